//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn content() -> PathBuf {
        "posts".into()
    }

    pub fn static_dir() -> PathBuf {
        "static".into()
    }

    pub fn post_template() -> String {
        "_post.html".into()
    }

    pub fn tag_template() -> String {
        "_tag.html".into()
    }

    pub fn root_pages() -> Vec<String> {
        vec!["index.html".into(), "404.html".into()]
    }

    pub fn recent_posts() -> usize {
        5
    }

    pub fn untitled() -> String {
        "Untitled".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "0.0.0.0".into()
    }

    pub fn port() -> u16 {
        3000
    }
}
