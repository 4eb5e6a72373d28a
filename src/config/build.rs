//! `[build]` section configuration.
//!
//! Source, output and content locations plus the names of the master templates.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in webcore.toml - build pipeline configuration.
///
/// `content` and `static` are relative to `source`. After loading, every
/// path here is absolute.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"           # Template search path
/// output = "build"         # Output directory
/// content = "posts"        # Markdown posts, inside `source`
/// static = "static"        # Copied verbatim to <output>/static
/// recent_posts = 5
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Template search path, watched in serve mode.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory, removed at the start of every build.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Markdown content directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Static assets subtree, never rendered.
    #[serde(rename = "static", default = "defaults::build::static_dir")]
    #[educe(Default = defaults::build::static_dir())]
    pub static_dir: PathBuf,

    /// Master template for posts.
    #[serde(default = "defaults::build::post_template")]
    #[educe(Default = defaults::build::post_template())]
    pub post_template: String,

    /// Master template for tag index pages.
    #[serde(default = "defaults::build::tag_template")]
    #[educe(Default = defaults::build::tag_template())]
    pub tag_template: String,

    /// Root-level pages written under their literal name instead of `<stem>/index.html`.
    #[serde(default = "defaults::build::root_pages")]
    #[educe(Default = defaults::build::root_pages())]
    pub root_pages: Vec<String>,

    /// Number of documents exposed as `recent_posts`.
    #[serde(default = "defaults::build::recent_posts")]
    #[educe(Default = defaults::build::recent_posts())]
    pub recent_posts: usize,

    /// Title used when a document has none.
    #[serde(default = "defaults::build::untitled")]
    #[educe(Default = defaults::build::untitled())]
    pub untitled: String,
}
