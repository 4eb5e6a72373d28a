//! Error types for the build pipeline and the dev server.
//!
//! Every variant except [`SiteError::WatchSetup`] is fatal to the current
//! build or process; they are propagated through `anyhow`.

use std::{net::SocketAddr, path::PathBuf};
use thiserror::Error;

/// Failures surfaced by the build, the watcher and the dev server.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to parse `{}`", path.display())]
    SourceParse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("failed to render `{template}` into `{}`", dest.display())]
    TemplateRender {
        template: String,
        dest: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("could not watch directory `{}`, make sure it exists", path.display())]
    WatchSetup {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to bind dev server on {addr}")]
    NetworkBind {
        addr: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("tag `{tag}` would be written outside the output directory")]
    UnsafeTag { tag: String },
}

/// Why a content file could not be turned into a document.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML front matter")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML front matter")]
    Toml(#[from] toml::de::Error),

    #[error("front matter opened with `{0}` is never closed")]
    Unterminated(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    Date(String),
}
