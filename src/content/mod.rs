//! Content loading: markdown files with front matter → [`Document`]s.
//!
//! # Flow
//!
//! ```text
//! posts/*.md ──► front_matter::parse() ──► markdown::render_markdown()
//!                        │                            │
//!                        └──────────► Document ◄──────┘
//!                                        │
//!                     sort by date desc (stable, file-name order on ties)
//! ```
//!
//! Nothing is cached: every build re-reads and re-renders every file, and a
//! single malformed file fails the whole build.

pub mod front_matter;
pub mod markdown;

use crate::error::{FrontMatterError, SiteError};
use anyhow::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Extension of content files.
pub const CONTENT_EXT: &str = "md";

/// A rendered content item, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub date: NaiveDate,
    pub excerpt: String,
    /// Canonical output path, `/posts/<stem>`
    pub url: String,
    /// Rendered HTML body
    pub content: String,
    pub tags: Vec<String>,
}

/// Fallbacks for metadata a file leaves out.
#[derive(Debug, Clone, Copy)]
pub struct Defaults<'a> {
    pub title: &'a str,
    pub date: NaiveDate,
}

/// Canonical URL of the document generated from `stem`.
pub fn post_url(stem: &str) -> String {
    format!("/posts/{stem}")
}

/// Load a single content file.
pub fn load_document(path: &Path, defaults: Defaults<'_>) -> Result<Document, SiteError> {
    let parse_error = |source: FrontMatterError| SiteError::SourceParse {
        path: path.to_path_buf(),
        source,
    };

    let raw = fs::read_to_string(path).map_err(|e| parse_error(e.into()))?;
    let (meta, body) = front_matter::parse(&raw).map_err(parse_error)?;
    let date = meta.parsed_date().map_err(parse_error)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Document {
        title: meta.title.unwrap_or_else(|| defaults.title.to_owned()),
        date: date.unwrap_or(defaults.date),
        excerpt: meta.excerpt.unwrap_or_default(),
        url: post_url(&stem),
        content: markdown::render_markdown(body),
        tags: meta.tags,
    })
}

/// Markdown files directly inside `dir`, in file-name order.
///
/// A missing directory has no content.
pub fn content_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == CONTENT_EXT))
        .collect()
}

/// Load every document in `dir`, newest first.
///
/// Documents sharing a date keep their file-name order.
pub fn load_documents(dir: &Path, defaults: Defaults<'_>) -> Result<Vec<Document>> {
    let mut documents = content_files(dir)
        .par_iter()
        .map(|path| load_document(path, defaults))
        .collect::<Result<Vec<_>, _>>()?;

    documents.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(documents)
}
