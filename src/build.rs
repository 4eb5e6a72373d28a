//! Site building orchestration.
//!
//! Every build is a full rebuild from an empty output directory.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── remove_dir_if_exists(output)
//!     │
//!     ├── load_documents() ──► GlobalContext ──► TemplateEngine
//!     │       (posts/*.md, newest first)   (year, posts, commit)
//!     │
//!     ├── rayon::join
//!     │       ├── discover_templates() → Site::render_all()
//!     │       └── copy_tree(static → output/static)
//!     │
//!     └── TagIndex::from_documents() → render_tag_pages()
//! ```
//!
//! Any failure aborts the build and leaves a partial output tree behind.

use crate::{
    config::SiteConfig,
    content::{Defaults, load_documents},
    context::GlobalContext,
    log,
    render::{
        Site,
        discover::discover_templates,
        engine::TemplateEngine,
        tags::{TagIndex, render_tag_pages},
    },
    utils::{
        fs::{copy_tree, remove_dir_if_exists},
        git::BuildId,
    },
};
use anyhow::Result;
use std::time::Instant;

/// Counts gathered during one build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Markdown documents loaded from the content directory
    pub documents: usize,
    /// Files written by the dispatched renderers
    pub pages: usize,
    /// Tag index pages written
    pub tags: usize,
    /// Static files copied
    pub static_files: usize,
}

/// Build the entire site into `config.build.output`.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let started = Instant::now();
    let build = &config.build;

    remove_dir_if_exists(&build.output)?;

    let today = chrono::Local::now().date_naive();
    let defaults = Defaults {
        title: &build.untitled,
        date: today,
    };

    let documents = load_documents(&build.content, defaults)?;
    log!("build"; "loaded {} documents", documents.len());

    let tag_index = TagIndex::from_documents(&documents);
    let document_count = documents.len();

    let globals = GlobalContext::new(
        documents,
        build.recent_posts,
        today,
        BuildId::discover(&config.root),
    );
    let engine = TemplateEngine::new(&build.source, &globals);
    let site = Site::new(engine, build, defaults);

    let templates = discover_templates(&build.source, &build.static_dir);
    let (pages, static_files) = rayon::join(
        || site.render_all(&templates),
        || copy_tree(&build.static_dir, &build.output.join("static")),
    );
    let (pages, static_files) = (pages?, static_files?);

    let tags = render_tag_pages(&site, &tag_index)?;

    let report = BuildReport {
        documents: document_count,
        pages,
        tags,
        static_files,
    };
    log!(
        "build";
        "{} pages, {} tags, {} static files in {:.2?}",
        report.pages,
        report.tags,
        report.static_files,
        started.elapsed()
    );

    Ok(report)
}
