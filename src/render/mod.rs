//! Rendering of discovered templates into the output tree.
//!
//! # Architecture
//!
//! ```text
//! discover_templates() ──► Dispatcher::select()
//!                               │
//!             ┌─────────────────┼──────────────────────┐
//!             ▼                 ▼                      ▼
//!        Renderer::Post   Renderer::GenericPage   Renderer::Template
//!             │                 │                      │
//!      pages::render_post  pages::render_page   pages::render_template
//!             │                 │                      │
//!             └──────► TemplateEngine::render_to_file ◄┘
//! ```
//!
//! The default table ends with a catch-all, so every discovered template is
//! written somewhere. A custom table without one skips unmatched names.
//!
//! Tag pages are rendered separately by [`tags::render_tag_pages`].

pub mod discover;
pub mod dispatch;
pub mod engine;
pub mod pages;
pub mod tags;

use crate::{config::BuildConfig, content::Defaults, log};
use anyhow::Result;
use dispatch::{Dispatcher, Renderer};
use engine::TemplateEngine;
use rayon::prelude::*;
use std::path::PathBuf;

/// Everything a render routine needs for one build.
pub struct Site<'a> {
    pub engine: TemplateEngine,
    pub build: &'a BuildConfig,
    pub defaults: Defaults<'a>,
    pub dispatcher: Dispatcher,
}

impl<'a> Site<'a> {
    pub fn new(engine: TemplateEngine, build: &'a BuildConfig, defaults: Defaults<'a>) -> Self {
        Self {
            engine,
            build,
            defaults,
            dispatcher: Dispatcher::default(),
        }
    }

    /// Render one template through its dispatched routine.
    ///
    /// Returns the written path, or `None` when no rule matches the name.
    pub fn render(&self, name: &str) -> Result<Option<PathBuf>> {
        let dest = match self.dispatcher.select(name) {
            Some(Renderer::Post) => pages::render_post(self, name)?,
            Some(Renderer::GenericPage) => pages::render_page(self, name)?,
            Some(Renderer::Template) => pages::render_template(self, name)?,
            None => return Ok(None),
        };
        Ok(Some(dest))
    }

    /// Render every template. Returns how many files were written.
    ///
    /// The first failure aborts the remaining renders.
    pub fn render_all(&self, names: &[String]) -> Result<usize> {
        let written = names
            .par_iter()
            .map(|name| -> Result<bool> {
                let dest = self.render(name)?;
                if dest.is_none() {
                    log!("render"; "skipped {name}: no matching renderer");
                }
                Ok(dest.is_some())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(written.into_iter().filter(|&w| w).count())
    }
}
