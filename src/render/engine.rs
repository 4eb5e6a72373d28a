//! Template engine wrapper.
//!
//! Templates are looked up by `/`-separated name relative to the source
//! directory. Output is not auto-escaped: rendered markdown is inserted with
//! a plain `{{ post.content }}`, as in classic Jinja setups.

use crate::{context::GlobalContext, error::SiteError, utils::fs::ensure_parent};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use minijinja::{AutoEscape, Environment, ErrorKind, Value, path_loader};
use serde::Serialize;
use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Default pattern of the `dateformat` filter.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A configured environment for one build.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine loading templates from `source`, with `globals` injected.
    pub fn new(source: &Path, globals: &GlobalContext) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(source));
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("dateformat", dateformat);

        env.add_global("year", Value::from(globals.year.as_str()));
        env.add_global("recent_posts", Value::from_serialize(&globals.recent_posts));
        env.add_global("posts", Value::from_serialize(&globals.posts));
        env.add_global("commit", Value::from(globals.commit.as_str()));
        env.add_global("commit_full", Value::from(globals.commit_full.as_str()));

        Self { env }
    }

    /// Render `template` with the per-file `ctx` and stream the result into `dest`.
    ///
    /// Missing parent directories are created; an existing file is overwritten.
    pub fn render_to_file<S: Serialize>(&self, template: &str, ctx: S, dest: &Path) -> Result<()> {
        let render_error = |source: minijinja::Error| SiteError::TemplateRender {
            template: template.to_owned(),
            dest: dest.to_path_buf(),
            source,
        };

        let tmpl = self.env.get_template(template).map_err(render_error)?;

        ensure_parent(dest)?;
        let file =
            File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut writer = BufWriter::new(file);
        tmpl.render_to_write(ctx, &mut writer).map_err(render_error)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        Ok(())
    }
}

/// `{{ post.date | dateformat("%B %d, %Y") }}`
fn dateformat(value: String, format: Option<String>) -> Result<String, minijinja::Error> {
    let date = NaiveDate::parse_from_str(&value, DEFAULT_DATE_FORMAT).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("not a date: {value}"))
            .with_source(e)
    })?;

    let format = format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format: {format}"),
        )
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content::Document, utils::git::BuildId};
    use minijinja::context;
    use std::fs;
    use tempfile::TempDir;

    fn globals() -> GlobalContext {
        let doc = Document {
            title: "Alpha".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            excerpt: "first".into(),
            url: "/posts/a".into(),
            content: "<p>hi</p>".into(),
            tags: vec!["x".into()],
        };
        GlobalContext::new(
            vec![doc],
            5,
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            BuildId {
                short: "abc1234".into(),
                full: "abc1234ffff".into(),
            },
        )
    }

    #[test]
    fn test_globals_and_context_rendered() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("page.html"),
            "{{ year }}|{{ commit }}|{{ posts|length }}|{{ recent_posts[0].title }}|{{ name }}",
        )
        .unwrap();
        let engine = TemplateEngine::new(dir.path(), &globals());
        let dest = dir.path().join("out/nested/page.html");

        engine
            .render_to_file("page.html", context! { name => "ctx" }, &dest)
            .unwrap();

        assert_eq!(fs::read_to_string(dest).unwrap(), "2026|abc1234|1|Alpha|ctx");
    }

    #[test]
    fn test_html_is_not_escaped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("p.html"), "{{ posts[0].content }}").unwrap();
        let engine = TemplateEngine::new(dir.path(), &globals());
        let dest = dir.path().join("out.html");

        engine.render_to_file("p.html", context! {}, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_missing_template_is_render_error() {
        let dir = TempDir::new().unwrap();
        let engine = TemplateEngine::new(dir.path(), &globals());

        let err = engine
            .render_to_file("_post.html", context! {}, &dir.path().join("x.html"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::TemplateRender { .. })
        ));
    }

    #[test]
    fn test_syntax_error_is_render_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.html"), "{% for %}").unwrap();
        let engine = TemplateEngine::new(dir.path(), &globals());

        let err = engine
            .render_to_file("bad.html", context! {}, &dir.path().join("x.html"))
            .unwrap_err();

        assert!(err.downcast_ref::<SiteError>().is_some());
    }

    #[test]
    fn test_dateformat_filter() {
        assert_eq!(dateformat("2024-06-01".into(), None).unwrap(), "2024-06-01");
        assert_eq!(
            dateformat("2024-06-01".into(), Some("%B %d, %Y".into())).unwrap(),
            "June 01, 2024"
        );
        assert!(dateformat("June".into(), None).is_err());
    }

    #[test]
    fn test_dateformat_in_template() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("d.html"), "{{ posts[0].date | dateformat('%d/%m/%Y') }}")
            .unwrap();
        let engine = TemplateEngine::new(dir.path(), &globals());
        let dest = dir.path().join("d.out");

        engine.render_to_file("d.html", context! {}, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest).unwrap(), "01/01/2024");
    }
}
