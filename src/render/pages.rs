//! The render routines: posts, generic pages and plain templates.
//!
//! All of them create missing directories and overwrite whatever sits at the
//! destination; the output tree was cleared at the start of the build.

use super::Site;
use crate::content::load_document;
use anyhow::Result;
use minijinja::context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output file name for directory-style URLs.
const INDEX_HTML: &str = "index.html";

/// Per-file context of a generic page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Template name, relative to the source directory
    pub name: String,
    /// Public URL of the written page
    pub url: String,
}

/// `posts/a.md` → `<output>/posts/a/index.html`
pub fn post_output_path(output: &Path, name: &str) -> PathBuf {
    output.join("posts").join(stem(name)).join(INDEX_HTML)
}

/// Destination and URL of a generic page.
///
/// Root-level special pages keep their file name; everything else becomes
/// `<stem>/index.html` at the output root, whatever directory it came from.
pub fn page_target(output: &Path, name: &str, root_pages: &[String]) -> (PathBuf, PageInfo) {
    let info = |url: String| PageInfo {
        name: name.to_owned(),
        url,
    };

    if root_pages.iter().any(|page| page == name) {
        let url = if name == INDEX_HTML {
            "/".to_owned()
        } else {
            format!("/{name}")
        };
        return (output.join(name), info(url));
    }

    let stem = stem(name);
    let url = format!("/{stem}/");
    (output.join(&stem).join(INDEX_HTML), info(url))
}

/// File name without its extension.
fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `feed.xml` → `<output>/feed.xml`, `meta/robots.txt` → `<output>/meta/robots.txt`
pub fn template_output_path(output: &Path, name: &str) -> PathBuf {
    name.split('/').fold(output.to_path_buf(), |path, part| path.join(part))
}

/// Render a markdown document through the post master template.
pub fn render_post(site: &Site<'_>, name: &str) -> Result<PathBuf> {
    let document = load_document(&site.build.source.join(name), site.defaults)?;
    let dest = post_output_path(&site.build.output, name);

    site.engine
        .render_to_file(&site.build.post_template, context! { post => document }, &dest)?;
    Ok(dest)
}

/// Render a markup file as a template of its own.
pub fn render_page(site: &Site<'_>, name: &str) -> Result<PathBuf> {
    let (dest, page) = page_target(&site.build.output, name, &site.build.root_pages);

    site.engine.render_to_file(name, context! { page }, &dest)?;
    Ok(dest)
}

/// Render any other template to its own relative path, with globals only.
pub fn render_template(site: &Site<'_>, name: &str) -> Result<PathBuf> {
    let dest = template_output_path(&site.build.output, name);

    site.engine.render_to_file(name, context! {}, &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_pages() -> Vec<String> {
        vec!["index.html".into(), "404.html".into()]
    }

    #[test]
    fn test_post_output_path() {
        let out = Path::new("/out");
        assert_eq!(
            post_output_path(out, "posts/hello.md"),
            PathBuf::from("/out/posts/hello/index.html")
        );
        assert_eq!(
            post_output_path(out, "elsewhere/deep/note.md"),
            PathBuf::from("/out/posts/note/index.html")
        );
    }

    #[test]
    fn test_root_special_pages() {
        let out = Path::new("/out");

        let (dest, info) = page_target(out, "index.html", &root_pages());
        assert_eq!(dest, PathBuf::from("/out/index.html"));
        assert_eq!(info.url, "/");

        let (dest, info) = page_target(out, "404.html", &root_pages());
        assert_eq!(dest, PathBuf::from("/out/404.html"));
        assert_eq!(info.url, "/404.html");
    }

    #[test]
    fn test_generic_page_gets_directory() {
        let (dest, info) = page_target(Path::new("/out"), "about.html", &root_pages());

        assert_eq!(dest, PathBuf::from("/out/about/index.html"));
        assert_eq!(info.url, "/about/");
        assert_eq!(info.name, "about.html");
    }

    #[test]
    fn test_nested_page_lands_at_root_by_stem() {
        let (dest, info) = page_target(Path::new("/out"), "blog/about.html", &root_pages());

        assert_eq!(dest, PathBuf::from("/out/about/index.html"));
        assert_eq!(info.url, "/about/");
        assert_eq!(info.name, "blog/about.html");
    }

    #[test]
    fn test_special_names_only_match_at_root() {
        let (dest, info) = page_target(Path::new("/out"), "blog/index.html", &root_pages());

        assert_eq!(dest, PathBuf::from("/out/index/index.html"));
        assert_eq!(info.url, "/index/");
    }

    #[test]
    fn test_template_output_path() {
        let out = Path::new("/out");
        assert_eq!(template_output_path(out, "feed.xml"), PathBuf::from("/out/feed.xml"));
        assert_eq!(
            template_output_path(out, "meta/robots.txt"),
            PathBuf::from("/out/meta/robots.txt")
        );
    }
}
