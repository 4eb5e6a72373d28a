//! Tag index and tag pages.
//!
//! Tags keep the order in which they first appear while walking the sorted
//! document list, so the newest post's tags come first. Tags are taken
//! verbatim: `Rust` and `rust` are two different pages.

use super::Site;
use crate::{content::Document, error::SiteError};
use anyhow::Result;
use minijinja::context;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::{Component, Path, PathBuf};

/// Tag → documents carrying it, in first-appearance order.
#[derive(Debug, Default, Clone)]
pub struct TagIndex {
    entries: Vec<(String, Vec<Document>)>,
    lookup: FxHashMap<String, usize>,
}

impl TagIndex {
    /// Build the index from documents sorted newest first.
    ///
    /// A tag repeated inside one document lists that document once.
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut index = Self::default();

        for doc in documents {
            for tag in &doc.tags {
                let slot = match index.lookup.get(tag) {
                    Some(&slot) => slot,
                    None => {
                        index.entries.push((tag.clone(), Vec::new()));
                        index.lookup.insert(tag.clone(), index.entries.len() - 1);
                        index.entries.len() - 1
                    }
                };

                let posts = &mut index.entries[slot].1;
                if posts.last().is_none_or(|last| last != doc) {
                    posts.push(doc.clone());
                }
            }
        }

        index
    }

    /// Documents carrying `tag`, newest first.
    pub fn get(&self, tag: &str) -> Option<&[Document]> {
        self.lookup
            .get(tag)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Tags in first-appearance order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Document])> {
        self.entries
            .iter()
            .map(|(tag, posts)| (tag.as_str(), posts.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `<output>/posts/tag/<tag>/index.html`
///
/// The tag must be a single plain path component.
pub fn tag_output_path(output: &Path, tag: &str) -> Result<PathBuf, SiteError> {
    let mut components = Path::new(tag).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == tag => {
            Ok(output.join("posts").join("tag").join(tag).join("index.html"))
        }
        _ => Err(SiteError::UnsafeTag {
            tag: tag.to_owned(),
        }),
    }
}

/// Render one page per tag through the tag master template.
///
/// Returns the number of pages written.
pub fn render_tag_pages(site: &Site<'_>, index: &TagIndex) -> Result<usize> {
    let pages = index
        .iter()
        .map(|(tag, posts)| {
            tag_output_path(&site.build.output, tag).map(|dest| (tag, posts, dest))
        })
        .collect::<Result<Vec<_>, SiteError>>()?;

    pages.par_iter().try_for_each(|(tag, posts, dest)| {
        site.engine
            .render_to_file(&site.build.tag_template, context! { tag, posts }, dest)
    })?;

    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(title: &str, day: u32, tags: &[&str]) -> Document {
        Document {
            title: title.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            excerpt: String::new(),
            url: format!("/posts/{}", title.to_lowercase()),
            content: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn titles(posts: &[Document]) -> Vec<&str> {
        posts.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn test_index_orders_posts_and_tags() {
        // newest first, as the loader hands them over
        let docs = vec![doc("Beta", 2, &["x", "y"]), doc("Alpha", 1, &["x"])];

        let index = TagIndex::from_documents(&docs);

        assert_eq!(index.tags().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(titles(index.get("x").unwrap()), vec!["Beta", "Alpha"]);
        assert_eq!(titles(index.get("y").unwrap()), vec!["Beta"]);
        assert!(index.get("z").is_none());
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let docs = vec![doc("A", 1, &["Rust", "rust"])];
        let index = TagIndex::from_documents(&docs);

        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_tag_in_one_document() {
        let docs = vec![doc("A", 1, &["x", "x"])];
        let index = TagIndex::from_documents(&docs);

        assert_eq!(index.get("x").unwrap().len(), 1);
    }

    #[test]
    fn test_untagged_documents() {
        let index = TagIndex::from_documents(&[doc("A", 1, &[])]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_tag_output_path() {
        assert_eq!(
            tag_output_path(Path::new("/out"), "rust").unwrap(),
            PathBuf::from("/out/posts/tag/rust/index.html")
        );
        assert_eq!(
            tag_output_path(Path::new("/out"), "hello world").unwrap(),
            PathBuf::from("/out/posts/tag/hello world/index.html")
        );
    }

    #[test]
    fn test_unsafe_tags_rejected() {
        for tag in ["", "..", ".", "a/b", "/etc", "x/"] {
            assert!(
                matches!(
                    tag_output_path(Path::new("/out"), tag),
                    Err(SiteError::UnsafeTag { .. })
                ),
                "{tag:?} should be rejected"
            );
        }
    }
}
