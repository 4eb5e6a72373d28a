//! Template discovery over the source tree.
//!
//! Every file is a template except:
//! - anything under the static subtree (copied, never rendered)
//! - paths with a component starting with `_` (partials, master templates)
//! - paths with a component starting with `.` (hidden files, editor state)

use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Discover template names under `source`, in file-name order.
///
/// Names are `/`-separated and relative to `source`, as the template
/// loader expects them.
pub fn discover_templates(source: &Path, static_dir: &Path) -> Vec<String> {
    WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || (!is_excluded(e) && e.path() != static_dir))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| template_name(e.path(), source))
        .collect()
}

/// Whether a walked entry is a partial or a hidden file.
fn is_excluded(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('_') || name.starts_with('.'))
}

/// `source/blog/about.html` → `blog/about.html`
fn template_name(path: &Path, source: &Path) -> Option<String> {
    let rel = path.strip_prefix(source).ok()?;
    let parts: Option<Vec<&str>> = rel
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    Some(parts?.join("/"))
}
