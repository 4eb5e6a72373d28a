//! Filesystem helpers shared by the build steps.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively, in file-name order.
///
/// A missing directory yields an empty list.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Remove a directory tree, tolerating its absence.
pub fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to clear output directory: {}", dir.display())),
    }
}

/// Create the parent directories of `path` if absent.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Copy every file under `src` to the same relative location under `dest`.
///
/// Returns the number of files copied. A missing `src` copies nothing.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let files = collect_all_files(src);

    files.par_iter().try_for_each(|path| {
        let rel = path.strip_prefix(src)?;
        let target = dest.join(rel);
        ensure_parent(&target)?;
        fs::copy(path, &target)
            .with_context(|| format!("Failed to copy {}", path.display()))?;
        Ok::<_, anyhow::Error>(())
    })?;

    Ok(files.len())
}
