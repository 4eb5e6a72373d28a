//! Build identifier from version-control state.
//!
//! The revision of `HEAD` in the repository enclosing the project root is
//! exposed to templates as `commit` / `commit_full` for cache-busting.

use serde::Serialize;
use std::path::Path;

/// Length of the abbreviated revision, matching `git rev-parse --short`.
const SHORT_HASH_LEN: usize = 7;

/// Revision of the checked-out commit. Both fields are empty outside a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildId {
    pub short: String,
    pub full: String,
}

impl BuildId {
    /// Discover the repository containing `root` and read its `HEAD`.
    ///
    /// Any failure (no repository, unborn branch, detached broken ref)
    /// yields the empty identifier.
    pub fn discover(root: &Path) -> Self {
        let Ok(repo) = gix::discover(root) else {
            return Self::default();
        };
        let Ok(head) = repo.head_id() else {
            return Self::default();
        };

        let id = head.detach();
        Self {
            short: id.to_hex_with_len(SHORT_HASH_LEN).to_string(),
            full: id.to_string(),
        }
    }
}
