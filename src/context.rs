//! Build-wide template context.
//!
//! A [`GlobalContext`] is constructed at the start of each build and handed
//! to the template engine as globals. Nothing outlives the build that made it.

use crate::{content::Document, utils::git::BuildId};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Values visible to every template render.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalContext {
    /// Current year, as a string for footers
    pub year: String,
    /// The newest documents, at most `recent_posts` of them
    pub recent_posts: Vec<Document>,
    /// Every document, newest first
    pub posts: Vec<Document>,
    /// Abbreviated HEAD revision, empty outside a repository
    pub commit: String,
    /// Full HEAD revision, empty outside a repository
    pub commit_full: String,
}

impl GlobalContext {
    /// `posts` must already be sorted newest first.
    pub fn new(posts: Vec<Document>, recent: usize, today: NaiveDate, build_id: BuildId) -> Self {
        let recent_posts = posts.iter().take(recent).cloned().collect();
        Self {
            year: today.year().to_string(),
            recent_posts,
            posts,
            commit: build_id.short,
            commit_full: build_id.full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str) -> Document {
        Document {
            title: title.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            excerpt: String::new(),
            url: format!("/posts/{title}"),
            content: String::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_recent_posts_truncated() {
        let posts: Vec<_> = (0..8).map(|i| doc(&i.to_string())).collect();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let ctx = GlobalContext::new(posts, 5, today, BuildId::default());

        assert_eq!(ctx.posts.len(), 8);
        assert_eq!(ctx.recent_posts.len(), 5);
        assert_eq!(ctx.recent_posts[0].title, "0");
        assert_eq!(ctx.recent_posts[4].title, "4");
        assert_eq!(ctx.year, "2026");
    }

    #[test]
    fn test_fewer_posts_than_recent_limit() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ctx = GlobalContext::new(vec![doc("only")], 5, today, BuildId::default());

        assert_eq!(ctx.recent_posts.len(), 1);
    }

    #[test]
    fn test_build_id_exposed() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let id = BuildId {
            short: "abc1234".into(),
            full: "abc1234def".into(),
        };

        let ctx = GlobalContext::new(Vec::new(), 5, today, id);

        assert_eq!(ctx.commit, "abc1234");
        assert_eq!(ctx.commit_full, "abc1234def");
    }
}
