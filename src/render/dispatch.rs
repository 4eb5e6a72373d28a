//! File-pattern → renderer dispatch table.
//!
//! An ordered list of `(pattern, renderer)` pairs; the first pattern that
//! matches a template name decides how it is rendered.
//!
//! | Pattern      | Renderer      | Output                          |
//! |--------------|---------------|---------------------------------|
//! | `\.md$`      | `Post`        | `posts/<stem>/index.html`       |
//! | `\.html?$`   | `GenericPage` | `<name>` or `<stem>/index.html` |
//! | anything     | `Template`    | `<name>`                        |

use regex::Regex;
use std::sync::LazyLock;

/// The closed set of render routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    /// Markdown document rendered through the post master template
    Post,
    /// Markup file rendered as its own template
    GenericPage,
    /// Any other template, written to its own relative path (feeds, robots.txt)
    Template,
}

/// One row of the dispatch table.
#[derive(Debug, Clone)]
pub struct RenderRule {
    pattern: Regex,
    renderer: Renderer,
}

impl RenderRule {
    pub fn new(pattern: &str, renderer: Renderer) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            renderer,
        })
    }
}

static DEFAULT_RULES: LazyLock<Vec<RenderRule>> = LazyLock::new(|| {
    vec![
        RenderRule::new(r"\.md$", Renderer::Post).unwrap(),
        RenderRule::new(r"\.html?$", Renderer::GenericPage).unwrap(),
        RenderRule::new(r".", Renderer::Template).unwrap(),
    ]
});

/// Ordered dispatch table, first match wins.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    rules: Vec<RenderRule>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.clone())
    }
}

impl Dispatcher {
    pub fn new(rules: Vec<RenderRule>) -> Self {
        Self { rules }
    }

    /// Pick the renderer for a template name, `None` when no rule matches.
    pub fn select(&self, name: &str) -> Option<Renderer> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(name))
            .map(|rule| rule.renderer)
    }
}
