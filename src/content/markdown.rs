//! Markdown → HTML conversion.
//!
//! CommonMark via pulldown-cmark with the GFM-ish extensions the blog relies
//! on (tables, footnotes, `~~strike~~`, task lists, `{#id}` heading
//! attributes). Every heading gets an `id` so a table of contents or a
//! fragment link can point at it.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html::push_html};
use rustc_hash::FxHashMap;

/// Render a markdown body to HTML.
pub fn render_markdown(body: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let events = inject_heading_ids(Parser::new_ext(body, options));

    let mut html = String::with_capacity(body.len() * 2);
    push_html(&mut html, events.into_iter());
    html
}

/// Give every heading without an explicit id a slug of its text.
///
/// Repeated slugs get a numeric suffix: `intro`, `intro-1`, `intro-2`.
fn inject_heading_ids<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events: Vec<Event<'a>> = Vec::new();
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    // Index of the buffered `Start(Heading)` while inside a heading
    let mut heading_start: Option<usize> = None;
    let mut heading_text = String::new();

    for event in parser {
        match &event {
            Event::Start(Tag::Heading { .. }) => {
                heading_start = Some(events.len());
                heading_text.clear();
            }
            Event::Text(text) | Event::Code(text) if heading_start.is_some() => {
                heading_text.push_str(text);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(start) = heading_start.take()
                    && let Event::Start(Tag::Heading { id, .. }) = &mut events[start]
                    && id.is_none()
                {
                    let slug = slugify(&heading_text);
                    if !slug.is_empty() {
                        *id = Some(CowStr::from(unique_slug(slug, &mut seen)));
                    }
                }
            }
            _ => {}
        }
        events.push(event);
    }

    events
}

/// Suffix `slug` with a counter if it was already handed out.
fn unique_slug(slug: String, seen: &mut FxHashMap<String, usize>) -> String {
    let count = seen.entry(slug.clone()).or_insert(0);
    let unique = if *count == 0 {
        slug
    } else {
        format!("{slug}-{count}")
    };
    *count += 1;
    unique
}

/// Lowercase, collapse non-alphanumeric runs into single hyphens, trim hyphens.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_hyphen = true; // suppress leading hyphen
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_emphasis() {
        let html = render_markdown("Hello *world*");
        assert_eq!(html.trim(), "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn test_heading_gets_id() {
        let html = render_markdown("## Getting Started");
        assert!(html.contains(r#"<h2 id="getting-started">Getting Started</h2>"#));
    }

    #[test]
    fn test_duplicate_headings_get_suffix() {
        let html = render_markdown("# Intro\n\n# Intro\n\n# Intro");
        assert!(html.contains(r#"id="intro""#));
        assert!(html.contains(r#"id="intro-1""#));
        assert!(html.contains(r#"id="intro-2""#));
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let html = render_markdown("## Setup {#install}");
        assert!(html.contains(r#"id="install""#));
        assert!(!html.contains(r#"id="setup""#));
    }

    #[test]
    fn test_inline_code_in_heading_slug() {
        let html = render_markdown("## The `build` step");
        assert!(html.contains(r#"id="the-build-step""#));
    }

    #[test]
    fn test_table_extension() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough_extension() {
        let html = render_markdown("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_fenced_code_language_class() {
        let html = render_markdown("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = render_markdown("<div class=\"note\">hi</div>");
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  --Already--Slugged--  "), "already-slugged");
        assert_eq!(slugify("???"), "");
    }
}
