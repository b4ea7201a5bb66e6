//! Content-renderer collaborator: stored text → HTML markup.
//!
//! Used only at the serving boundary. Persisted content stays plain; the
//! navigator runs children's content through [`render_markdown`] just
//! before categorized listings leave the core.

use pulldown_cmark::{html, Parser};

/// Converts markdown text to an HTML fragment.
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new(content);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Renders optional content, mapping absent to absent.
pub fn render_optional(content: Option<&str>) -> Option<String> {
    content.map(render_markdown)
}
