//! Markup rendering for edit scripts.

use super::DiffOp;

/// CSS class wrapping inserted text.
pub const ADDED_CLASS: &str = "diff-added";

/// CSS class wrapping deleted text.
pub const REMOVED_CLASS: &str = "diff-removed";

/// Escapes `&`, `<`, `>`, `"`, and `'` for inclusion in markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders `ops` as escaped markup with changed spans wrapped in classes.
#[must_use]
pub fn render(ops: &[DiffOp]) -> String {
    ops.iter().fold(String::new(), |mut markup, op| {
        let escaped = escape_html(op.text());
        match op {
            DiffOp::Equal(_) => markup.push_str(&escaped),
            DiffOp::Insert(_) => push_span(&mut markup, ADDED_CLASS, &escaped),
            DiffOp::Delete(_) => push_span(&mut markup, REMOVED_CLASS, &escaped),
        }
        markup
    })
}

fn push_span(markup: &mut String, class: &str, escaped: &str) {
    markup.push_str("<span class=\"");
    markup.push_str(class);
    markup.push_str("\">");
    markup.push_str(escaped);
    markup.push_str("</span>");
}
