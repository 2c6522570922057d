//! Whitespace-preserving rendering of inline literals.
//!
//! The text is split into words, space runs and newlines. Words that
//! contain a break opportunity (two consecutive non-word characters, or a
//! leading `-`/`?`) are wrapped in `<span class="pre">` so browsers do not
//! wrap them; runs of spaces keep their width through `&nbsp;`.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::encode;

static WORDS_AND_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+| +|\n").expect("valid tokenizer pattern"));

static BREAK_OPPORTUNITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+\W\W.+|[-?].+").expect("valid break pattern"));

/// Render literal text as the inner HTML of a `<code>` element.
pub(crate) fn render_literal_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in WORDS_AND_SPACES.find_iter(text).map(|m| m.as_str()) {
        if !token.trim().is_empty() {
            if BREAK_OPPORTUNITY.is_match(token) {
                out.push_str("<span class=\"pre\">");
                out.push_str(&encode(token));
                out.push_str("</span>");
            } else {
                out.push_str(&encode(token));
            }
        } else if token == "\n" || token == " " {
            out.push_str(token);
        } else {
            out.push_str(&"&nbsp;".repeat(token.len() - 1));
            out.push(' ');
        }
    }
    out
}
