//! Conversion to a bare HTML fragment.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConvertError;
use crate::publisher::{Settings, publish_parts};

/// Opening tag of the document wrapper plus the rest of its line.
static WRAPPER_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<div[^>]+>(.*)").expect("valid wrapper pattern"));

/// Strip the document `<div>` wrapper from an `html_body` part.
///
/// The first opening `<div ...>` tag is removed (the text after it on the
/// same line is kept), then the closing `</div>` and surrounding
/// whitespace.
///
/// ```
/// use rst_renderer::extract_fragment;
///
/// let body = "<div class=\"document\">\n<p>Hi</p>\n</div>\n";
/// assert_eq!(extract_fragment(body), "<p>Hi</p>");
/// ```
#[must_use]
pub fn extract_fragment(html_body: &str) -> String {
    let unwrapped = WRAPPER_DIV.replacen(html_body, 1, "$1");
    let trimmed = unwrapped.trim_end();
    trimmed
        .strip_suffix("</div>")
        .unwrap_or(trimmed)
        .trim()
        .to_owned()
}

/// Convert UTF-8 encoded RST into an HTML fragment.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidUtf8`] for undecodable input, and the
/// errors of [`convert_str`] otherwise.
pub fn convert(input: &[u8], settings: &Settings) -> Result<String, ConvertError> {
    let source = std::str::from_utf8(input)?;
    convert_str(source, settings)
}

/// Convert RST text into an HTML fragment.
///
/// # Errors
///
/// Returns [`ConvertError`] if parsing or rendering fails. No partial
/// output is produced.
///
/// # Example
///
/// ```
/// use rst_renderer::{Settings, convert_str};
///
/// let html = convert_str("Title\n=====\n\nHello *world*.", &Settings::default()).unwrap();
/// assert_eq!(html, "<h1>Title</h1>\n<p>Hello <em>world</em>.</p>");
/// ```
pub fn convert_str(source: &str, settings: &Settings) -> Result<String, ConvertError> {
    let parts = publish_parts(source, settings)?;
    let fragment = extract_fragment(&parts.html_body);
    tracing::debug!(bytes = fragment.len(), "converted document");
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_fragment_with_trailing_blank_lines() {
        assert_eq!(
            extract_fragment("<div class=\"document\">\n<p>x</p>\n</div>\n\n\n"),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_extract_fragment_single_line() {
        assert_eq!(
            extract_fragment("<div class=\"document\">  INNER </div>\n\n\n"),
            "INNER"
        );
    }

    #[test]
    fn test_extract_fragment_keeps_rest_of_first_line() {
        assert_eq!(
            extract_fragment("<div class=\"document\" id=\"a\"><span id=\"b\"></span>\n<p>x</p>\n</div>\n"),
            "<span id=\"b\"></span>\n<p>x</p>"
        );
    }

    #[test]
    fn test_extract_fragment_only_first_div() {
        assert_eq!(
            extract_fragment("<div class=\"document\">\n<div class=\"topic\">\n<p>t</p>\n</div>\n</div>\n"),
            "<div class=\"topic\">\n<p>t</p>\n</div>"
        );
    }

    #[test]
    fn test_convert_title_and_paragraph() {
        let html = convert(b"Title\n=====\n\nHello *world*.", &Settings::default()).unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("Hello <em>world</em>."));
        assert!(!html.contains("<div"));
    }

    #[test]
    fn test_convert_sourcecode() {
        let html = convert(
            b"Example:\n\n.. sourcecode::\n   :options: lang-rust\n\n   if a < b && c {\n       go();\n   }\n",
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(
            html,
            "<p>Example:</p>\n<pre class=\"prettyprint lang-rust\">if a &lt; b &amp;&amp; c {\n    go();\n}</pre>"
        );
    }

    #[test]
    fn test_convert_rejects_invalid_utf8() {
        let err = convert(b"caf\xe9", &Settings::default()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidUtf8(_)));
    }

    #[test]
    fn test_convert_empty_sourcecode_fails() {
        let err = convert(b".. sourcecode::\n\nText.\n", &Settings::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Directive { .. }));
    }

    #[test]
    fn test_convert_syntax_error() {
        let err = convert_str("Para.\n\n   Title\n   =====\n", &Settings::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Syntax { .. }));
    }

    #[test]
    fn test_convert_empty_document() {
        assert_eq!(convert(b"", &Settings::default()).unwrap(), "");
    }

    #[test]
    fn test_convert_is_deterministic() {
        let src = b"A\n=\n\nB\n-\n\n=  =\nx  y\n=  =\n\n* ``a  b``\n";
        let settings = Settings::default();
        assert_eq!(
            convert(src, &settings).unwrap(),
            convert(src, &settings).unwrap()
        );
    }
}
