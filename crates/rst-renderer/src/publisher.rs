//! Parse-and-render pipeline.

use rst_parser::{Node, NodeKind, Parser, ParserConfig, walkabout};

use crate::code_block::SourcecodeDirective;
use crate::error::ConvertError;
use crate::translator::HtmlTranslator;

/// Rendering settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Heading level used for top-level sections (1-6).
    pub initial_header_level: usize,
    /// Promote a lone top-level section to the document title.
    pub doctitle_xform: bool,
    /// Tab stop width used when expanding tabs in the source.
    pub tab_width: usize,
    /// Wrap section titles that refer back to a table of contents entry in
    /// a `toc-backref` link.
    pub heading_backlinks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_header_level: 1,
            doctitle_xform: true,
            tab_width: 8,
            heading_backlinks: false,
        }
    }
}

/// Rendered document parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Everything inside `<body>`: the document `<div>` and its content.
    pub html_body: String,
    /// Body content after the document title and subtitle.
    pub body: String,
    /// Document title and subtitle markup.
    pub body_pre_docinfo: String,
    /// Inner HTML of the document title (empty if none).
    pub title: String,
    /// Inner HTML of the document subtitle (empty if none).
    pub subtitle: String,
}

/// Parse `source` and render it to HTML parts.
///
/// The parser is configured from `settings` and has the `sourcecode`
/// directive registered.
///
/// # Errors
///
/// Returns [`ConvertError`] if the source cannot be parsed or the
/// resulting tree cannot be rendered.
pub fn publish_parts(source: &str, settings: &Settings) -> Result<RenderResult, ConvertError> {
    let parser = Parser::with_config(ParserConfig {
        tab_width: settings.tab_width,
        doctitle_xform: settings.doctitle_xform,
    })
    .with_directive(SourcecodeDirective);
    let document = parser.parse(source)?;
    render_document(&document, settings)
}

/// Render an already parsed document.
///
/// # Errors
///
/// Returns [`ConvertError::Structure`] if `document` is not a document
/// node or contains a node in a position the translator cannot render.
pub fn render_document(document: &Node, settings: &Settings) -> Result<RenderResult, ConvertError> {
    if document.kind != NodeKind::Document {
        return Err(ConvertError::Structure(format!(
            "expected a document root, found {}",
            document.kind.name()
        )));
    }
    let mut translator = HtmlTranslator::new(settings);
    walkabout(document, &mut translator)?;
    Ok(translator.finish(document))
}
