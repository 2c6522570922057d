//! Parser entry point.

use crate::block::BlockParser;
use crate::block::section::build_sections;
use crate::directive::{Directive, DirectiveRegistry};
use crate::doctree::{Node, NodeKind};
use crate::error::ParseError;
use crate::source::preprocess;
use crate::transform;

/// Parser settings.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Tab stop width used when expanding tabs.
    pub tab_width: usize,
    /// Promote a lone top-level section to the document title.
    pub doctitle_xform: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            doctitle_xform: true,
        }
    }
}

/// RST parser with a directive registry.
///
/// # Example
///
/// ```
/// use rst_parser::{NodeKind, Parser};
///
/// let doc = Parser::new().parse("Hello *world*.").unwrap();
/// assert_eq!(doc.kind, NodeKind::Document);
/// assert_eq!(doc.children[0].astext(), "Hello world.");
/// ```
pub struct Parser {
    config: ParserConfig,
    registry: DirectiveRegistry,
}

impl Parser {
    /// Parser with default settings and the built-in directives.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            registry: DirectiveRegistry::with_builtins(),
        }
    }

    /// Register an additional directive.
    #[must_use]
    pub fn with_directive<D: Directive + 'static>(mut self, directive: D) -> Self {
        self.registry.register(directive);
        self
    }

    /// Parse `source` into a document tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on malformed structure, unknown directives or
    /// roles, failing directives and unresolvable references.
    pub fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let lines = preprocess(source, self.config.tab_width.max(1));
        tracing::debug!(lines = lines.len(), "parsing document");
        let blocks = BlockParser::new(&self.registry).parse_document(&lines)?;
        let children = build_sections(blocks)?;
        let mut document = Node::element(NodeKind::Document, children);
        transform::apply(&mut document, self.config.doctitle_xform)?;
        Ok(document)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document() {
        let doc = Parser::new().parse("").unwrap();
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_tabs_expand_to_configured_width() {
        let parser = Parser::with_config(ParserConfig {
            tab_width: 4,
            ..ParserConfig::default()
        });
        let doc = parser.parse("Code::\n\n\tx\n\t\ty").unwrap();
        assert_eq!(doc.children[1].text, "x\n    y");
    }

    #[test]
    fn test_realistic_document() {
        let src = "\
Release notes
=============

.. note:: Read this first.

Changes
-------

- Faster ``parse``.
- New `sidebar` support.

Fixes
-----

1. Tables render.
";
        let doc = Parser::new().parse(src).unwrap();
        let kinds: Vec<&str> = doc.children.iter().map(|c| c.kind.name()).collect();
        assert_eq!(kinds, vec!["title", "admonition", "section", "section"]);
        assert_eq!(doc.children[2].children[1].kind, NodeKind::BulletList);
        assert_eq!(doc.children[3].attrs.ids, vec!["fixes".to_owned()]);
    }
}
