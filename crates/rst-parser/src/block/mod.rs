//! Body-level parsing: turns preprocessed lines into block nodes.
//!
//! The parser works on a slice of [`SourceLine`]s and dispatches on the
//! first line of each block. Section titles are not nested here: at
//! document level they are emitted as [`Block::Title`] markers and
//! [`section::build_sections`] assembles the section tree afterwards.

mod explicit;
mod lists;
pub(crate) mod section;
mod table;

use std::cell::Cell;

use crate::directive::DirectiveRegistry;
use crate::doctree::{Node, NodeKind};
use crate::error::ParseError;
use crate::inline::parse_inline;
use crate::source::{SourceLine, take_indented};

/// Adornment style of a section title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TitleStyle {
    pub(crate) ch: char,
    pub(crate) overline: bool,
}

/// A section title found at document level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TitleMark {
    pub(crate) style: TitleStyle,
    pub(crate) text: String,
    pub(crate) line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    Node(Node),
    Title(TitleMark),
}

/// Deepest allowed nesting of body elements (list items, block quotes,
/// directive content, table cells).
pub(crate) const MAX_NESTING: usize = 64;

/// Recursive block parser sharing one directive registry.
pub(crate) struct BlockParser<'a> {
    registry: &'a DirectiveRegistry,
    depth: Cell<usize>,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(registry: &'a DirectiveRegistry) -> Self {
        Self {
            registry,
            depth: Cell::new(0),
        }
    }

    /// Parse top-level lines; section titles are allowed.
    pub(crate) fn parse_document(&self, lines: &[SourceLine]) -> Result<Vec<Block>, ParseError> {
        self.parse_blocks(lines, true)
    }

    /// Parse a nested body (list item, directive content, block quote).
    pub(crate) fn parse_nested(&self, lines: &[SourceLine]) -> Result<Vec<Node>, ParseError> {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            let line = lines.first().map_or(0, |l| l.lineno);
            return Err(ParseError::syntax(
                line,
                format!("Body elements nested more than {MAX_NESTING} levels deep."),
            ));
        }
        self.depth.set(depth + 1);
        let blocks = self.parse_blocks(lines, false);
        self.depth.set(depth);
        let blocks = blocks?;
        Ok(blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::Node(node) => Some(node),
                Block::Title(_) => None,
            })
            .collect())
    }

    fn parse_blocks(&self, lines: &[SourceLine], titles: bool) -> Result<Vec<Block>, ParseError> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if lines[i].is_blank() {
                i += 1;
                continue;
            }
            i = self.block(lines, i, titles, &mut out)?;
        }
        Ok(out)
    }

    fn block(
        &self,
        lines: &[SourceLine],
        i: usize,
        titles: bool,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let line = &lines[i];
        if line.indent() > 0 {
            return self.block_quote(lines, i, out);
        }
        let text = line.text.as_str();
        if explicit::is_explicit(text) {
            return self.explicit(lines, i, out);
        }
        if let Some(ch) = adornment_char(text) {
            if let Some(next) = self.adorned_line(lines, i, ch, titles, out)? {
                return Ok(next);
            }
        }
        if let Some(next) = self.list(lines, i, out)? {
            return Ok(next);
        }
        if table::is_simple_border(text) {
            let (layout, next) = table::simple(lines, i)?;
            out.push(Block::Node(self.table(layout, line.lineno)?));
            return Ok(next);
        }
        if table::is_grid_border(text) {
            let (layout, next) = table::grid(lines, i)?;
            out.push(Block::Node(self.table(layout, line.lineno)?));
            return Ok(next);
        }
        if is_doctest(text) {
            return Ok(self.doctest(lines, i, out));
        }
        self.text_block(lines, i, titles, out)
    }

    /// A block starting with a line of repeated punctuation: overlined
    /// title, transition, or plain text when too short for either.
    fn adorned_line(
        &self,
        lines: &[SourceLine],
        i: usize,
        ch: char,
        titles: bool,
        out: &mut Vec<Block>,
    ) -> Result<Option<usize>, ParseError> {
        let overline = &lines[i];
        let len = overline.text.chars().count();
        let next_blank = lines.get(i + 1).is_none_or(SourceLine::is_blank);

        if !next_blank {
            let title = &lines[i + 1];
            let underline = lines
                .get(i + 2)
                .filter(|l| adornment_char(&l.text) == Some(ch));
            if let Some(underline) = underline {
                let width = title.text.chars().count();
                if len < 4 && len < width {
                    return Ok(None);
                }
                if !titles {
                    return Err(ParseError::syntax(title.lineno, "Unexpected section title."));
                }
                if underline.text != overline.text {
                    return Err(ParseError::syntax(
                        overline.lineno,
                        "Title overline & underline mismatch.",
                    ));
                }
                if len < width {
                    return Err(ParseError::syntax(overline.lineno, "Title overline too short."));
                }
                out.push(Block::Title(TitleMark {
                    style: TitleStyle { ch, overline: true },
                    text: title.text.trim().to_owned(),
                    line: title.lineno,
                }));
                return Ok(Some(i + 3));
            }
        }

        if len < 4 {
            return Ok(None);
        }
        if !titles {
            return Err(ParseError::syntax(
                overline.lineno,
                "Unexpected section title or transition.",
            ));
        }
        if !next_blank {
            return Err(ParseError::syntax(
                overline.lineno,
                "Missing matching underline for section title overline.",
            ));
        }
        out.push(Block::Node(
            Node::new(NodeKind::Transition).with_line(overline.lineno),
        ));
        Ok(Some(i + 1))
    }

    /// Underlined title, definition list or paragraph.
    fn text_block(
        &self,
        lines: &[SourceLine],
        i: usize,
        titles: bool,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let first = &lines[i];
        if let Some(next) = lines.get(i + 1).filter(|l| !l.is_blank()) {
            if next.indent() > 0 {
                return self.definition_list(lines, i, out);
            }
            if let Some(ch) = adornment_char(&next.text) {
                let len = next.text.chars().count();
                let width = first.text.chars().count();
                if len >= width || len >= 4 {
                    if !titles {
                        return Err(ParseError::syntax(first.lineno, "Unexpected section title."));
                    }
                    if len < width {
                        tracing::warn!(line = next.lineno, "Title underline too short.");
                    }
                    out.push(Block::Title(TitleMark {
                        style: TitleStyle {
                            ch,
                            overline: false,
                        },
                        text: first.text.clone(),
                        line: first.lineno,
                    }));
                    return Ok(i + 2);
                }
            }
        }
        self.paragraph(lines, i, out)
    }

    fn paragraph(
        &self,
        lines: &[SourceLine],
        i: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let mut end = i + 1;
        while end < lines.len() && !lines[end].is_blank() && lines[end].indent() == 0 {
            end += 1;
        }
        let raw = lines[i..end]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let (text, literal) = split_literal_marker(&raw);
        let lineno = lines[i].lineno;
        if !text.is_empty() {
            let children = parse_inline(text, lineno)?;
            out.push(Block::Node(
                Node::element(NodeKind::Paragraph, children).with_line(lineno),
            ));
        }
        if literal {
            return Ok(self.literal_block(lines, end, out));
        }
        if lines.get(end).is_some_and(|l| !l.is_blank()) {
            tracing::warn!(line = lines[end].lineno, "Unexpected indentation.");
        }
        Ok(end)
    }

    /// The indented block following a `::` paragraph.
    fn literal_block(&self, lines: &[SourceLine], start: usize, out: &mut Vec<Block>) -> usize {
        let j = skip_blank(lines, start);
        if lines.get(j).is_none_or(|l| l.indent() == 0) {
            let line = lines.get(start.saturating_sub(1)).map_or(0, |l| l.lineno);
            tracing::warn!(line, "Literal block expected; none found.");
            return start;
        }
        let (block, next) = take_indented(lines, j, None);
        let text = block
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        out.push(Block::Node(
            Node::new(NodeKind::LiteralBlock)
                .with_text(text)
                .with_line(lines[j].lineno),
        ));
        next
    }

    fn block_quote(
        &self,
        lines: &[SourceLine],
        i: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let (block, next) = take_indented(lines, i, None);
        let children = self.parse_nested(&block)?;
        out.push(Block::Node(
            Node::element(NodeKind::BlockQuote, children).with_line(lines[i].lineno),
        ));
        Ok(next)
    }

    fn definition_list(
        &self,
        lines: &[SourceLine],
        mut i: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let mut items = Vec::new();
        loop {
            let term_line = &lines[i];
            let term = term_line
                .text
                .split(" : ")
                .next()
                .unwrap_or_default()
                .trim_end();
            let (block, next) = take_indented(lines, i + 1, None);
            let definition = self.parse_nested(&block)?;
            items.push(
                Node::element(
                    NodeKind::DefinitionListItem,
                    vec![
                        Node::element(NodeKind::Term, parse_inline(term, term_line.lineno)?)
                            .with_line(term_line.lineno),
                        Node::element(NodeKind::Definition, definition),
                    ],
                )
                .with_line(term_line.lineno),
            );
            let j = skip_blank(lines, next);
            if self.starts_definition(lines, j) {
                i = j;
            } else {
                out.push(Block::Node(
                    Node::element(NodeKind::DefinitionList, items).with_line(lines[i].lineno),
                ));
                return Ok(next);
            }
        }
    }

    fn starts_definition(&self, lines: &[SourceLine], j: usize) -> bool {
        let (Some(term), Some(body)) = (lines.get(j), lines.get(j + 1)) else {
            return false;
        };
        term.indent() == 0
            && !term.is_blank()
            && !body.is_blank()
            && body.indent() > 0
            && !explicit::is_explicit(&term.text)
            && adornment_char(&term.text).is_none()
            && !lists::is_list_marker(&term.text)
            && !is_doctest(&term.text)
    }

    fn doctest(&self, lines: &[SourceLine], i: usize, out: &mut Vec<Block>) -> usize {
        let end = lines[i..]
            .iter()
            .position(SourceLine::is_blank)
            .map_or(lines.len(), |offset| i + offset);
        let text = lines[i..end]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        out.push(Block::Node(
            Node::new(NodeKind::DoctestBlock)
                .with_text(text)
                .with_line(lines[i].lineno),
        ));
        end
    }
}

/// The adornment character when `text` is one punctuation character repeated.
pub(crate) fn adornment_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let first = chars.next()?;
    (first.is_ascii_punctuation() && chars.all(|c| c == first)).then_some(first)
}

fn is_doctest(text: &str) -> bool {
    text == ">>>" || text.starts_with(">>> ")
}

fn skip_blank(lines: &[SourceLine], mut i: usize) -> usize {
    while lines.get(i).is_some_and(SourceLine::is_blank) {
        i += 1;
    }
    i
}

/// Strip a trailing literal-block marker (`::`), reporting whether one was found.
///
/// `Paragraph::` keeps one colon, `Paragraph ::` keeps none and a lone `::`
/// yields no paragraph at all.
fn split_literal_marker(text: &str) -> (&str, bool) {
    if text == "::" {
        return ("", true);
    }
    match text.strip_suffix("::") {
        Some(stripped) if stripped.ends_with(char::is_whitespace) => (stripped.trim_end(), true),
        Some(_) => (&text[..text.len() - 1], true),
        None => (text, false),
    }
}
