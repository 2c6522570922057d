//! Bullet and enumerated lists.

use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BlockParser, skip_blank};
use crate::doctree::{EnumType, Node, NodeKind};
use crate::error::ParseError;
use crate::source::{SourceLine, take_indented};

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-*+\x{2022}\x{2023}\x{2043}])(?: +|$)").expect("valid bullet pattern")
});

static ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\(?)([0-9]+|#|[a-zA-Z])([.)])(?: +|$)").expect("valid enumerator pattern")
});

/// `1.`, `1)` or `(1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EnumFormat {
    Period,
    Paren,
    Parens,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Enumerator {
    format: EnumFormat,
    /// `None` for the auto-enumerator `#`.
    sequence: Option<(EnumType, usize)>,
    /// Byte offset where the item text starts.
    end: usize,
}

fn bullet(text: &str) -> Option<(char, usize)> {
    let caps = BULLET.captures(text)?;
    let ch = caps[1].chars().next()?;
    Some((ch, caps.get(0)?.end()))
}

fn enumerator(text: &str) -> Option<Enumerator> {
    let caps = ENUMERATOR.captures(text)?;
    let format = match (&caps[1], &caps[3]) {
        ("(", ")") => EnumFormat::Parens,
        ("(", _) => return None,
        (_, ")") => EnumFormat::Paren,
        _ => EnumFormat::Period,
    };
    let value = &caps[2];
    let sequence = if value == "#" {
        None
    } else if value.starts_with(|c: char| c.is_ascii_digit()) {
        // Numbers too large for an ordinal are not enumerators.
        Some((EnumType::Arabic, value.parse::<usize>().ok()?))
    } else {
        let c = value.chars().next()?;
        let enumtype = if c.is_ascii_lowercase() {
            EnumType::LowerAlpha
        } else {
            EnumType::UpperAlpha
        };
        let offset = u32::from(c.to_ascii_lowercase()).checked_sub(u32::from('a'))?;
        Some((enumtype, usize::try_from(offset).ok()? + 1))
    };
    Some(Enumerator {
        format,
        sequence,
        end: caps.get(0)?.end(),
    })
}

/// Whether `text` starts with a bullet or an enumerator.
pub(super) fn is_list_marker(text: &str) -> bool {
    bullet(text).is_some() || enumerator(text).is_some()
}

impl BlockParser<'_> {
    /// Parse a list starting at line `i`, if the line starts one.
    pub(super) fn list(
        &self,
        lines: &[SourceLine],
        i: usize,
        out: &mut Vec<Block>,
    ) -> Result<Option<usize>, ParseError> {
        let text = lines[i].text.as_str();
        if let Some((ch, end)) = bullet(text) {
            return self.bullet_list(lines, i, ch, end, out).map(Some);
        }
        if let Some(first) = enumerator(text) {
            if self.enumerated_list_starts(lines, i, first) {
                return self.enumerated_list(lines, i, first, out).map(Some);
            }
        }
        Ok(None)
    }

    fn bullet_list(
        &self,
        lines: &[SourceLine],
        mut i: usize,
        ch: char,
        mut end: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let start_line = lines[i].lineno;
        let mut items = Vec::new();
        loop {
            let (item, next) = self.list_item(lines, i, end)?;
            items.push(item);
            let j = skip_blank(lines, next);
            match lines.get(j).and_then(|l| bullet(&l.text)) {
                Some((c, e)) if c == ch => {
                    i = j;
                    end = e;
                }
                _ => {
                    out.push(Block::Node(
                        Node::element(NodeKind::BulletList, items).with_line(start_line),
                    ));
                    return Ok(next);
                }
            }
        }
    }

    /// An enumerator only starts a list when the next line does not
    /// continue a paragraph ("A. Smith wrote..." stays text).
    fn enumerated_list_starts(&self, lines: &[SourceLine], i: usize, first: Enumerator) -> bool {
        match lines.get(i + 1) {
            None => true,
            Some(next) if next.is_blank() || next.indent() > 0 => true,
            Some(next) => enumerator(&next.text).is_some_and(|e| e.format == first.format),
        }
    }

    fn enumerated_list(
        &self,
        lines: &[SourceLine],
        mut i: usize,
        first: Enumerator,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let start_line = lines[i].lineno;
        let (enumtype, start) = first.sequence.unwrap_or((EnumType::Arabic, 1));
        let mut ordinal = start;
        let mut end = first.end;
        let mut items = Vec::new();
        loop {
            let (item, next) = self.list_item(lines, i, end)?;
            items.push(item);
            let j = skip_blank(lines, next);
            let following = lines.get(j).and_then(|l| enumerator(&l.text));
            let continues = following.filter(|e| {
                e.format == first.format
                    && match (first.sequence, e.sequence) {
                        (None, None) => true,
                        (Some(_), Some((kind, n))) => {
                            kind == enumtype && ordinal.checked_add(1) == Some(n)
                        }
                        _ => false,
                    }
            });
            match continues {
                Some(e) => {
                    i = j;
                    end = e.end;
                    ordinal += 1;
                }
                None => {
                    if following.is_some() {
                        tracing::warn!(
                            line = lines[j].lineno,
                            "Enumerated list start value not ordinal-1; new list started."
                        );
                    }
                    out.push(Block::Node(
                        Node::element(NodeKind::EnumeratedList { enumtype, start }, items)
                            .with_line(start_line),
                    ));
                    return Ok(next);
                }
            }
        }
    }

    /// One item: the text after the marker plus the lines indented to it.
    fn list_item(
        &self,
        lines: &[SourceLine],
        i: usize,
        marker_end: usize,
    ) -> Result<(Node, usize), ParseError> {
        let line = &lines[i];
        let first = &line.text[marker_end..];
        let (body, next) = if first.is_empty() {
            take_indented(lines, i + 1, None)
        } else {
            let column = line.text[..marker_end].chars().count();
            let (rest, next) = take_indented(lines, i + 1, Some(column));
            let mut body = vec![SourceLine::new(first, line.lineno)];
            body.extend(rest);
            (body, next)
        };
        let children = self.parse_nested(&body)?;
        Ok((
            Node::element(NodeKind::ListItem, children).with_line(line.lineno),
            next,
        ))
    }
}
