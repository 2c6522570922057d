//! Explicit markup blocks: directives, hyperlink targets and comments.

use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BlockParser};
use crate::directive;
use crate::doctree::{Node, NodeKind, normalize_name};
use crate::error::ParseError;
use crate::inline::unescape;
use crate::source::{SourceLine, take_indented};

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\. +([A-Za-z0-9]+(?:[-_.+:][A-Za-z0-9]+)*) ?::(?: +(.*)|$)")
        .expect("valid directive pattern")
});

/// Whether `text` starts an explicit markup block (`.. `).
pub(super) fn is_explicit(text: &str) -> bool {
    text == ".." || text.starts_with(".. ")
}

/// Split `.. _name: rest` into the target name and the text after the colon.
fn target(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix("..")?.trim_start().strip_prefix('_')?;
    if let Some(quoted) = body.strip_prefix('`') {
        let end = quoted.find("`:")?;
        let rest = &quoted[end + 2..];
        return (rest.is_empty() || rest.starts_with(' '))
            .then(|| (unescape(&quoted[..end]), rest.trim()));
    }
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    for (k, &(pos, c)) in chars.iter().enumerate() {
        if c != ':' || (k > 0 && chars[k - 1].1 == '\\') {
            continue;
        }
        let rest = &body[pos + 1..];
        if rest.is_empty() || rest.starts_with(' ') {
            return Some((unescape(&body[..pos]), rest.trim()));
        }
    }
    None
}

impl BlockParser<'_> {
    pub(super) fn explicit(
        &self,
        lines: &[SourceLine],
        i: usize,
        out: &mut Vec<Block>,
    ) -> Result<usize, ParseError> {
        let line = &lines[i];
        if let Some(caps) = DIRECTIVE.captures(&line.text) {
            let name = &caps[1];
            let rest = caps.get(2).map_or("", |m| m.as_str());
            let (block, next) = take_indented(lines, i + 1, None);
            let mut indented = vec![SourceLine::new(rest, line.lineno)];
            indented.extend(block);
            let handler = self.registry.get(name).ok_or_else(|| {
                ParseError::syntax(line.lineno, format!("Unknown directive type \"{name}\"."))
            })?;
            let nodes = directive::invoke(handler, self, name, indented, line.lineno)?;
            out.extend(nodes.into_iter().map(Block::Node));
            return Ok(next);
        }

        if let Some((name, rest)) = target(&line.text) {
            let (block, next) = take_indented(lines, i + 1, None);
            let link: String = std::iter::once(rest)
                .chain(block.iter().map(|l| l.text.trim()))
                .collect();
            if name == "_" {
                tracing::warn!(line = line.lineno, "anonymous targets are not supported");
                return Ok(next);
            }
            out.push(Block::Node(hyperlink_target(&name, &link, line.lineno)));
            return Ok(next);
        }

        let first = line.text[2..].trim();
        if first.is_empty() && lines.get(i + 1).is_none_or(SourceLine::is_blank) {
            out.push(Block::Node(Node::new(NodeKind::Comment).with_line(line.lineno)));
            return Ok(i + 1);
        }
        if first.starts_with('[') || first.starts_with('|') {
            tracing::warn!(
                line = line.lineno,
                "footnotes, citations and substitutions are not supported; treated as a comment"
            );
        }
        let (block, next) = take_indented(lines, i + 1, None);
        let text = std::iter::once(first)
            .filter(|t| !t.is_empty())
            .chain(block.iter().map(|l| l.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        out.push(Block::Node(
            Node::new(NodeKind::Comment)
                .with_text(text)
                .with_line(line.lineno),
        ));
        Ok(next)
    }
}

/// Build a target node. An empty link makes an internal target; a link
/// ending in `_` is an indirect target whose referenced name is kept in
/// the node text.
fn hyperlink_target(name: &str, link: &str, line: usize) -> Node {
    let indirect = link
        .strip_suffix('_')
        .filter(|n| !n.is_empty() && !n.ends_with('_'))
        .map(|n| normalize_name(n.trim_matches('`')));
    let (refuri, text) = match indirect {
        Some(alias) => (None, alias),
        None if link.is_empty() => (None, String::new()),
        None => (Some(unescape(link)), String::new()),
    };
    let mut node = Node::new(NodeKind::Target { refuri })
        .with_text(text)
        .with_line(line);
    node.attrs.names.push(normalize_name(name));
    node
}
