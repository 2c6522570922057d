//! Inline markup recognition.
//!
//! Implements the docutils start-string/end-string rules for literals,
//! strong, emphasis, interpreted text, hyperlink references and standalone
//! URIs. Inline markup does not nest.

use std::sync::LazyLock;

use regex::Regex;

use crate::doctree::{Node, NodeKind, normalize_name};
use crate::error::ParseError;

/// Characters allowed immediately before a start-string.
const START_PRECEDERS: &str = "-:/'\"<([{\u{2018}\u{201c}\u{00ab}\u{201a}\u{201e}";
/// Characters allowed immediately after an end-string.
const END_FOLLOWERS: &str = "-.,:;!?\\/'\")]}>\u{2019}\u{201d}\u{00bb}";

static STANDALONE_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:https?|ftp)://|mailto:)[^\s<>]+").expect("valid standalone URI pattern")
});

static EMBEDDED_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.*?)\s*<([^<>]+)>$").expect("valid embedded URI pattern")
});

/// Parse a run of inline text into nodes.
pub(crate) fn parse_inline(text: &str, line: usize) -> Result<Vec<Node>, ParseError> {
    InlineParser::new(text, line).run()
}

struct InlineParser {
    chars: Vec<char>,
    line: usize,
    nodes: Vec<Node>,
    pending: String,
}

impl InlineParser {
    fn new(text: &str, line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            line,
            nodes: Vec::new(),
            pending: String::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Node>, ParseError> {
        let mut i = 0;
        while i < self.chars.len() {
            i = match self.chars[i] {
                '\\' => self.escape(i),
                '`' if self.is_at(i, "``") => self.literal(i),
                '`' => self.interpreted(i, None)?,
                '*' if self.is_at(i, "**") => self.simple_span(i, "**", NodeKind::Strong),
                '*' => self.simple_span(i, "*", NodeKind::Emphasis),
                ':' => self.role_prefix(i)?,
                '_' => self.simple_reference(i),
                c => {
                    self.pending.push(c);
                    i + 1
                }
            };
        }
        self.flush();
        Ok(self.nodes)
    }

    fn is_at(&self, i: usize, s: &str) -> bool {
        let mut idx = i;
        for c in s.chars() {
            if self.chars.get(idx) != Some(&c) {
                return false;
            }
            idx += 1;
        }
        true
    }

    fn escape(&mut self, i: usize) -> usize {
        match self.chars.get(i + 1) {
            Some(c) if c.is_whitespace() => i + 2,
            Some(&c) => {
                self.pending.push(c);
                i + 2
            }
            None => i + 1,
        }
    }

    /// Whether a start-string of `len` chars at `i` may open inline markup.
    fn start_ok(&self, i: usize, len: usize) -> bool {
        let Some(&next) = self.chars.get(i + len) else {
            return false;
        };
        if next.is_whitespace() {
            return false;
        }
        if i == 0 {
            return true;
        }
        let prev = self.chars[i - 1];
        if !(prev.is_whitespace() || START_PRECEDERS.contains(prev)) {
            return false;
        }
        !matches!(
            (prev, next),
            ('(', ')') | ('[', ']') | ('{', '}') | ('<', '>') | ('\'', '\'') | ('"', '"')
        )
    }

    /// Whether the position right after an end-string may close inline markup.
    fn end_followed_ok(&self, after: usize) -> bool {
        self.chars
            .get(after)
            .is_none_or(|c| c.is_whitespace() || END_FOLLOWERS.contains(*c))
    }

    /// Find the end-string `end` for markup whose content starts at `from`.
    fn find_end(&self, from: usize, end: &str, escapable: bool) -> Option<usize> {
        let len = end.chars().count();
        (from + 1..self.chars.len()).find(|&j| {
            let prev = self.chars[j - 1];
            self.is_at(j, end)
                && !prev.is_whitespace()
                && !(escapable && prev == '\\')
                && self.end_followed_ok(j + len)
        })
    }

    fn collect(&self, from: usize, to: usize) -> String {
        self.chars[from..to].iter().collect()
    }

    fn unterminated(&mut self, i: usize, markup: &str, what: &str) -> usize {
        tracing::warn!(
            line = self.line,
            "Inline {what} start-string without end-string."
        );
        self.pending.push_str(markup);
        i + markup.chars().count()
    }

    fn literal(&mut self, i: usize) -> usize {
        if !self.start_ok(i, 2) {
            self.pending.push_str("``");
            return i + 2;
        }
        match self.find_end(i + 2, "``", false) {
            Some(j) => {
                let content = self.collect(i + 2, j);
                self.push(Node::element(NodeKind::Literal, vec![Node::text(content)]));
                j + 2
            }
            None => self.unterminated(i, "``", "literal"),
        }
    }

    fn simple_span(&mut self, i: usize, markup: &str, kind: NodeKind) -> usize {
        let len = markup.len();
        if !self.start_ok(i, len) {
            self.pending.push_str(markup);
            return i + len;
        }
        let what = if kind == NodeKind::Strong {
            "strong"
        } else {
            "emphasis"
        };
        match self.find_end(i + len, markup, true) {
            Some(j) => {
                let content = unescape(&self.collect(i + len, j));
                self.push(Node::element(kind, vec![Node::text(content)]));
                j + len
            }
            None => self.unterminated(i, markup, what),
        }
    }

    /// `:role:` immediately followed by interpreted text.
    fn role_prefix(&mut self, i: usize) -> Result<usize, ParseError> {
        if i > 0 {
            let prev = self.chars[i - 1];
            if !(prev.is_whitespace() || START_PRECEDERS.contains(prev)) {
                self.pending.push(':');
                return Ok(i + 1);
            }
        }
        if let Some((role, after)) = self.role_name(i)
            && self.chars.get(after) == Some(&'`')
            && !self.is_at(after, "``")
        {
            return self.interpreted(after, Some(role));
        }
        self.pending.push(':');
        Ok(i + 1)
    }

    /// Parse `:name:` at `i`, returning the name and the index after it.
    fn role_name(&self, i: usize) -> Option<(String, usize)> {
        let mut j = i + 1;
        while let Some(&c) = self.chars.get(j) {
            if c.is_alphanumeric() || "-_.+".contains(c) {
                j += 1;
            } else {
                break;
            }
        }
        if j == i + 1 || self.chars.get(j) != Some(&':') {
            return None;
        }
        Some((self.collect(i + 1, j), j + 1))
    }

    fn interpreted(&mut self, i: usize, prefix_role: Option<String>) -> Result<usize, ParseError> {
        let role_start_ok =
            prefix_role.is_some() && self.chars.get(i + 1).is_some_and(|c| !c.is_whitespace());
        if !(role_start_ok || self.start_ok(i, 1)) {
            if let Some(role) = prefix_role {
                self.pending.push_str(&format!(":{role}:"));
            }
            self.pending.push('`');
            return Ok(i + 1);
        }

        let content_start = i + 1;
        let mut j = content_start + 1;
        while j < self.chars.len() {
            let prev = self.chars[j - 1];
            if self.chars[j] == '`' && !prev.is_whitespace() && prev != '\\' {
                let (suffix, after) = self.interpreted_suffix(j + 1);
                if self.end_followed_ok(after) {
                    let content = self.collect(content_start, j);
                    self.finish_interpreted(content, prefix_role, suffix)?;
                    return Ok(after);
                }
            }
            j += 1;
        }

        let markup = match &prefix_role {
            Some(role) => format!(":{role}:`"),
            None => "`".to_owned(),
        };
        tracing::warn!(
            line = self.line,
            "Inline interpreted text or phrase reference start-string without end-string."
        );
        self.pending.push_str(&markup);
        Ok(i + 1)
    }

    /// Recognize what follows a closing backtick.
    fn interpreted_suffix(&self, at: usize) -> (Suffix, usize) {
        if self.is_at(at, "__") {
            return (Suffix::Reference, at + 2);
        }
        if self.is_at(at, "_") {
            return (Suffix::Reference, at + 1);
        }
        if self.chars.get(at) == Some(&':')
            && let Some((role, after)) = self.role_name(at)
        {
            return (Suffix::Role(role), after);
        }
        (Suffix::None, at)
    }

    fn finish_interpreted(
        &mut self,
        content: String,
        prefix_role: Option<String>,
        suffix: Suffix,
    ) -> Result<(), ParseError> {
        match (prefix_role, suffix) {
            (Some(_), Suffix::Role(_)) => Err(ParseError::syntax(
                self.line,
                "Multiple roles in interpreted text (both prefix and suffix present; only one allowed).",
            )),
            (Some(_), Suffix::Reference) => Err(ParseError::syntax(
                self.line,
                "Mismatch: both interpreted text role prefix and reference suffix.",
            )),
            (None, Suffix::Reference) => {
                self.phrase_reference(&content);
                Ok(())
            }
            (Some(role), Suffix::None) | (None, Suffix::Role(role)) => {
                let node = self.role(&role, &content)?;
                self.push(node);
                Ok(())
            }
            (None, Suffix::None) => {
                self.push(Node::element(
                    NodeKind::TitleReference,
                    vec![Node::text(unescape(&content))],
                ));
                Ok(())
            }
        }
    }

    fn role(&self, role: &str, content: &str) -> Result<Node, ParseError> {
        let text = vec![Node::text(unescape(content))];
        let node = match role.to_lowercase().as_str() {
            "title-reference" | "title" | "t" => Node::element(NodeKind::TitleReference, text),
            "emphasis" => Node::element(NodeKind::Emphasis, text),
            "strong" => Node::element(NodeKind::Strong, text),
            "literal" => Node::element(NodeKind::Literal, text),
            "code" => Node::element(NodeKind::Literal, text).with_class("code"),
            "subscript" | "sub" => Node::element(NodeKind::Subscript, text),
            "superscript" | "sup" => Node::element(NodeKind::Superscript, text),
            _ => {
                return Err(ParseError::syntax(
                    self.line,
                    format!("Unknown interpreted text role \"{role}\"."),
                ));
            }
        };
        Ok(node)
    }

    fn phrase_reference(&mut self, content: &str) {
        if let Some(caps) = EMBEDDED_URI.captures(content) {
            let label = unescape(caps[1].trim());
            let target: String = caps[2].split_whitespace().collect();
            if let Some(alias) = target.strip_suffix('_') {
                let text = if label.is_empty() { alias.to_owned() } else { label };
                self.push(reference(text, None, Some(normalize_name(alias))));
                return;
            }
            let text = if label.is_empty() { target.clone() } else { label.clone() };
            self.push(reference(text, Some(target.clone()), None));
            if !label.is_empty() {
                let mut anchor = Node::new(NodeKind::Target {
                    refuri: Some(target),
                });
                anchor.attrs.names.push(normalize_name(&label));
                self.push(anchor);
            }
            return;
        }
        let text = unescape(content);
        let name = normalize_name(&text);
        self.push(reference(text, None, Some(name)));
    }

    /// `name_` at the trailing underscore.
    fn simple_reference(&mut self, i: usize) -> usize {
        let next = self.chars.get(i + 1).copied();
        let terminated = next != Some('_') && self.end_followed_ok(i + 1);
        let name_len = reference_name_suffix(&self.pending);
        if !terminated || name_len == 0 {
            self.pending.push('_');
            return i + 1;
        }
        let split = self.pending.len() - name_len;
        let boundary_ok = self.pending[..split]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || START_PRECEDERS.contains(c));
        if !boundary_ok {
            self.pending.push('_');
            return i + 1;
        }
        let name = self.pending.split_off(split);
        let refname = normalize_name(&name);
        self.push(reference(name, None, Some(refname)));
        i + 1
    }

    fn push(&mut self, node: Node) {
        self.flush();
        self.nodes.push(node.with_line(self.line));
    }

    /// Emit pending plain text, splitting out standalone URIs.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let mut last = 0;
        for m in STANDALONE_URI.find_iter(&text) {
            let uri = m.as_str().trim_end_matches(|c: char| ".,;:!?'\")]}>".contains(c));
            if m.start() > 0
                && text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric)
            {
                continue;
            }
            if uri.ends_with("://") || uri.ends_with(':') {
                continue;
            }
            if m.start() > last {
                self.nodes
                    .push(Node::text(&text[last..m.start()]).with_line(self.line));
            }
            self.nodes
                .push(reference(uri.to_owned(), Some(uri.to_owned()), None).with_line(self.line));
            last = m.start() + uri.len();
        }
        if last < text.len() {
            self.nodes.push(Node::text(&text[last..]).with_line(self.line));
        }
    }
}

enum Suffix {
    None,
    Reference,
    Role(String),
}

fn reference(text: String, refuri: Option<String>, refname: Option<String>) -> Node {
    Node::element(NodeKind::Reference { refuri, refname }, vec![Node::text(text)])
}

/// Byte length of the simple reference name at the end of `text`
/// (`[A-Za-z0-9]+` joined by single `-._+:` characters), or 0.
fn reference_name_suffix(text: &str) -> usize {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut start = chars.len();
    while start > 0 {
        let c = chars[start - 1].1;
        if c.is_alphanumeric() {
            start -= 1;
        } else if "-._+:".contains(c)
            && start >= 2
            && start < chars.len()
            && chars[start - 2].1.is_alphanumeric()
        {
            start -= 1;
        } else {
            break;
        }
    }
    if start == chars.len() {
        return 0;
    }
    text.len() - chars[start].0
}

/// Remove backslash escapes: `\x` becomes `x`, escaped whitespace vanishes.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(n) if n.is_whitespace() => {}
                Some(n) => out.push(n),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
