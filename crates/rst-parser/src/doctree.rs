//! Document tree produced by the parser.
//!
//! The tree is a plain owned structure: every [`Node`] has a [`NodeKind`],
//! a set of [`Attributes`], its children and (for text-like leaves) the
//! literal text it carries. Renderers never mutate it.

use std::collections::HashSet;

/// Enumeration style of an enumerated list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumType {
    /// `1.`, `2.`, ...
    Arabic,
    /// `a.`, `b.`, ...
    LowerAlpha,
    /// `A.`, `B.`, ...
    UpperAlpha,
}

impl EnumType {
    /// Class name used by HTML writers (`arabic`, `loweralpha`, `upperalpha`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arabic => "arabic",
            Self::LowerAlpha => "loweralpha",
            Self::UpperAlpha => "upperalpha",
        }
    }
}

/// Admonition flavor.
///
/// [`Generic`](Self::Generic) comes from the `admonition` directive and
/// carries its own title node; the others get a generated label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmonitionKind {
    Generic,
    Attention,
    Caution,
    Danger,
    Error,
    Hint,
    Important,
    Note,
    Tip,
    Warning,
}

impl AdmonitionKind {
    /// Look up a specific admonition by directive name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "attention" => Self::Attention,
            "caution" => Self::Caution,
            "danger" => Self::Danger,
            "error" => Self::Error,
            "hint" => Self::Hint,
            "important" => Self::Important,
            "note" => Self::Note,
            "tip" => Self::Tip,
            "warning" => Self::Warning,
            _ => return None,
        };
        Some(kind)
    }

    /// Directive name, also used as the CSS class.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "admonition",
            Self::Attention => "attention",
            Self::Caution => "caution",
            Self::Danger => "danger",
            Self::Error => "error",
            Self::Hint => "hint",
            Self::Important => "important",
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Warning => "warning",
        }
    }

    /// Human readable label ("Note", "Warning", ...).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Generic => "Admonition",
            Self::Attention => "Attention!",
            Self::Caution => "Caution!",
            Self::Danger => "!DANGER!",
            Self::Error => "Error",
            Self::Hint => "Hint",
            Self::Important => "Important",
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Warning => "Warning",
        }
    }
}

/// Closed set of node kinds the parser can produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Section,
    Title,
    Subtitle,
    Paragraph,
    Text,
    Emphasis,
    Strong,
    Literal,
    TitleReference,
    Subscript,
    Superscript,
    Reference {
        refuri: Option<String>,
        refname: Option<String>,
    },
    Target {
        refuri: Option<String>,
    },
    BulletList,
    EnumeratedList {
        enumtype: EnumType,
        start: usize,
    },
    ListItem,
    DefinitionList,
    DefinitionListItem,
    Term,
    Definition,
    LiteralBlock,
    DoctestBlock,
    BlockQuote,
    Topic,
    Sidebar,
    Admonition(AdmonitionKind),
    Table,
    TGroup {
        cols: usize,
    },
    ColSpec {
        colwidth: usize,
    },
    THead,
    TBody,
    Row,
    Entry,
    Raw {
        format: String,
    },
    Comment,
    Transition,
}

impl NodeKind {
    /// Short lowercase name, matching docutils node class names.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Section => "section",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Paragraph => "paragraph",
            Self::Text => "Text",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Literal => "literal",
            Self::TitleReference => "title_reference",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::Reference { .. } => "reference",
            Self::Target { .. } => "target",
            Self::BulletList => "bullet_list",
            Self::EnumeratedList { .. } => "enumerated_list",
            Self::ListItem => "list_item",
            Self::DefinitionList => "definition_list",
            Self::DefinitionListItem => "definition_list_item",
            Self::Term => "term",
            Self::Definition => "definition",
            Self::LiteralBlock => "literal_block",
            Self::DoctestBlock => "doctest_block",
            Self::BlockQuote => "block_quote",
            Self::Topic => "topic",
            Self::Sidebar => "sidebar",
            Self::Admonition(_) => "admonition",
            Self::Table => "table",
            Self::TGroup { .. } => "tgroup",
            Self::ColSpec { .. } => "colspec",
            Self::THead => "thead",
            Self::TBody => "tbody",
            Self::Row => "row",
            Self::Entry => "entry",
            Self::Raw { .. } => "raw",
            Self::Comment => "comment",
            Self::Transition => "transition",
        }
    }
}

/// Per-node metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Unique identifiers (HTML `id`).
    pub ids: Vec<String>,
    /// Reference names (targets, section titles).
    pub names: Vec<String>,
    /// CSS classes.
    pub classes: Vec<String>,
    /// Id of the element this node refers back to.
    pub refid: Option<String>,
}

/// A document tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub attrs: Attributes,
    pub children: Vec<Node>,
    /// Literal text for `Text`, `LiteralBlock`, `DoctestBlock`, `Raw` and
    /// `Comment`; the referenced name for an indirect `Target`.
    pub text: String,
    /// 1-based source line (0 when synthesized).
    pub line: usize,
}

impl Node {
    /// Create an empty node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Attributes::default(),
            children: Vec::new(),
            text: String::new(),
            line: 0,
        }
    }

    /// Create a `Text` leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text).with_text(text)
    }

    /// Create a node wrapping the given children.
    #[must_use]
    pub fn element(kind: NodeKind, children: Vec<Node>) -> Self {
        Self::new(kind).with_children(children)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.attrs.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_refid(mut self, refid: impl Into<String>) -> Self {
        self.attrs.refid = Some(refid.into());
        self
    }

    /// Whether the node carries the given class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs.classes.iter().any(|c| c == class)
    }

    /// Whether this is a `Text` leaf.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Kind of the child at `index`, if any.
    #[must_use]
    pub fn child_kind(&self, index: usize) -> Option<&NodeKind> {
        self.children.get(index).map(|c| &c.kind)
    }

    /// Concatenated text content of the subtree.
    #[must_use]
    pub fn astext(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.kind {
            NodeKind::Text
            | NodeKind::LiteralBlock
            | NodeKind::DoctestBlock
            | NodeKind::Raw { .. }
            | NodeKind::Comment => out.push_str(&self.text),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Normalize a reference name: collapse whitespace and lowercase.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Convert a name into a valid identifier.
///
/// Lowercases, replaces runs of non-alphanumerics with single hyphens and
/// strips leading digits/hyphens and trailing hyphens.
///
/// ```
/// use rst_parser::make_id;
///
/// assert_eq!(make_id("Hello, World!"), "hello-world");
/// assert_eq!(make_id("2. Installation"), "installation");
/// ```
#[must_use]
pub fn make_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() && c.is_ascii() {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    id.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-')
        .to_owned()
}

/// Hands out document-unique ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    used: HashSet<String>,
    counter: usize,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive an id from `name`, falling back to `id{n}` on collision or
    /// when the name has no usable characters.
    pub fn id_for(&mut self, name: &str) -> String {
        let candidate = make_id(name);
        if !candidate.is_empty() && self.used.insert(candidate.clone()) {
            return candidate;
        }
        loop {
            self.counter += 1;
            let fallback = format!("id{}", self.counter);
            if self.used.insert(fallback.clone()) {
                return fallback;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_astext_concatenates_leaves() {
        let node = Node::element(
            NodeKind::Paragraph,
            vec![
                Node::text("Hello "),
                Node::element(NodeKind::Emphasis, vec![Node::text("world")]),
                Node::text("."),
            ],
        );
        assert_eq!(node.astext(), "Hello world.");
    }

    #[test]
    fn test_has_class() {
        let node = Node::new(NodeKind::Literal).with_class("code");
        assert!(node.has_class("code"));
        assert!(!node.has_class("pre"));
    }

    #[test]
    fn test_child_kind() {
        let node = Node::element(NodeKind::Section, vec![Node::new(NodeKind::Title)]);
        assert_eq!(node.child_kind(0), Some(&NodeKind::Title));
        assert_eq!(node.child_kind(1), None);
    }

    #[test]
    fn test_make_id() {
        assert_eq!(make_id("Getting Started"), "getting-started");
        assert_eq!(make_id("  --Odd__name--  "), "odd-name");
        assert_eq!(make_id("123"), "");
        assert_eq!(make_id("Überblick"), "berblick");
    }

    #[test]
    fn test_id_generator_uniqueness() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.id_for("Intro"), "intro");
        assert_eq!(ids.id_for("Intro"), "id1");
        assert_eq!(ids.id_for("!!!"), "id2");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Python\n  Docs "), "python docs");
    }

    #[test]
    fn test_admonition_lookup() {
        assert_eq!(AdmonitionKind::from_name("note"), Some(AdmonitionKind::Note));
        assert_eq!(AdmonitionKind::from_name("admonition"), None);
        assert_eq!(AdmonitionKind::Warning.label(), "Warning");
    }
}
