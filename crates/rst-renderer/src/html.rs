//! HTML escaping and tag construction.

use std::collections::BTreeMap;

use rst_parser::Node;

/// Encode text for HTML output: `&`, `<`, `"`, `>` and `@`.
///
/// `@` is encoded to make addresses harder to harvest.
///
/// ```
/// use rst_renderer::encode;
///
/// assert_eq!(encode(r#"<a href="x">me@host</a>"#), "&lt;a href=&quot;x&quot;&gt;me&#64;host&lt;/a&gt;");
/// ```
#[must_use]
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '>' => out.push_str("&gt;"),
            '@' => out.push_str("&#64;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape `&`, `<` and `>` only. Quotes are left alone.
#[must_use]
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Attribute value: newlines, tabs and other control whitespace become
/// spaces, then the result is encoded.
fn attval(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' | '\x0b' | '\x0c' => ' ',
            c => c,
        })
        .collect();
    encode(&flat)
}

/// Builder for an opening tag.
///
/// Classes are deduplicated and empty ones dropped, attributes are written
/// in name order, the first id becomes the `id` attribute and further ids
/// become empty `<span id>` anchors.
#[derive(Debug, Clone)]
pub(crate) struct StartTag {
    name: String,
    classes: Vec<String>,
    ids: Vec<String>,
    attrs: BTreeMap<&'static str, String>,
    suffix: &'static str,
    empty: bool,
    anchors_before: bool,
}

impl StartTag {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
            ids: Vec::new(),
            attrs: BTreeMap::new(),
            suffix: "\n",
            empty: false,
            anchors_before: false,
        }
    }

    /// Start from the node's own classes and ids.
    pub(crate) fn for_node(name: impl Into<String>, node: &Node) -> Self {
        let mut tag = Self::new(name);
        tag.classes.clone_from(&node.attrs.classes);
        tag.ids.clone_from(&node.attrs.ids);
        tag
    }

    /// Add classes (a space-separated list; empty adds nothing).
    pub(crate) fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_owned));
        self
    }

    pub(crate) fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    pub(crate) fn ids(mut self, ids: &[String]) -> Self {
        self.ids.extend(ids.iter().cloned());
        self
    }

    /// Drop a class the node carries.
    pub(crate) fn without_class(mut self, class: &str) -> Self {
        self.classes.retain(|c| c != class);
        self
    }

    pub(crate) fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    /// Text appended right after the tag (default `"\n"`).
    pub(crate) fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    /// Self-closing tag (`<col />`).
    pub(crate) fn empty(mut self) -> Self {
        self.empty = true;
        self
    }

    /// Place extra id anchors in front of the element (lists, tables).
    pub(crate) fn anchors_before(mut self) -> Self {
        self.anchors_before = true;
        self
    }

    pub(crate) fn build(self) -> String {
        let mut classes: Vec<String> = Vec::with_capacity(self.classes.len());
        for class in self.classes {
            if !class.trim().is_empty() && !classes.contains(&class) {
                classes.push(class);
            }
        }
        let mut attrs = self.attrs;
        if !classes.is_empty() {
            attrs.insert("class", classes.join(" "));
        }

        let mut prefix = String::new();
        let mut suffix = self.suffix.to_owned();
        if let Some((first, rest)) = self.ids.split_first() {
            attrs.insert("id", first.clone());
            for id in rest {
                let anchor = format!("<span id=\"{}\"></span>", attval(id));
                if self.empty || self.anchors_before {
                    prefix.push_str(&anchor);
                } else {
                    suffix.push_str(&anchor);
                }
            }
        }

        let mut out = prefix;
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&attval(value));
            out.push('"');
        }
        if self.empty {
            out.push_str(" /");
        }
        out.push('>');
        out.push_str(&suffix);
        out
    }
}
