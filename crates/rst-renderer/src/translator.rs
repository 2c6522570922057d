//! Document tree to HTML translation.
//!
//! [`HtmlTranslator`] walks a document with visit/depart callbacks and
//! appends HTML chunks to its body buffer. Closing tags that depend on how
//! a node was opened are pushed on a context stack in `visit` and popped in
//! `depart`.
//!
//! Rendering follows the classic docutils HTML writer with these changes:
//!
//! - inline literals keep their whitespace (`&nbsp;` runs, `<span
//!   class="pre">` around words with break opportunities);
//! - sections render as `<section>` without ids;
//! - titles are chosen by their container (`<p>`, `<caption>`, `<h1>` or a
//!   heading whose level follows the section depth);
//! - tables carry no border or class, and `<col />` has no width.

use std::ptr;

use rst_parser::{AdmonitionKind, Node, NodeKind, NodeVisitor, Visit};

use crate::error::ConvertError;
use crate::html::{StartTag, encode};
use crate::literal::render_literal_text;
use crate::publisher::{RenderResult, Settings};

/// HTML translator for one document.
///
/// A translator holds per-document state and is consumed by
/// [`finish`](Self::finish). Create a new one for every document.
///
/// # Example
///
/// ```
/// use rst_parser::{Parser, walkabout};
/// use rst_renderer::{HtmlTranslator, Settings};
///
/// let doc = Parser::new().parse("Some *text*.").unwrap();
/// let settings = Settings::default();
/// let mut translator = HtmlTranslator::new(&settings);
/// walkabout(&doc, &mut translator).unwrap();
/// assert_eq!(translator.section_level(), 0);
/// let parts = translator.finish(&doc);
/// assert_eq!(parts.body, "<p>Some <em>text</em>.</p>\n");
/// ```
pub struct HtmlTranslator<'s> {
    settings: &'s Settings,
    body: Vec<String>,
    body_pre_docinfo: Vec<String>,
    title: String,
    subtitle: String,
    /// Body index right after the opening tag of the document title or
    /// subtitle being rendered.
    in_document_title: Option<usize>,
    section_level: usize,
    context: Vec<String>,
    colspecs: Vec<String>,
    compact_simple: bool,
    compact_p: bool,
    list_context: Vec<(bool, bool)>,
    in_thead: bool,
}

impl<'s> HtmlTranslator<'s> {
    #[must_use]
    pub fn new(settings: &'s Settings) -> Self {
        Self {
            settings,
            body: Vec::new(),
            body_pre_docinfo: Vec::new(),
            title: String::new(),
            subtitle: String::new(),
            in_document_title: None,
            section_level: 0,
            context: Vec::new(),
            colspecs: Vec::new(),
            compact_simple: false,
            compact_p: true,
            list_context: Vec::new(),
            in_thead: false,
        }
    }

    /// Current section nesting depth.
    #[must_use]
    pub fn section_level(&self) -> usize {
        self.section_level
    }

    /// Assemble the output parts. `document` is the walked root.
    #[must_use]
    pub fn finish(self, document: &Node) -> RenderResult {
        let pre_docinfo = self.body_pre_docinfo.concat();
        let body = self.body.concat();
        let mut html_body = StartTag::for_node("div", document).class("document").build();
        html_body.push_str(&pre_docinfo);
        html_body.push_str(&body);
        html_body.push_str("</div>\n");
        tracing::debug!(bytes = html_body.len(), "assembled html body");
        RenderResult {
            html_body,
            body,
            body_pre_docinfo: pre_docinfo,
            title: self.title,
            subtitle: self.subtitle,
        }
    }

    fn push(&mut self, chunk: impl Into<String>) {
        self.body.push(chunk.into());
    }

    fn pop_context(&mut self, node: &Node) -> Result<String, ConvertError> {
        self.context.pop().ok_or_else(|| {
            ConvertError::Structure(format!(
                "unbalanced {} at line {}",
                node.kind.name(),
                node.line
            ))
        })
    }

    fn write_colspecs(&mut self) {
        self.body.append(&mut self.colspecs);
    }

    /// Move the document title/subtitle chunks out of the body.
    fn capture_document_title(&mut self) -> Option<String> {
        let start = self.in_document_title.take()?;
        let end = self.body.len().saturating_sub(1);
        let inner = self.body.get(start..end).map(<[String]>::concat);
        self.body_pre_docinfo.append(&mut self.body);
        inner
    }

    fn visit_title(
        &mut self,
        node: &Node,
        parent: Option<&Node>,
        extra: &[&'static str],
    ) -> Result<(), ConvertError> {
        let parent = parent.ok_or_else(|| ConvertError::Structure("title without a parent".to_owned()))?;
        let close = match &parent.kind {
            NodeKind::Topic | NodeKind::Sidebar | NodeKind::Admonition(_) => {
                self.push(start("p", node, extra).suffix("").build());
                "</p>\n".to_owned()
            }
            NodeKind::Table => {
                self.push(start("caption", node, extra).suffix("").build());
                "</caption>\n".to_owned()
            }
            NodeKind::Document => {
                self.push(start("h1", node, extra).suffix("").build());
                self.in_document_title = Some(self.body.len());
                "</h1>\n".to_owned()
            }
            NodeKind::Section => {
                let level = self.heading_level();
                self.push(start(format!("h{level}"), node, extra).suffix("").build());
                // Titles referring back to a table of contents entry.
                let backlink = node.attrs.refid.as_ref().map(|refid| format!("#{refid}"));
                match backlink {
                    Some(href) if self.settings.heading_backlinks => {
                        self.push(
                            StartTag::new("a")
                                .class("toc-backref")
                                .attr("href", href)
                                .suffix("")
                                .build(),
                        );
                        format!("</a></h{level}>\n")
                    }
                    _ => format!("</h{level}>\n"),
                }
            }
            other => {
                return Err(ConvertError::Structure(format!(
                    "title inside {} at line {}",
                    other.name(),
                    node.line
                )));
            }
        };
        self.context.push(close);
        Ok(())
    }

    fn visit_subtitle(
        &mut self,
        node: &Node,
        parent: Option<&Node>,
        extra: &[&'static str],
    ) -> Result<(), ConvertError> {
        let close = match parent.map(|p| &p.kind) {
            Some(NodeKind::Sidebar) => {
                self.push(
                    start("p", node, extra)
                        .class("sidebar-subtitle")
                        .suffix("")
                        .build(),
                );
                "</p>\n".to_owned()
            }
            Some(NodeKind::Document) => {
                self.push(start("h2", node, extra).class("subtitle").suffix("").build());
                self.in_document_title = Some(self.body.len());
                "</h2>\n".to_owned()
            }
            Some(NodeKind::Section) => {
                let tag = format!("h{}", self.heading_level());
                let mut open = start(tag.clone(), node, extra)
                    .class("section-subtitle")
                    .suffix("")
                    .build();
                open.push_str(
                    &StartTag::new("span")
                        .class("section-subtitle")
                        .suffix("")
                        .build(),
                );
                self.push(open);
                format!("</span></{tag}>\n")
            }
            _ => {
                return Err(ConvertError::Structure(format!(
                    "subtitle inside {} at line {}",
                    parent.map_or("nothing", |p| p.kind.name()),
                    node.line
                )));
            }
        };
        self.context.push(close);
        Ok(())
    }

    fn heading_level(&self) -> usize {
        (self.section_level + self.settings.initial_header_level).saturating_sub(1)
    }

    fn visit_literal(&mut self, node: &Node, extra: &[&'static str]) -> Visit {
        if node.has_class("code") {
            self.push(
                start("code", node, extra)
                    .without_class("code")
                    .suffix("")
                    .build(),
            );
            return Visit::Continue;
        }
        let mut html = start("code", node, extra).suffix("").build();
        html.push_str(&render_literal_text(&node.astext()));
        html.push_str("</code>");
        self.push(html);
        Visit::SkipNode
    }

    fn visit_list(&mut self, node: &Node, tag: StartTag) {
        let old_compact_simple = self.compact_simple;
        self.list_context.push((self.compact_simple, self.compact_p));
        self.compact_p = false;
        self.compact_simple = is_compactable(node, old_compact_simple);
        let tag = if self.compact_simple && !old_compact_simple {
            tag.class("simple")
        } else {
            tag
        };
        self.push(tag.anchors_before().build());
    }

    fn depart_list(&mut self, close: &str) {
        if let Some((compact_simple, compact_p)) = self.list_context.pop() {
            self.compact_simple = compact_simple;
            self.compact_p = compact_p;
        }
        self.push(close);
    }

    /// Whether the `<p>` tags around a paragraph can be left out.
    fn is_compact_paragraph(&self, node: &Node, parent: Option<&Node>) -> bool {
        let Some(parent) = parent else {
            return false;
        };
        if parent.kind == NodeKind::Document
            || !node.attrs.ids.is_empty()
            || !node.attrs.names.is_empty()
            || !node.attrs.classes.is_empty()
            || has_generated_title(parent)
        {
            return false;
        }
        let mut visible = parent.children.iter().filter(|c| !is_invisible(c));
        if !visible.next().is_some_and(|first| ptr::eq(first, node)) {
            return false;
        }
        let parent_length = 1 + visible.count();
        self.compact_simple || (self.compact_p && parent_length == 1)
    }

    fn visit_admonition(&mut self, node: &Node, kind: AdmonitionKind, extra: &[&'static str]) {
        let tag = StartTag::new("div")
            .class("admonition")
            .classes(node.attrs.classes.iter().cloned())
            .class(kind.name())
            .classes(extra.iter().copied())
            .ids(&node.attrs.ids);
        self.push(tag.build());
        if has_generated_title(node) {
            let mut classes = vec!["first"];
            if !node.children.iter().any(|c| !is_invisible(c)) {
                classes.push("last");
            }
            let mut label = StartTag::new("p").classes(classes).suffix("").build();
            label.push_str(&encode(kind.label()));
            label.push_str("</p>\n");
            self.push(label);
        }
    }

    fn visit_reference(&mut self, node: &Node, extra: &[&'static str]) -> Result<(), ConvertError> {
        let NodeKind::Reference { refuri, .. } = &node.kind else {
            return Ok(());
        };
        let tag = start("a", node, extra).suffix("");
        let tag = match (refuri, &node.attrs.refid) {
            (Some(uri), _) => tag.class("reference external").attr("href", uri.clone()),
            (None, Some(refid)) => tag
                .class("reference internal")
                .attr("href", format!("#{refid}")),
            (None, None) => {
                return Err(ConvertError::Structure(format!(
                    "reference without a target at line {}",
                    node.line
                )));
            }
        };
        self.push(tag.build());
        Ok(())
    }

    fn visit_raw(&mut self, node: &Node, parent: Option<&Node>, extra: &[&'static str]) {
        let NodeKind::Raw { format } = &node.kind else {
            return;
        };
        if !format.split_whitespace().any(|f| f == "html") {
            return;
        }
        let tag = if parent.is_some_and(is_text_element) {
            "span"
        } else {
            "div"
        };
        if node.attrs.classes.is_empty() {
            self.push(node.text.clone());
        } else {
            let mut html = start(tag, node, extra).suffix("").build();
            html.push_str(&node.text);
            html.push_str(&format!("</{tag}>"));
            self.push(html);
        }
    }

    fn visit_entry(&mut self, node: &Node, extra: &[&'static str]) {
        let tag = if self.in_thead {
            start("th", node, extra).class("head")
        } else {
            start("td", node, extra)
        };
        self.push(tag.suffix("").build());
        if node.children.is_empty() {
            self.push("&nbsp;");
        }
    }
}

impl NodeVisitor for HtmlTranslator<'_> {
    type Error = ConvertError;

    #[allow(clippy::too_many_lines)]
    fn visit(&mut self, node: &Node, parent: Option<&Node>) -> Result<Visit, ConvertError> {
        let extra = positional_classes(node, parent);
        let extra = extra.as_slice();
        match &node.kind {
            NodeKind::Document | NodeKind::DefinitionListItem => {}
            NodeKind::Section => {
                self.section_level += 1;
                self.push("<section>\n");
            }
            NodeKind::Title => self.visit_title(node, parent, extra)?,
            NodeKind::Subtitle => self.visit_subtitle(node, parent, extra)?,
            NodeKind::Paragraph => {
                if self.is_compact_paragraph(node, parent) {
                    self.context.push(String::new());
                } else {
                    self.push(start("p", node, extra).suffix("").build());
                    self.context.push("</p>\n".to_owned());
                }
            }
            NodeKind::Text => self.push(encode(&node.text)),
            NodeKind::Emphasis => self.push(start("em", node, extra).suffix("").build()),
            NodeKind::Strong => self.push(start("strong", node, extra).suffix("").build()),
            NodeKind::TitleReference => self.push(start("cite", node, extra).suffix("").build()),
            NodeKind::Subscript => self.push(start("sub", node, extra).suffix("").build()),
            NodeKind::Superscript => self.push(start("sup", node, extra).suffix("").build()),
            NodeKind::Literal => return Ok(self.visit_literal(node, extra)),
            NodeKind::Reference { .. } => self.visit_reference(node, extra)?,
            NodeKind::Target { refuri } => {
                if refuri.is_none() && node.attrs.refid.is_none() && node.text.is_empty() {
                    self.push(start("span", node, extra).class("target").suffix("").build());
                    self.context.push("</span>".to_owned());
                } else {
                    self.context.push(String::new());
                }
            }
            NodeKind::BulletList => {
                let tag = start("ul", node, extra);
                self.visit_list(node, tag);
            }
            NodeKind::EnumeratedList { enumtype, start: first } => {
                let mut tag = start("ol", node, extra).class(enumtype.as_str());
                if *first != 1 {
                    tag = tag.attr("start", first.to_string());
                }
                self.visit_list(node, tag);
            }
            NodeKind::ListItem => self.push(start("li", node, extra).suffix("").build()),
            NodeKind::DefinitionList => self.push(
                start("dl", node, extra)
                    .class("docutils")
                    .anchors_before()
                    .build(),
            ),
            NodeKind::Term => self.push(start("dt", node, extra).suffix("").build()),
            NodeKind::Definition => {
                self.push("</dt>\n");
                self.push(start("dd", node, extra).suffix("").build());
            }
            NodeKind::LiteralBlock | NodeKind::DoctestBlock => {
                let class = if node.kind == NodeKind::LiteralBlock {
                    "literal-block"
                } else {
                    "doctest-block"
                };
                let mut html = start("pre", node, extra).class(class).build();
                html.push_str(&encode(&node.text));
                self.push(html);
                return Ok(Visit::SkipChildren);
            }
            NodeKind::BlockQuote => self.push(start("blockquote", node, extra).build()),
            NodeKind::Topic => self.push(start("div", node, extra).class("topic").build()),
            NodeKind::Sidebar => self.push(start("div", node, extra).class("sidebar").build()),
            NodeKind::Admonition(kind) => self.visit_admonition(node, *kind, extra),
            NodeKind::Table => {
                // Placeholder class; empty values never reach the attribute.
                self.push(start("table", node, extra).class("").anchors_before().build());
            }
            NodeKind::TGroup { .. } => {
                self.push(start("colgroup", node, extra).build());
                self.context.push("</colgroup>\n".to_owned());
            }
            NodeKind::ColSpec { .. } => {
                self.colspecs.push(start("col", node, extra).empty().build());
                return Ok(Visit::SkipNode);
            }
            NodeKind::THead => {
                self.write_colspecs();
                let close = self.pop_context(node)?;
                self.push(close);
                self.context.push(String::new());
                self.push(start("thead", node, extra).attr("valign", "bottom").build());
                self.in_thead = true;
            }
            NodeKind::TBody => {
                self.write_colspecs();
                let close = self.pop_context(node)?;
                self.push(close);
                self.push(start("tbody", node, extra).attr("valign", "top").build());
            }
            NodeKind::Row => self.push(start("tr", node, extra).suffix("").build()),
            NodeKind::Entry => self.visit_entry(node, extra),
            NodeKind::Raw { .. } => {
                self.visit_raw(node, parent, extra);
                return Ok(Visit::SkipNode);
            }
            NodeKind::Comment => {
                self.push(format!("<!-- {} -->\n", break_double_dashes(&node.text)));
                return Ok(Visit::SkipNode);
            }
            NodeKind::Transition => {
                self.push(start("hr", node, extra).class("docutils").empty().build());
                return Ok(Visit::SkipChildren);
            }
        }
        Ok(Visit::Continue)
    }

    fn depart(&mut self, node: &Node, _parent: Option<&Node>) -> Result<(), ConvertError> {
        match &node.kind {
            NodeKind::Document
            | NodeKind::Text
            | NodeKind::DefinitionListItem
            | NodeKind::Term
            | NodeKind::TGroup { .. }
            | NodeKind::ColSpec { .. }
            | NodeKind::Raw { .. }
            | NodeKind::Comment
            | NodeKind::Transition => {}
            NodeKind::Section => {
                self.push("</section>\n");
                self.section_level = self.section_level.saturating_sub(1);
            }
            NodeKind::Title => {
                let close = self.pop_context(node)?;
                self.push(close);
                if let Some(title) = self.capture_document_title() {
                    self.title = title;
                }
            }
            NodeKind::Subtitle => {
                let close = self.pop_context(node)?;
                self.push(close);
                if let Some(subtitle) = self.capture_document_title() {
                    self.subtitle = subtitle;
                }
            }
            NodeKind::Paragraph | NodeKind::Target { .. } => {
                let close = self.pop_context(node)?;
                self.push(close);
            }
            NodeKind::Emphasis => self.push("</em>"),
            NodeKind::Strong => self.push("</strong>"),
            NodeKind::TitleReference => self.push("</cite>"),
            NodeKind::Subscript => self.push("</sub>"),
            NodeKind::Superscript => self.push("</sup>"),
            NodeKind::Literal => self.push("</code>"),
            NodeKind::Reference { .. } => self.push("</a>"),
            NodeKind::BulletList => self.depart_list("</ul>\n"),
            NodeKind::EnumeratedList { .. } => self.depart_list("</ol>\n"),
            NodeKind::ListItem => self.push("</li>\n"),
            NodeKind::DefinitionList => self.push("</dl>\n"),
            NodeKind::Definition => self.push("</dd>\n"),
            NodeKind::LiteralBlock | NodeKind::DoctestBlock => self.push("\n</pre>\n"),
            NodeKind::BlockQuote => self.push("</blockquote>\n"),
            NodeKind::Topic | NodeKind::Sidebar | NodeKind::Admonition(_) => self.push("</div>\n"),
            NodeKind::Table => self.push("</table>\n"),
            NodeKind::THead => {
                self.push("</thead>\n");
                self.in_thead = false;
            }
            NodeKind::TBody => self.push("</tbody>\n"),
            NodeKind::Row => self.push("</tr>\n"),
            NodeKind::Entry => self.push(if self.in_thead { "</th>\n" } else { "</td>\n" }),
        }
        Ok(())
    }
}

/// Opening tag with the node's classes and ids plus positional classes.
fn start(name: impl Into<String>, node: &Node, extra: &[&'static str]) -> StartTag {
    StartTag::for_node(name, node).classes(extra.iter().copied())
}

/// Comments, targets and other nodes that produce no visible output.
fn is_invisible(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Comment | NodeKind::Target { .. })
}

/// Specific admonitions render a label paragraph before their children.
fn has_generated_title(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Admonition(kind) if kind != AdmonitionKind::Generic)
}

fn is_text_element(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Paragraph
            | NodeKind::Title
            | NodeKind::Subtitle
            | NodeKind::Term
            | NodeKind::LiteralBlock
            | NodeKind::DoctestBlock
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Literal
            | NodeKind::TitleReference
            | NodeKind::Subscript
            | NodeKind::Superscript
            | NodeKind::Reference { .. }
            | NodeKind::Target { .. }
    )
}

/// `first`/`last` classes a node gets from its position in its parent.
///
/// The first child of a list item is marked `first`. The first and last
/// visible children of definitions, table entries, sidebars and
/// admonitions are marked `first` and `last`.
fn positional_classes(node: &Node, parent: Option<&Node>) -> Vec<&'static str> {
    let Some(parent) = parent else {
        return Vec::new();
    };
    match parent.kind {
        NodeKind::ListItem => {
            if parent.children.first().is_some_and(|first| ptr::eq(first, node)) {
                vec!["first"]
            } else {
                Vec::new()
            }
        }
        NodeKind::Definition | NodeKind::Entry | NodeKind::Sidebar | NodeKind::Admonition(_) => {
            let visible: Vec<&Node> = parent.children.iter().filter(|c| !is_invisible(c)).collect();
            let mut classes = Vec::new();
            // The generated label takes the first position.
            if !has_generated_title(parent) && visible.first().is_some_and(|f| ptr::eq(*f, node)) {
                classes.push("first");
            }
            if visible.last().is_some_and(|l| ptr::eq(*l, node)) {
                classes.push("last");
            }
            classes
        }
        _ => Vec::new(),
    }
}

/// Whether a list renders compactly (paragraph tags omitted in items).
fn is_compactable(list: &Node, compact_simple: bool) -> bool {
    list.has_class("compact")
        || (!list.has_class("open") && (compact_simple || is_simple_list(list)))
}

/// A list is simple when every item holds at most one paragraph, optionally
/// followed by a nested simple list.
fn is_simple_list(node: &Node) -> bool {
    match node.kind {
        NodeKind::BulletList | NodeKind::EnumeratedList { .. } => {
            node.children.iter().all(is_simple_list)
        }
        NodeKind::ListItem => {
            let mut visible: Vec<&Node> = node.children.iter().filter(|c| !is_invisible(c)).collect();
            let trailing_list = visible.len() > 1
                && visible.first().is_some_and(|c| c.kind == NodeKind::Paragraph)
                && visible.last().is_some_and(|c| {
                    matches!(c.kind, NodeKind::BulletList | NodeKind::EnumeratedList { .. })
                });
            if trailing_list {
                visible.pop();
            }
            visible.len() <= 1 && node.children.iter().all(is_simple_list)
        }
        NodeKind::Paragraph | NodeKind::Comment | NodeKind::Target { .. } => true,
        _ => false,
    }
}

/// Comment text may not contain `--`.
fn break_double_dashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '-' && chars.peek() == Some(&'-') {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rst_parser::{Parser, ParserConfig, walkabout};

    fn render_with(source: &str, settings: &Settings) -> RenderResult {
        let parser = Parser::with_config(ParserConfig {
            tab_width: settings.tab_width,
            doctitle_xform: settings.doctitle_xform,
        });
        let doc = parser.parse(source).unwrap();
        let mut translator = HtmlTranslator::new(settings);
        walkabout(&doc, &mut translator).unwrap();
        assert_eq!(translator.section_level(), 0);
        translator.finish(&doc)
    }

    fn body(source: &str) -> String {
        render_with(source, &Settings::default()).body
    }

    #[test]
    fn test_paragraph_and_inline() {
        assert_eq!(
            body("Plain *em* **strong** `cite` :sub:`2` :sup:`x`."),
            "<p>Plain <em>em</em> <strong>strong</strong> <cite>cite</cite> <sub>2</sub> <sup>x</sup>.</p>\n"
        );
    }

    #[test]
    fn test_text_is_encoded() {
        assert_eq!(body("a < b & \"c\" @d"), "<p>a &lt; b &amp; &quot;c&quot; &#64;d</p>\n");
    }

    #[test]
    fn test_inline_literal_preserves_spaces() {
        assert_eq!(
            body("Run ``ls  -la``."),
            "<p>Run <code>ls&nbsp; <span class=\"pre\">-la</span></code>.</p>\n"
        );
    }

    #[test]
    fn test_code_role_renders_children() {
        assert_eq!(
            body("Use :code:`a  &&  b`."),
            "<p>Use <code>a  &amp;&amp;  b</code>.</p>\n"
        );
    }

    #[test]
    fn test_document_title_moves_out_of_body() {
        let parts = render_with("Title\n=====\n\nHello.", &Settings::default());
        assert_eq!(parts.title, "Title");
        assert_eq!(parts.body_pre_docinfo, "<h1>Title</h1>\n");
        assert_eq!(parts.body, "<p>Hello.</p>\n");
        assert_eq!(
            parts.html_body,
            "<div class=\"document\" id=\"title\">\n<h1>Title</h1>\n<p>Hello.</p>\n</div>\n"
        );
    }

    #[test]
    fn test_document_subtitle() {
        let parts = render_with("Title\n=====\n\nSub\n---\n\nHello.", &Settings::default());
        assert_eq!(parts.subtitle, "Sub");
        assert_eq!(
            parts.body_pre_docinfo,
            "<h1>Title</h1>\n<h2 class=\"subtitle\" id=\"sub\">Sub</h2>\n"
        );
    }

    #[test]
    fn test_sections_and_heading_levels() {
        let src = "Intro.\n\nA\n=\n\nText.\n\nB\n-\n\nMore.\n";
        assert_eq!(
            body(src),
            "<p>Intro.</p>\n<section>\n<h1>A</h1>\n<p>Text.</p>\n<section>\n<h2>B</h2>\n<p>More.</p>\n</section>\n</section>\n"
        );
    }

    #[test]
    fn test_initial_header_level_shifts_headings() {
        let settings = Settings {
            initial_header_level: 3,
            ..Settings::default()
        };
        let parts = render_with("Intro.\n\nA\n=\n\nText.\n", &settings);
        assert!(parts.body.contains("<h3>A</h3>"));
    }

    #[test]
    fn test_heading_level_follows_depth() {
        let source = "Intro.\n\nT0\n==\n\nT1\n--\n\nT2\n~~\n\nT3\n^^\n\n\
                      T4\n\"\"\n\nT5\n++\n\nT6\n##\n";
        let parts = render_with(source, &Settings::default());
        for level in 1..=7 {
            let title = level - 1;
            assert!(
                parts.body.contains(&format!("<h{level}>T{title}</h{level}>")),
                "missing h{level} in {}",
                parts.body
            );
        }

        let settings = Settings {
            initial_header_level: 6,
            ..Settings::default()
        };
        let parts = render_with("Intro.\n\nA\n=\n\nB\n-\n\nText.\n", &settings);
        assert!(parts.body.contains("<h6>A</h6>"));
        assert!(parts.body.contains("<h7>B</h7>"));
    }

    fn titled_section(refid: Option<&str>) -> Node {
        let mut title = Node::element(NodeKind::Title, vec![Node::text("Usage")]);
        title.attrs.refid = refid.map(str::to_owned);
        Node::element(
            NodeKind::Document,
            vec![
                Node::element(NodeKind::Paragraph, vec![Node::text("Intro.")]),
                Node::element(NodeKind::Section, vec![title]),
            ],
        )
    }

    fn render_tree(doc: &Node, settings: &Settings) -> Result<RenderResult, ConvertError> {
        let mut translator = HtmlTranslator::new(settings);
        walkabout(doc, &mut translator)?;
        Ok(translator.finish(doc))
    }

    #[test]
    fn test_title_refid_without_backlinks() {
        let plain = render_tree(&titled_section(None), &Settings::default()).unwrap();
        let linked = render_tree(&titled_section(Some("toc-1")), &Settings::default()).unwrap();
        assert_eq!(plain.body, linked.body);
    }

    #[test]
    fn test_title_refid_with_backlinks() {
        let settings = Settings {
            heading_backlinks: true,
            ..Settings::default()
        };
        let parts = render_tree(&titled_section(Some("toc-1")), &settings).unwrap();
        assert!(parts.body.contains(
            "<h1><a class=\"toc-backref\" href=\"#toc-1\">Usage</a></h1>\n"
        ));
    }

    #[test]
    fn test_title_in_unexpected_parent() {
        let doc = Node::element(
            NodeKind::Document,
            vec![Node::element(
                NodeKind::BlockQuote,
                vec![Node::element(NodeKind::Title, vec![Node::text("x")])],
            )],
        );
        let err = render_tree(&doc, &Settings::default()).err().unwrap();
        assert!(matches!(err, ConvertError::Structure(_)));
        assert_eq!(
            err.to_string(),
            "unsupported document structure: title inside block_quote at line 0"
        );
    }

    #[test]
    fn test_reference_without_target() {
        let doc = Node::element(
            NodeKind::Document,
            vec![Node::element(
                NodeKind::Paragraph,
                vec![Node::element(
                    NodeKind::Reference {
                        refuri: None,
                        refname: None,
                    },
                    vec![Node::text("x")],
                )],
            )],
        );
        let err = render_tree(&doc, &Settings::default()).err().unwrap();
        assert!(matches!(err, ConvertError::Structure(_)));
    }

    #[test]
    fn test_simple_bullet_list() {
        assert_eq!(
            body("- one\n- two\n"),
            "<ul class=\"simple\">\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_non_simple_list_keeps_paragraphs() {
        assert_eq!(
            body("- one\n\n  more\n\n- two\n"),
            "<ul>\n<li><p class=\"first\">one</p>\n<p>more</p>\n</li>\n<li><p class=\"first\">two</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_nested_simple_list() {
        assert_eq!(
            body("- one\n\n  - inner\n\n- two\n"),
            "<ul class=\"simple\">\n<li>one<ul>\n<li>inner</li>\n</ul>\n</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_enumerated_list_start() {
        assert_eq!(
            body("3. three\n4. four\n"),
            "<ol class=\"arabic simple\" start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n"
        );
        assert_eq!(
            body("a) x\nb) y\n"),
            "<ol class=\"loweralpha simple\">\n<li>x</li>\n<li>y</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            body("term\n   Definition.\n"),
            "<dl class=\"docutils\">\n<dt>term</dt>\n<dd>Definition.</dd>\n</dl>\n"
        );
        assert_eq!(
            body("term\n   One.\n\n   Two.\n"),
            "<dl class=\"docutils\">\n<dt>term</dt>\n<dd><p class=\"first\">One.</p>\n<p class=\"last\">Two.</p>\n</dd>\n</dl>\n"
        );
    }

    #[test]
    fn test_literal_block() {
        assert_eq!(
            body("Example::\n\n    a < b\n"),
            "<p>Example:</p>\n<pre class=\"literal-block\">\na &lt; b\n</pre>\n"
        );
    }

    #[test]
    fn test_doctest_block() {
        assert_eq!(
            body(">>> 1 + 1\n2\n"),
            "<pre class=\"doctest-block\">\n&gt;&gt;&gt; 1 + 1\n2\n</pre>\n"
        );
    }

    #[test]
    fn test_block_quote_single_paragraph_is_compact() {
        assert_eq!(
            body("Intro.\n\n    Quoted.\n"),
            "<p>Intro.</p>\n<blockquote>\nQuoted.</blockquote>\n"
        );
    }

    #[test]
    fn test_note_admonition() {
        assert_eq!(
            body(".. note:: Read this.\n"),
            "<div class=\"admonition note\">\n<p class=\"first\">Note</p>\n<p class=\"last\">Read this.</p>\n</div>\n"
        );
    }

    #[test]
    fn test_generic_admonition() {
        assert_eq!(
            body(".. admonition:: Heads up\n\n   Body.\n"),
            "<div class=\"admonition admonition-heads-up\">\n<p class=\"first\">Heads up</p>\n<p class=\"last\">Body.</p>\n</div>\n"
        );
    }

    #[test]
    fn test_topic_and_sidebar_titles() {
        assert_eq!(
            body(".. topic:: About\n\n   Text.\n"),
            "<div class=\"topic\">\n<p>About</p>\n<p>Text.</p>\n</div>\n"
        );
        assert_eq!(
            body(".. sidebar:: Side\n   :subtitle: Sub\n\n   Text.\n"),
            "<div class=\"sidebar\">\n<p class=\"first\">Side</p>\n<p class=\"sidebar-subtitle\">Sub</p>\n<p class=\"last\">Text.</p>\n</div>\n"
        );
    }

    #[test]
    fn test_simple_table() {
        let src = "\
=====  =====
A      B
=====  =====
1      2
3
=====  =====
";
        assert_eq!(
            body(src),
            "<table>\n<colgroup>\n<col />\n<col />\n</colgroup>\n\
<thead valign=\"bottom\">\n<tr><th class=\"head\">A</th>\n<th class=\"head\">B</th>\n</tr>\n</thead>\n\
<tbody valign=\"top\">\n<tr><td>1</td>\n<td>2</td>\n</tr>\n<tr><td>3</td>\n<td>&nbsp;</td>\n</tr>\n</tbody>\n\
</table>\n"
        );
    }

    #[test]
    fn test_table_caption() {
        let src = ".. table:: Numbers\n\n   =  =\n   1  2\n   =  =\n";
        let html = body(src);
        assert!(html.starts_with("<table>\n<caption>Numbers</caption>\n<colgroup>\n"));
        assert!(html.contains("<tbody valign=\"top\">\n<tr><td>1</td>\n"));
    }

    #[test]
    fn test_references() {
        assert_eq!(
            body("See https://example.com and `docs <https://docs.rs>`_."),
            "<p>See <a class=\"reference external\" href=\"https://example.com\">https://example.com</a> and <a class=\"reference external\" href=\"https://docs.rs\">docs</a>.</p>\n"
        );
    }

    #[test]
    fn test_internal_reference_and_target() {
        assert_eq!(
            body("Go to here_.\n\n.. _here:\n\nTarget.\n"),
            "<p>Go to <a class=\"reference internal\" href=\"#here\">here</a>.</p>\n<p id=\"here\">Target.</p>\n"
        );
    }

    #[test]
    fn test_dangling_internal_target() {
        assert_eq!(
            body("Text.\n\n.. _end:\n"),
            "<p>Text.</p>\n<span class=\"target\" id=\"end\"></span>"
        );
    }

    #[test]
    fn test_comment_and_transition() {
        assert_eq!(
            body("Before.\n\n.. a -- b\n\n----\n\nAfter.\n"),
            "<p>Before.</p>\n<!-- a - - b -->\n<hr class=\"docutils\" />\n<p>After.</p>\n"
        );
    }

    #[test]
    fn test_raw_html_and_other_formats() {
        assert_eq!(
            body(".. raw:: html\n\n   <hr>\n\n.. raw:: latex\n\n   \\newpage\n"),
            "<hr>"
        );
    }

    #[test]
    fn test_break_double_dashes() {
        assert_eq!(break_double_dashes("a---b"), "a- - -b");
        assert_eq!(break_double_dashes("-a-"), "-a-");
    }
}
