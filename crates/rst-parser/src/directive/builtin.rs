//! Built-in body directives.

use super::{
    Directive, DirectiveContext, DirectiveError, DirectiveInvocation, DirectiveSpec, OptionKind,
};
use crate::doctree::{AdmonitionKind, Node, NodeKind};

const CLASS_OPTION: &[(&str, OptionKind)] = &[("class", OptionKind::Class)];

fn titled(optional: bool, options: &'static [(&'static str, OptionKind)]) -> DirectiveSpec {
    DirectiveSpec {
        required_arguments: usize::from(!optional),
        optional_arguments: usize::from(optional),
        final_argument_whitespace: true,
        options,
        has_content: true,
    }
}

fn title_node(text: &str, ctx: &DirectiveContext<'_>) -> Result<Node, DirectiveError> {
    Ok(Node::element(NodeKind::Title, ctx.parse_inline(text)?).with_line(ctx.line()))
}

fn body_container(
    kind: NodeKind,
    invocation: &DirectiveInvocation,
    mut children: Vec<Node>,
    ctx: &DirectiveContext<'_>,
) -> Result<Node, DirectiveError> {
    children.extend(ctx.parse_nested(&invocation.content)?);
    let mut node = Node::element(kind, children).with_line(invocation.line);
    node.attrs.classes = invocation.options.classes("class");
    Ok(node)
}

/// `.. topic:: Title` followed by body elements.
pub struct TopicDirective;

impl Directive for TopicDirective {
    fn name(&self) -> &str {
        "topic"
    }

    fn spec(&self) -> DirectiveSpec {
        titled(false, CLASS_OPTION)
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let title = title_node(&invocation.arguments[0], ctx)?;
        Ok(vec![body_container(NodeKind::Topic, &invocation, vec![title], ctx)?])
    }
}

/// `.. sidebar:: Title` with an optional `:subtitle:`.
pub struct SidebarDirective;

impl Directive for SidebarDirective {
    fn name(&self) -> &str {
        "sidebar"
    }

    fn spec(&self) -> DirectiveSpec {
        titled(
            true,
            &[("subtitle", OptionKind::Unchanged), ("class", OptionKind::Class)],
        )
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let mut head = Vec::new();
        if let Some(title) = invocation.arguments.first() {
            head.push(title_node(title, ctx)?);
        }
        if let Some(subtitle) = invocation.options.get("subtitle") {
            head.push(
                Node::element(NodeKind::Subtitle, ctx.parse_inline(subtitle)?)
                    .with_line(invocation.line),
            );
        }
        Ok(vec![body_container(NodeKind::Sidebar, &invocation, head, ctx)?])
    }
}

/// The generic `admonition` directive and the specific ones (`note`, ...).
pub struct AdmonitionDirective {
    kind: AdmonitionKind,
}

impl AdmonitionDirective {
    /// `.. admonition:: Title`.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            kind: AdmonitionKind::Generic,
        }
    }

    /// A specific admonition such as `note` or `warning`.
    #[must_use]
    pub fn specific(name: &str) -> Option<Self> {
        AdmonitionKind::from_name(name).map(|kind| Self { kind })
    }
}

impl Directive for AdmonitionDirective {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn spec(&self) -> DirectiveSpec {
        if self.kind == AdmonitionKind::Generic {
            titled(false, CLASS_OPTION)
        } else {
            DirectiveSpec {
                options: CLASS_OPTION,
                ..DirectiveSpec::content_only()
            }
        }
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let mut head = Vec::new();
        if let Some(title) = invocation.arguments.first() {
            head.push(title_node(title, ctx)?);
        }
        let mut node = body_container(NodeKind::Admonition(self.kind), &invocation, head, ctx)?;
        if let Some(title) = invocation.arguments.first() {
            if node.attrs.classes.is_empty() {
                node.attrs
                    .classes
                    .push(format!("admonition-{}", crate::make_id(title)));
            }
        }
        Ok(vec![node])
    }
}

/// `.. raw:: format` passes its content through to matching writers.
pub struct RawDirective;

impl Directive for RawDirective {
    fn name(&self) -> &str {
        "raw"
    }

    fn spec(&self) -> DirectiveSpec {
        titled(false, CLASS_OPTION)
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        _ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let format = invocation.arguments[0]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let mut node = Node::new(NodeKind::Raw { format })
            .with_text(invocation.content.text())
            .with_line(invocation.line);
        node.attrs.classes = invocation.options.classes("class");
        Ok(vec![node])
    }
}

/// `.. table:: Caption` wrapping exactly one simple or grid table.
pub struct TableDirective;

impl Directive for TableDirective {
    fn name(&self) -> &str {
        "table"
    }

    fn spec(&self) -> DirectiveSpec {
        titled(true, CLASS_OPTION)
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let mut nodes = ctx.parse_nested(&invocation.content)?;
        if nodes.len() != 1 || nodes[0].kind != NodeKind::Table {
            return Err(DirectiveError::Invalid(
                "Error parsing content block for the \"table\" directive: exactly one table expected."
                    .to_owned(),
            ));
        }
        let mut table = nodes.remove(0);
        if let Some(title) = invocation.arguments.first() {
            table.children.insert(0, title_node(title, ctx)?);
        }
        table.attrs.classes.extend(invocation.options.classes("class"));
        Ok(vec![table])
    }
}

#[cfg(test)]
mod tests {
    use crate::doctree::{AdmonitionKind, NodeKind};
    use crate::{ParseError, Parser};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_topic() {
        let doc = Parser::new()
            .parse("Intro.\n\n.. topic:: Summary\n\n   Body text.\n")
            .unwrap();
        let topic = &doc.children[1];
        assert_eq!(topic.kind, NodeKind::Topic);
        assert_eq!(topic.children[0].kind, NodeKind::Title);
        assert_eq!(topic.children[0].astext(), "Summary");
        assert_eq!(topic.children[1].kind, NodeKind::Paragraph);
    }

    #[test]
    fn test_sidebar_subtitle() {
        let doc = Parser::new()
            .parse(".. sidebar:: Aside\n   :subtitle: More\n\n   Text.\n")
            .unwrap();
        let sidebar = &doc.children[0];
        assert_eq!(sidebar.kind, NodeKind::Sidebar);
        assert_eq!(sidebar.child_kind(1), Some(&NodeKind::Subtitle));
        assert_eq!(sidebar.children[1].astext(), "More");
    }

    #[test]
    fn test_specific_admonition() {
        let doc = Parser::new().parse(".. note:: Mind the gap.\n").unwrap();
        let note = &doc.children[0];
        assert_eq!(note.kind, NodeKind::Admonition(AdmonitionKind::Note));
        assert_eq!(note.astext(), "Mind the gap.");
    }

    #[test]
    fn test_generic_admonition_class() {
        let doc = Parser::new()
            .parse(".. admonition:: By the way\n\n   Text.\n")
            .unwrap();
        let node = &doc.children[0];
        assert!(node.has_class("admonition-by-the-way"));
        assert_eq!(node.children[0].astext(), "By the way");
    }

    #[test]
    fn test_admonition_requires_content() {
        let err = Parser::new().parse(".. warning::\n").unwrap_err();
        assert!(matches!(err, ParseError::Directive { ref name, line: 1, .. } if name == "warning"));
    }

    #[test]
    fn test_raw() {
        let doc = Parser::new()
            .parse(".. raw:: HTML\n\n   <b>bold</b>\n")
            .unwrap();
        assert_eq!(
            doc.children[0].kind,
            NodeKind::Raw {
                format: "html".to_owned()
            }
        );
        assert_eq!(doc.children[0].text, "<b>bold</b>");
    }

    #[test]
    fn test_table_caption() {
        let src = ".. table:: Numbers\n\n   =  =\n   a  b\n   =  =\n";
        let doc = Parser::new().parse(src).unwrap();
        let table = &doc.children[0];
        assert_eq!(table.kind, NodeKind::Table);
        assert_eq!(table.children[0].kind, NodeKind::Title);
        assert_eq!(table.children[0].astext(), "Numbers");
    }

    #[test]
    fn test_table_requires_single_table() {
        let err = Parser::new()
            .parse(".. table:: Numbers\n\n   Not a table.\n")
            .unwrap_err();
        assert!(err.to_string().contains("exactly one table expected"));
    }
}
