//! Depth-first tree walk with visit/depart callbacks.

use crate::doctree::Node;

/// What the walker should do after [`NodeVisitor::visit`] returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Walk the children, then call `depart`.
    Continue,
    /// Skip the children but still call `depart`.
    SkipChildren,
    /// Skip the children and `depart`: the node has been fully handled.
    SkipNode,
}

/// Callbacks invoked for every node of a document tree.
///
/// `parent` is `None` only for the root.
pub trait NodeVisitor {
    type Error;

    fn visit(&mut self, node: &Node, parent: Option<&Node>) -> Result<Visit, Self::Error>;

    fn depart(&mut self, node: &Node, parent: Option<&Node>) -> Result<(), Self::Error>;
}

/// Walk `root` depth-first, dispatching to `visitor`.
///
/// The first error aborts the walk and is returned unchanged.
pub fn walkabout<V: NodeVisitor>(root: &Node, visitor: &mut V) -> Result<(), V::Error> {
    walk(root, None, visitor)
}

fn walk<V: NodeVisitor>(
    node: &Node,
    parent: Option<&Node>,
    visitor: &mut V,
) -> Result<(), V::Error> {
    match visitor.visit(node, parent)? {
        Visit::SkipNode => Ok(()),
        Visit::SkipChildren => visitor.depart(node, parent),
        Visit::Continue => {
            for child in &node.children {
                walk(child, Some(node), visitor)?;
            }
            visitor.depart(node, parent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctree::NodeKind;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip: Option<NodeKind>,
        skip_children: Option<NodeKind>,
    }

    impl NodeVisitor for Recorder {
        type Error = String;

        fn visit(&mut self, node: &Node, parent: Option<&Node>) -> Result<Visit, String> {
            let parent = parent.map_or("-", |p| p.kind.name());
            self.events
                .push(format!("visit {} in {parent}", node.kind.name()));
            if self.skip.as_ref() == Some(&node.kind) {
                return Ok(Visit::SkipNode);
            }
            if self.skip_children.as_ref() == Some(&node.kind) {
                return Ok(Visit::SkipChildren);
            }
            Ok(Visit::Continue)
        }

        fn depart(&mut self, node: &Node, _parent: Option<&Node>) -> Result<(), String> {
            self.events.push(format!("depart {}", node.kind.name()));
            Ok(())
        }
    }

    fn sample() -> Node {
        Node::element(
            NodeKind::Document,
            vec![Node::element(
                NodeKind::Paragraph,
                vec![Node::text("hi")],
            )],
        )
    }

    #[test]
    fn test_walk_order_and_parents() {
        let mut rec = Recorder::default();
        walkabout(&sample(), &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "visit document in -",
                "visit paragraph in document",
                "visit Text in paragraph",
                "depart Text",
                "depart paragraph",
                "depart document",
            ]
        );
    }

    #[test]
    fn test_skip_node_skips_depart() {
        let mut rec = Recorder {
            skip: Some(NodeKind::Paragraph),
            ..Default::default()
        };
        walkabout(&sample(), &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "visit document in -",
                "visit paragraph in document",
                "depart document",
            ]
        );
    }

    #[test]
    fn test_skip_children_still_departs() {
        let mut rec = Recorder {
            skip_children: Some(NodeKind::Paragraph),
            ..Default::default()
        };
        walkabout(&sample(), &mut rec).unwrap();
        assert_eq!(
            rec.events,
            vec![
                "visit document in -",
                "visit paragraph in document",
                "depart paragraph",
                "depart document",
            ]
        );
    }
}
