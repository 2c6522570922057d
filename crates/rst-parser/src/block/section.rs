//! Assembles the flat block sequence into nested sections.

use super::{Block, TitleStyle};
use crate::doctree::{Node, NodeKind};
use crate::error::ParseError;
use crate::inline::parse_inline;

/// Nest body nodes under the titles preceding them.
///
/// Levels are assigned by first appearance of each adornment style; a
/// title may close any number of open sections but can only open one new
/// level at a time.
pub(crate) fn build_sections(blocks: Vec<Block>) -> Result<Vec<Node>, ParseError> {
    let mut styles: Vec<TitleStyle> = Vec::new();
    let mut root = Vec::new();
    let mut open: Vec<Node> = Vec::new();

    for block in blocks {
        match block {
            Block::Node(node) => match open.last_mut() {
                Some(section) => section.children.push(node),
                None => root.push(node),
            },
            Block::Title(mark) => {
                let level = match styles.iter().position(|s| *s == mark.style) {
                    Some(level) => level,
                    None => {
                        styles.push(mark.style);
                        styles.len() - 1
                    }
                };
                if level > open.len() {
                    return Err(ParseError::syntax(mark.line, "Title level inconsistent."));
                }
                close_sections(&mut open, &mut root, level);
                let title = Node::element(NodeKind::Title, parse_inline(&mark.text, mark.line)?)
                    .with_line(mark.line);
                open.push(Node::element(NodeKind::Section, vec![title]).with_line(mark.line));
            }
        }
    }
    close_sections(&mut open, &mut root, 0);
    Ok(root)
}

fn close_sections(open: &mut Vec<Node>, root: &mut Vec<Node>, depth: usize) {
    while open.len() > depth {
        let Some(section) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.children.push(section),
            None => root.push(section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TitleMark;
    use pretty_assertions::assert_eq;

    fn title(ch: char, text: &str, line: usize) -> Block {
        Block::Title(TitleMark {
            style: TitleStyle { ch, overline: false },
            text: text.to_owned(),
            line,
        })
    }

    fn para(text: &str) -> Block {
        Block::Node(Node::element(NodeKind::Paragraph, vec![Node::text(text)]))
    }

    #[test]
    fn test_nesting() {
        let nodes = build_sections(vec![
            para("intro"),
            title('=', "A", 3),
            para("a"),
            title('-', "A.1", 6),
            para("a1"),
            title('=', "B", 9),
        ])
        .unwrap();
        assert_eq!(nodes.len(), 3);
        let a = &nodes[1];
        assert_eq!(a.kind, NodeKind::Section);
        assert_eq!(a.children[0].astext(), "A");
        assert_eq!(a.children[2].kind, NodeKind::Section);
        assert_eq!(a.children[2].children[1].astext(), "a1");
        assert_eq!(nodes[2].children[0].astext(), "B");
    }

    #[test]
    fn test_overline_is_distinct_style() {
        let overlined = Block::Title(TitleMark {
            style: TitleStyle {
                ch: '=',
                overline: true,
            },
            text: "Doc".to_owned(),
            line: 1,
        });
        let nodes = build_sections(vec![overlined, title('=', "Sub", 5)]).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children[1].kind, NodeKind::Section);
    }

    #[test]
    fn test_level_skip_is_inconsistent() {
        let err = build_sections(vec![
            title('=', "A", 1),
            title('-', "A.1", 4),
            title('=', "B", 7),
            title('~', "B.1", 10),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "line 10: Title level inconsistent.");
    }
}
