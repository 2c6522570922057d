//! Simple and grid tables.
//!
//! Both syntaxes are first reduced to a [`TableLayout`] (column widths and
//! the raw lines of every cell); cell bodies are then parsed as nested
//! blocks. Cell spans are not supported.

use std::sync::LazyLock;

use regex::Regex;

use super::BlockParser;
use crate::doctree::{Node, NodeKind};
use crate::error::ParseError;
use crate::source::{SourceLine, common_indent, dedent, trim_blank_lines};

static SIMPLE_BORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^=+(?: +=+)+$").expect("valid simple table border pattern"));

static GRID_BORDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+(?:-+\+)+$").expect("valid grid table border pattern"));

type Cell = Vec<SourceLine>;
type Row = Vec<Cell>;

#[derive(Debug, Default)]
pub(super) struct TableLayout {
    colwidths: Vec<usize>,
    head: Vec<Row>,
    body: Vec<Row>,
}

pub(super) fn is_simple_border(text: &str) -> bool {
    SIMPLE_BORDER.is_match(text)
}

pub(super) fn is_grid_border(text: &str) -> bool {
    GRID_BORDER.is_match(text)
}

fn malformed(line: usize, detail: &str) -> ParseError {
    ParseError::syntax(line, format!("Malformed table. {detail}"))
}

/// Character ranges of the `=` runs of a simple table border.
fn columns(border: &str) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in border.chars().enumerate() {
        match (c, start) {
            ('=', None) => start = Some(i),
            (' ', Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, border.chars().count()));
    }
    runs
}

/// Parse a simple table whose top border is at `start`.
pub(super) fn simple(lines: &[SourceLine], start: usize) -> Result<(TableLayout, usize), ParseError> {
    let top = &lines[start];
    let cols = columns(&top.text);

    let mut borders = vec![start];
    let mut k = start + 1;
    let end = loop {
        let Some(line) = lines.get(k) else {
            return Err(malformed(top.lineno, "No bottom table border found."));
        };
        if is_simple_border(&line.text) {
            if columns(&line.text) != cols {
                return Err(malformed(line.lineno, "Border does not match top border."));
            }
            borders.push(k);
            if lines.get(k + 1).is_none_or(SourceLine::is_blank) {
                break k;
            }
        }
        k += 1;
    };
    if borders.len() > 3 {
        return Err(malformed(
            lines[borders[2]].lineno,
            "Multiple head/body row separators; only one allowed.",
        ));
    }
    let separator = (borders.len() == 3).then(|| borders[1]);

    let mut layout = TableLayout {
        colwidths: cols.iter().map(|(s, e)| e - s).collect(),
        ..TableLayout::default()
    };
    let mut current: Option<Row> = None;
    let mut in_head = separator.is_some();
    for k in start + 1..end {
        let line = &lines[k];
        if Some(k) == separator || line.is_blank() {
            layout.push_row(current.take(), in_head);
            if Some(k) == separator {
                in_head = false;
            }
            continue;
        }
        let texts = split_simple_row(line, &cols)?;
        // A blank first column continues the previous row.
        let continuation = current.is_some() && texts[0].trim().is_empty();
        if !continuation {
            layout.push_row(current.take(), in_head);
            current = Some(vec![Vec::new(); cols.len()]);
        }
        if let Some(row) = current.as_mut() {
            for (cell, text) in row.iter_mut().zip(texts) {
                cell.push(SourceLine::new(text, line.lineno));
            }
        }
    }
    layout.push_row(current, in_head);
    Ok((layout, end + 1))
}

fn split_simple_row(line: &SourceLine, cols: &[(usize, usize)]) -> Result<Vec<String>, ParseError> {
    let chars: Vec<char> = line.text.chars().collect();
    let mut texts = Vec::with_capacity(cols.len());
    for (j, &(start, end)) in cols.iter().enumerate() {
        let cell_end = match cols.get(j + 1) {
            Some(&(next_start, _)) => {
                let margin = chars.get(end..next_start.min(chars.len())).unwrap_or_default();
                if margin.iter().any(|c| *c != ' ') {
                    return Err(malformed(
                        line.lineno,
                        &format!("Text in column margin in table line {}.", line.lineno),
                    ));
                }
                end.min(chars.len())
            }
            None => chars.len(),
        };
        let text: String = chars.get(start..cell_end).unwrap_or_default().iter().collect();
        texts.push(text.trim_end().to_owned());
    }
    Ok(texts)
}

/// Parse a grid table whose top border is at `start`.
pub(super) fn grid(lines: &[SourceLine], start: usize) -> Result<(TableLayout, usize), ParseError> {
    let end = lines[start..]
        .iter()
        .position(SourceLine::is_blank)
        .map_or(lines.len(), |offset| start + offset);
    let top: Vec<char> = lines[start].text.chars().collect();
    let bounds: Vec<usize> = top
        .iter()
        .enumerate()
        .filter_map(|(i, c)| (*c == '+').then_some(i))
        .collect();
    let width = top.len();

    let mut layout = TableLayout {
        colwidths: bounds.windows(2).map(|w| w[1] - w[0] - 1).collect(),
        ..TableLayout::default()
    };
    let mut rows: Vec<Row> = Vec::new();
    let mut head_rows = None;
    let mut current: Row = vec![Vec::new(); bounds.len() - 1];
    let mut closed = true;

    for line in &lines[start + 1..end] {
        let chars: Vec<char> = line.text.chars().collect();
        if chars.first() == Some(&'+') {
            if !is_separator(&chars, &bounds, width) {
                return Err(malformed(line.lineno, "Cell spans are not supported."));
            }
            if !closed {
                rows.push(std::mem::replace(&mut current, vec![Vec::new(); bounds.len() - 1]));
                closed = true;
            }
            if chars.contains(&'=') {
                if head_rows.is_some() {
                    return Err(malformed(
                        line.lineno,
                        "Multiple head/body row separators; only one allowed.",
                    ));
                }
                head_rows = Some(rows.len());
            }
            continue;
        }
        if chars.len() != width || bounds.iter().any(|&b| chars.get(b) != Some(&'|')) {
            return Err(malformed(line.lineno, "Cell spans are not supported."));
        }
        for (cell, pair) in current.iter_mut().zip(bounds.windows(2)) {
            let text: String = chars[pair[0] + 1..pair[1]].iter().collect();
            cell.push(SourceLine::new(text.trim_end(), line.lineno));
        }
        closed = false;
    }
    if !closed {
        let line = lines[end - 1].lineno;
        return Err(malformed(line, "Bottom border missing."));
    }

    let body = rows.split_off(head_rows.unwrap_or(0));
    layout.head = rows;
    layout.body = body;
    Ok((layout, end))
}

fn is_separator(chars: &[char], bounds: &[usize], width: usize) -> bool {
    chars.len() == width
        && chars.iter().enumerate().all(|(i, c)| {
            if bounds.contains(&i) {
                *c == '+'
            } else {
                *c == '-' || *c == '='
            }
        })
}

impl TableLayout {
    fn push_row(&mut self, row: Option<Row>, head: bool) {
        if let Some(row) = row {
            if head {
                self.head.push(row);
            } else {
                self.body.push(row);
            }
        }
    }
}

fn finish_cell(cell: Cell) -> Vec<SourceLine> {
    let indent = common_indent(&cell);
    trim_blank_lines(dedent(&cell, indent))
}

impl BlockParser<'_> {
    /// Build a `Table` node, parsing every cell as a nested body.
    pub(super) fn table(&self, layout: TableLayout, line: usize) -> Result<Node, ParseError> {
        let cols = layout.colwidths.len();
        let mut group: Vec<Node> = layout
            .colwidths
            .iter()
            .map(|&colwidth| Node::new(NodeKind::ColSpec { colwidth }))
            .collect();
        if !layout.head.is_empty() {
            group.push(Node::element(NodeKind::THead, self.rows(layout.head)?));
        }
        group.push(Node::element(NodeKind::TBody, self.rows(layout.body)?));
        Ok(Node::element(
            NodeKind::Table,
            vec![Node::element(NodeKind::TGroup { cols }, group)],
        )
        .with_line(line))
    }

    fn rows(&self, rows: Vec<Row>) -> Result<Vec<Node>, ParseError> {
        rows.into_iter()
            .map(|cells| {
                let entries = cells
                    .into_iter()
                    .map(|cell| {
                        let body = self.parse_nested(&finish_cell(cell))?;
                        Ok(Node::element(NodeKind::Entry, body))
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(Node::element(NodeKind::Row, entries))
            })
            .collect()
    }
}
