//! Source lines and indentation helpers.

/// One physical source line with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub lineno: usize,
}

impl SourceLine {
    #[must_use]
    pub fn new(text: impl Into<String>, lineno: usize) -> Self {
        Self {
            text: text.into(),
            lineno,
        }
    }

    /// Whether the line is empty (trailing whitespace is already stripped).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of leading spaces.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }
}

/// Split source text into lines: normalize line endings, expand tabs and
/// strip trailing whitespace.
pub(crate) fn preprocess(source: &str, tab_width: usize) -> Vec<SourceLine> {
    let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split('\n')
        .enumerate()
        .map(|(i, line)| SourceLine::new(expand_tabs(line, tab_width).trim_end(), i + 1))
        .collect()
}

fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') {
        return line.to_owned();
    }
    let mut out = String::with_capacity(line.len() + tab_width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = tab_width - column % tab_width;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// Remove leading and trailing blank lines.
pub(crate) fn trim_blank_lines(mut lines: Vec<SourceLine>) -> Vec<SourceLine> {
    while lines.last().is_some_and(SourceLine::is_blank) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_blank()).count();
    lines.drain(..leading);
    lines
}

/// Strip `amount` columns of indentation from every non-blank line.
pub(crate) fn dedent(lines: &[SourceLine], amount: usize) -> Vec<SourceLine> {
    lines
        .iter()
        .map(|l| {
            let text = if l.is_blank() {
                String::new()
            } else {
                l.text[amount.min(l.indent())..].to_owned()
            };
            SourceLine::new(text, l.lineno)
        })
        .collect()
}

/// Smallest indentation among non-blank lines (0 when all are blank).
pub(crate) fn common_indent(lines: &[SourceLine]) -> usize {
    lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(SourceLine::indent)
        .min()
        .unwrap_or(0)
}

/// Collect the indented block starting at `start`.
///
/// With `Some(min)`, lines belong to the block while they are blank or
/// indented by at least `min` columns, and exactly `min` columns are
/// removed. With `None`, any indentation counts and the common indentation
/// is removed. Trailing blank lines are dropped from the block but
/// consumed. Returns the block and the index of the first line after it.
pub(crate) fn take_indented(
    lines: &[SourceLine],
    start: usize,
    min: Option<usize>,
) -> (Vec<SourceLine>, usize) {
    let threshold = min.unwrap_or(1).max(1);
    let end = lines[start..]
        .iter()
        .position(|l| !l.is_blank() && l.indent() < threshold)
        .map_or(lines.len(), |offset| start + offset);
    let block = &lines[start..end];
    let amount = min.unwrap_or_else(|| common_indent(block));
    let mut block = dedent(block, amount);
    while block.last().is_some_and(SourceLine::is_blank) {
        block.pop();
    }
    (block, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine::new(*t, i + 1))
            .collect()
    }

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_preprocess_normalizes() {
        let out = preprocess("a\r\n\tb  \rc", 4);
        assert_eq!(texts(&out), vec!["a", "    b", "c"]);
        assert_eq!(out[2].lineno, 3);
    }

    #[test]
    fn test_expand_tabs_respects_columns() {
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("\t\tx", 8).len(), 17);
    }

    #[test]
    fn test_take_indented_common_indent() {
        let src = lines(&["  one", "    two", "", "  three", "", "back"]);
        let (block, next) = take_indented(&src, 0, None);
        assert_eq!(texts(&block), vec!["one", "  two", "", "three"]);
        assert_eq!(next, 5);
    }

    #[test]
    fn test_take_indented_known_indent() {
        let src = lines(&["   x", "  y"]);
        let (block, next) = take_indented(&src, 0, Some(3));
        assert_eq!(texts(&block), vec!["x"]);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_trim_blank_lines() {
        let src = lines(&["", "a", "", "b", ""]);
        assert_eq!(texts(&trim_blank_lines(src)), vec!["a", "", "b"]);
    }
}
