//! Status lines on standard error.
//!
//! The HTML fragment owns standard output, so everything meant for the
//! user goes to stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Status reporter for a conversion run.
pub(crate) struct Output {
    term: Term,
    done: Style,
    failed: Style,
    detail: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            failed: Style::new().red().bold(),
            detail: Style::new().dim(),
        }
    }

    /// Report a fragment written to `path`.
    pub(crate) fn wrote(&self, path: &Path, bytes: usize) {
        self.line(&self.wrote_line(path, bytes));
    }

    /// Report a failed run.
    pub(crate) fn failure(&self, err: &impl Display) {
        self.line(&self.failure_line(err));
    }

    fn wrote_line(&self, path: &Path, bytes: usize) -> String {
        format!(
            "{} {} {}",
            self.done.apply_to("Wrote"),
            path.display(),
            self.detail.apply_to(format!("({bytes} bytes)"))
        )
    }

    fn failure_line(&self, err: &impl Display) -> String {
        format!("{} {err}", self.failed.apply_to("Error:"))
    }

    fn line(&self, text: &str) {
        // Nothing sensible is left to do when stderr is gone.
        let _ = self.term.write_line(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain() -> Output {
        Output {
            term: Term::stderr(),
            done: Style::new().green().force_styling(false),
            failed: Style::new().red().bold().force_styling(false),
            detail: Style::new().dim().force_styling(false),
        }
    }

    #[test]
    fn test_wrote_line() {
        assert_eq!(
            plain().wrote_line(Path::new("out/doc.html"), 42),
            "Wrote out/doc.html (42 bytes)"
        );
    }

    #[test]
    fn test_failure_line() {
        assert_eq!(
            plain().failure_line(&"line 3: Unknown directive type \"nope\"."),
            "Error: line 3: Unknown directive type \"nope\"."
        );
    }

    #[test]
    fn test_styled_failure_keeps_message() {
        let output = Output {
            failed: Style::new().red().force_styling(true),
            ..plain()
        };
        let line = output.failure_line(&"boom");
        assert!(line.starts_with("\u{1b}["));
        assert!(line.ends_with(" boom"));
    }
}
