//! Pluggable directives for explicit markup blocks (`.. name:: ...`).
//!
//! # Architecture
//!
//! A directive declares its shape through a [`DirectiveSpec`]: how many
//! arguments it takes, which options it understands and whether it accepts
//! a content block. The parser splits the directive block accordingly
//! (following the docutils rules) and hands the result to
//! [`Directive::run`] as a [`DirectiveInvocation`].
//!
//! Directives that contain body elements parse their content through
//! [`DirectiveContext::parse_nested`].
//!
//! # Example
//!
//! ```
//! use rst_parser::directive::{
//!     Directive, DirectiveContext, DirectiveError, DirectiveInvocation, DirectiveSpec,
//! };
//! use rst_parser::{Node, NodeKind, Parser};
//!
//! struct Shout;
//!
//! impl Directive for Shout {
//!     fn name(&self) -> &str { "shout" }
//!
//!     fn spec(&self) -> DirectiveSpec {
//!         DirectiveSpec::content_only()
//!     }
//!
//!     fn run(
//!         &self,
//!         invocation: DirectiveInvocation,
//!         _ctx: &DirectiveContext<'_>,
//!     ) -> Result<Vec<Node>, DirectiveError> {
//!         invocation.require_content()?;
//!         let text = invocation.content.text().to_uppercase();
//!         Ok(vec![Node::new(NodeKind::Raw { format: "html".to_owned() }).with_text(text)])
//!     }
//! }
//!
//! let parser = Parser::new().with_directive(Shout);
//! let doc = parser.parse(".. shout::\n\n   hello").unwrap();
//! assert_eq!(doc.children[0].text, "HELLO");
//! ```

mod builtin;
mod options;

use std::sync::LazyLock;

use regex::Regex;

use crate::block::BlockParser;
use crate::doctree::Node;
use crate::error::ParseError;
use crate::source::SourceLine;

pub use builtin::{AdmonitionDirective, RawDirective, SidebarDirective, TableDirective, TopicDirective};
pub use options::{OptionKind, Options};

static FIELD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:[^:\s][^:]*:(?: |$)").expect("valid field marker pattern"));

/// Shape of a directive: arguments, options and content.
#[derive(Clone, Copy, Debug)]
pub struct DirectiveSpec {
    /// Number of required arguments.
    pub required_arguments: usize,
    /// Number of optional arguments.
    pub optional_arguments: usize,
    /// Whether the final argument may contain whitespace.
    pub final_argument_whitespace: bool,
    /// Recognized options and how their values are converted.
    pub options: &'static [(&'static str, OptionKind)],
    /// Whether a content block is permitted.
    pub has_content: bool,
}

impl DirectiveSpec {
    /// No arguments, no options, content permitted.
    #[must_use]
    pub const fn content_only() -> Self {
        Self {
            required_arguments: 0,
            optional_arguments: 0,
            final_argument_whitespace: false,
            options: &[],
            has_content: true,
        }
    }

    fn takes_arguments(&self) -> bool {
        self.required_arguments + self.optional_arguments > 0
    }
}

/// A directive's content block: dedented lines with their source line numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Content {
    lines: Vec<SourceLine>,
}

impl Content {
    #[must_use]
    pub fn new(lines: Vec<SourceLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line texts without line numbers.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// Lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    pub(crate) fn source_lines(&self) -> &[SourceLine] {
        &self.lines
    }
}

/// A parsed directive occurrence.
#[derive(Clone, Debug)]
pub struct DirectiveInvocation {
    /// Directive name as written (lowercased).
    pub name: String,
    pub arguments: Vec<String>,
    pub options: Options,
    pub content: Content,
    /// Line of the `.. name::` marker.
    pub line: usize,
}

impl DirectiveInvocation {
    /// Fail unless the directive has a non-empty content block.
    pub fn require_content(&self) -> Result<(), DirectiveError> {
        if self.content.is_empty() {
            return Err(DirectiveError::Invalid(format!(
                "Content block expected for the \"{}\" directive; none found.",
                self.name
            )));
        }
        Ok(())
    }
}

/// Error returned by [`Directive::run`].
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    /// The directive's input is invalid (reported at the directive's line).
    #[error("{0}")]
    Invalid(String),
    /// Parsing the directive's nested content failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DirectiveError {
    fn into_parse_error(self, name: &str, line: usize) -> ParseError {
        match self {
            Self::Invalid(message) => ParseError::Directive {
                name: name.to_owned(),
                line,
                message,
            },
            Self::Parse(err) => err,
        }
    }
}

/// Parser services available while a directive runs.
pub struct DirectiveContext<'a> {
    parser: &'a BlockParser<'a>,
    line: usize,
}

impl<'a> DirectiveContext<'a> {
    pub(crate) fn new(parser: &'a BlockParser<'a>, line: usize) -> Self {
        Self { parser, line }
    }

    /// Line of the directive marker.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Parse a content block as body elements (section titles not allowed).
    pub fn parse_nested(&self, content: &Content) -> Result<Vec<Node>, ParseError> {
        self.parser.parse_nested(content.source_lines())
    }

    /// Parse a single line of text (e.g. a title argument) as inline markup.
    pub fn parse_inline(&self, text: &str) -> Result<Vec<Node>, ParseError> {
        crate::inline::parse_inline(text, self.line)
    }
}

/// Handler for one directive name.
///
/// Handlers are `Send` so a configured parser can move between threads.
pub trait Directive: Send {
    /// Directive name matched case-insensitively against `.. name::`.
    fn name(&self) -> &str;

    /// Arguments/options/content shape.
    fn spec(&self) -> DirectiveSpec;

    /// Produce the nodes that replace the directive.
    fn run(
        &self,
        invocation: DirectiveInvocation,
        ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError>;
}

/// Registered directives, consulted by name.
#[derive(Default)]
pub struct DirectiveRegistry {
    directives: Vec<Box<dyn Directive>>,
}

impl DirectiveRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in body directives (`topic`, `sidebar`,
    /// `admonition` and the specific admonitions, `raw`, `table`).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TopicDirective);
        registry.register(SidebarDirective);
        registry.register(AdmonitionDirective::generic());
        for name in [
            "attention",
            "caution",
            "danger",
            "error",
            "hint",
            "important",
            "note",
            "tip",
            "warning",
        ] {
            if let Some(directive) = AdmonitionDirective::specific(name) {
                registry.register(directive);
            }
        }
        registry.register(RawDirective);
        registry.register(TableDirective);
        registry
    }

    /// Register a directive. Later registrations shadow earlier ones.
    pub fn register<D: Directive + 'static>(&mut self, directive: D) {
        self.directives.push(Box::new(directive));
    }

    /// Find a directive by (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Directive> {
        self.directives
            .iter()
            .rev()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .map(AsRef::as_ref)
    }

    /// Names of all registered directives.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(|d| d.name())
    }
}

/// Run `directive` on its block (`indented[0]` is the text after `::`).
pub(crate) fn invoke(
    directive: &dyn Directive,
    parser: &BlockParser<'_>,
    name: &str,
    indented: Vec<SourceLine>,
    line: usize,
) -> Result<Vec<Node>, ParseError> {
    let invocation = prepare(&directive.spec(), name, indented, line)
        .map_err(|e| e.into_parse_error(name, line))?;
    tracing::debug!(directive = name, line, "running directive");
    let ctx = DirectiveContext::new(parser, line);
    directive
        .run(invocation, &ctx)
        .map_err(|e| e.into_parse_error(name, line))
}

/// Split a directive block into arguments, options and content.
fn prepare(
    spec: &DirectiveSpec,
    name: &str,
    mut indented: Vec<SourceLine>,
    line: usize,
) -> Result<DirectiveInvocation, DirectiveError> {
    if indented.first().is_some_and(SourceLine::is_blank) {
        indented.remove(0);
    }
    while indented.last().is_some_and(SourceLine::is_blank) {
        indented.pop();
    }

    let blank = indented
        .iter()
        .position(SourceLine::is_blank)
        .unwrap_or(indented.len());
    let splits_block = !indented.is_empty() && (spec.takes_arguments() || !spec.options.is_empty());
    let (mut arg_block, mut content) = if splits_block {
        let content = indented.get(blank + 1..).map(<[_]>::to_vec).unwrap_or_default();
        (indented[..blank].to_vec(), content)
    } else {
        (Vec::new(), indented.clone())
    };

    let mut options = Options::default();
    if !spec.options.is_empty() {
        if let Some(split) = arg_block.iter().position(|l| FIELD_MARKER.is_match(&l.text)) {
            let option_block = arg_block.split_off(split);
            options = Options::parse(&option_block, spec.options)?;
        }
    }

    if !arg_block.is_empty() && !spec.takes_arguments() {
        let mut merged = arg_block;
        merged.extend(indented[blank..].iter().cloned());
        content = merged;
        arg_block = Vec::new();
    }

    let leading = content.iter().take_while(|l| l.is_blank()).count();
    content.drain(..leading);

    if !spec.has_content && !content.is_empty() {
        return Err(DirectiveError::Invalid(format!(
            "no content permitted in \"{name}\" directive"
        )));
    }

    let arguments = split_arguments(spec, &arg_block)?;
    Ok(DirectiveInvocation {
        name: name.to_lowercase(),
        arguments,
        options,
        content: Content::new(content),
        line,
    })
}

fn split_arguments(
    spec: &DirectiveSpec,
    arg_block: &[SourceLine],
) -> Result<Vec<String>, DirectiveError> {
    let text = arg_block
        .iter()
        .map(|l| l.text.trim())
        .collect::<Vec<_>>()
        .join("\n");
    let max = spec.required_arguments + spec.optional_arguments;
    let arguments: Vec<String> = if text.is_empty() {
        Vec::new()
    } else if spec.final_argument_whitespace && max > 0 {
        text.splitn(max, char::is_whitespace)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    } else {
        text.split_whitespace().map(str::to_owned).collect()
    };

    if arguments.len() < spec.required_arguments {
        return Err(DirectiveError::Invalid(format!(
            "{} argument(s) required, {} supplied.",
            spec.required_arguments,
            arguments.len()
        )));
    }
    if arguments.len() > max {
        return Err(DirectiveError::Invalid(format!(
            "maximum {max} argument(s) allowed, {} supplied.",
            arguments.len()
        )));
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(texts: &[&str]) -> Vec<SourceLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine::new(*t, i + 10))
            .collect()
    }

    const OPTIONED: DirectiveSpec = DirectiveSpec {
        required_arguments: 0,
        optional_arguments: 0,
        final_argument_whitespace: false,
        options: &[("options", OptionKind::Unchanged)],
        has_content: true,
    };

    const TITLED: DirectiveSpec = DirectiveSpec {
        required_arguments: 1,
        optional_arguments: 0,
        final_argument_whitespace: true,
        options: &[("class", OptionKind::Class)],
        has_content: true,
    };

    #[test]
    fn test_prepare_options_then_content() {
        let inv = prepare(
            &OPTIONED,
            "sourcecode",
            block(&["", ":options: lang-rs", "", "fn main() {}", "  body"]),
            10,
        )
        .unwrap();
        assert!(inv.arguments.is_empty());
        assert_eq!(inv.options.get("options"), Some("lang-rs"));
        assert_eq!(inv.content.lines().collect::<Vec<_>>(), vec!["fn main() {}", "  body"]);
    }

    #[test]
    fn test_prepare_text_after_marker_becomes_content() {
        let inv = prepare(&OPTIONED, "sourcecode", block(&["python", "", "x = 1"]), 10).unwrap();
        assert_eq!(inv.content.lines().collect::<Vec<_>>(), vec!["python", "", "x = 1"]);
    }

    #[test]
    fn test_prepare_title_argument_with_whitespace() {
        let inv = prepare(&TITLED, "topic", block(&["A long title", "", "Body."]), 10).unwrap();
        assert_eq!(inv.arguments, vec!["A long title".to_owned()]);
        assert_eq!(inv.content.text(), "Body.");
    }

    #[test]
    fn test_prepare_missing_argument() {
        let err = prepare(&TITLED, "topic", block(&["", "", "Body."]), 10).unwrap_err();
        assert_eq!(err.to_string(), "1 argument(s) required, 0 supplied.");
    }

    #[test]
    fn test_prepare_content_not_permitted() {
        let spec = DirectiveSpec {
            has_content: false,
            ..DirectiveSpec::content_only()
        };
        let err = prepare(&spec, "thing", block(&["", "text"]), 10).unwrap_err();
        assert!(err.to_string().contains("no content permitted"));
    }

    #[test]
    fn test_require_content() {
        let inv = prepare(&OPTIONED, "sourcecode", block(&[""]), 10).unwrap();
        let err = inv.require_content().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content block expected for the \"sourcecode\" directive; none found."
        );
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive_and_shadowing() {
        let registry = DirectiveRegistry::with_builtins();
        assert!(registry.get("NOTE").is_some());
        assert!(registry.get("sourcecode").is_none());
        assert!(registry.names().any(|n| n == "table"));
    }

    #[test]
    fn test_into_parse_error_keeps_nested_errors() {
        let nested = ParseError::syntax(12, "Unexpected section title.");
        let err = DirectiveError::from(nested.clone()).into_parse_error("note", 10);
        assert_eq!(err, nested);
    }
}
