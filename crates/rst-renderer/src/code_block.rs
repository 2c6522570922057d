//! The `sourcecode` directive.
//!
//! ```rst
//! .. sourcecode::
//!    :options: lang-rust linenums
//!
//!    fn main() {}
//! ```
//!
//! renders to `<pre class="prettyprint lang-rust linenums">fn main() {}</pre>`
//! for client-side highlighting. Content lines are HTML-escaped and joined
//! with `\n`; the options string is passed through as written.

use rst_parser::directive::{
    Directive, DirectiveContext, DirectiveError, DirectiveInvocation, DirectiveSpec, OptionKind,
};
use rst_parser::{Node, NodeKind};

use crate::html::escape_code;

/// Directive producing a pre-escaped `prettyprint` block.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourcecodeDirective;

impl Directive for SourcecodeDirective {
    fn name(&self) -> &str {
        "sourcecode"
    }

    fn spec(&self) -> DirectiveSpec {
        DirectiveSpec {
            options: &[("options", OptionKind::Unchanged)],
            ..DirectiveSpec::content_only()
        }
    }

    fn run(
        &self,
        invocation: DirectiveInvocation,
        _ctx: &DirectiveContext<'_>,
    ) -> Result<Vec<Node>, DirectiveError> {
        invocation.require_content()?;
        let options = invocation.options.get("options").unwrap_or_default();
        let html = render_sourcecode(invocation.content.lines(), options);
        tracing::debug!(line = invocation.line, "rendered sourcecode block");
        let raw = Node::new(NodeKind::Raw {
            format: "html".to_owned(),
        })
        .with_text(html)
        .with_line(invocation.line);
        Ok(vec![raw])
    }
}

/// Build the `<pre class="prettyprint ...">` markup for `lines`.
pub(crate) fn render_sourcecode<'a>(lines: impl Iterator<Item = &'a str>, options: &str) -> String {
    let body = lines.map(escape_code).collect::<Vec<_>>().join("\n");
    format!("<pre class=\"prettyprint {options}\">{body}</pre>")
}
