//! reStructuredText to HTML fragment renderer.
//!
//! This crate turns RST source into an HTML fragment suitable for
//! embedding in a page:
//!
//! - [`convert`] / [`convert_str`]: source in, fragment out (the document
//!   wrapper `<div>` removed).
//! - [`publish_parts`]: the rendered parts (`html_body`, `body`, `title`,
//!   ...) before fragment extraction.
//! - [`HtmlTranslator`]: the tree visitor producing the HTML, for callers
//!   that parse with their own [`rst_parser::Parser`].
//!
//! The `sourcecode` directive ([`SourcecodeDirective`]) is registered for
//! every conversion. It emits a pre-escaped `<pre class="prettyprint ...">`
//! block for client-side syntax highlighting.
//!
//! # Example
//!
//! ```
//! use rst_renderer::{Settings, convert_str};
//!
//! let source = "\
//! Usage
//! =====
//!
//! Run ``make  all``:
//!
//! .. sourcecode::
//!    :options: lang-sh
//!
//!    make all
//! ";
//! let html = convert_str(source, &Settings::default()).unwrap();
//! assert!(html.starts_with("<h1>Usage</h1>"));
//! assert!(html.contains("<code>make&nbsp; all</code>"));
//! assert!(html.ends_with("<pre class=\"prettyprint lang-sh\">make all</pre>"));
//! ```

mod code_block;
mod error;
mod fragment;
mod html;
mod literal;
mod publisher;
mod translator;

pub use code_block::SourcecodeDirective;
pub use error::ConvertError;
pub use fragment::{convert, convert_str, extract_fragment};
pub use html::{encode, escape_code};
pub use publisher::{RenderResult, Settings, publish_parts, render_document};
pub use translator::HtmlTranslator;
