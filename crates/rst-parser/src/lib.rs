//! reStructuredText parser.
//!
//! Parses the commonly used RST subset into an owned document tree:
//!
//! - **Blocks**: sections, paragraphs, literal and doctest blocks, block
//!   quotes, bullet/enumerated/definition lists, simple and grid tables,
//!   transitions, comments and hyperlink targets.
//! - **Inline markup**: emphasis, strong, literals, interpreted text with
//!   roles, hyperlink references and standalone URIs.
//! - **Directives**: a pluggable registry ([`directive`]) with the common
//!   body directives built in.
//!
//! After parsing, section ids are assigned, internal targets are attached
//! to the following element, a lone top-level section is promoted to the
//! document title and named references are resolved.
//!
//! Renderers consume the tree through [`walkabout`] and a
//! [`NodeVisitor`].
//!
//! # Example
//!
//! ```
//! use rst_parser::{NodeKind, Parser};
//!
//! let doc = Parser::new()
//!     .parse("Title\n=====\n\nSome ``code``.")
//!     .unwrap();
//! assert_eq!(doc.children[0].kind, NodeKind::Title);
//! ```

mod block;
pub mod directive;
mod doctree;
mod error;
mod inline;
mod parser;
mod source;
mod transform;
mod visitor;

pub use doctree::{
    AdmonitionKind, Attributes, EnumType, IdGenerator, Node, NodeKind, make_id, normalize_name,
};
pub use error::ParseError;
pub use parser::{Parser, ParserConfig};
pub use source::SourceLine;
pub use visitor::{NodeVisitor, Visit, walkabout};
