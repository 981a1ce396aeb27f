//! # Sitedit Markup
//!
//! Parsing and serialization of page markup for the editing engine.
//!
//! ```text
//! source ──tokenize──▶ tokens ──Parser──▶ Document (arena tree) ──Serializer──▶ source
//! ```
//!
//! The tree never invents structure that was not in the source, so a
//! document written by the serializer parses back to an equal tree and
//! re-serializes to the same bytes.

pub mod dom;
pub mod entities;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use dom::{Document, ElementData, NodeData, NodeId};
pub use error::{ParseError, ParseResult};
pub use parser::{is_void_element, parse, parse_fragment, Parser};
pub use serializer::{inner_markup, outer_markup, serialize, SerializeOptions, Serializer};
pub use tokenizer::{tokenize, Attribute, Token};
