use crate::dom::{Document, NodeData, NodeId};
use crate::entities;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use tracing::trace;

/// Elements that never have children or a close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub const MAX_DEPTH: usize = 512;

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Tree builder over the token stream.
///
/// Deliberately small: no implied `html`/`head`/`body` elements and no
/// adoption-agency repairs. A close tag pops back to the nearest open
/// element with the same name; close tags with no match are dropped.
pub struct Parser<'src> {
    source: &'src str,
    max_depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse_document(&self) -> ParseResult<Document> {
        let tokens = tokenize(self.source)?;
        let mut doc = Document::new();
        let mut open: Vec<NodeId> = vec![doc.root()];

        for (token, span) in tokens {
            let current = *open.last().unwrap_or(&doc.root());
            match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let leaf = self_closing || is_void_element(&name);
                    let element = doc.create_element(name, attributes);
                    doc.append(current, element);
                    if !leaf {
                        if open.len() > self.max_depth {
                            return Err(ParseError::nesting_too_deep(span.start, self.max_depth));
                        }
                        open.push(element);
                    }
                }
                Token::EndTag(name) => {
                    // Index 0 is the document root and never closes.
                    if let Some(pos) = open
                        .iter()
                        .rposition(|&n| doc.tag(n) == Some(name.as_str()))
                        .filter(|&pos| pos > 0)
                    {
                        open.truncate(pos);
                    } else {
                        trace!(tag = %name, pos = span.start, "Dropping unmatched close tag");
                    }
                }
                Token::Text(text) => {
                    let node = doc.create(NodeData::Text {
                        content: entities::decode(text).into_owned(),
                        raw: false,
                    });
                    doc.append(current, node);
                }
                Token::RawText(text) => {
                    let node = doc.create(NodeData::Text {
                        content: text.to_string(),
                        raw: true,
                    });
                    doc.append(current, node);
                }
                Token::Comment(body) => {
                    let node = doc.create(NodeData::Comment(body.to_string()));
                    doc.append(current, node);
                }
                Token::Doctype(body) => {
                    let node = doc.create(NodeData::Doctype(body.to_string()));
                    doc.append(current, node);
                }
            }
        }

        Ok(doc)
    }
}

/// Parse a whole page.
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}

/// Parse a markup fragment. Top-level nodes become children of the
/// returned document's root.
pub fn parse_fragment(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}
