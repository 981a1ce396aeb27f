//! Markup tokenizer.
//!
//! Two logos lexers morph into each other: [`ContentToken`] runs between
//! tags and [`TagToken`] runs inside a start tag. Comments and raw-text
//! element bodies (`script`, `style`, ...) are scanned by hand from the
//! lexer remainder since they end on a delimiter rather than a pattern.

use crate::entities;
use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::ops::Range;

/// Elements whose body is not markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken<'src> {
    #[regex(r"<[a-zA-Z][^\s/>]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[a-zA-Z][^\s>]*[ \t\r\n]*>", close_tag_name)]
    TagClose(&'src str),

    #[token("<!--", comment_body)]
    Comment(&'src str),

    #[regex(r"<![a-zA-Z][^>]*>", |lex| { let s = lex.slice(); &s[2..s.len() - 1] })]
    Doctype(&'src str),

    #[regex(r"[^<]+")]
    Text(&'src str),

    /// A `<` that does not open anything is plain text.
    #[token("<")]
    Lt,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TagToken<'src> {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, strip_quotes)]
    #[regex(r"'[^']*'", strip_quotes)]
    Quoted(&'src str),

    #[regex(r#"[^\s"'=<>/`]+"#)]
    Name(&'src str),

    #[token("/")]
    Slash,
}

fn close_tag_name<'s>(lex: &mut Lexer<'s, ContentToken<'s>>) -> &'s str {
    let slice = lex.slice();
    slice[2..slice.len() - 1].trim_end()
}

fn comment_body<'s>(lex: &mut Lexer<'s, ContentToken<'s>>) -> &'s str {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            &rest[..end]
        }
        None => {
            // Unterminated comments swallow the rest of the input.
            lex.bump(rest.len());
            rest
        }
    }
}

fn strip_quotes<'s>(lex: &mut Lexer<'s, TagToken<'s>>) -> &'s str {
    let slice = lex.slice();
    &slice[1..slice.len() - 1]
}

/// A parsed attribute. `value` is `None` for bare boolean attributes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag(String),
    Text(&'src str),
    /// Body of a raw-text element, never entity-decoded.
    RawText(&'src str),
    Comment(&'src str),
    Doctype(&'src str),
}

pub type Spanned<'src> = (Token<'src>, Range<usize>);

/// Tokenize markup source into start/end tags, text, comments and doctypes.
pub fn tokenize(source: &str) -> ParseResult<Vec<Spanned<'_>>> {
    let mut tokens: Vec<Spanned<'_>> = Vec::new();
    let mut lex = ContentToken::lexer(source);

    while let Some(result) = lex.next() {
        let span = lex.span();
        match result {
            Ok(ContentToken::Text(_)) | Ok(ContentToken::Lt) | Err(()) => {
                push_text(&mut tokens, source, span);
            }
            Ok(ContentToken::Comment(body)) => {
                tokens.push((Token::Comment(body), span.start..lex.span().end));
            }
            Ok(ContentToken::Doctype(body)) => tokens.push((Token::Doctype(body), span)),
            Ok(ContentToken::TagClose(name)) => {
                tokens.push((Token::EndTag(name.to_ascii_lowercase()), span));
            }
            Ok(ContentToken::TagOpen(name)) => {
                let name = name.to_ascii_lowercase();
                let mut tag_lex = lex.morph::<TagToken>();
                let (attributes, self_closing) = read_attributes(&mut tag_lex, span.start, &name)?;
                let end = tag_lex.span().end;
                lex = tag_lex.morph();

                let raw = is_raw_text_element(&name) && !self_closing;
                tokens.push((
                    Token::StartTag {
                        name: name.clone(),
                        attributes,
                        self_closing,
                    },
                    span.start..end,
                ));

                if raw {
                    let rest = lex.remainder();
                    let len = find_close_tag(rest, &name).unwrap_or(rest.len());
                    if len > 0 {
                        tokens.push((Token::RawText(&rest[..len]), end..end + len));
                    }
                    lex.bump(len);
                }
            }
        }
    }

    Ok(tokens)
}

/// Append text, merging with a directly preceding text token.
fn push_text<'s>(tokens: &mut Vec<Spanned<'s>>, source: &'s str, span: Range<usize>) {
    if let Some((Token::Text(_), prev)) = tokens.last() {
        if prev.end == span.start {
            let start = prev.start;
            tokens.pop();
            tokens.push((Token::Text(&source[start..span.end]), start..span.end));
            return;
        }
    }
    tokens.push((Token::Text(&source[span.clone()]), span));
}

fn read_attributes<'s>(
    lex: &mut Lexer<'s, TagToken<'s>>,
    start: usize,
    tag: &str,
) -> ParseResult<(Vec<Attribute>, bool)> {
    let mut attributes: Vec<Attribute> = Vec::new();

    loop {
        let Some(result) = lex.next() else {
            return Err(ParseError::unexpected_eof(start, tag));
        };

        match result {
            Ok(TagToken::End) => return Ok((attributes, false)),
            Ok(TagToken::SelfClose) => return Ok((attributes, true)),
            Ok(TagToken::Name(name)) => {
                let name = name.to_ascii_lowercase();
                let value = if lex.remainder().trim_start().starts_with('=') {
                    // Consume the `=`.
                    lex.next();
                    Some(read_value(lex))
                } else {
                    None
                };

                // First occurrence wins, as in browsers.
                if !attributes.iter().any(|a| a.name == name) {
                    attributes.push(Attribute { name, value });
                }
            }
            // Stray quotes, slashes and equals signs are dropped.
            Ok(_) | Err(()) => {}
        }
    }
}

fn read_value<'s>(lex: &mut Lexer<'s, TagToken<'s>>) -> String {
    let rest = lex.remainder();
    let trimmed = rest.trim_start();

    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        if let Some(Ok(TagToken::Quoted(value))) = lex.next() {
            return entities::decode(value).into_owned();
        }
        return String::new();
    }

    let skipped = rest.len() - trimmed.len();
    let len = trimmed
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(trimmed.len());
    lex.bump(skipped + len);
    entities::decode(&trimmed[..len]).into_owned()
}

/// Byte offset of the `</tag` that closes a raw-text element.
fn find_close_tag(haystack: &str, tag: &str) -> Option<usize> {
    let needle = format!("</{}", tag);
    let lower = haystack.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(&needle) {
        let at = from + pos;
        let after = lower[at + needle.len()..].chars().next();
        match after {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
            None => return Some(at),
            _ => from = at + needle.len(),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_start_tag_with_mixed_attributes() {
        let tokens = kinds(r#"<A HREF='/x' data-id=7 hidden class="a b">"#);
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "a".to_string(),
                attributes: vec![
                    Attribute::new("href", "/x"),
                    Attribute::new("data-id", "7"),
                    Attribute {
                        name: "hidden".to_string(),
                        value: None
                    },
                    Attribute::new("class", "a b"),
                ],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn test_unquoted_value_keeps_slashes() {
        let tokens = kinds("<a href=/about/us>x</a>");
        match &tokens[0] {
            Token::StartTag { attributes, .. } => {
                assert_eq!(attributes[0].value.as_deref(), Some("/about/us"));
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn test_attribute_values_decode_references() {
        let tokens = kinds(r#"<a href="/s?a=1&amp;b=2" title='say "hi"' data-x=a&lt;b>"#);
        match &tokens[0] {
            Token::StartTag { attributes, .. } => {
                assert_eq!(attributes[0].value.as_deref(), Some("/s?a=1&b=2"));
                assert_eq!(attributes[1].value.as_deref(), Some("say \"hi\""));
                assert_eq!(attributes[2].value.as_deref(), Some("a<b"));
            }
            other => panic!("expected start tag, got {:?}", other),
        }
    }

    #[test]
    fn test_self_closing_and_close_tags() {
        let tokens = kinds("<br/><input disabled /></DIV >");
        assert!(matches!(&tokens[0], Token::StartTag { name, self_closing: true, .. } if name == "br"));
        assert!(matches!(&tokens[1], Token::StartTag { name, self_closing: true, attributes } if name == "input" && attributes.len() == 1));
        assert_eq!(tokens[2], Token::EndTag("div".to_string()));
    }

    #[test]
    fn test_stray_lt_merges_into_text() {
        let tokens = kinds("a < b");
        assert_eq!(tokens, vec![Token::Text("a < b")]);
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = kinds("<!DOCTYPE html><!-- <p>not a tag</p> -->");
        assert_eq!(tokens[0], Token::Doctype("DOCTYPE html"));
        assert_eq!(tokens[1], Token::Comment(" <p>not a tag</p> "));
    }

    #[test]
    fn test_script_body_is_raw() {
        let tokens = kinds("<script>if (a < b) { x = '</p>'; }</script>");
        assert_eq!(tokens[1], Token::RawText("if (a < b) { x = '</p>'; }"));
        assert_eq!(tokens[2], Token::EndTag("script".to_string()));
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        let err = tokenize("<p>ok</p><div class=\"x").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { pos: 9, .. }));
    }
}
