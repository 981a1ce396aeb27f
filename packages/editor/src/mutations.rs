//! # Node mutations
//!
//! Node-scoped edits used as the mutator of a document patch. Every edit
//! goes through a [`NodeMut`], a handle on one element of a freshly parsed
//! tree; the patch reserializes the whole tree afterwards.
//!
//! ## Semantics
//!
//! - `SetText` replaces all children with one text node (escaped on output)
//! - `SetInnerMarkup` replaces all children with parsed markup
//! - `ReplaceOuterMarkup` swaps the element for exactly one parsed element
//! - `WrapInLink` puts the element inside `<a href>`, or retargets the
//!   anchor that already encloses it
//!
//! Markup that does not parse fails the mutation, and with it the patch.

use serde::{Deserialize, Serialize};
use sitedit_markup::{parse_fragment, Attribute, Document, NodeId, ParseError};
use thiserror::Error;

/// Serializable form of a single edit, as recorded in replay scripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    SetText { text: String },

    SetInnerMarkup { markup: String },

    SetAttribute { name: String, value: String },

    RemoveAttribute { name: String },

    /// `None` or an empty value drops the attribute.
    SetClass { class: Option<String> },

    ReplaceOuterMarkup { markup: String },

    WrapInLink { href: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node is not an element")]
    NotAnElement,

    #[error("Invalid markup: {0}")]
    InvalidMarkup(#[from] ParseError),

    #[error("Replacement must be a single element, found {0}")]
    NotSingleElement(String),

    #[error("Node has no parent")]
    Detached,

    #[error("Invalid attribute name: {0:?}")]
    InvalidAttributeName(String),
}

impl Mutation {
    pub fn apply(&self, node: &mut NodeMut<'_>) -> Result<(), MutationError> {
        match self {
            Mutation::SetText { text } => node.set_text(text),
            Mutation::SetInnerMarkup { markup } => node.set_inner_markup(markup),
            Mutation::SetAttribute { name, value } => node.set_attribute(name, value),
            Mutation::RemoveAttribute { name } => node.remove_attribute(name),
            Mutation::SetClass { class } => match class.as_deref().map(str::trim) {
                Some(class) if !class.is_empty() => node.set_attribute("class", class),
                _ => node.remove_attribute("class"),
            },
            Mutation::ReplaceOuterMarkup { markup } => node.replace_outer_markup(markup),
            Mutation::WrapInLink { href } => node.wrap_in_link(href),
        }
    }

    /// Short human label, used for history entries.
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::SetText { .. } => "Set text",
            Mutation::SetInnerMarkup { .. } => "Set content",
            Mutation::SetAttribute { .. } => "Set attribute",
            Mutation::RemoveAttribute { .. } => "Remove attribute",
            Mutation::SetClass { .. } => "Set class",
            Mutation::ReplaceOuterMarkup { .. } => "Replace element",
            Mutation::WrapInLink { .. } => "Add link",
        }
    }
}

/// Mutable handle on one element of a document.
pub struct NodeMut<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> NodeMut<'a> {
    pub fn new(doc: &'a mut Document, node: NodeId) -> Result<Self, MutationError> {
        if !doc.is_element(node) {
            return Err(MutationError::NotAnElement);
        }
        Ok(Self { doc, node })
    }

    /// The element, which changes after [`replace_outer_markup`](Self::replace_outer_markup).
    pub fn id(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn tag(&self) -> &str {
        self.doc.tag(self.node).unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.doc.attribute(self.node, name)
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), MutationError> {
        self.doc.clear_children(self.node);
        if !text.is_empty() {
            let child = self.doc.create_text(text);
            self.doc.append(self.node, child);
        }
        Ok(())
    }

    pub fn set_inner_markup(&mut self, markup: &str) -> Result<(), MutationError> {
        let fragment = parse_fragment(markup)?;
        self.doc.clear_children(self.node);
        for &child in fragment.children(fragment.root()) {
            let copy = self.doc.import(&fragment, child);
            self.doc.append(self.node, copy);
        }
        Ok(())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), MutationError> {
        validate_attribute_name(name)?;
        self.doc.set_attribute(self.node, name, value);
        Ok(())
    }

    /// Removing an absent attribute is fine.
    pub fn remove_attribute(&mut self, name: &str) -> Result<(), MutationError> {
        self.doc.remove_attribute(self.node, &name.to_ascii_lowercase());
        Ok(())
    }

    pub fn replace_outer_markup(&mut self, markup: &str) -> Result<(), MutationError> {
        let fragment = parse_fragment(markup)?;
        let element = fragment
            .single_root_element()
            .ok_or_else(|| MutationError::NotSingleElement(summarize(markup)))?;
        if self.doc.parent(self.node).is_none() {
            return Err(MutationError::Detached);
        }
        let copy = self.doc.import(&fragment, element);
        self.doc.replace(self.node, copy);
        self.node = copy;
        Ok(())
    }

    pub fn wrap_in_link(&mut self, href: &str) -> Result<(), MutationError> {
        if let Some(anchor) = self.enclosing_anchor() {
            self.doc.set_attribute(anchor, "href", href);
            return Ok(());
        }
        if self.doc.parent(self.node).is_none() {
            return Err(MutationError::Detached);
        }
        let anchor = self
            .doc
            .create_element("a", vec![Attribute::new("href", href)]);
        self.doc.insert_before(self.node, anchor);
        self.doc.append(anchor, self.node);
        Ok(())
    }

    /// The nearest `<a>` ancestor, stopping at block-level containers.
    fn enclosing_anchor(&self) -> Option<NodeId> {
        self.doc
            .ancestors(self.node)
            .take_while(|&a| !matches!(self.doc.tag(a), Some("body" | "section" | "div" | "main")))
            .find(|&a| self.doc.tag(a) == Some("a"))
    }
}

fn validate_attribute_name(name: &str) -> Result<(), MutationError> {
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'));
    if valid {
        Ok(())
    } else {
        Err(MutationError::InvalidAttributeName(name.to_string()))
    }
}

fn summarize(markup: &str) -> String {
    let trimmed = markup.trim();
    match trimmed.char_indices().nth(40) {
        Some((i, _)) => format!("{}...", &trimmed[..i]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitedit_markup::{parse, serialize};

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.descendants(doc.root())
            .find(|&n| doc.tag(n) == Some(tag))
            .unwrap()
    }

    fn run(source: &str, tag: &str, mutation: Mutation) -> Result<String, MutationError> {
        let mut doc = parse(source).unwrap();
        let node = first(&doc, tag);
        let mut handle = NodeMut::new(&mut doc, node)?;
        mutation.apply(&mut handle)?;
        Ok(serialize(&doc))
    }

    #[test]
    fn test_set_text_is_escaped() {
        let out = run(
            "<p>old <b>bold</b></p>",
            "p",
            Mutation::SetText {
                text: "a < b & c".into(),
            },
        )
        .unwrap();
        assert_eq!(out, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_set_inner_markup() {
        let out = run(
            "<div><p>x</p></div>",
            "div",
            Mutation::SetInnerMarkup {
                markup: "<h2>T</h2>text".into(),
            },
        )
        .unwrap();
        assert_eq!(out, "<div><h2>T</h2>text</div>");
    }

    #[test]
    fn test_set_class_empty_removes_attribute() {
        let out = run(
            r#"<p class="a">x</p>"#,
            "p",
            Mutation::SetClass {
                class: Some("  ".into()),
            },
        )
        .unwrap();
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn test_replace_outer_markup_requires_one_element() {
        let err = run(
            "<div><p>x</p></div>",
            "p",
            Mutation::ReplaceOuterMarkup {
                markup: "<p>a</p><p>b</p>".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::NotSingleElement(_)));

        let out = run(
            "<div><p>x</p></div>",
            "p",
            Mutation::ReplaceOuterMarkup {
                markup: "\n  <!-- new --><h3 class=\"t\">y</h3>\n".into(),
            },
        )
        .unwrap();
        assert_eq!(out, r#"<div><h3 class="t">y</h3></div>"#);
    }

    #[test]
    fn test_wrap_in_link_then_retarget() {
        let out = run(
            r#"<div><img src="a.png"></div>"#,
            "img",
            Mutation::WrapInLink { href: "/one".into() },
        )
        .unwrap();
        assert_eq!(out, r#"<div><a href="/one"><img src="a.png"></a></div>"#);

        let out = run(&out, "img", Mutation::WrapInLink { href: "/two".into() }).unwrap();
        assert_eq!(out, r#"<div><a href="/two"><img src="a.png"></a></div>"#);
    }

    #[test]
    fn test_rejects_bad_attribute_names() {
        let err = run(
            "<p>x</p>",
            "p",
            Mutation::SetAttribute {
                name: "on click".into(),
                value: "x".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidAttributeName(_)));
    }

    #[test]
    fn test_serde_shape() {
        let mutation: Mutation =
            serde_json::from_str(r#"{"op":"setAttribute","name":"src","value":"b.png"}"#).unwrap();
        assert_eq!(
            mutation,
            Mutation::SetAttribute {
                name: "src".into(),
                value: "b.png".into()
            }
        );
    }
}
