use crate::dom::{Document, NodeData, NodeId};
use crate::entities::{escape_attribute, escape_text};
use crate::parser::is_void_element;

/// What to leave out while serializing.
///
/// The editor uses this to keep its transient markers (hover classes,
/// `contenteditable`) out of anything that reaches the stored document.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Attributes dropped entirely.
    pub skip_attributes: Vec<String>,
    /// Class tokens dropped from `class`; an emptied `class` is dropped too.
    pub skip_classes: Vec<String>,
}

impl SerializeOptions {
    pub fn skip_attribute(mut self, name: impl Into<String>) -> Self {
        self.skip_attributes.push(name.into());
        self
    }

    pub fn skip_class(mut self, class: impl Into<String>) -> Self {
        self.skip_classes.push(class.into());
        self
    }
}

/// Converts a tree (or part of one) back to markup text.
pub struct Serializer<'a> {
    doc: &'a Document,
    options: SerializeOptions,
}

impl<'a> Serializer<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self::with_options(doc, SerializeOptions::default())
    }

    pub fn with_options(doc: &'a Document, options: SerializeOptions) -> Self {
        Self { doc, options }
    }

    /// The whole document.
    pub fn document(&self) -> String {
        self.inner(self.doc.root())
    }

    /// A node including its own tags.
    pub fn outer(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// A node's children only.
    pub fn inner(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(id, &mut out);
        out
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for &child in self.doc.children(id) {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.doc.data(id) {
            NodeData::Document => self.write_children(id, out),
            NodeData::Doctype(body) => {
                out.push_str("<!");
                out.push_str(body);
                out.push('>');
            }
            NodeData::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            NodeData::Text { content, raw } => {
                if *raw {
                    out.push_str(content);
                } else {
                    out.push_str(&escape_text(content));
                }
            }
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for attr in &element.attributes {
                    if self.options.skip_attributes.iter().any(|s| *s == attr.name) {
                        continue;
                    }
                    let value = match (&attr.value, attr.name.as_str()) {
                        (Some(value), "class") if !self.options.skip_classes.is_empty() => {
                            let kept: Vec<&str> = value
                                .split_whitespace()
                                .filter(|c| !self.options.skip_classes.iter().any(|s| s == c))
                                .collect();
                            let total = value.split_whitespace().count();
                            if kept.is_empty() && total > 0 {
                                continue;
                            }
                            // Untouched values keep their original spacing.
                            if kept.len() == total {
                                Some(value.clone())
                            } else {
                                Some(kept.join(" "))
                            }
                        }
                        (value, _) => value.clone(),
                    };

                    out.push(' ');
                    out.push_str(&attr.name);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&escape_attribute(&value));
                        out.push('"');
                    }
                }
                out.push('>');

                if is_void_element(&element.tag) {
                    return;
                }

                self.write_children(id, out);
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

pub fn serialize(doc: &Document) -> String {
    Serializer::new(doc).document()
}

pub fn outer_markup(doc: &Document, id: NodeId) -> String {
    Serializer::new(doc).outer(id)
}

pub fn inner_markup(doc: &Document, id: NodeId) -> String {
    Serializer::new(doc).inner(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_markers_are_stripped() {
        let doc = parse(
            r#"<p class="lead hovered-element" contenteditable="true" id="x">t</p>"#,
        )
        .unwrap();
        let options = SerializeOptions::default()
            .skip_attribute("contenteditable")
            .skip_class("hovered-element");
        assert_eq!(
            Serializer::with_options(&doc, options).document(),
            r#"<p class="lead" id="x">t</p>"#
        );
    }

    #[test]
    fn test_class_made_only_of_markers_disappears() {
        let doc = parse(r#"<p class="selected-element">t</p>"#).unwrap();
        let options = SerializeOptions::default().skip_class("selected-element");
        assert_eq!(Serializer::with_options(&doc, options).document(), "<p>t</p>");
    }

    #[test]
    fn test_unmarked_class_keeps_its_source_text() {
        let doc = parse("<p class=\"\">a</p><p class=\"text-lg\n  font-bold\">b</p>").unwrap();
        let options = SerializeOptions::default().skip_class("selected-element");
        assert_eq!(
            Serializer::with_options(&doc, options).document(),
            "<p class=\"\">a</p><p class=\"text-lg\n  font-bold\">b</p>"
        );
    }

    #[test]
    fn test_boolean_attributes_stay_bare() {
        let doc = parse("<input disabled type=checkbox>").unwrap();
        assert_eq!(serialize(&doc), r#"<input disabled type="checkbox">"#);
    }

    #[test]
    fn test_outer_and_inner() {
        let doc = parse("<section><h1>T</h1><p>b</p></section>").unwrap();
        let section = doc.child_elements(doc.root()).next().unwrap();
        assert_eq!(inner_markup(&doc, section), "<h1>T</h1><p>b</p>");
        assert_eq!(
            outer_markup(&doc, section),
            "<section><h1>T</h1><p>b</p></section>"
        );
    }
}
