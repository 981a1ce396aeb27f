//! Arena-backed markup tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! Detached nodes stay in the arena; trees here are short-lived (one parse
//! per edit), so nothing is ever compacted.

use crate::tokenizer::Attribute;
use serde::{Deserialize, Serialize};

/// Index of a node inside one [`Document`]. Meaningless across documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    /// Decoded text. `raw` marks bodies of raw-text elements.
    Text { content: String, raw: bool },
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Element children only, in order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(|&c| self.is_element(c))
    }

    pub fn create_element(&mut self, tag: impl Into<String>, attributes: Vec<Attribute>) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.into().to_ascii_lowercase(),
            attributes,
        }))
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeData::Text {
            content: content.into(),
            raw: false,
        })
    }

    pub(crate) fn create(&mut self, data: NodeData) -> NodeId {
        self.push(data)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        if let Some(parent) = self.parent(reference) {
            let index = self.index_in_parent(reference).unwrap_or(0);
            self.insert_at(parent, index, child);
        }
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        if let Some(parent) = self.parent(reference) {
            let index = self.index_in_parent(reference).map(|i| i + 1).unwrap_or(0);
            self.insert_at(parent, index, child);
        }
    }

    /// Remove a node from its parent. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Put `replacement` where `old` is and detach `old`.
    pub fn replace(&mut self, old: NodeId, replacement: NodeId) {
        if old == replacement {
            return;
        }
        self.detach(replacement);
        if let Some(parent) = self.parent(old) {
            let index = self.index_in_parent(old).unwrap_or(0);
            self.nodes[parent.0].children[index] = replacement;
            self.nodes[replacement.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
        }
    }

    /// Replace an element by its own children.
    pub fn unwrap_node(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let mut index = self.index_in_parent(id).unwrap_or(0);
        for child in self.children(id).to_vec() {
            self.insert_at(parent, index, child);
            index += 1;
        }
        self.detach(id);
    }

    pub fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// True if `id` is reachable from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.root()
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.tag(n) == Some("body"))
    }

    pub fn elements_with_id<'a>(&'a self, value: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(self.root())
            .filter(move |&n| self.element(n).and_then(|e| e.attribute("id")) == Some(value))
    }

    /// The only element carrying `id="value"`, or `None` if absent or duplicated.
    pub fn unique_element_by_id(&self, value: &str) -> Option<NodeId> {
        let mut matches = self.elements_with_id(value);
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Concatenated decoded text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            if let NodeData::Text { content, .. } = self.data(n) {
                out.push_str(content);
            }
        }
        out
    }

    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&n| matches!(self.data(n), NodeData::Text { .. }))
            .collect()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].data {
            NodeData::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if let Some(element) = self.element_mut(id) {
            match element.attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = Some(value),
                None => element.attributes.push(Attribute {
                    name,
                    value: Some(value),
                }),
            }
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let before = element.attributes.len();
        element.attributes.retain(|a| a.name != name);
        element.attributes.len() != before
    }

    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attribute(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) || !self.is_element(id) {
            return;
        }
        let value = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", value);
    }

    /// Remove a class token; drops the attribute when nothing is left.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let remaining: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            self.remove_attribute(id, "class");
        } else {
            self.set_attribute(id, "class", remaining.join(" "));
        }
    }

    /// Deep-copy a subtree of `source` into this arena (detached).
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.push(source.data(node).clone());
        for &child in source.children(node) {
            let child_copy = self.import(source, child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// The sole element among the root's children, ignoring comments and
    /// whitespace-only text.
    pub fn single_root_element(&self) -> Option<NodeId> {
        let mut found = None;
        for &child in self.children(self.root()) {
            match self.data(child) {
                NodeData::Element(_) if found.is_none() => found = Some(child),
                NodeData::Element(_) => return None,
                NodeData::Text { content, .. } if content.trim().is_empty() => {}
                NodeData::Comment(_) => {}
                _ => return None,
            }
        }
        found
    }

    /// Structural equality of the two trees from their roots.
    pub fn deep_eq(&self, other: &Document) -> bool {
        self.subtree_eq(self.root(), other, other.root())
    }

    pub fn subtree_eq(&self, a: NodeId, other: &Document, b: NodeId) -> bool {
        if self.data(a) != other.data(b) {
            return false;
        }
        let left = self.children(a);
        let right = other.children(b);
        left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(&l, &r)| self.subtree_eq(l, other, r))
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
