//! # Node paths
//!
//! A [`NodePath`] addresses one element of a page structurally, so it
//! survives a reparse of the same markup where a [`NodeId`] would not.
//!
//! Two shapes:
//! - `Id` when the element carries an `id` that is unique in the page.
//! - `Steps` otherwise: `(tag, ordinal)` pairs from the editable root down,
//!   where the ordinal is 1-based and counts only element siblings with
//!   the same tag (like `:nth-of-type`).
//!
//! The editable root is `<body>` when the page has one, else the document
//! root itself.

use serde::{Deserialize, Serialize};
use sitedit_markup::{Document, NodeId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodePath {
    Id { id: String },
    Steps { steps: Vec<PathStep> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub tag: String,
    pub ordinal: usize,
}

impl PathStep {
    pub fn new(tag: impl Into<String>, ordinal: usize) -> Self {
        Self {
            tag: tag.into(),
            ordinal,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("No node at {0}")]
    NotFound(NodePath),

    #[error("Only elements can be addressed")]
    NotAnElement,

    #[error("Node is outside the editable root")]
    OutsideRoot,

    #[error("Malformed path: {0}")]
    Malformed(String),
}

impl NodePath {
    pub fn id(id: impl Into<String>) -> Self {
        NodePath::Id { id: id.into() }
    }

    pub fn steps(steps: Vec<PathStep>) -> Self {
        NodePath::Steps { steps }
    }

    /// Path of the editable root itself.
    pub fn root() -> Self {
        NodePath::Steps { steps: Vec::new() }
    }
}

/// `<body>` if present, else the document root.
pub fn editable_root(doc: &Document) -> NodeId {
    doc.body().unwrap_or_else(|| doc.root())
}

pub fn compute_path(doc: &Document, node: NodeId) -> Result<NodePath, PathError> {
    let element = doc.element(node).ok_or(PathError::NotAnElement)?;

    if let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) {
        if doc.unique_element_by_id(id) == Some(node) {
            return Ok(NodePath::id(id));
        }
    }

    let root = editable_root(doc);
    let mut steps = Vec::new();
    let mut current = node;
    while current != root {
        let parent = doc.parent(current).ok_or(PathError::OutsideRoot)?;
        let tag = doc.tag(current).ok_or(PathError::NotAnElement)?;
        let ordinal = doc
            .child_elements(parent)
            .filter(|&sibling| doc.tag(sibling) == Some(tag))
            .position(|sibling| sibling == current)
            .map(|i| i + 1)
            .ok_or(PathError::OutsideRoot)?;
        steps.push(PathStep::new(tag, ordinal));
        current = parent;
    }
    steps.reverse();
    Ok(NodePath::Steps { steps })
}

pub fn resolve_path(doc: &Document, path: &NodePath) -> Result<NodeId, PathError> {
    match path {
        NodePath::Id { id } => doc
            .elements_with_id(id)
            .next()
            .ok_or_else(|| PathError::NotFound(path.clone())),
        NodePath::Steps { steps } => {
            let mut current = editable_root(doc);
            for step in steps {
                if step.ordinal == 0 {
                    return Err(PathError::Malformed(format!(
                        "ordinal 0 for <{}>",
                        step.tag
                    )));
                }
                current = doc
                    .child_elements(current)
                    .filter(|&child| doc.tag(child) == Some(step.tag.as_str()))
                    .nth(step.ordinal - 1)
                    .ok_or_else(|| PathError::NotFound(path.clone()))?;
            }
            Ok(current)
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePath::Id { id } => write!(f, "#{id}"),
            NodePath::Steps { steps } => {
                f.write_str("body")?;
                for step in steps {
                    write!(f, " > {}:nth-of-type({})", step.tag, step.ordinal)?;
                }
                Ok(())
            }
        }
    }
}

/// Parses the [`Display`](fmt::Display) form back, so paths can be
/// written by hand in scripts.
impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() {
                return Err(PathError::Malformed(s.to_string()));
            }
            return Ok(NodePath::id(id));
        }

        let mut parts = s.split('>').map(str::trim);
        if parts.next() != Some("body") {
            return Err(PathError::Malformed(s.to_string()));
        }
        let steps = parts
            .map(|part| parse_step(part).ok_or_else(|| PathError::Malformed(part.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodePath::Steps { steps })
    }
}

fn parse_step(part: &str) -> Option<PathStep> {
    let (tag, rest) = part.split_once(":nth-of-type(")?;
    let ordinal = rest.strip_suffix(')')?.trim().parse().ok()?;
    if tag.is_empty() || ordinal == 0 {
        return None;
    }
    Some(PathStep::new(tag.to_ascii_lowercase(), ordinal))
}
