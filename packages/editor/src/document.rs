//! # Document store
//!
//! The serialized markup string is the single source of truth. Every
//! committed change goes through [`apply_patch`]: parse a fresh tree,
//! resolve the path, run the mutator, serialize the whole tree back.
//! The live surface is never touched here.

use crate::errors::PatchError;
use crate::mutations::{MutationError, NodeMut};
use crate::path::{resolve_path, NodePath, PathError};
use sitedit_markup::{parse, serialize};
use std::sync::Arc;
use tracing::debug;

/// Result of a patch whose document parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    Applied(String),
    /// The path did not resolve; `document` is the input, unchanged.
    Unresolved { document: String, reason: PathError },
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied(_))
    }

    pub fn document(&self) -> &str {
        match self {
            PatchOutcome::Applied(document) | PatchOutcome::Unresolved { document, .. } => document,
        }
    }

    pub fn into_document(self) -> String {
        match self {
            PatchOutcome::Applied(document) | PatchOutcome::Unresolved { document, .. } => document,
        }
    }
}

/// Patch one node of `document`. Pure: equal inputs give equal outputs.
///
/// Either the whole mutation lands in the returned string or nothing does;
/// a failing mutator yields an error and no document.
pub fn apply_patch<F>(document: &str, path: &NodePath, mutate: F) -> Result<PatchOutcome, PatchError>
where
    F: FnOnce(&mut NodeMut<'_>) -> Result<(), MutationError>,
{
    let mut tree = parse(document)?;
    let node = match resolve_path(&tree, path) {
        Ok(node) => node,
        Err(reason) => {
            debug!(path = %path, %reason, "Patch target did not resolve");
            return Ok(PatchOutcome::Unresolved {
                document: document.to_string(),
                reason,
            });
        }
    };

    {
        let mut handle = NodeMut::new(&mut tree, node)?;
        mutate(&mut handle)?;
    }

    Ok(PatchOutcome::Applied(serialize(&tree)))
}

/// Structural equality of two documents. Falls back to byte equality when
/// either side does not parse.
pub fn is_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (parse(a), parse(b)) {
        (Ok(left), Ok(right)) => left.deep_eq(&right),
        _ => false,
    }
}

/// Holder of the live serialized document.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    markup: Arc<str>,
    version: u64,
}

impl DocumentStore {
    pub fn new(markup: impl Into<Arc<str>>) -> Self {
        Self {
            markup: markup.into(),
            version: 0,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.markup)
    }

    /// Bumped on every replacement, including undo and redo.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn replace(&mut self, markup: impl Into<Arc<str>>) {
        self.markup = markup.into();
        self.version += 1;
    }

    /// Patch the current document without storing the result.
    pub fn patch<F>(&self, path: &NodePath, mutate: F) -> Result<PatchOutcome, PatchError>
    where
        F: FnOnce(&mut NodeMut<'_>) -> Result<(), MutationError>,
    {
        apply_patch(&self.markup, path, mutate)
    }
}
