//! Error types for the editor

use crate::mutations::MutationError;
use crate::path::PathError;
use crate::rewrite::RewriteError;
use sitedit_markup::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("No element is selected")]
    NothingSelected,

    #[error("A rewrite is already in flight for this selection")]
    RewriteInFlight,

    #[error("Instruction is empty")]
    EmptyInstruction,

    #[error("No edit session is open")]
    NoEditSession,

    #[error("Selected element is not an image")]
    NotAnImage,

    #[error("Not available in {0} mode")]
    WrongMode(crate::mode::InteractionMode),
}

impl From<PatchError> for EditorError {
    fn from(e: PatchError) -> Self {
        match e {
            PatchError::Parse(e) => EditorError::Parse(e),
            PatchError::Mutation(e) => EditorError::Mutation(e),
        }
    }
}

/// Failure of [`crate::apply_patch`]. A path that no longer resolves is not
/// an error; see [`crate::PatchOutcome::Unresolved`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Document does not parse: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
