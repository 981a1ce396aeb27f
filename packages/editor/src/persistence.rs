//! Contracts of the storage collaborators: page saves and image uploads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One save of one page. `version` is the store version that was saved,
/// echoed back through [`crate::Editor::report_save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub page_id: PageId,
    pub content: String,
    pub version: u64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Save request failed: {0}")]
    Transport(String),

    #[error("Save rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

pub trait PersistenceService {
    fn save(&self, request: &SaveRequest) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload response carried no URL")]
    MissingUrl,
}

/// Stores an uploaded image and returns a URL the page can reference.
pub trait AssetService {
    fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, AssetError>> + Send;
}
