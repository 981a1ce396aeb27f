//! # Sitedit Services
//!
//! HTTP implementations of the editor's collaborators.
//!
//! | Service                  | Request                                   | Response                 |
//! |--------------------------|-------------------------------------------|--------------------------|
//! | [`HttpRewriteService`]   | `{ fullHtml, elementCode, userRequest, model, creativity }` | `{ updatedCode }` or `{ error, details }` |
//! | [`HttpPersistenceService`] | `{ pageId, content }`                   | any 2xx                  |
//! | [`HttpAssetService`]     | raw bytes with their `content-type`       | `{ url }`                |
//!
//! Endpoints come from the `services` section of the editor config.

mod assets;
mod client;
mod persistence;
mod rewrite;

pub use assets::HttpAssetService;
pub use client::{ServiceError, Services, DEFAULT_TIMEOUT};
pub use persistence::HttpPersistenceService;
pub use rewrite::HttpRewriteService;
