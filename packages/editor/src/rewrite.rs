//! # AI rewrite orchestration
//!
//! A rewrite replaces the selected element with markup produced by an
//! external service from a natural-language instruction. The network
//! round trip is the editor's only suspension point, so the flow is split
//! around it:
//!
//! ```text
//! begin_rewrite(instruction) ──▶ PendingRewrite ──▶ host awaits service
//!                                                        │
//!             RewriteOutcome ◀── finish_rewrite(pending, result)
//! ```
//!
//! The target is addressed by path, re-resolved when the response lands.
//! If the document moved on so that the path no longer resolves, the
//! response is dropped.

use crate::editor::Editor;
use crate::effects::{FailureKind, Notification};
use crate::errors::EditorError;
use crate::document::PatchOutcome;
use crate::path::NodePath;
use crate::persistence::PageId;
use serde::{Deserialize, Serialize};
use sitedit_markup::parse_fragment;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which model the rewrite service should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelTier {
    #[default]
    Standard,
    /// Slower and more capable.
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    /// The whole document, for context.
    pub full_document_markup: String,
    /// Outer markup of the selected element, markers stripped.
    pub target_element_markup: String,
    /// What the user asked for, in their own words.
    pub instruction: String,
    pub model_tier: ModelTier,
    /// Sampling temperature.
    pub creativity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    /// Replacement for the target element; `None` when the service had nothing.
    #[serde(default)]
    pub updated_element_markup: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// The request never got a readable answer.
    #[error("Rewrite request failed: {0}")]
    Transport(String),

    /// The service answered with an error.
    #[error("Rewrite service error: {message}")]
    Service {
        message: String,
        details: Option<String>,
    },

    /// The answer was not a single element.
    #[error("Rewrite returned no usable markup: {0}")]
    Unusable(String),
}

pub trait RewriteService {
    fn rewrite(
        &self,
        request: &RewriteRequest,
    ) -> impl Future<Output = Result<RewriteResponse, RewriteError>> + Send;
}

/// A submitted rewrite waiting on the service.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRewrite {
    /// Identifies this submission against the selection's in-flight slot.
    pub ticket: u64,
    /// Page the rewrite was asked for; another page drops the answer.
    pub page: PageId,
    /// Target, re-resolved when the answer lands.
    pub path: NodePath,
    pub request: RewriteRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RewriteOutcome {
    /// The element was replaced; `history_index` is the new entry.
    Applied { history_index: usize },
    /// The replacement is equivalent to what is already there.
    Unchanged,
    /// The target is gone (page switched or path no longer resolves).
    Dropped,
    /// Reported to the user; nothing changed.
    Failed(RewriteError),
}

/// Check replacement markup before it goes anywhere near the document.
pub fn validate_replacement(markup: &str) -> Result<&str, RewriteError> {
    let markup = markup.trim();
    if !markup.contains('<') || !markup.contains('>') {
        return Err(RewriteError::Unusable("response is not markup".to_string()));
    }
    let fragment =
        parse_fragment(markup).map_err(|e| RewriteError::Unusable(e.to_string()))?;
    if fragment.single_root_element().is_none() {
        return Err(RewriteError::Unusable(
            "response must be exactly one element".to_string(),
        ));
    }
    Ok(markup)
}

impl Editor {
    pub fn begin_rewrite(&mut self, instruction: &str) -> Result<PendingRewrite, EditorError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(EditorError::EmptyInstruction);
        }
        let path = self
            .selection
            .selected_path()
            .cloned()
            .ok_or(EditorError::NothingSelected)?;
        if self.selection.rewrite_in_flight().is_some() {
            return Err(EditorError::RewriteInFlight);
        }

        let node = self.surface.resolve(&path)?;
        let request = RewriteRequest {
            full_document_markup: self.store.markup().to_string(),
            target_element_markup: self.surface.outer_markup(node),
            instruction: instruction.to_string(),
            model_tier: self.config.rewrite.model_tier,
            creativity: self.config.rewrite.creativity,
        };

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.selection.set_rewrite_in_flight(Some(ticket));
        info!(ticket, path = %path, "Rewrite submitted");

        Ok(PendingRewrite {
            ticket,
            page: self.page.clone(),
            path,
            request,
        })
    }

    pub fn finish_rewrite(
        &mut self,
        pending: PendingRewrite,
        result: Result<RewriteResponse, RewriteError>,
    ) -> RewriteOutcome {
        if self.selection.rewrite_in_flight() == Some(pending.ticket) {
            self.selection.set_rewrite_in_flight(None);
        }
        if pending.page != self.page {
            debug!(ticket = pending.ticket, page = %pending.page, "Rewrite for another page dropped");
            return RewriteOutcome::Dropped;
        }

        let markup = result.and_then(|response| {
            let markup = response
                .updated_element_markup
                .ok_or_else(|| RewriteError::Unusable("response carried no markup".to_string()))?;
            let valid = validate_replacement(&markup)?.to_string();
            Ok(valid)
        });
        let markup = match markup {
            Ok(markup) => markup,
            Err(e) => return self.rewrite_failed(pending.ticket, e),
        };

        self.commit_session();
        let outcome = match self
            .store
            .patch(&pending.path, |node| node.replace_outer_markup(&markup))
        {
            Ok(outcome) => outcome,
            Err(e) => return self.rewrite_failed(pending.ticket, RewriteError::Unusable(e.to_string())),
        };

        if let PatchOutcome::Unresolved { reason, .. } = &outcome {
            warn!(ticket = pending.ticket, path = %pending.path, %reason, "Rewrite target is gone, dropping response");
            self.outbox.notify(Notification::failure(
                FailureKind::PathResolution,
                "The element changed before the rewrite arrived, so it was not applied",
            ));
            return RewriteOutcome::Dropped;
        }

        if !self.commit_outcome(outcome, "AI rewrite") {
            return RewriteOutcome::Unchanged;
        }
        self.reload_surface();
        self.clear_selection();

        let history_index = self.history.index();
        self.last_rewrite = Some(history_index);
        self.outbox
            .notify(Notification::info("Element updated. Undo to revert the rewrite."));
        info!(ticket = pending.ticket, history_index, "Rewrite applied");
        RewriteOutcome::Applied { history_index }
    }

    fn rewrite_failed(&mut self, ticket: u64, error: RewriteError) -> RewriteOutcome {
        warn!(ticket, error = %error, "Rewrite failed");
        self.outbox.notify(Notification::failure(
            FailureKind::RewriteService,
            error.to_string(),
        ));
        RewriteOutcome::Failed(error)
    }

    /// Submit, await and apply in one go.
    pub async fn request_rewrite<S: RewriteService>(
        &mut self,
        service: &S,
        instruction: &str,
    ) -> Result<RewriteOutcome, EditorError> {
        let pending = self.begin_rewrite(instruction)?;
        let result = service.rewrite(&pending.request).await;
        Ok(self.finish_rewrite(pending, result))
    }

    /// Undo the last rewrite, as long as nothing was stacked on top of it.
    pub fn undo_rewrite(&mut self) -> bool {
        self.commit_session();
        if self.last_rewrite != Some(self.history.index()) {
            return false;
        }
        self.last_rewrite = None;
        self.undo()
    }

    pub fn can_undo_rewrite(&self) -> bool {
        self.last_rewrite.is_some_and(|index| index == self.history.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_replacement() {
        assert_eq!(
            validate_replacement("\n <h2 class=\"x\">New</h2> \n"),
            Ok("<h2 class=\"x\">New</h2>")
        );
        assert!(validate_replacement("<!-- note --><p>ok</p>").is_ok());
        assert!(matches!(
            validate_replacement("just words"),
            Err(RewriteError::Unusable(_))
        ));
        assert!(matches!(
            validate_replacement("<p>a</p><p>b</p>"),
            Err(RewriteError::Unusable(_))
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let request = RewriteRequest {
            full_document_markup: "<body></body>".into(),
            target_element_markup: "<p>x</p>".into(),
            instruction: "shorter".into(),
            model_tier: ModelTier::Advanced,
            creativity: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetElementMarkup"], "<p>x</p>");
        assert_eq!(json["modelTier"], "advanced");

        let response: RewriteResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.updated_element_markup, None);
    }
}
