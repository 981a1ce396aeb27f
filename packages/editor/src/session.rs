//! # Inline edit sessions
//!
//! One element at a time is writable in direct-edit mode. The user types
//! and formats into the live surface; the element's content, class and
//! style are copied back into the document when the session commits
//! (focus lost, mode switched, another element clicked).
//!
//! Each formatting action is synced and pushed to history immediately so
//! it can be undone on its own. There is no discard path: every exit
//! commits, and a commit with no net change pushes nothing.

use crate::editor::Editor;
use crate::errors::EditorError;
use crate::formatting::{self, formats_at, text_len, FormatAction, TextFormats, TextRange};
use crate::geometry::Rect;
use crate::path::NodePath;
use crate::surface::Marker;
use serde::Serialize;
use sitedit_markup::NodeId;
use tracing::{debug, error, info};

/// Lifecycle of one session. `Committed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// Writable and marked, no text selection seen yet.
    Opened,
    /// The user has placed a caret or selection inside the element.
    Editing,
    Committed,
}

/// Where focus went when it left the editable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// The floating format toolbar; focus is handed back.
    Toolbar,
    /// Anywhere else; the session commits.
    Elsewhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Nothing was open.
    NoSession,
    /// Focus went back to the editable element.
    Refocused,
    /// The session ended; `changed` is whether the document moved.
    Committed { changed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Applied to the live selection and pushed to history.
    Applied,
    /// Held until a non-empty text selection exists.
    Queued,
}

/// The one element currently open for inline editing.
#[derive(Debug, Clone)]
pub struct EditSession {
    node: NodeId,
    /// Where the element lives in the document, captured at open.
    path: NodePath,
    phase: SessionPhase,
    /// Formats of the whole element when the session opened.
    initial_formats: TextFormats,
    /// Formats of the current selection.
    current_formats: TextFormats,
    selection: Option<TextRange>,
    toolbar: Option<Rect>,
    /// A format requested before there was anything to apply it to.
    queued: Option<FormatAction>,
}

impl EditSession {
    /// The writable element in the live surface.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn initial_formats(&self) -> &TextFormats {
        &self.initial_formats
    }

    pub fn current_formats(&self) -> &TextFormats {
        &self.current_formats
    }

    pub fn text_selection(&self) -> Option<TextRange> {
        self.selection
    }

    /// Where the format toolbar should float, in preview space.
    pub fn toolbar_box(&self) -> Option<Rect> {
        self.toolbar
    }

    pub fn queued_action(&self) -> Option<&FormatAction> {
        self.queued.as_ref()
    }
}

impl Editor {
    pub(crate) fn open_session(&mut self, node: NodeId) -> Result<&EditSession, EditorError> {
        let path = self.surface.path_of(node)?;

        self.surface.clear_editable();
        self.surface.clear_marker(Marker::Editing);
        self.surface.set_editable(node, true);
        self.surface.mark(node, Marker::Editing);

        let formats = formats_at(self.surface.tree(), node, None);
        info!(path = %path, "Edit session opened");
        Ok(&*self.session.insert(EditSession {
            node,
            path,
            phase: SessionPhase::Opened,
            initial_formats: formats.clone(),
            current_formats: formats,
            selection: None,
            toolbar: None,
            queued: None,
        }))
    }

    /// The user moved the text selection inside the editable element.
    pub fn select_text(&mut self, range: TextRange) -> Result<(), EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoEditSession)?;
        let node = session.node;
        let range = range.clamp(text_len(self.surface.tree(), node));

        session.selection = Some(range);
        session.phase = SessionPhase::Editing;
        session.current_formats = formats_at(self.surface.tree(), node, Some(range));
        session.toolbar = if range.is_empty() {
            None
        } else {
            self.surface.text_range_box(node, range)
        };

        if !range.is_empty() {
            if let Some(action) = session.queued.take() {
                debug!(?action, "Applying queued format action");
                self.apply_format(action)?;
            }
        }
        Ok(())
    }

    /// Replace the current text selection (or insert at the caret).
    pub fn input_text(&mut self, text: &str) -> Result<TextRange, EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoEditSession)?;
        let node = session.node;
        let range = session
            .selection
            .unwrap_or_else(|| TextRange::caret(text_len(self.surface.tree(), node)));

        let caret = formatting::replace_text(self.surface.tree_mut(), node, range, text);
        session.selection = Some(caret);
        session.phase = SessionPhase::Editing;
        session.toolbar = None;
        session.current_formats = formats_at(self.surface.tree(), node, Some(caret));
        Ok(caret)
    }

    pub fn apply_format(&mut self, action: FormatAction) -> Result<FormatOutcome, EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoEditSession)?;
        let node = session.node;
        let range = session.selection.unwrap_or_default();

        if action.needs_selection() && range.is_empty() {
            debug!(?action, "No text selected, queueing format action");
            session.queued = Some(action);
            return Ok(FormatOutcome::Queued);
        }

        formatting::apply(self.surface.tree_mut(), node, range, &action);
        session.phase = SessionPhase::Editing;
        session.current_formats = formats_at(self.surface.tree(), node, Some(range));

        self.sync_session(action.label())?;
        Ok(FormatOutcome::Applied)
    }

    pub fn focus_changed(&mut self, target: FocusTarget) -> FocusOutcome {
        if self.session.is_none() {
            return FocusOutcome::NoSession;
        }
        match target {
            FocusTarget::Toolbar => FocusOutcome::Refocused,
            FocusTarget::Elsewhere => FocusOutcome::Committed {
                changed: self.commit_session(),
            },
        }
    }

    /// Focus left the editable element for somewhere other than the toolbar.
    pub fn blur(&mut self) -> FocusOutcome {
        self.focus_changed(FocusTarget::Elsewhere)
    }

    /// Copy the session element back into the document.
    fn sync_session(&mut self, label: &str) -> Result<bool, EditorError> {
        let Some(session) = &self.session else {
            return Ok(false);
        };
        let node = session.node;
        let path = session.path.clone();

        let inner = self.surface.inner_markup(node);
        let class = self.surface.persisted_class(node);
        let style = self
            .surface
            .tree()
            .attribute(node, "style")
            .map(str::to_string);

        let outcome = self.store.patch(&path, |target| {
            target.set_inner_markup(&inner)?;
            // Same tokens: leave the stored attribute text alone.
            if class_tokens(target.attribute("class")) != class_tokens(class.as_deref()) {
                match &class {
                    Some(class) => target.set_attribute("class", class)?,
                    None => target.remove_attribute("class")?,
                }
            }
            match &style {
                Some(style) => target.set_attribute("style", style),
                None => target.remove_attribute("style"),
            }
        })?;
        Ok(self.commit_outcome(outcome, label))
    }

    /// End the session, if any. Returns whether the document changed.
    pub(crate) fn commit_session(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }

        let changed = match self.sync_session("Edit text") {
            Ok(changed) => changed,
            Err(e) => {
                error!(error = %e, "Edit session could not be committed");
                self.outbox.notify(crate::effects::Notification::failure(
                    crate::effects::FailureKind::InvariantViolation,
                    format!("Your edit could not be saved: {e}"),
                ));
                false
            }
        };

        if let Some(mut session) = self.session.take() {
            session.phase = SessionPhase::Committed;
            info!(path = %session.path, changed, "Edit session committed");
        }
        self.surface.clear_marker(Marker::Selected);
        self.selection.deselect();
        self.reload_surface();
        changed
    }
}

fn class_tokens(class: Option<&str>) -> Vec<&str> {
    class.map(|c| c.split_whitespace().collect()).unwrap_or_default()
}
