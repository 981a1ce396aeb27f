//! # Editor
//!
//! Ties the store, history, surface and interaction state together.
//!
//! ```text
//! input ─▶ mode controller ─▶ selection / edit session
//!                                   │ commit
//!                                   ▼
//!                      DocumentStore::patch(path, mutate)
//!                                   │
//!                  History::push ◀──┴──▶ Surface::load ─▶ listeners reattached
//! ```
//!
//! Every write to the document goes through a patch; the surface is only
//! ever replaced wholesale from the stored markup.

use crate::config::EditorConfig;
use crate::document::{is_equivalent, DocumentStore, PatchOutcome};
use crate::effects::{Effect, FailureKind, Notification, Outbox};
use crate::errors::EditorError;
use crate::history::History;
use crate::mode::{InteractionMode, ModeController};
use crate::mutations::Mutation;
use crate::path::NodePath;
use crate::persistence::{PageId, PersistenceError, SaveRequest};
use crate::selection::{HighlightTracker, Overlay, SelectionState};
use crate::session::EditSession;
use crate::surface::{LayoutOracle, Marker, NoLayout, Surface};
use sitedit_markup::parse;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) page: PageId,
    pub(crate) store: DocumentStore,
    pub(crate) history: History,
    pub(crate) surface: Surface,
    pub(crate) modes: ModeController,
    pub(crate) selection: SelectionState,
    pub(crate) highlight: HighlightTracker,
    pub(crate) session: Option<EditSession>,
    pub(crate) outbox: Outbox,
    /// Store version of the last save sent, `None` when unsaved.
    pub(crate) saved_version: Option<u64>,
    pub(crate) next_ticket: u64,
    /// History index produced by the last applied rewrite.
    pub(crate) last_rewrite: Option<usize>,
}

impl Editor {
    pub fn new(
        page: impl Into<PageId>,
        document: &str,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        Self::with_layout(page, document, config, Box::new(NoLayout))
    }

    pub fn with_layout(
        page: impl Into<PageId>,
        document: &str,
        config: EditorConfig,
        layout: Box<dyn LayoutOracle>,
    ) -> Result<Self, EditorError> {
        let mut surface = Surface::new(document, layout, config.markers.clone())?;
        surface.viewport_mut().zoom = config
            .zoom
            .initial
            .clamp(config.zoom.min, config.zoom.max.max(config.zoom.min));

        let document: Arc<str> = Arc::from(document);
        let page = page.into();
        info!(page = %page, bytes = document.len(), "Editor opened");

        Ok(Self {
            store: DocumentStore::new(Arc::clone(&document)),
            history: History::with_max_levels(document, config.history_limit),
            config,
            page,
            surface,
            modes: ModeController::default(),
            selection: SelectionState::default(),
            highlight: HighlightTracker::default(),
            session: None,
            outbox: Outbox::default(),
            saved_version: Some(0),
            next_ticket: 1,
            last_rewrite: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn page(&self) -> &PageId {
        &self.page
    }

    /// The live serialized document.
    pub fn document(&self) -> &str {
        self.store.markup()
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn overlay(&self) -> &Overlay {
        self.highlight.overlay()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when the document changed since the last save was sent.
    pub fn is_dirty(&self) -> bool {
        self.saved_version != Some(self.store.version())
    }

    pub fn pending_effects(&self) -> &[Effect] {
        self.outbox.pending()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.outbox.take()
    }

    /// Apply one mutation to the node at `path` as its own history entry.
    ///
    /// Returns whether the document changed. A path that no longer
    /// resolves is reported as a notification, not an error.
    pub fn apply_mutation(
        &mut self,
        path: &NodePath,
        mutation: &Mutation,
    ) -> Result<bool, EditorError> {
        self.commit_session();
        let outcome = self.store.patch(path, |node| mutation.apply(node))?;
        let changed = self.commit_outcome(outcome, mutation.label());
        if changed {
            self.reload_surface();
        }
        Ok(changed)
    }

    /// Store a patch result and push it to history, unless the path did
    /// not resolve or nothing actually changed.
    pub(crate) fn commit_outcome(&mut self, outcome: PatchOutcome, label: &str) -> bool {
        match outcome {
            PatchOutcome::Unresolved { reason, .. } => {
                self.outbox.notify(Notification::failure(
                    FailureKind::PathResolution,
                    format!("The element changed before the edit could be applied ({reason})"),
                ));
                false
            }
            PatchOutcome::Applied(document) => {
                if is_equivalent(&document, self.store.markup()) {
                    debug!(label, "Patch left the document unchanged");
                    return false;
                }
                let document: Arc<str> = document.into();
                self.store.replace(Arc::clone(&document));
                self.history.push_labeled(document, label);
                debug!(
                    label,
                    index = self.history.index(),
                    len = self.history.len(),
                    "Document committed"
                );
                true
            }
        }
    }

    /// Rebuild the surface from the store and restore what survives.
    pub(crate) fn reload_surface(&mut self) {
        if let Err(e) = self.surface.load(self.store.markup()) {
            error!(error = %e, "Stored document failed to parse");
            self.outbox.notify(Notification::failure(
                FailureKind::InvariantViolation,
                format!("The page could not be reloaded: {e}"),
            ));
        }
        self.after_reload();
    }

    fn after_reload(&mut self) {
        self.modes.reattach(self.surface.listeners());

        if let Some(path) = self.selection.selected_path().cloned() {
            match self.surface.resolve(&path) {
                Ok(node) => self.surface.mark(node, Marker::Selected),
                Err(_) => {
                    debug!(path = %path, "Selection no longer resolves, clearing");
                    self.selection.deselect();
                }
            }
        }
        if let Some(path) = self.selection.hovered_path().cloned() {
            match self.surface.resolve(&path) {
                Ok(node) => self.surface.mark(node, Marker::Hovered),
                Err(_) => self.selection.clear_hover(),
            }
        }
        self.refresh_overlay();
    }

    pub(crate) fn refresh_overlay(&mut self) {
        if self.modes.mode() == InteractionMode::Pick {
            self.highlight.refresh(
                &self.surface,
                &self.selection,
                self.config.highlight_padding,
                self.config.label_offset,
            );
        } else {
            self.highlight.clear();
        }
    }

    /// Remove selection and hover, markers included.
    pub(crate) fn clear_selection(&mut self) {
        self.surface.clear_marker(Marker::Hovered);
        self.surface.clear_marker(Marker::Selected);
        self.selection.clear();
        self.refresh_overlay();
    }

    pub fn undo(&mut self) -> bool {
        self.commit_session();
        if self.history.undo().is_none() {
            return false;
        }
        self.restore_from_history("Undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        self.commit_session();
        if self.history.redo().is_none() {
            return false;
        }
        self.restore_from_history("Redo");
        true
    }

    fn restore_from_history(&mut self, action: &str) {
        self.store.replace(self.history.current_shared());
        self.reload_surface();
        info!(
            action,
            index = self.history.index(),
            len = self.history.len(),
            "History moved"
        );
    }

    /// Queue a save of the current document.
    pub fn save(&mut self) -> SaveRequest {
        self.commit_session();
        let request = SaveRequest {
            page_id: self.page.clone(),
            content: self.store.markup().to_string(),
            version: self.store.version(),
        };
        self.saved_version = Some(request.version);
        self.outbox.push(Effect::Save(request.clone()));
        debug!(page = %self.page, version = request.version, "Save queued");
        request
    }

    /// Outcome of a save the host performed. Failures are surfaced, never
    /// fatal; the in-memory document stays authoritative.
    pub fn report_save(&mut self, version: u64, result: Result<(), PersistenceError>) {
        match result {
            Ok(()) => debug!(page = %self.page, version, "Save acknowledged"),
            Err(e) => {
                error!(page = %self.page, version, error = %e, "Save failed");
                if self.saved_version == Some(version) {
                    self.saved_version = None;
                }
                self.outbox.notify(Notification::failure(
                    FailureKind::Persistence,
                    format!("Saving the page failed: {e}"),
                ));
            }
        }
    }

    /// Switch to another page: save this one, then start over.
    pub fn change_page(
        &mut self,
        page: impl Into<PageId>,
        document: &str,
    ) -> Result<(), EditorError> {
        parse(document)?;
        self.save();

        self.session = None;
        self.selection.clear();
        self.modes.enter(InteractionMode::View, self.surface.listeners());
        self.last_rewrite = None;

        let document: Arc<str> = Arc::from(document);
        self.page = page.into();
        self.store.replace(Arc::clone(&document));
        self.history.reset(document);
        self.saved_version = Some(self.store.version());
        self.reload_surface();
        info!(page = %self.page, "Page changed");
        Ok(())
    }

    pub fn on_scroll(&mut self, x: f64, y: f64) {
        let viewport = self.surface.viewport_mut();
        viewport.scroll_x = x;
        viewport.scroll_y = y;
        self.refresh_overlay();
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        let viewport = self.surface.viewport_mut();
        viewport.width = width;
        viewport.height = height;
        self.refresh_overlay();
    }

    pub fn zoom(&self) -> u16 {
        self.surface.viewport().zoom
    }

    pub fn zoom_in(&mut self) -> u16 {
        self.step_zoom(i32::from(self.config.zoom.step))
    }

    pub fn zoom_out(&mut self) -> u16 {
        self.step_zoom(-i32::from(self.config.zoom.step))
    }

    fn step_zoom(&mut self, delta: i32) -> u16 {
        let (min, max) = (self.config.zoom.min, self.config.zoom.max.max(self.config.zoom.min));
        if self.surface.viewport_mut().step_zoom(delta, min, max) {
            self.refresh_overlay();
        }
        self.zoom()
    }
}
