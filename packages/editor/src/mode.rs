//! # Interaction modes
//!
//! `view`, `pick` and `direct-edit` are mutually exclusive. Pick and
//! direct-edit are toggled independently from view; switching between them
//! commits any open edit, clears the selection and swaps the surface
//! listeners.
//!
//! | mode        | listeners              | click                              |
//! |-------------|------------------------|------------------------------------|
//! | view        | none                   | ignored                            |
//! | pick        | pointer over/out, click| toggle selection, open prompt      |
//! | direct-edit | click                  | open edit session / image actions  |

use crate::editor::Editor;
use crate::geometry::Point;
use crate::listeners::{AttachedListeners, ListenerKind, ListenerRegistry};
use crate::path::{editable_root, NodePath};
use crate::surface::Marker;
use serde::{Deserialize, Serialize};
use sitedit_markup::NodeId;
use std::fmt;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    #[default]
    View,
    Pick,
    DirectEdit,
}

impl InteractionMode {
    pub fn listener_kinds(self) -> &'static [ListenerKind] {
        match self {
            InteractionMode::View => &[],
            InteractionMode::Pick => &[
                ListenerKind::PointerOver,
                ListenerKind::PointerOut,
                ListenerKind::Click,
            ],
            InteractionMode::DirectEdit => &[ListenerKind::Click],
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InteractionMode::View => "view",
            InteractionMode::Pick => "pick",
            InteractionMode::DirectEdit => "direct-edit",
        })
    }
}

/// Current mode plus the listeners it owns.
#[derive(Debug, Default)]
pub struct ModeController {
    mode: InteractionMode,
    listeners: Option<AttachedListeners>,
}

impl ModeController {
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn listeners(&self) -> Option<&AttachedListeners> {
        self.listeners.as_ref()
    }

    /// Release the old mode's listeners and take the new mode's.
    pub fn enter(&mut self, mode: InteractionMode, registry: &ListenerRegistry) {
        self.listeners = None;
        self.mode = mode;
        self.reattach(registry);
    }

    /// Attach this mode's listeners again, e.g. to a reloaded surface.
    pub fn reattach(&mut self, registry: &ListenerRegistry) {
        self.listeners = None;
        let kinds = self.mode.listener_kinds();
        if !kinds.is_empty() {
            self.listeners = Some(registry.attach(kinds));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Not listening, or the click landed inside the open session.
    Ignored,
    /// Picked; the instruction prompt opens.
    Selected(NodePath),
    Deselected,
    /// A text element became writable.
    SessionOpened(NodePath),
    /// An image was clicked in direct-edit.
    ImageActions(NodePath),
}

impl Editor {
    pub fn toggle_pick(&mut self) -> InteractionMode {
        self.toggle(InteractionMode::Pick)
    }

    pub fn toggle_direct_edit(&mut self) -> InteractionMode {
        self.toggle(InteractionMode::DirectEdit)
    }

    pub fn exit_mode(&mut self) {
        self.switch_mode(InteractionMode::View);
    }

    fn toggle(&mut self, mode: InteractionMode) -> InteractionMode {
        let target = if self.modes.mode() == mode {
            InteractionMode::View
        } else {
            mode
        };
        self.switch_mode(target);
        self.modes.mode()
    }

    fn switch_mode(&mut self, target: InteractionMode) {
        let from = self.modes.mode();
        if from == target {
            return;
        }

        self.commit_session();
        if from == InteractionMode::DirectEdit && self.is_dirty() {
            self.save();
        }
        self.clear_selection();
        self.modes.enter(target, self.surface.listeners());
        self.refresh_overlay();
        info!(from = %from, to = %target, "Interaction mode changed");
    }

    fn listening(&self, kind: ListenerKind) -> bool {
        self.modes.listeners().is_some_and(|l| l.is_live()) && self.surface.listeners().is_attached(kind)
    }

    pub fn on_pointer_over(&mut self, target: NodeId, at: Point) -> bool {
        if !self.listening(ListenerKind::PointerOver) || self.selection.is_locked() {
            return false;
        }
        let path = match self.surface.path_of(target) {
            Ok(path) => path,
            Err(reason) => {
                trace!(%reason, "Hover target has no path");
                return false;
            }
        };
        self.surface.clear_marker(Marker::Hovered);
        self.surface.mark(target, Marker::Hovered);
        self.selection.hover(path, at);
        self.refresh_overlay();
        true
    }

    pub fn on_pointer_out(&mut self, target: NodeId) -> bool {
        if !self.listening(ListenerKind::PointerOut) || self.selection.is_locked() {
            return false;
        }
        self.surface.unmark(target, Marker::Hovered);
        let left_hovered = match (self.surface.path_of(target), self.selection.hovered_path()) {
            (Ok(path), Some(hovered)) => path == *hovered,
            _ => false,
        };
        if left_hovered {
            self.selection.clear_hover();
        }
        self.refresh_overlay();
        true
    }

    pub fn on_click(&mut self, target: NodeId, at: Point) -> ClickOutcome {
        if !self.listening(ListenerKind::Click) {
            return ClickOutcome::Ignored;
        }
        match self.modes.mode() {
            InteractionMode::View => ClickOutcome::Ignored,
            InteractionMode::Pick => self.pick_click(target, at),
            InteractionMode::DirectEdit => self.direct_edit_click(target, at),
        }
    }

    fn pick_click(&mut self, target: NodeId, at: Point) -> ClickOutcome {
        if self.selection.is_element_selected() {
            self.surface.clear_marker(Marker::Selected);
            self.selection.deselect();
            self.refresh_overlay();
            return ClickOutcome::Deselected;
        }

        let Ok(path) = self.surface.path_of(target) else {
            return ClickOutcome::Ignored;
        };
        self.surface.mark(target, Marker::Selected);
        self.selection.select(path.clone(), Some(at));
        self.selection.open_prompt();
        self.refresh_overlay();
        debug!(path = %path, "Element selected");
        ClickOutcome::Selected(path)
    }

    fn direct_edit_click(&mut self, target: NodeId, at: Point) -> ClickOutcome {
        let tree = self.surface.tree();
        if let Some(session) = &self.session {
            if target == session.node() || tree.is_ancestor_of(session.node(), target) {
                return ClickOutcome::Ignored;
            }
        }

        // Paths, not ids: committing the open session reloads the surface.
        let image = (tree.tag(target) == Some("img"))
            .then(|| self.surface.path_of(target).ok())
            .flatten();
        let root = editable_root(tree);
        let editable = std::iter::once(target)
            .chain(tree.ancestors(target))
            .take_while(|&n| n != root)
            .find(|&n| tree.tag(n).is_some_and(|tag| self.config.is_editable_tag(tag)))
            .and_then(|n| self.surface.path_of(n).ok());

        self.commit_session();
        self.surface.clear_marker(Marker::Selected);
        self.selection.deselect();

        if let Some(path) = image {
            let Ok(node) = self.surface.resolve(&path) else {
                return ClickOutcome::Ignored;
            };
            self.surface.mark(node, Marker::Selected);
            self.selection.select(path.clone(), Some(at));
            self.selection.open_image_actions();
            debug!(path = %path, "Image actions opened");
            return ClickOutcome::ImageActions(path);
        }

        let Some(path) = editable else {
            return ClickOutcome::Ignored;
        };
        let Ok(node) = self.surface.resolve(&path) else {
            return ClickOutcome::Ignored;
        };
        self.selection.select(path.clone(), Some(at));
        match self.open_session(node) {
            Ok(_) => ClickOutcome::SessionOpened(path),
            Err(e) => {
                debug!(error = %e, "Could not open edit session");
                self.selection.deselect();
                ClickOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_swaps_listeners() {
        let registry = ListenerRegistry::new();
        let mut modes = ModeController::default();
        modes.enter(InteractionMode::Pick, &registry);
        assert_eq!(registry.attached().len(), 3);
        modes.enter(InteractionMode::DirectEdit, &registry);
        assert_eq!(registry.attached(), vec![ListenerKind::Click]);
        modes.enter(InteractionMode::View, &registry);
        assert!(registry.attached().is_empty());
    }

    #[test]
    fn test_reattach_after_reload() {
        let registry = ListenerRegistry::new();
        let mut modes = ModeController::default();
        modes.enter(InteractionMode::Pick, &registry);
        registry.detach_all();
        assert!(!modes.listeners().unwrap().is_live());
        modes.reattach(&registry);
        assert!(modes.listeners().unwrap().is_live());
        assert!(registry.is_attached(ListenerKind::PointerOut));
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(
            serde_json::to_string(&InteractionMode::DirectEdit).unwrap(),
            r#""direct-edit""#
        );
    }
}
