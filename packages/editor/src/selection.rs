//! Hover and selection state, and the overlay geometry derived from it.

use crate::geometry::{Point, Rect};
use crate::path::NodePath;
use crate::surface::Surface;
use serde::Serialize;

/// What the pointer is over and what the user picked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    hovered_path: Option<NodePath>,
    selected_path: Option<NodePath>,
    is_element_selected: bool,
    /// The rewrite instruction prompt is showing.
    is_prompt_open: bool,
    /// Last pointer position, for the floating tag indicator.
    pointer: Option<Point>,
    /// Where the selecting click landed; the prompt floats there.
    click_position: Option<Point>,
    /// Upload/link/close actions for a selected image are showing.
    image_action_open: bool,
    /// Ticket of the rewrite submitted for this selection, if any.
    rewrite_in_flight: Option<u64>,
}

impl SelectionState {
    pub fn hovered_path(&self) -> Option<&NodePath> {
        self.hovered_path.as_ref()
    }

    pub fn selected_path(&self) -> Option<&NodePath> {
        self.selected_path.as_ref()
    }

    pub fn is_element_selected(&self) -> bool {
        self.is_element_selected
    }

    pub fn is_prompt_open(&self) -> bool {
        self.is_prompt_open
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn click_position(&self) -> Option<Point> {
        self.click_position
    }

    pub fn is_image_action_open(&self) -> bool {
        self.image_action_open
    }

    pub fn rewrite_in_flight(&self) -> Option<u64> {
        self.rewrite_in_flight
    }

    /// Hover and selection updates are frozen while a decision is pending.
    pub fn is_locked(&self) -> bool {
        self.is_element_selected || self.is_prompt_open
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn hover(&mut self, path: NodePath, pointer: Point) {
        self.hovered_path = Some(path);
        self.pointer = Some(pointer);
    }

    pub(crate) fn clear_hover(&mut self) {
        self.hovered_path = None;
        self.pointer = None;
    }

    pub(crate) fn select(&mut self, path: NodePath, at: Option<Point>) {
        self.selected_path = Some(path);
        self.is_element_selected = true;
        self.click_position = at;
    }

    pub(crate) fn open_prompt(&mut self) {
        self.is_prompt_open = true;
    }

    pub(crate) fn open_image_actions(&mut self) {
        self.image_action_open = true;
    }

    pub(crate) fn close_image_actions(&mut self) {
        self.image_action_open = false;
    }

    pub(crate) fn set_rewrite_in_flight(&mut self, ticket: Option<u64>) {
        self.rewrite_in_flight = ticket;
    }

    /// Drop the selection and everything hanging off it; hover stays.
    pub(crate) fn deselect(&mut self) {
        self.selected_path = None;
        self.is_element_selected = false;
        self.is_prompt_open = false;
        self.click_position = None;
        self.image_action_open = false;
        self.rewrite_in_flight = None;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Boxes to draw over the preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    /// Padded box around the hovered element, in preview space.
    pub hover_box: Option<Rect>,
    /// Padded box around the selected element, in preview space.
    pub selection_box: Option<Rect>,
    pub label: Option<TagLabel>,
}

/// Tag name shown above the hovered element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagLabel {
    pub tag: String,
    /// Top-left corner of the label, above the hover box.
    pub position: Point,
}

/// Keeps the overlay in step with hover, selection, scroll and zoom.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    overlay: Overlay,
}

impl HighlightTracker {
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn clear(&mut self) {
        self.overlay = Overlay::default();
    }

    pub fn refresh(
        &mut self,
        surface: &Surface,
        selection: &SelectionState,
        padding: f64,
        label_offset: f64,
    ) {
        let live_box = |path: Option<&NodePath>| {
            let node = surface.resolve(path?).ok()?;
            Some((node, surface.bounding_box(node)?.inflate(padding)))
        };

        let hovered = live_box(selection.hovered_path());
        self.overlay = Overlay {
            hover_box: hovered.map(|(_, rect)| rect),
            selection_box: live_box(selection.selected_path()).map(|(_, rect)| rect),
            label: hovered.and_then(|(node, rect)| {
                Some(TagLabel {
                    tag: surface.tree().tag(node)?.to_string(),
                    position: Point::new(rect.x, rect.y + padding - label_offset),
                })
            }),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deselect_keeps_hover() {
        let mut state = SelectionState::default();
        state.hover(NodePath::id("a"), Point::new(1.0, 2.0));
        state.select(NodePath::id("a"), None);
        state.open_prompt();
        assert!(state.is_locked());
        state.deselect();
        assert!(!state.is_locked());
        assert_eq!(state.hovered_path(), Some(&NodePath::id("a")));
        state.clear();
        assert!(state.is_empty());
    }
}
