//! # Rendering surface
//!
//! The live tree the user sees and edits directly. It is always a parse of
//! the stored document plus transient markers (hover/selection/editing
//! classes and the editable attribute); serializing it strips the markers,
//! so a clean surface serializes to what the store holds.
//!
//! Layout comes from the renderer through [`LayoutOracle`].

use crate::config::MarkerConfig;
use crate::formatting::TextRange;
use crate::geometry::{Rect, Viewport};
use crate::listeners::ListenerRegistry;
use crate::path::{compute_path, resolve_path, NodePath, PathError};
use sitedit_markup::{parse, Document, NodeId, ParseResult, SerializeOptions, Serializer};
use tracing::trace;

/// Page-space boxes of live nodes, unscrolled and at 100% zoom.
pub trait LayoutOracle {
    fn layout_box(&self, doc: &Document, node: NodeId) -> Option<Rect>;

    /// Box of a text range inside `node`, for the floating format toolbar.
    fn text_range_box(&self, doc: &Document, node: NodeId, range: TextRange) -> Option<Rect> {
        let _ = range;
        self.layout_box(doc, node)
    }
}

/// For headless use: nothing has a box.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl LayoutOracle for NoLayout {
    fn layout_box(&self, _doc: &Document, _node: NodeId) -> Option<Rect> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Hovered,
    Selected,
    Editing,
}

pub struct Surface {
    tree: Document,
    layout: Box<dyn LayoutOracle>,
    viewport: Viewport,
    listeners: ListenerRegistry,
    markers: MarkerConfig,
}

impl Surface {
    pub fn new(
        markup: &str,
        layout: Box<dyn LayoutOracle>,
        markers: MarkerConfig,
    ) -> ParseResult<Self> {
        Ok(Self {
            tree: parse(markup)?,
            layout,
            viewport: Viewport::default(),
            listeners: ListenerRegistry::new(),
            markers,
        })
    }

    /// Replace the whole tree. Every attached listener goes with the old one.
    pub fn load(&mut self, markup: &str) -> ParseResult<()> {
        self.tree = parse(markup)?;
        self.listeners.detach_all();
        trace!(bytes = markup.len(), "Surface reloaded");
        Ok(())
    }

    pub fn tree(&self) -> &Document {
        &self.tree
    }

    /// Direct access for in-place edits (typing, formatting).
    pub fn tree_mut(&mut self) -> &mut Document {
        &mut self.tree
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    fn serializer_options(&self) -> SerializeOptions {
        SerializeOptions::default()
            .skip_attribute(self.markers.editable_attribute.clone())
            .skip_class(self.markers.hovered.clone())
            .skip_class(self.markers.selected.clone())
            .skip_class(self.markers.editing.clone())
    }

    pub fn serialize(&self) -> String {
        Serializer::with_options(&self.tree, self.serializer_options()).document()
    }

    pub fn outer_markup(&self, node: NodeId) -> String {
        Serializer::with_options(&self.tree, self.serializer_options()).outer(node)
    }

    pub fn inner_markup(&self, node: NodeId) -> String {
        Serializer::with_options(&self.tree, self.serializer_options()).inner(node)
    }

    /// `class` without editor markers; `None` when nothing else is left.
    pub fn persisted_class(&self, node: NodeId) -> Option<String> {
        let marker_names = [
            &self.markers.hovered,
            &self.markers.selected,
            &self.markers.editing,
        ];
        let kept: Vec<&str> = self
            .tree
            .classes(node)
            .into_iter()
            .filter(|c| !marker_names.iter().any(|m| m.as_str() == *c))
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join(" "))
        }
    }

    pub fn resolve(&self, path: &NodePath) -> Result<NodeId, PathError> {
        resolve_path(&self.tree, path)
    }

    pub fn path_of(&self, node: NodeId) -> Result<NodePath, PathError> {
        compute_path(&self.tree, node)
    }

    /// Box of a live node in preview space.
    pub fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        self.layout
            .layout_box(&self.tree, node)
            .map(|rect| self.viewport.project(rect))
    }

    pub fn text_range_box(&self, node: NodeId, range: TextRange) -> Option<Rect> {
        self.layout
            .text_range_box(&self.tree, node, range)
            .map(|rect| self.viewport.project(rect))
    }

    fn marker_class(&self, marker: Marker) -> String {
        match marker {
            Marker::Hovered => self.markers.hovered.clone(),
            Marker::Selected => self.markers.selected.clone(),
            Marker::Editing => self.markers.editing.clone(),
        }
    }

    pub fn mark(&mut self, node: NodeId, marker: Marker) {
        let class = self.marker_class(marker);
        self.tree.add_class(node, &class);
    }

    pub fn unmark(&mut self, node: NodeId, marker: Marker) {
        let class = self.marker_class(marker);
        self.tree.remove_class(node, &class);
    }

    /// Remove a marker from every node.
    pub fn clear_marker(&mut self, marker: Marker) {
        let class = self.marker_class(marker);
        let marked: Vec<NodeId> = self
            .tree
            .descendants(self.tree.root())
            .filter(|&n| self.tree.has_class(n, &class))
            .collect();
        for node in marked {
            self.tree.remove_class(node, &class);
        }
    }

    pub fn marked(&self, marker: Marker) -> Vec<NodeId> {
        let class = self.marker_class(marker);
        self.tree
            .descendants(self.tree.root())
            .filter(|&n| self.tree.has_class(n, &class))
            .collect()
    }

    pub fn set_editable(&mut self, node: NodeId, editable: bool) {
        let attribute = self.markers.editable_attribute.clone();
        if editable {
            self.tree.set_attribute(node, &attribute, "true");
        } else {
            self.tree.remove_attribute(node, &attribute);
        }
    }

    /// Strip the editable flag from every node.
    pub fn clear_editable(&mut self) {
        let attribute = self.markers.editable_attribute.clone();
        let editable: Vec<NodeId> = self
            .tree
            .descendants(self.tree.root())
            .filter(|&n| self.tree.attribute(n, &attribute).is_some())
            .collect();
        for node in editable {
            self.tree.remove_attribute(node, &attribute);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.elements_with_id(id).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(markup: &str) -> Surface {
        Surface::new(markup, Box::new(NoLayout), MarkerConfig::default()).unwrap()
    }

    #[test]
    fn test_markers_never_reach_serialization() {
        let mut surface = surface(r#"<body><p id="a" class="lead">Hi</p></body>"#);
        let p = surface.find_by_id("a").unwrap();
        surface.mark(p, Marker::Hovered);
        surface.mark(p, Marker::Editing);
        surface.set_editable(p, true);
        assert_eq!(
            surface.tree().attribute(p, "class"),
            Some("lead hovered-element editing-element")
        );
        assert_eq!(surface.serialize(), r#"<body><p id="a" class="lead">Hi</p></body>"#);
        assert_eq!(surface.persisted_class(p).as_deref(), Some("lead"));
    }

    #[test]
    fn test_clear_marker_everywhere() {
        let mut surface = surface("<body><p>a</p><p>b</p></body>");
        let ps: Vec<NodeId> = surface.tree().child_elements(surface.tree().body().unwrap()).collect();
        for &p in &ps {
            surface.mark(p, Marker::Selected);
        }
        assert_eq!(surface.marked(Marker::Selected).len(), 2);
        surface.clear_marker(Marker::Selected);
        assert!(surface.marked(Marker::Selected).is_empty());
        assert_eq!(surface.serialize(), "<body><p>a</p><p>b</p></body>");
    }

    #[test]
    fn test_reload_detaches_listeners() {
        use crate::listeners::ListenerKind;
        let mut surface = surface("<body></body>");
        let _guard = surface.listeners().attach(&[ListenerKind::Click]);
        surface.load("<body><p>x</p></body>").unwrap();
        assert!(surface.listeners().attached().is_empty());
    }

    struct FixedLayout;

    impl LayoutOracle for FixedLayout {
        fn layout_box(&self, _doc: &Document, _node: NodeId) -> Option<Rect> {
            Some(Rect::new(100.0, 200.0, 50.0, 20.0))
        }
    }

    #[test]
    fn test_bounding_box_is_projected() {
        let mut surface =
            Surface::new("<body><p>x</p></body>", Box::new(FixedLayout), MarkerConfig::default())
                .unwrap();
        surface.viewport_mut().scroll_y = 100.0;
        surface.viewport_mut().zoom = 200;
        let p = surface.resolve(&"body > p:nth-of-type(1)".parse().unwrap()).unwrap();
        assert_eq!(surface.bounding_box(p), Some(Rect::new(200.0, 200.0, 100.0, 40.0)));
    }
}
