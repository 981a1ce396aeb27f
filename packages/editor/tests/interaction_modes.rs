//! Mode switching, pick-mode selection, overlay geometry, keyboard and
//! page switching.

use sitedit_editor::{
    ClickOutcome, Document, Editor, EditorConfig, Effect, FailureKind, InteractionMode, Key,
    KeyEvent, KeyOutcome, LayoutOracle, ListenerKind, Mutation, NodeId, NodePath, PathStep,
    PersistenceError, Point, Rect, TagLabel,
};

fn editor(markup: &str) -> Editor {
    Editor::new("home", markup, EditorConfig::default()).unwrap()
}

fn nth_tag(editor: &Editor, tag: &str, n: usize) -> NodeId {
    let tree = editor.surface().tree();
    tree.descendants(tree.root())
        .filter(|&node| tree.tag(node) == Some(tag))
        .nth(n)
        .unwrap()
}

/// Every paragraph sits at the same page position.
struct ParagraphLayout;

impl LayoutOracle for ParagraphLayout {
    fn layout_box(&self, doc: &Document, node: NodeId) -> Option<Rect> {
        (doc.tag(node) == Some("p")).then(|| Rect::new(10.0, 20.0, 100.0, 30.0))
    }
}

#[test]
fn test_pick_selects_by_type_ordinal() {
    let mut editor = editor("<body><div><span>x</span><button>A</button><button>B</button></div></body>");
    assert_eq!(editor.toggle_pick(), InteractionMode::Pick);

    let second = nth_tag(&editor, "button", 1);
    let outcome = editor.on_click(second, Point::new(5.0, 5.0));

    let expected = NodePath::steps(vec![PathStep::new("div", 1), PathStep::new("button", 2)]);
    assert_eq!(outcome, ClickOutcome::Selected(expected.clone()));
    assert_eq!(
        expected.to_string(),
        "body > div:nth-of-type(1) > button:nth-of-type(2)"
    );
    assert!(editor.selection().is_element_selected());
    assert!(editor.selection().is_prompt_open());
    assert_eq!(editor.selection().click_position(), Some(Point::new(5.0, 5.0)));
}

#[test]
fn test_second_pick_click_deselects() {
    let mut editor = editor("<body><p>a</p><p>b</p></body>");
    editor.toggle_pick();

    let first = nth_tag(&editor, "p", 0);
    editor.on_click(first, Point::default());
    let second = nth_tag(&editor, "p", 1);
    assert_eq!(editor.on_click(second, Point::default()), ClickOutcome::Deselected);
    assert!(!editor.selection().is_element_selected());
    assert!(editor.surface().marked(sitedit_editor::Marker::Selected).is_empty());
}

#[test]
fn test_hover_is_frozen_while_selected() {
    let mut editor = editor("<body><p>a</p><p>b</p></body>");
    editor.toggle_pick();

    let first = nth_tag(&editor, "p", 0);
    let second = nth_tag(&editor, "p", 1);
    assert!(editor.on_pointer_over(first, Point::new(1.0, 1.0)));
    editor.on_click(first, Point::new(1.0, 1.0));

    assert!(!editor.on_pointer_over(second, Point::new(2.0, 2.0)));
    assert!(!editor.on_pointer_out(first));
    let hovered = editor.selection().hovered_path().cloned();
    assert_eq!(hovered, Some(NodePath::steps(vec![PathStep::new("p", 1)])));
}

#[test]
fn test_view_mode_has_no_listeners() {
    let mut editor = editor("<body><p>a</p></body>");
    let p = nth_tag(&editor, "p", 0);

    assert!(editor.surface().listeners().attached().is_empty());
    assert_eq!(editor.on_click(p, Point::default()), ClickOutcome::Ignored);
    assert!(!editor.on_pointer_over(p, Point::default()));
}

#[test]
fn test_exiting_a_mode_clears_selection_and_listeners() {
    let mut editor = editor("<body><p>a</p></body>");
    editor.toggle_pick();
    assert!(editor.surface().listeners().is_attached(ListenerKind::PointerOver));

    let p = nth_tag(&editor, "p", 0);
    editor.on_pointer_over(p, Point::default());
    editor.on_click(p, Point::default());

    editor.exit_mode();
    assert_eq!(editor.mode(), InteractionMode::View);
    assert!(editor.selection().is_empty());
    assert!(editor.surface().listeners().attached().is_empty());
    assert!(editor.surface().marked(sitedit_editor::Marker::Hovered).is_empty());
    assert_eq!(editor.document(), "<body><p>a</p></body>");
}

#[test]
fn test_pick_and_direct_edit_are_exclusive() {
    let mut editor = editor("<body><p>a</p></body>");
    editor.toggle_pick();
    let p = nth_tag(&editor, "p", 0);
    editor.on_click(p, Point::default());

    assert_eq!(editor.toggle_direct_edit(), InteractionMode::DirectEdit);
    assert!(editor.selection().is_empty());
    assert_eq!(
        editor.surface().listeners().attached(),
        vec![ListenerKind::Click]
    );

    // Toggling the active mode goes back to view
    assert_eq!(editor.toggle_direct_edit(), InteractionMode::View);
}

#[test]
fn test_listeners_survive_reload() {
    let mut editor = editor("<body><p>a</p></body>");
    editor.toggle_pick();

    let changed = editor
        .apply_mutation(
            &NodePath::steps(vec![PathStep::new("p", 1)]),
            &Mutation::SetText { text: "b".into() },
        )
        .unwrap();
    assert!(changed);
    assert_eq!(editor.surface().listeners().attached().len(), 3);

    let p = nth_tag(&editor, "p", 0);
    assert!(editor.on_pointer_over(p, Point::default()));
}

#[test]
fn test_overlay_follows_hover_scroll_and_zoom() {
    let mut editor = Editor::with_layout(
        "home",
        "<body><p>a</p></body>",
        EditorConfig::default(),
        Box::new(ParagraphLayout),
    )
    .unwrap();
    editor.toggle_pick();

    let p = nth_tag(&editor, "p", 0);
    editor.on_pointer_over(p, Point::new(15.0, 25.0));
    assert_eq!(editor.overlay().hover_box, Some(Rect::new(6.0, 16.0, 108.0, 38.0)));
    assert_eq!(
        editor.overlay().label,
        Some(TagLabel {
            tag: "p".into(),
            position: Point::new(6.0, 4.0),
        })
    );
    assert_eq!(editor.overlay().selection_box, None);

    editor.on_scroll(0.0, 20.0);
    assert_eq!(editor.overlay().hover_box, Some(Rect::new(6.0, -4.0, 108.0, 38.0)));

    assert_eq!(editor.zoom_in(), 110);
    assert_eq!(editor.zoom_out(), 100);
    for _ in 0..10 {
        editor.zoom_out();
    }
    assert_eq!(editor.zoom(), 50);

    editor.toggle_direct_edit();
    assert_eq!(editor.overlay(), &Default::default());
}

#[test]
fn test_escape_keeps_the_mode() {
    let mut editor = editor("<body><p>a</p></body>");
    editor.toggle_pick();
    let p = nth_tag(&editor, "p", 0);
    editor.on_click(p, Point::default());

    assert_eq!(editor.on_key(&KeyEvent::new(Key::Escape)), KeyOutcome::Handled);
    assert!(!editor.selection().is_element_selected());
    assert!(!editor.selection().is_prompt_open());
    assert_eq!(editor.mode(), InteractionMode::Pick);
    assert!(editor.surface().listeners().is_attached(ListenerKind::Click));

    assert_eq!(editor.on_key(&KeyEvent::new(Key::Escape)), KeyOutcome::Ignored);
}

#[test]
fn test_undo_redo_shortcuts() {
    let mut editor = editor("<body><p>a</p></body>");
    let path = NodePath::steps(vec![PathStep::new("p", 1)]);
    editor
        .apply_mutation(&path, &Mutation::SetText { text: "b".into() })
        .unwrap();

    assert_eq!(editor.on_key(&KeyEvent::ctrl('z')), KeyOutcome::Handled);
    assert_eq!(editor.document(), "<body><p>a</p></body>");
    assert_eq!(editor.on_key(&KeyEvent::meta('y')), KeyOutcome::Handled);
    assert_eq!(editor.document(), "<body><p>b</p></body>");
    assert_eq!(editor.on_key(&KeyEvent::ctrl('q')), KeyOutcome::Ignored);
}

#[test]
fn test_unresolved_mutation_is_a_notification() {
    let mut editor = editor("<body><p>a</p></body>");
    let changed = editor
        .apply_mutation(&NodePath::id("missing"), &Mutation::SetText { text: "b".into() })
        .unwrap();

    assert!(!changed);
    assert_eq!(editor.history().len(), 1);
    let effects = editor.take_effects();
    assert!(matches!(
        effects.as_slice(),
        [Effect::Notify(n)] if n.kind == Some(FailureKind::PathResolution)
    ));
}

#[test]
fn test_page_change_saves_and_resets() {
    let mut editor = editor("<body><p>a</p></body>");
    editor.toggle_pick();
    editor
        .apply_mutation(
            &NodePath::steps(vec![PathStep::new("p", 1)]),
            &Mutation::SetText { text: "b".into() },
        )
        .unwrap();

    editor
        .change_page("about", "<body><h1>About</h1></body>")
        .unwrap();

    let saves: Vec<_> = editor
        .take_effects()
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Save(request) => Some(request),
            Effect::Notify(_) => None,
        })
        .collect();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].page_id.as_str(), "home");
    assert_eq!(saves[0].content, "<body><p>b</p></body>");

    assert_eq!(editor.page().as_str(), "about");
    assert_eq!(editor.document(), "<body><h1>About</h1></body>");
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.mode(), InteractionMode::View);
    assert!(!editor.is_dirty());
    assert!(editor.surface().listeners().attached().is_empty());
}

#[test]
fn test_page_change_rejects_broken_markup() {
    let mut editor = editor("<body><p>a</p></body>");
    assert!(editor.change_page("broken", "<body><p").is_err());
    assert_eq!(editor.page().as_str(), "home");
    assert!(editor.take_effects().is_empty());
}

#[test]
fn test_failed_save_is_reported_and_marks_dirty() {
    let mut editor = editor("<body><p>a</p></body>");
    let request = editor.save();
    assert!(!editor.is_dirty());

    editor.report_save(
        request.version,
        Err(PersistenceError::Transport("offline".into())),
    );
    assert!(editor.is_dirty());
    let effects = editor.take_effects();
    assert!(matches!(effects.first(), Some(Effect::Save(_))));
    assert!(matches!(
        effects.last(),
        Some(Effect::Notify(n)) if n.kind == Some(FailureKind::Persistence)
    ));
}
