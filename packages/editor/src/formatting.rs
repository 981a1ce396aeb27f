//! # Inline formatting
//!
//! Text ranges are character offsets into the concatenated text of one
//! element. Bold, italic and underline are `b`/`i`/`u` wrappers around the
//! covered text; alignment and font size live in the element's `style`.
//!
//! Toggling is exact: unwrapping a format from part of a wrapper rewraps
//! whatever else the wrapper covered, so only the selected characters
//! change. [`normalize`] then tidies up the wrappers formatting produces;
//! other inline elements (icons, spans) are never pruned or merged.

use serde::{Deserialize, Serialize};
use sitedit_markup::{Attribute, Document, NodeData, NodeId};

pub const DEFAULT_FONT_SIZE: &str = "16px";

/// A `start..end` character range; `start == end` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Endpoints in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub alignment: Alignment,
    pub font_size: String,
}

impl Default for TextFormats {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            alignment: Alignment::Left,
            font_size: DEFAULT_FONT_SIZE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "camelCase")]
pub enum FormatAction {
    Bold,
    Italic,
    Underline,
    Align(Alignment),
    Size(String),
}

impl FormatAction {
    /// Actions that act on the selected text rather than the whole element.
    pub fn needs_selection(&self) -> bool {
        matches!(
            self,
            FormatAction::Bold | FormatAction::Italic | FormatAction::Underline
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormatAction::Bold => "Bold",
            FormatAction::Italic => "Italic",
            FormatAction::Underline => "Underline",
            FormatAction::Align(_) => "Align",
            FormatAction::Size(_) => "Font size",
        }
    }

    fn wrapper(&self) -> Option<Wrapper> {
        match self {
            FormatAction::Bold => Some(Wrapper::BOLD),
            FormatAction::Italic => Some(Wrapper::ITALIC),
            FormatAction::Underline => Some(Wrapper::UNDERLINE),
            _ => None,
        }
    }
}

/// An inline format expressed as a wrapping element.
#[derive(Debug, Clone, Copy)]
struct Wrapper {
    tag: &'static str,
    /// Tags that already count as this format.
    matches: &'static [&'static str],
}

impl Wrapper {
    const BOLD: Wrapper = Wrapper {
        tag: "b",
        matches: &["b", "strong"],
    };
    const ITALIC: Wrapper = Wrapper {
        tag: "i",
        matches: &["i", "em"],
    };
    const UNDERLINE: Wrapper = Wrapper {
        tag: "u",
        matches: &["u"],
    };

    fn is(&self, doc: &Document, node: NodeId) -> bool {
        doc.tag(node).is_some_and(|tag| self.matches.contains(&tag))
    }
}

/// Tags formatting creates. Only attribute-less ones are pruned or merged.
const FORMAT_TAGS: &[&str] = &["b", "i", "u"];

/// Text nodes under `node` with their character spans.
fn text_spans(doc: &Document, node: NodeId) -> Vec<(NodeId, usize, usize)> {
    let mut offset = 0;
    doc.text_nodes(node)
        .into_iter()
        .map(|text| {
            let len = doc.text(text).map_or(0, |t| t.chars().count());
            let span = (text, offset, offset + len);
            offset += len;
            span
        })
        .collect()
}

pub fn text_len(doc: &Document, node: NodeId) -> usize {
    text_spans(doc, node).last().map_or(0, |&(_, _, end)| end)
}

/// Text nodes the range covers, or for a caret the one it sits in.
fn covered_text(doc: &Document, node: NodeId, range: TextRange) -> Vec<NodeId> {
    let spans = text_spans(doc, node);
    if range.is_empty() {
        return spans
            .iter()
            .find(|&&(_, start, end)| range.start >= start && range.start <= end)
            .map(|&(text, ..)| vec![text])
            .unwrap_or_default();
    }
    spans
        .into_iter()
        .filter(|&(_, start, end)| start < range.end && end > range.start)
        .map(|(text, ..)| text)
        .collect()
}

/// Nearest ancestor of `text` inside `node` (exclusive) carrying the format.
fn wrapper_ancestor(doc: &Document, node: NodeId, text: NodeId, wrapper: Wrapper) -> Option<NodeId> {
    doc.ancestors(text)
        .take_while(|&a| a != node)
        .find(|&a| wrapper.is(doc, a))
}

/// Formatting state of `range` inside `node`. With no range, the start of
/// the element is probed.
pub fn formats_at(doc: &Document, node: NodeId, range: Option<TextRange>) -> TextFormats {
    let probes = covered_text(doc, node, range.unwrap_or_default());
    let all = |wrapper: Wrapper| {
        !probes.is_empty()
            && probes
                .iter()
                .all(|&t| wrapper_ancestor(doc, node, t, wrapper).is_some())
    };

    let alignment = std::iter::once(node)
        .chain(doc.ancestors(node))
        .find_map(|n| {
            doc.attribute(n, "style")
                .and_then(|style| style_property(style, "text-align"))
                .and_then(|value| Alignment::from_css(&value))
        })
        .unwrap_or_default();

    let size_origin = probes.first().copied().unwrap_or(node);
    let font_size = std::iter::once(size_origin)
        .chain(doc.ancestors(size_origin))
        .filter(|&n| doc.is_element(n))
        .find_map(|n| doc.attribute(n, "style").and_then(|s| style_property(s, "font-size")))
        .unwrap_or_else(|| DEFAULT_FONT_SIZE.to_string());

    TextFormats {
        bold: all(Wrapper::BOLD),
        italic: all(Wrapper::ITALIC),
        underline: all(Wrapper::UNDERLINE),
        alignment,
        font_size,
    }
}

/// Apply one action to `range` of `node`. Selection-based actions on an
/// empty range do nothing.
pub fn apply(doc: &mut Document, node: NodeId, range: TextRange, action: &FormatAction) {
    match action {
        FormatAction::Align(alignment) => {
            set_style(doc, node, "text-align", alignment.as_css());
        }
        FormatAction::Size(size) => {
            set_style(doc, node, "font-size", size.trim());
        }
        _ => {
            let Some(wrapper) = action.wrapper() else {
                return;
            };
            if range.is_empty() {
                return;
            }
            let preserved = empty_elements(doc, node);
            let segments = split_range(doc, node, range);
            if segments.is_empty() {
                return;
            }
            let active = segments
                .iter()
                .all(|&s| wrapper_ancestor(doc, node, s, wrapper).is_some());
            for &segment in &segments {
                if active {
                    unwrap_segment(doc, node, segment, wrapper);
                } else if wrapper_ancestor(doc, node, segment, wrapper).is_none() {
                    let element = doc.create_element(wrapper.tag, Vec::new());
                    doc.insert_before(segment, element);
                    doc.append(element, segment);
                }
            }
            normalize(doc, node, &preserved);
        }
    }
}

/// Split text nodes so that `range` is covered by whole nodes, and return
/// those nodes in order.
fn split_range(doc: &mut Document, node: NodeId, range: TextRange) -> Vec<NodeId> {
    let mut covered = Vec::new();
    for (text, start, end) in text_spans(doc, node) {
        if end <= range.start || start >= range.end || start == end {
            continue;
        }
        let local_start = range.start.saturating_sub(start);
        let local_end = range.end.min(end) - start;
        if local_end < end - start {
            split_text(doc, text, local_end);
        }
        let segment = if local_start > 0 {
            split_text(doc, text, local_start)
        } else {
            text
        };
        covered.push(segment);
    }
    covered
}

/// Split a text node at a character offset. The node keeps the head; the
/// tail is inserted after it and returned.
fn split_text(doc: &mut Document, text: NodeId, at: usize) -> NodeId {
    let content = doc.text(text).unwrap_or_default().to_string();
    let byte = content
        .char_indices()
        .nth(at)
        .map_or(content.len(), |(i, _)| i);
    let tail = doc.create_text(&content[byte..]);
    if let Some(head) = doc.text_mut(text) {
        head.truncate(byte);
    }
    doc.insert_after(text, tail);
    tail
}

/// Remove `wrapper` from one text segment only.
fn unwrap_segment(doc: &mut Document, node: NodeId, segment: NodeId, wrapper: Wrapper) {
    while let Some(outer) = wrapper_ancestor(doc, node, segment, wrapper) {
        // Chain from the wrapper's child down to the segment.
        let mut chain: Vec<NodeId> = doc
            .ancestors(segment)
            .take_while(|&a| a != outer)
            .collect();
        chain.reverse();
        chain.push(segment);

        let attributes = doc
            .element(outer)
            .map(|e| e.attributes.clone())
            .unwrap_or_default();
        let tag = doc.tag(outer).unwrap_or(wrapper.tag).to_string();

        let mut parent = outer;
        for &keep in &chain {
            for sibling in doc.children(parent).to_vec() {
                if sibling != keep {
                    rewrap(doc, sibling, &tag, &attributes);
                }
            }
            parent = keep;
        }
        doc.unwrap_node(outer);
    }
}

fn rewrap(doc: &mut Document, child: NodeId, tag: &str, attributes: &[Attribute]) {
    let element = doc.create_element(tag, attributes.to_vec());
    doc.insert_before(child, element);
    doc.append(element, child);
}

/// Replace `range` with `text` and return the caret after the insertion.
pub fn replace_text(doc: &mut Document, node: NodeId, range: TextRange, text: &str) -> TextRange {
    let range = range.clamp(text_len(doc, node));
    let inserted = text.chars().count();
    let preserved = empty_elements(doc, node);

    if range.is_empty() {
        match covered_text(doc, node, range).first() {
            Some(&target) => {
                let start = text_spans(doc, node)
                    .into_iter()
                    .find(|&(t, ..)| t == target)
                    .map_or(0, |(_, start, _)| start);
                if let Some(content) = doc.text_mut(target) {
                    let at = content
                        .char_indices()
                        .nth(range.start - start)
                        .map_or(content.len(), |(i, _)| i);
                    content.insert_str(at, text);
                }
            }
            None if !text.is_empty() => {
                let child = doc.create_text(text);
                doc.append(node, child);
            }
            None => {}
        }
    } else {
        let segments = split_range(doc, node, range);
        if let Some((&first, rest)) = segments.split_first() {
            if let Some(content) = doc.text_mut(first) {
                content.clear();
                content.push_str(text);
            }
            for &segment in rest {
                doc.detach(segment);
            }
        }
    }

    normalize(doc, node, &preserved);
    TextRange::caret(range.start + inserted)
}

/// Elements under `node` that have no children.
pub fn empty_elements(doc: &Document, node: NodeId) -> Vec<NodeId> {
    doc.descendants(node)
        .filter(|&n| n != node && doc.is_element(n) && doc.children(n).is_empty())
        .collect()
}

/// Merge adjacent text and adjacent identical format wrappers, and drop
/// empty text and format wrappers that an edit emptied, throughout `node`.
/// Elements listed in `preserved` were empty before the edit and stay.
pub fn normalize(doc: &mut Document, node: NodeId, preserved: &[NodeId]) {
    for child in doc.children(node).to_vec() {
        if doc.is_element(child) {
            normalize(doc, child, preserved);
        }
    }

    let mut i = 0;
    loop {
        let children = doc.children(node).to_vec();
        let Some(&current) = children.get(i) else {
            break;
        };

        let empty_text = matches!(doc.data(current), NodeData::Text { content, .. } if content.is_empty());
        let empty_wrapper = is_format_wrapper(doc, current)
            && doc.children(current).is_empty()
            && !preserved.contains(&current);
        if empty_text || empty_wrapper {
            doc.detach(current);
            // The neighbours are now adjacent.
            i = i.saturating_sub(1);
            continue;
        }

        if let Some(&next) = children.get(i + 1) {
            if merge_text(doc, current, next) {
                continue;
            }
            if same_wrapper(doc, current, next) {
                for grandchild in doc.children(next).to_vec() {
                    doc.append(current, grandchild);
                }
                doc.detach(next);
                normalize(doc, current, preserved);
                continue;
            }
        }
        i += 1;
    }
}

fn is_format_wrapper(doc: &Document, node: NodeId) -> bool {
    doc.element(node)
        .is_some_and(|e| e.attributes.is_empty() && FORMAT_TAGS.contains(&e.tag.as_str()))
}

fn merge_text(doc: &mut Document, current: NodeId, next: NodeId) -> bool {
    let tail = match (doc.data(current), doc.data(next)) {
        (NodeData::Text { raw: false, .. }, NodeData::Text { content, raw: false }) => content.clone(),
        _ => return false,
    };
    if let Some(content) = doc.text_mut(current) {
        content.push_str(&tail);
    }
    doc.detach(next);
    true
}

fn same_wrapper(doc: &Document, a: NodeId, b: NodeId) -> bool {
    is_format_wrapper(doc, a) && doc.element(a) == doc.element(b)
}

/// Value of one declaration in a `style` attribute.
pub fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim().to_string())
    })
}

/// `style` with one declaration set, others kept in order.
pub fn with_style_property(style: Option<&str>, property: &str, value: &str) -> String {
    let mut declarations: Vec<(String, String)> = style
        .unwrap_or_default()
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect();

    match declarations
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
    {
        Some(declaration) => declaration.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }

    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn set_style(doc: &mut Document, node: NodeId, property: &str, value: &str) {
    let style = with_style_property(doc.attribute(node, "style"), property, value);
    doc.set_attribute(node, "style", style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitedit_markup::{inner_markup, parse};

    fn paragraph(markup: &str) -> (Document, NodeId) {
        let doc = parse(markup).unwrap();
        let p = doc
            .descendants(doc.root())
            .find(|&n| doc.tag(n) == Some("p"))
            .unwrap();
        (doc, p)
    }

    #[test]
    fn test_bold_wraps_the_range() {
        let (mut doc, p) = paragraph("<p>Hello world</p>");
        apply(&mut doc, p, TextRange::new(6, 11), &FormatAction::Bold);
        assert_eq!(inner_markup(&doc, p), "Hello <b>world</b>");
        assert!(formats_at(&doc, p, Some(TextRange::new(6, 11))).bold);
        assert!(!formats_at(&doc, p, Some(TextRange::new(0, 11))).bold);
    }

    #[test]
    fn test_bold_toggle_restores_markup() {
        let (mut doc, p) = paragraph("<p>Hello world</p>");
        apply(&mut doc, p, TextRange::new(0, 5), &FormatAction::Bold);
        apply(&mut doc, p, TextRange::new(0, 5), &FormatAction::Bold);
        assert_eq!(inner_markup(&doc, p), "Hello world");
    }

    #[test]
    fn test_unwrap_part_of_a_wrapper() {
        let (mut doc, p) = paragraph("<p><b>abcdef</b></p>");
        apply(&mut doc, p, TextRange::new(2, 4), &FormatAction::Bold);
        assert_eq!(inner_markup(&doc, p), "<b>ab</b>cd<b>ef</b>");
    }

    #[test]
    fn test_unwrap_through_nested_formats() {
        let (mut doc, p) = paragraph("<p><b>x<i>yz</i></b></p>");
        apply(&mut doc, p, TextRange::new(2, 3), &FormatAction::Bold);
        assert_eq!(inner_markup(&doc, p), "<b>x</b><i><b>y</b>z</i>");
    }

    #[test]
    fn test_adjacent_wrappers_merge() {
        let (mut doc, p) = paragraph("<p>abcd</p>");
        apply(&mut doc, p, TextRange::new(0, 2), &FormatAction::Italic);
        apply(&mut doc, p, TextRange::new(2, 4), &FormatAction::Italic);
        assert_eq!(inner_markup(&doc, p), "<i>abcd</i>");
    }

    #[test]
    fn test_mixed_selection_applies_everywhere() {
        let (mut doc, p) = paragraph("<p><u>ab</u>cd</p>");
        apply(&mut doc, p, TextRange::new(0, 4), &FormatAction::Underline);
        assert_eq!(inner_markup(&doc, p), "<u>abcd</u>");
    }

    #[test]
    fn test_alignment_and_size_use_style() {
        let (mut doc, p) = paragraph(r#"<p style="color: red">x</p>"#);
        apply(&mut doc, p, TextRange::caret(0), &FormatAction::Align(Alignment::Center));
        apply(&mut doc, p, TextRange::caret(0), &FormatAction::Size("24px".into()));
        assert_eq!(
            doc.attribute(p, "style"),
            Some("color: red; text-align: center; font-size: 24px")
        );
        let formats = formats_at(&doc, p, None);
        assert_eq!(formats.alignment, Alignment::Center);
        assert_eq!(formats.font_size, "24px");
    }

    #[test]
    fn test_default_formats() {
        let (doc, p) = paragraph("<p>plain</p>");
        assert_eq!(formats_at(&doc, p, None), TextFormats::default());
    }

    #[test]
    fn test_replace_text_across_wrappers() {
        let (mut doc, p) = paragraph("<p>ab<b>cd</b>ef</p>");
        let caret = replace_text(&mut doc, p, TextRange::new(1, 5), "X");
        assert_eq!(inner_markup(&doc, p), "aXf");
        assert_eq!(caret, TextRange::caret(2));
    }

    #[test]
    fn test_typing_at_a_caret() {
        let (mut doc, p) = paragraph("<p>Hi</p>");
        let caret = replace_text(&mut doc, p, TextRange::caret(2), " there");
        assert_eq!(caret, TextRange::caret(8));
        assert_eq!(doc.text_content(p), "Hi there");

        let (mut doc, p) = paragraph("<p></p>");
        replace_text(&mut doc, p, TextRange::caret(0), "new");
        assert_eq!(inner_markup(&doc, p), "new");
    }

    #[test]
    fn test_empty_inline_elements_survive_edits() {
        let (mut doc, p) = paragraph(r#"<p><i class="fa fa-star"></i> Rated<span class="icon"></span></p>"#);
        replace_text(&mut doc, p, TextRange::caret(6), "!");
        apply(&mut doc, p, TextRange::new(1, 6), &FormatAction::Bold);
        assert_eq!(
            inner_markup(&doc, p),
            r#"<i class="fa fa-star"></i> <b>Rated</b>!<span class="icon"></span>"#
        );
    }

    #[test]
    fn test_only_format_wrappers_merge() {
        let (mut doc, p) = paragraph(r#"<p><span class="a">x</span><span class="a">y</span>z</p>"#);
        apply(&mut doc, p, TextRange::new(2, 3), &FormatAction::Bold);
        assert_eq!(
            inner_markup(&doc, p),
            r#"<span class="a">x</span><span class="a">y</span><b>z</b>"#
        );

        let (mut doc, p) = paragraph("<p><b></b>ab</p>");
        replace_text(&mut doc, p, TextRange::caret(2), "c");
        assert_eq!(inner_markup(&doc, p), "<b></b>abc");
    }

    #[test]
    fn test_multibyte_offsets() {
        let (mut doc, p) = paragraph("<p>héllo wörld</p>");
        apply(&mut doc, p, TextRange::new(6, 11), &FormatAction::Bold);
        assert_eq!(inner_markup(&doc, p), "héllo <b>wörld</b>");
    }

    #[test]
    fn test_style_helpers() {
        assert_eq!(style_property("a: 1; Font-Size : 2em", "font-size").as_deref(), Some("2em"));
        assert_eq!(with_style_property(None, "text-align", "right"), "text-align: right");
        assert_eq!(
            with_style_property(Some("text-align: left;"), "text-align", "right"),
            "text-align: right"
        );
    }
}
