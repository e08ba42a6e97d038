//! Binding to the host's text input field.
//!
//! The suggestion controller never talks to a toolkit widget directly. The
//! host wraps its text field in an [`InputField`] implementation, which lets
//! the controller read and replace the text and locate the field on screen.
//!
//! [`MemoryField`] is a self-contained implementation backed by plain data,
//! useful for headless hosts and tests.

use std::collections::HashMap;
use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::geometry::{Point, Rect};

/// Identifies a container view in the host's view hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

/// The host text field a suggestion controller is bound to.
pub trait InputField {
    /// The field's full current text.
    fn text(&self) -> String;

    /// Replace the field's text.
    fn set_text(&mut self, text: &str);

    /// The field's frame in its immediate parent's coordinate space.
    fn frame(&self) -> Rect;

    /// The field's frame translated into an ancestor container's coordinates.
    ///
    /// Returns `None` if `container` is not an ancestor of the field.
    fn frame_in(&self, container: ContainerId) -> Option<Rect> {
        let _ = container;
        None
    }
}

/// An [`InputField`] backed by plain data.
///
/// Ancestors are registered with the offset of the field's parent inside
/// them, which is all that is needed to translate the field's frame.
#[derive(Debug, Clone, Default)]
pub struct MemoryField {
    text: String,
    frame: Rect,
    ancestors: HashMap<ContainerId, Point>,
}

impl MemoryField {
    /// Create an empty field with the given frame.
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Set initial text using builder pattern.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Register an ancestor container in which the field's parent sits at `parent_origin`.
    pub fn with_ancestor(mut self, container: ContainerId, parent_origin: Point) -> Self {
        self.ancestors.insert(container, parent_origin);
        self
    }

    /// Move or resize the field.
    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

impl InputField for MemoryField {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn frame(&self) -> Rect {
        self.frame
    }

    fn frame_in(&self, container: ContainerId) -> Option<Rect> {
        self.ancestors
            .get(&container)
            .map(|origin| self.frame.offset(origin.x, origin.y))
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Length of `text` in user-perceived characters (extended grapheme clusters).
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// `text` with its last user-perceived character removed.
pub fn without_last_grapheme(text: &str) -> &str {
    match text.grapheme_indices(true).next_back() {
        Some((start, _)) => &text[..start],
        None => text,
    }
}

/// Apply a pending edit: replace the byte `range` of `text` with `replacement`.
///
/// The range is clamped to the text and both ends are snapped back to the
/// nearest char boundary, so a stale range from the host never panics.
pub fn apply_edit(text: &str, range: Range<usize>, replacement: &str) -> String {
    let end = floor_char_boundary(text, range.end.min(text.len()));
    let start = floor_char_boundary(text, range.start.min(end));

    let mut edited = String::with_capacity(text.len() - (end - start) + replacement.len());
    edited.push_str(&text[..start]);
    edited.push_str(replacement);
    edited.push_str(&text[end..]);
    edited
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
