//! Dropdown view state and appearance.
//!
//! The dropdown itself is drawn by a platform-specific rendering adapter. This
//! module holds everything such an adapter needs to know: where the dropdown
//! sits, which container it is attached to, which rows are in view, and how
//! it should look.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::field::ContainerId;
use crate::geometry::Rect;

// ============================================================================
// Appearance
// ============================================================================

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    u8::MAX
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    /// The light grey used for grouped-list backgrounds.
    pub const GROUP_BACKGROUND: Self = Self::from_rgb8(239, 239, 244);

    /// Create an opaque color.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha channel.
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Font applied to a suggestion row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellFont {
    /// Font family name. `"system"` selects the platform UI font.
    pub family: String,
    /// Point size.
    pub size: f32,
}

impl CellFont {
    /// Create a font description.
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// The platform UI font at the given size.
    pub fn system(size: f32) -> Self {
        Self::new("system", size)
    }
}

impl Default for CellFont {
    fn default() -> Self {
        Self::system(15.0)
    }
}

/// Border and background of the dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownStyle {
    /// Border stroke width. Zero disables the border.
    pub border_width: f32,
    /// Corner radius of the dropdown frame.
    pub corner_radius: f32,
    pub border_color: Color,
    pub background_color: Color,
    /// Font rows start out with before the data source renders them.
    pub font: CellFont,
}

impl Default for DropdownStyle {
    fn default() -> Self {
        Self {
            border_width: 0.0,
            corner_radius: 0.0,
            border_color: Color::GROUP_BACKGROUND,
            background_color: Color::WHITE,
            font: CellFont::default(),
        }
    }
}

impl DropdownStyle {
    /// Set the border using builder pattern.
    pub fn with_border(mut self, width: f32, corner_radius: f32, color: Color) -> Self {
        self.border_width = width.max(0.0);
        self.corner_radius = corner_radius.max(0.0);
        self.border_color = color;
        self
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Which view the dropdown is attached to while visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownParent {
    /// The input field's immediate parent.
    #[default]
    FieldParent,
    /// An ancestor container, typically used to escape a parent that clips
    /// its children.
    Container(ContainerId),
}

/// Geometry and attachment state of the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownState {
    attached: bool,
    parent: DropdownParent,
    frame: Rect,
    scroll_offset: usize,
}

impl Default for DropdownState {
    fn default() -> Self {
        Self {
            attached: false,
            parent: DropdownParent::FieldParent,
            frame: Rect::ZERO,
            scroll_offset: 0,
        }
    }
}

impl DropdownState {
    /// Whether the dropdown is currently attached to its parent.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The container the dropdown attaches to.
    pub fn parent(&self) -> DropdownParent {
        self.parent
    }

    /// Frame in the parent container's coordinate space.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Index of the first row in view.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub(crate) fn set_parent(&mut self, parent: DropdownParent) {
        self.parent = parent;
    }

    pub(crate) fn attach(&mut self) {
        self.attached = true;
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
        self.scroll_offset = 0;
    }

    pub(crate) fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    /// Place the dropdown directly below `anchor`, matching its width.
    pub(crate) fn place_below(&mut self, anchor: Rect, height: f32) {
        self.frame = Rect::new(anchor.left(), anchor.bottom(), anchor.width(), height);
    }

    /// Rows in view, given the total row count and the row cap.
    pub fn visible_range(&self, row_count: usize, max_visible_rows: usize) -> Range<usize> {
        let start = self.scroll_offset.min(row_count);
        let end = (start + max_visible_rows).min(row_count);
        start..end
    }

    /// Scroll so that `row` is in view.
    pub(crate) fn ensure_row_visible(&mut self, row: usize, max_visible_rows: usize) {
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if max_visible_rows > 0 && row >= self.scroll_offset + max_visible_rows {
            self.scroll_offset = row + 1 - max_visible_rows;
        }
    }
}

/// Height of a dropdown showing `row_count` rows, capped at `max_visible_rows`.
pub fn dropdown_height(row_height: f32, row_count: usize, max_visible_rows: usize) -> f32 {
    row_height * row_count.min(max_visible_rows) as f32
}
