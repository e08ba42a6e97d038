//! Data sources and selection delegates.
//!
//! A suggestion controller is wired to two narrow capability traits supplied
//! by the embedding application:
//!
//! - [`SuggestionSource`] answers lookups and renders items into rows.
//! - [`SelectionDelegate`] hears about the row the user picked.
//!
//! [`StringListSource`] is a ready-made source over a static list of strings.

use serde::{Deserialize, Serialize};

use crate::dropdown::CellFont;

// ============================================================================
// Case Sensitivity
// ============================================================================

/// Controls how prefix matching handles letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Case-sensitive matching (e.g., "Ger" won't match "germany").
    CaseSensitive,
    /// Case-insensitive matching (e.g., "ger" will match "Germany").
    #[default]
    CaseInsensitive,
}

// ============================================================================
// Suggestion Cell
// ============================================================================

/// A reusable row the data source renders an item into.
///
/// Sources only set the display text and, optionally, the font. Layout is
/// the rendering adapter's business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionCell {
    text: String,
    font: CellFont,
}

impl SuggestionCell {
    /// Create an empty cell with the default font.
    pub fn new() -> Self {
        Self::default()
    }

    /// The display text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the display text.
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    /// The row font.
    pub fn font(&self) -> &CellFont {
        &self.font
    }

    /// Set the row font.
    pub fn set_font(&mut self, font: CellFont) {
        self.font = font;
    }

    /// Clear the text and restore `font` before the cell is reused.
    pub(crate) fn reset(&mut self, font: &CellFont) {
        self.text.clear();
        if self.font != *font {
            self.font = font.clone();
        }
    }
}

// ============================================================================
// Suggestion Source
// ============================================================================

/// Supplies suggestions for a query and renders them.
///
/// `lookup` runs on the controller's background worker, never on the
/// interaction thread, so it may block on I/O or scan a large collection.
/// `render_item` runs on the interaction thread.
pub trait SuggestionSource: Send + Sync + 'static {
    /// The application's item type. Need not be text.
    type Item: Send + 'static;

    /// Write the display text (and optionally the font) of `item` into `cell`.
    fn render_item(&self, item: &Self::Item, cell: &mut SuggestionCell);

    /// Items matching `query`, in the order they should be listed.
    ///
    /// The conventional predicate is a case-insensitive "starts with".
    fn lookup(&self, query: &str) -> Vec<Self::Item>;
}

// ============================================================================
// Selection Delegate
// ============================================================================

/// Notified after the user picks a suggestion.
///
/// By the time `row_selected` is called the field already holds the picked
/// text and the dropdown is hidden.
pub trait SelectionDelegate {
    fn row_selected(&mut self, row_index: usize);
}

impl<F: FnMut(usize)> SelectionDelegate for F {
    fn row_selected(&mut self, row_index: usize) {
        self(row_index)
    }
}

// ============================================================================
// String List Source
// ============================================================================

/// A suggestion source backed by a static list of strings.
#[derive(Debug, Clone, Default)]
pub struct StringListSource {
    items: Vec<String>,
    case_sensitivity: CaseSensitivity,
    font: Option<CellFont>,
}

impl StringListSource {
    /// Create a new source with the given items.
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Set case sensitivity using builder pattern.
    pub fn with_case_sensitivity(mut self, sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = sensitivity;
        self
    }

    /// Render every row with `font` instead of the dropdown's default.
    pub fn with_font(mut self, font: CellFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Get a reference to the items.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Get the case sensitivity setting.
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    /// Items starting with `prefix`, in list order.
    pub fn matches(&self, prefix: &str) -> Vec<String> {
        match self.case_sensitivity {
            CaseSensitivity::CaseSensitive => self
                .items
                .iter()
                .filter(|item| item.starts_with(prefix))
                .cloned()
                .collect(),
            CaseSensitivity::CaseInsensitive => {
                let prefix_lower = prefix.to_lowercase();
                self.items
                    .iter()
                    .filter(|item| item.to_lowercase().starts_with(&prefix_lower))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl SuggestionSource for StringListSource {
    type Item = String;

    fn render_item(&self, item: &String, cell: &mut SuggestionCell) {
        cell.set_text(item);
        if let Some(font) = &self.font {
            cell.set_font(font.clone());
        }
    }

    fn lookup(&self, query: &str) -> Vec<String> {
        self.matches(query)
    }
}

impl From<Vec<String>> for StringListSource {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl From<Vec<&str>> for StringListSource {
    fn from(items: Vec<&str>) -> Self {
        Self::new(items.into_iter().map(String::from).collect())
    }
}

static_assertions::assert_impl_all!(StringListSource: SuggestionSource, Send, Sync);
