//! Tunable behavior of a suggestion controller.
//!
//! Options can be built in code or loaded from TOML or JSON. Missing keys
//! take their defaults:
//!
//! ```
//! use typeahead::SuggestOptions;
//!
//! let options = SuggestOptions::from_toml_str(
//!     r#"
//!     min_chars_to_show = 1
//!     max_visible_rows = 4
//!
//!     [style]
//!     border_width = 1.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.min_chars_to_show, 1);
//! assert_eq!(options.row_height, 44.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dropdown::DropdownStyle;
use crate::error::{Result, SuggestError};

/// Options recognized by [`SuggestionController::configure`](crate::SuggestionController::configure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    /// Suggestions are never shown for queries shorter than this, in
    /// user-perceived characters. Empty text always hides, even at zero.
    pub min_chars_to_show: usize,
    /// Maximum rows shown at once. Caps the dropdown height, not the result set.
    pub max_visible_rows: usize,
    /// Height of one row in logical pixels.
    pub row_height: f32,
    /// Keep searching and tracking state but never show the dropdown.
    pub suppress_display: bool,
    /// Border, background and row font.
    pub style: DropdownStyle,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_chars_to_show: 3,
            max_visible_rows: 2,
            row_height: 44.0,
            suppress_display: false,
            style: DropdownStyle::default(),
        }
    }
}

impl SuggestOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum query length using builder pattern.
    pub fn with_min_chars_to_show(mut self, min_chars: usize) -> Self {
        self.min_chars_to_show = min_chars;
        self
    }

    /// Set the row cap using builder pattern.
    pub fn with_max_visible_rows(mut self, max_rows: usize) -> Self {
        self.max_visible_rows = max_rows;
        self
    }

    /// Set the row height using builder pattern.
    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height;
        self
    }

    /// Set display suppression using builder pattern.
    pub fn with_suppress_display(mut self, suppress: bool) -> Self {
        self.suppress_display = suppress;
        self
    }

    /// Set the dropdown style using builder pattern.
    pub fn with_style(mut self, style: DropdownStyle) -> Self {
        self.style = style;
        self
    }

    /// Clamp values a dropdown cannot be laid out with.
    ///
    /// At least one row is always visible and the row height is a finite,
    /// non-negative number.
    pub fn normalized(mut self) -> Self {
        self.max_visible_rows = self.max_visible_rows.max(1);
        if !self.row_height.is_finite() || self.row_height < 0.0 {
            self.row_height = Self::default().row_height;
        }
        self
    }

    /// Parse options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: Self = toml::from_str(s)?;
        Ok(options.normalized())
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(s)?;
        Ok(options.normalized())
    }

    /// Read and parse a TOML options file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SuggestError::io(path, e))?;
        let options = Self::from_toml_str(&content)?;
        tracing::debug!(
            target: crate::targets::OPTIONS,
            path = %path.display(),
            min_chars = options.min_chars_to_show,
            max_rows = options.max_visible_rows,
            "loaded options"
        );
        Ok(options)
    }

    /// Render the options as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::dropdown::Color;

    #[test]
    fn test_defaults() {
        let options = SuggestOptions::default();
        assert_eq!(options.min_chars_to_show, 3);
        assert_eq!(options.max_visible_rows, 2);
        assert_eq!(options.row_height, 44.0);
        assert!(!options.suppress_display);
    }

    #[test]
    fn test_toml_missing_keys_take_defaults() {
        let options = SuggestOptions::from_toml_str("suppress_display = true").unwrap();
        assert!(options.suppress_display);
        assert_eq!(options.min_chars_to_show, 3);
        assert_eq!(options.style, DropdownStyle::default());
    }

    #[test]
    fn test_toml_style_table() {
        let options = SuggestOptions::from_toml_str(
            r#"
            [style]
            border_width = 1.5
            corner_radius = 6.0
            border_color = { r = 200, g = 200, b = 200 }

            [style.font]
            family = "Helvetica"
            size = 13.0
            "#,
        )
        .unwrap();

        assert_eq!(options.style.border_width, 1.5);
        assert_eq!(options.style.border_color, Color::from_rgb8(200, 200, 200));
        assert_eq!(options.style.background_color, Color::WHITE);
        assert_eq!(options.style.font.family, "Helvetica");
    }

    #[test]
    fn test_json() {
        let options =
            SuggestOptions::from_json_str(r#"{"min_chars_to_show": 1, "row_height": 32}"#)
                .unwrap();
        assert_eq!(options.min_chars_to_show, 1);
        assert_eq!(options.row_height, 32.0);
    }

    #[test]
    fn test_invalid_documents_are_errors() {
        assert!(matches!(
            SuggestOptions::from_toml_str("min_chars_to_show = \"three\""),
            Err(SuggestError::Toml(_))
        ));
        assert!(matches!(
            SuggestOptions::from_json_str("{"),
            Err(SuggestError::Json(_))
        ));
    }

    #[test]
    fn test_normalized() {
        let options = SuggestOptions::new()
            .with_max_visible_rows(0)
            .with_row_height(f32::NAN)
            .normalized();
        assert_eq!(options.max_visible_rows, 1);
        assert_eq!(options.row_height, 44.0);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_chars_to_show = 2\nmax_visible_rows = 5").unwrap();

        let options = SuggestOptions::load_toml(file.path()).unwrap();
        assert_eq!(options.min_chars_to_show, 2);
        assert_eq!(options.max_visible_rows, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        match SuggestOptions::load_toml(&missing) {
            Err(SuggestError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_toml_round_trip_preserves_style() {
        let options = SuggestOptions::new()
            .with_min_chars_to_show(1)
            .with_style(DropdownStyle::default().with_border(1.0, 4.0, Color::BLACK));
        let text = options.to_toml_string().unwrap();
        assert_eq!(SuggestOptions::from_toml_str(&text).unwrap(), options);
    }
}
