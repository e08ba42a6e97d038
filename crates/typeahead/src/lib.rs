//! typeahead - an autocomplete suggestion dropdown for text input fields.
//!
//! A [`SuggestionController`] is bound to one [`InputField`]. As the user
//! types, it looks up matching items from a [`SuggestionSource`] on a private
//! background worker and keeps the dropdown's visibility, rows and placement
//! up to date. A platform rendering adapter draws the dropdown from that state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use typeahead::prelude::*;
//!
//! let source = Arc::new(StringListSource::from(vec!["France", "Germany", "Georgia"]));
//! let field = MemoryField::new(Rect::new(0.0, 0.0, 240.0, 32.0));
//! let mut controller = SuggestionController::new(source, field).unwrap();
//!
//! controller.set_delegate(|row: usize| println!("picked row {row}"));
//!
//! controller.on_text_changed("Ger");
//! controller.wait_for_results(Duration::from_secs(5));
//! controller.on_row_selected(0).unwrap();
//!
//! assert_eq!(controller.field().text(), "Germany");
//! assert!(!controller.is_visible());
//! ```

pub mod controller;
pub mod dropdown;
mod error;
pub mod executor;
pub mod field;
pub mod geometry;
pub mod options;
pub mod prelude;
pub mod source;

pub use controller::{SuggestionController, Visibility};
pub use dropdown::{CellFont, Color, DropdownParent, DropdownState, DropdownStyle};
pub use error::{Result, SuggestError};
pub use executor::{SearchExecutor, SearchResponse};
pub use field::{ContainerId, InputField, MemoryField};
pub use geometry::{Point, Rect, Size};
pub use options::SuggestOptions;
pub use source::{
    CaseSensitivity, SelectionDelegate, StringListSource, SuggestionCell, SuggestionSource,
};

/// Target names for log filtering.
///
/// ```text
/// RUST_LOG=typeahead::controller=debug,typeahead_core=info
/// ```
pub mod targets {
    /// Controller state transitions.
    pub const CONTROLLER: &str = "typeahead::controller";
    /// Lookup submission and delivery.
    pub const EXECUTOR: &str = "typeahead::executor";
    /// Options loading.
    pub const OPTIONS: &str = "typeahead::options";
}
