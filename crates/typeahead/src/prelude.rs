//! Prelude module for typeahead.
//!
//! ```
//! use typeahead::prelude::*;
//! ```
//!
//! Brings in the controller, the capability traits a host implements, and
//! the value types needed to configure and lay out the dropdown.

// ============================================================================
// Controller
// ============================================================================

pub use crate::controller::{SuggestionController, Visibility};
pub use crate::options::SuggestOptions;

// ============================================================================
// Host Capabilities
// ============================================================================

pub use crate::field::{ContainerId, InputField, MemoryField};
pub use crate::source::{
    CaseSensitivity, SelectionDelegate, StringListSource, SuggestionCell, SuggestionSource,
};

// ============================================================================
// Layout and Appearance
// ============================================================================

pub use crate::dropdown::{CellFont, Color, DropdownParent, DropdownStyle};
pub use crate::geometry::{Point, Rect, Size};

// ============================================================================
// Errors and Signals
// ============================================================================

pub use crate::error::{Result, SuggestError};
pub use typeahead_core::Signal;
