//! The suggestion dropdown controller.
//!
//! [`SuggestionController`] is bound to one input field. On every text change
//! it decides whether to search, show or hide, runs lookups on its private
//! [`SearchExecutor`], and applies their results on the interaction thread.
//!
//! The controller draws nothing itself. A rendering adapter reads its state
//! through accessors ([`dropdown`](SuggestionController::dropdown),
//! [`render_row`](SuggestionController::render_row),
//! [`visible_rows`](SuggestionController::visible_rows)) and listens to its
//! signals to know when to redraw.
//!
//! # Pumping results
//!
//! Lookup results arrive in a mailbox. The host drains it on the interaction
//! thread, typically once per event-loop turn:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use typeahead::prelude::*;
//!
//! let source = Arc::new(StringListSource::from(vec!["France", "Germany", "Georgia"]));
//! let field = MemoryField::new(Rect::new(20.0, 100.0, 280.0, 30.0));
//! let options = SuggestOptions::new().with_min_chars_to_show(1);
//! let mut controller = SuggestionController::with_options(source, field, options).unwrap();
//!
//! controller.on_text_changed("Ge");
//! controller.wait_for_results(Duration::from_secs(5));
//!
//! assert!(controller.is_visible());
//! assert_eq!(controller.row_text(1).unwrap(), "Georgia");
//! ```

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use typeahead_core::{Mailbox, Signal, ThreadAffinity, mailbox};

use crate::dropdown::{DropdownParent, DropdownState, dropdown_height};
use crate::error::{Result, SuggestError};
use crate::executor::{SearchExecutor, SearchResponse};
use crate::field::{InputField, apply_edit, grapheme_len, without_last_grapheme};
use crate::geometry::Rect;
use crate::options::SuggestOptions;
use crate::source::{SelectionDelegate, SuggestionCell, SuggestionSource};

/// Whether the dropdown is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

/// Controls the suggestion dropdown of one input field.
///
/// All methods must be called on the thread that created the controller.
pub struct SuggestionController<S: SuggestionSource, F: InputField> {
    options: SuggestOptions,
    field: F,
    executor: SearchExecutor<S>,
    inbox: Mailbox<SearchResponse<S::Item>>,
    delegate: Option<Box<dyn SelectionDelegate>>,

    results: Vec<S::Item>,
    visibility: Visibility,
    /// Text seen by the most recent `on_text_changed`.
    last_query: String,
    /// The latest query whose applied result was empty.
    no_match_query: Option<String>,
    /// Sequence number of the lookup whose result will be applied.
    awaiting: Option<u64>,

    dropdown: DropdownState,
    parent: DropdownParent,
    focused: bool,
    affinity: ThreadAffinity,

    /// Emitted when the dropdown is shown or hidden.
    pub visibility_changed: Signal<Visibility>,

    /// Emitted with the new row count whenever the result set changes.
    pub results_changed: Signal<usize>,

    /// Emitted with the display text of a row the user picked.
    pub row_activated: Signal<String>,
}

impl<S: SuggestionSource, F: InputField> SuggestionController<S, F> {
    /// Create a controller with default options.
    pub fn new(source: Arc<S>, field: F) -> Result<Self> {
        Self::with_options(source, field, SuggestOptions::default())
    }

    /// Create a controller with the given options.
    pub fn with_options(source: Arc<S>, field: F, options: SuggestOptions) -> Result<Self> {
        let (reply, inbox) = mailbox();
        let executor = SearchExecutor::new(source, reply)?;

        Ok(Self {
            options: options.normalized(),
            field,
            executor,
            inbox,
            delegate: None,
            results: Vec::new(),
            visibility: Visibility::Hidden,
            last_query: String::new(),
            no_match_query: None,
            awaiting: None,
            dropdown: DropdownState::default(),
            parent: DropdownParent::FieldParent,
            focused: false,
            affinity: ThreadAffinity::current(),
            visibility_changed: Signal::new(),
            results_changed: Signal::new(),
            row_activated: Signal::new(),
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the options. Takes effect on the next event.
    pub fn configure(&mut self, options: SuggestOptions) {
        self.options = options.normalized();
        tracing::debug!(
            target: crate::targets::CONTROLLER,
            min_chars = self.options.min_chars_to_show,
            max_rows = self.options.max_visible_rows,
            suppress = self.options.suppress_display,
            "options configured"
        );
    }

    /// The current options.
    pub fn options(&self) -> &SuggestOptions {
        &self.options
    }

    /// Set the delegate notified when a row is picked.
    pub fn set_delegate(&mut self, delegate: impl SelectionDelegate + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    /// Remove the selection delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Attach the dropdown to `parent` instead of the field's immediate parent.
    ///
    /// Used to escape an immediate parent that clips its children. Takes
    /// effect the next time the dropdown is laid out.
    pub fn set_dropdown_parent(&mut self, parent: DropdownParent) {
        self.parent = parent;
    }

    // =========================================================================
    // Host Events
    // =========================================================================

    /// React to the field's text changing to `candidate`.
    pub fn on_text_changed(&mut self, candidate: &str) {
        self.affinity.debug_assert_same_thread();

        let previous = std::mem::replace(&mut self.last_query, candidate.to_owned());

        if candidate.is_empty() || grapheme_len(candidate) < self.options.min_chars_to_show {
            tracing::trace!(target: crate::targets::CONTROLLER, "query below minimum length");
            self.hide();
            return;
        }

        // A query that extends a no-match query by one character cannot match either.
        let extends_no_match = !previous.is_empty()
            && self.no_match_query.as_deref() == Some(previous.as_str())
            && candidate != previous
            && without_last_grapheme(candidate) == previous;
        if extends_no_match {
            tracing::debug!(
                target: crate::targets::CONTROLLER,
                query = %candidate,
                "skipping lookup; previous query had no matches"
            );
            self.hide();
            self.no_match_query = Some(candidate.to_owned());
            return;
        }

        self.no_match_query = None;
        match self.executor.submit(candidate) {
            Ok(sequence) => self.awaiting = Some(sequence),
            Err(err) => {
                tracing::warn!(
                    target: crate::targets::CONTROLLER,
                    error = %err,
                    "lookup rejected; hiding suggestions"
                );
                self.hide();
            }
        }
    }

    /// React to a pending edit that will replace byte `range` of the field's
    /// text with `replacement`.
    pub fn on_pending_edit(&mut self, range: Range<usize>, replacement: &str) {
        let candidate = apply_edit(&self.field.text(), range, replacement);
        self.on_text_changed(&candidate);
    }

    /// The field gained focus. Suggestions for its current text reappear.
    pub fn on_editing_began(&mut self) {
        self.focused = true;
        let text = self.field.text();
        self.on_text_changed(&text);
    }

    /// The field lost focus.
    pub fn on_editing_ended(&mut self) {
        self.focused = false;
        self.hide();
    }

    /// Whether the field is being edited.
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Apply every lookup result that has arrived. Never blocks.
    ///
    /// Returns the number of responses taken from the mailbox, stale ones
    /// included.
    pub fn process_pending(&mut self) -> usize {
        self.affinity.debug_assert_same_thread();

        let responses = self.inbox.drain();
        let count = responses.len();
        for response in responses {
            self.on_search_result(response);
        }
        count
    }

    /// Block until the outstanding lookup's result has been applied, or
    /// `timeout` elapses.
    ///
    /// Returns `true` if no lookup is outstanding on return.
    pub fn wait_for_results(&mut self, timeout: Duration) -> bool {
        self.affinity.debug_assert_same_thread();

        let deadline = Instant::now() + timeout;
        while self.awaiting.is_some() {
            match self.inbox.recv_deadline(deadline) {
                Some(response) => {
                    self.on_search_result(response);
                }
                None => return false,
            }
        }
        true
    }

    /// Apply one lookup result.
    ///
    /// Results for any lookup other than the latest one issued are dropped.
    /// Returns `true` if the result was applied.
    pub fn on_search_result(&mut self, response: SearchResponse<S::Item>) -> bool {
        if self.awaiting != Some(response.sequence) {
            tracing::debug!(
                target: crate::targets::CONTROLLER,
                sequence = response.sequence,
                query = %response.query,
                "discarding stale lookup result"
            );
            return false;
        }
        self.awaiting = None;

        if response.items.is_empty() {
            if !response.failed {
                self.no_match_query = Some(response.query);
            }
            self.hide();
            return true;
        }

        tracing::trace!(
            target: crate::targets::CONTROLLER,
            query = %response.query,
            count = response.items.len(),
            "applying lookup result"
        );
        self.results = response.items;
        self.dropdown.reset_scroll();
        self.results_changed.emit(self.results.len());
        self.show();
        true
    }

    /// Whether a lookup has been issued and its result not yet applied.
    pub fn is_search_pending(&self) -> bool {
        self.awaiting.is_some()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The user picked row `row_index`.
    ///
    /// Writes the row's display text into the field, hides the dropdown and
    /// notifies the delegate. Out-of-range rows leave all state unchanged.
    pub fn on_row_selected(&mut self, row_index: usize) -> Result<()> {
        let text = self.row_text(row_index)?;

        self.field.set_text(&text);
        self.hide();

        tracing::debug!(target: crate::targets::CONTROLLER, row = row_index, text = %text, "row selected");
        self.row_activated.emit(text);
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.row_selected(row_index);
        }
        Ok(())
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Hide the dropdown and forget the current results.
    ///
    /// Also invalidates the outstanding lookup, if any. Calling it again has
    /// no further effect.
    pub fn hide(&mut self) {
        self.awaiting = None;

        if !self.results.is_empty() {
            self.results.clear();
            self.results_changed.emit(0);
        }

        self.retract();
    }

    /// Detach the dropdown and move to Hidden, keeping the results.
    fn retract(&mut self) {
        if self.dropdown.is_attached() {
            self.dropdown.detach();
        }

        if self.visibility == Visibility::Visible {
            self.visibility = Visibility::Hidden;
            tracing::trace!(target: crate::targets::CONTROLLER, "dropdown hidden");
            self.visibility_changed.emit(Visibility::Hidden);
        }
    }

    /// Lay out and show the dropdown for the current results.
    ///
    /// Does nothing when there are no results. With display suppressed the
    /// dropdown is taken off screen instead, and the results are kept.
    pub fn show(&mut self) {
        if self.results.is_empty() {
            return;
        }
        if self.options.suppress_display {
            self.retract();
            return;
        }

        let height = dropdown_height(
            self.options.row_height,
            self.results.len(),
            self.options.max_visible_rows,
        );
        let (parent, anchor) = self.anchor();
        self.dropdown.set_parent(parent);
        self.dropdown.place_below(anchor, height);

        if !self.dropdown.is_attached() {
            self.dropdown.attach();
        }

        if self.visibility == Visibility::Hidden {
            self.visibility = Visibility::Visible;
            tracing::trace!(
                target: crate::targets::CONTROLLER,
                height,
                parent = ?parent,
                "dropdown shown"
            );
            self.visibility_changed.emit(Visibility::Visible);
        }
    }

    /// The field's frame in the coordinates of the container the dropdown
    /// attaches to.
    fn anchor(&self) -> (DropdownParent, Rect) {
        match self.parent {
            DropdownParent::FieldParent => (DropdownParent::FieldParent, self.field.frame()),
            DropdownParent::Container(container) => match self.field.frame_in(container) {
                Some(frame) => (self.parent, frame),
                None => {
                    tracing::warn!(
                        target: crate::targets::CONTROLLER,
                        container = container.0,
                        "container is not an ancestor of the field; using the field's parent"
                    );
                    (DropdownParent::FieldParent, self.field.frame())
                }
            },
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Whether the dropdown is shown.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Shorthand for `visibility() == Visibility::Visible`.
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// The current result set.
    pub fn results(&self) -> &[S::Item] {
        &self.results
    }

    /// Number of rows in the current result set.
    pub fn row_count(&self) -> usize {
        self.results.len()
    }

    /// The text seen by the most recent text change.
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    /// Placement and attachment of the dropdown.
    pub fn dropdown(&self) -> &DropdownState {
        &self.dropdown
    }

    /// The bound input field.
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Mutable access to the bound input field.
    pub fn field_mut(&mut self) -> &mut F {
        &mut self.field
    }

    /// The data source.
    pub fn source(&self) -> &Arc<S> {
        self.executor.source()
    }

    /// Render row `row_index` into `cell`.
    ///
    /// The cell is cleared and given the dropdown's row font first.
    pub fn render_row(&self, row_index: usize, cell: &mut SuggestionCell) -> Result<()> {
        let item = self
            .results
            .get(row_index)
            .ok_or_else(|| SuggestError::index_out_of_range(row_index, self.results.len()))?;
        cell.reset(&self.options.style.font);
        self.executor.source().render_item(item, cell);
        Ok(())
    }

    /// Display text of row `row_index`.
    pub fn row_text(&self, row_index: usize) -> Result<String> {
        let mut cell = SuggestionCell::new();
        self.render_row(row_index, &mut cell)?;
        Ok(cell.text().to_owned())
    }

    /// Rows currently in view.
    pub fn visible_rows(&self) -> Range<usize> {
        self.dropdown
            .visible_range(self.results.len(), self.options.max_visible_rows)
    }

    /// Scroll so that row `row_index` is in view.
    pub fn scroll_to_row(&mut self, row_index: usize) -> Result<()> {
        if row_index >= self.results.len() {
            return Err(SuggestError::index_out_of_range(row_index, self.results.len()));
        }
        self.dropdown
            .ensure_row_visible(row_index, self.options.max_visible_rows);
        Ok(())
    }
}

impl<S: SuggestionSource, F: InputField + std::fmt::Debug> std::fmt::Debug
    for SuggestionController<S, F>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionController")
            .field("field", &self.field)
            .field("visibility", &self.visibility)
            .field("row_count", &self.results.len())
            .field("last_query", &self.last_query)
            .field("awaiting", &self.awaiting)
            .field("dropdown", &self.dropdown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ContainerId, MemoryField};
    use crate::geometry::Point;
    use crate::source::StringListSource;

    const WAIT: Duration = Duration::from_secs(5);

    fn controller(min_chars: usize) -> SuggestionController<StringListSource, MemoryField> {
        let source = Arc::new(StringListSource::from(vec![
            "France", "Germany", "Georgia", "Ghana", "Greece", "Grenada", "Guatemala",
        ]));
        let field = MemoryField::new(Rect::new(20.0, 100.0, 280.0, 30.0))
            .with_ancestor(ContainerId(7), Point::new(0.0, 64.0));
        let options = SuggestOptions::new().with_min_chars_to_show(min_chars);
        SuggestionController::with_options(source, field, options).unwrap()
    }

    #[test]
    fn test_dropdown_sits_below_field() {
        let mut c = controller(1);
        c.on_text_changed("Ge");
        assert!(c.wait_for_results(WAIT));

        assert_eq!(c.dropdown().parent(), DropdownParent::FieldParent);
        assert_eq!(c.dropdown().frame(), Rect::new(20.0, 130.0, 280.0, 88.0));
        assert!(c.dropdown().is_attached());
    }

    #[test]
    fn test_unknown_container_falls_back_to_field_parent() {
        let mut c = controller(1);
        c.set_dropdown_parent(DropdownParent::Container(ContainerId(99)));
        c.on_text_changed("Ge");
        assert!(c.wait_for_results(WAIT));

        assert_eq!(c.dropdown().parent(), DropdownParent::FieldParent);
        assert_eq!(c.dropdown().frame().top(), 130.0);
    }

    #[test]
    fn test_scroll_to_row_and_reset_on_new_results() {
        let mut c = controller(1);
        c.on_text_changed("G");
        assert!(c.wait_for_results(WAIT));
        assert_eq!(c.row_count(), 6);
        assert_eq!(c.visible_rows(), 0..2);

        c.scroll_to_row(4).unwrap();
        assert_eq!(c.visible_rows(), 3..5);
        assert!(matches!(
            c.scroll_to_row(6),
            Err(SuggestError::IndexOutOfRange { index: 6, len: 6 })
        ));

        c.on_text_changed("Gr");
        assert!(c.wait_for_results(WAIT));
        assert_eq!(c.visible_rows(), 0..2);
    }

    #[test]
    fn test_render_row_uses_style_font() {
        let mut c = controller(1);
        let mut options = c.options().clone();
        options.style.font = crate::dropdown::CellFont::new("Helvetica", 17.0);
        c.configure(options);

        c.on_text_changed("Fr");
        assert!(c.wait_for_results(WAIT));

        let mut cell = SuggestionCell::new();
        c.render_row(0, &mut cell).unwrap();
        assert_eq!(cell.text(), "France");
        assert_eq!(cell.font().family, "Helvetica");
    }

    #[test]
    fn test_editing_began_reruns_current_text() {
        let mut c = controller(2);
        c.field_mut().set_text("Gh");
        c.on_editing_began();
        assert!(c.has_focus());
        assert!(c.wait_for_results(WAIT));
        assert_eq!(c.row_text(0).unwrap(), "Ghana");

        c.on_editing_ended();
        assert!(!c.has_focus());
        assert!(!c.is_visible());
        assert_eq!(c.row_count(), 0);
    }

    #[test]
    fn test_failed_lookup_is_not_memoized() {
        let mut c = controller(1);
        c.on_text_changed("Ger");
        let sequence = c.awaiting.unwrap();
        // Swallow the real response and feed a failed one in its place.
        assert!(c.inbox.recv_timeout(WAIT).is_some());
        c.on_search_result(SearchResponse {
            sequence,
            query: "Ger".into(),
            items: Vec::new(),
            failed: true,
        });
        assert!(c.no_match_query.is_none());

        c.on_text_changed("Germ");
        assert!(c.is_search_pending());
    }
}
