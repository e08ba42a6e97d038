//! Tests for the suggestion controller's search-and-display cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use typeahead::SearchResponse;
use typeahead::prelude::*;

const WAIT: Duration = Duration::from_secs(5);
const FIELD_FRAME: Rect = Rect::new(20.0, 100.0, 280.0, 30.0);

/// A string list that counts how many lookups reach it.
struct CountingSource {
    inner: StringListSource,
    lookups: AtomicUsize,
}

impl CountingSource {
    fn new(items: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inner: StringListSource::from(items.to_vec()),
            lookups: AtomicUsize::new(0),
        })
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SuggestionSource for CountingSource {
    type Item = String;

    fn render_item(&self, item: &String, cell: &mut SuggestionCell) {
        self.inner.render_item(item, cell);
    }

    fn lookup(&self, query: &str) -> Vec<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(query)
    }
}

/// Panics for queries starting with "Gx".
struct FlakySource(StringListSource);

impl SuggestionSource for FlakySource {
    type Item = String;

    fn render_item(&self, item: &String, cell: &mut SuggestionCell) {
        cell.set_text(item);
    }

    fn lookup(&self, query: &str) -> Vec<String> {
        if query.starts_with("Gx") {
            panic!("index corrupted");
        }
        self.0.lookup(query)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Country {
    name: &'static str,
    code: &'static str,
}

/// Items that are not text; the display text is derived when rendering.
struct CountrySource(Vec<Country>);

impl SuggestionSource for CountrySource {
    type Item = Country;

    fn render_item(&self, item: &Country, cell: &mut SuggestionCell) {
        cell.set_text(&format!("{} ({})", item.name, item.code));
    }

    fn lookup(&self, query: &str) -> Vec<Country> {
        let query = query.to_lowercase();
        self.0
            .iter()
            .filter(|country| country.name.to_lowercase().starts_with(&query))
            .cloned()
            .collect()
    }
}

fn field() -> MemoryField {
    MemoryField::new(FIELD_FRAME)
}

fn controller_with<S: SuggestionSource>(
    source: Arc<S>,
    options: SuggestOptions,
) -> SuggestionController<S, MemoryField> {
    SuggestionController::with_options(source, field(), options).unwrap()
}

fn european() -> Arc<CountingSource> {
    CountingSource::new(&["France", "Germany", "Georgia", "Ghana", "Greece", "Grenada"])
}

/// Keep pumping until `count` responses have come through the mailbox.
fn pump(controller: &mut SuggestionController<impl SuggestionSource, MemoryField>, count: usize) {
    let deadline = Instant::now() + WAIT;
    let mut seen = 0;
    while seen < count {
        assert!(Instant::now() < deadline, "timed out waiting for lookups");
        seen += controller.process_pending();
        std::thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// Minimum length
// ============================================================================

#[test]
fn test_below_minimum_hides_and_clears() {
    let source = european();
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Ger");
    assert!(c.wait_for_results(WAIT));
    assert!(c.is_visible());
    let lookups = source.lookups();

    // "Ré" is two user-perceived characters despite being three code points.
    for short in ["", "G", "Ge", "é", "Re\u{301}"] {
        c.on_text_changed(short);
        assert_eq!(c.visibility(), Visibility::Hidden, "query {short:?}");
        assert!(c.results().is_empty(), "query {short:?}");
        assert!(!c.dropdown().is_attached());
    }
    assert_eq!(source.lookups(), lookups);
}

#[test]
fn test_empty_text_hides_even_with_zero_minimum() {
    let source = european();
    let mut c = controller_with(source.clone(), SuggestOptions::new().with_min_chars_to_show(0));

    c.on_text_changed("");
    assert!(!c.is_search_pending());
    assert!(c.wait_for_results(WAIT));
    assert_eq!(source.lookups(), 0);
    assert!(!c.is_visible());
}

#[test]
fn test_short_query_invalidates_outstanding_lookup() {
    let source = european();
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Gre");
    c.on_text_changed("Gr");
    assert!(!c.is_search_pending());

    pump(&mut c, 1);
    assert!(!c.is_visible());
    assert!(c.results().is_empty());
}

// ============================================================================
// Hide
// ============================================================================

#[test]
fn test_hide_is_idempotent() {
    let mut c = controller_with(european(), SuggestOptions::default());
    let hidden = Arc::new(AtomicUsize::new(0));
    let counter = hidden.clone();
    c.visibility_changed.connect(move |visibility| {
        if *visibility == Visibility::Hidden {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    c.on_text_changed("Gre");
    assert!(c.wait_for_results(WAIT));
    assert!(c.is_visible());

    c.hide();
    let after_once = (c.visibility(), c.row_count(), c.dropdown().clone());
    c.hide();
    let after_twice = (c.visibility(), c.row_count(), c.dropdown().clone());

    assert_eq!(after_once, after_twice);
    assert_eq!(hidden.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hide_keeps_last_query() {
    let mut c = controller_with(european(), SuggestOptions::default());
    c.on_text_changed("Gre");
    c.hide();
    assert_eq!(c.last_query(), "Gre");
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn test_extending_a_no_match_query_skips_lookup() {
    let source = CountingSource::new(&["France", "Ghana"]);
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Ger");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(source.lookups(), 1);
    assert!(!c.is_visible());

    c.on_text_changed("Germ");
    assert!(!c.is_search_pending());
    assert_eq!(source.lookups(), 1);
    assert!(!c.is_visible());
    assert!(c.results().is_empty());

    // Chains over consecutive keystrokes.
    c.on_text_changed("Germa");
    assert_eq!(source.lookups(), 1);

    // Deleting a character is not an extension.
    c.on_text_changed("Germ");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(source.lookups(), 2);
}

#[test]
fn test_extension_after_matches_still_searches() {
    let source = european();
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Ger");
    assert!(c.wait_for_results(WAIT));
    c.on_text_changed("Germ");
    assert!(c.wait_for_results(WAIT));

    assert_eq!(source.lookups(), 2);
    assert_eq!(c.results(), ["Germany"]);
}

#[test]
fn test_jump_past_no_match_query_still_searches() {
    let source = CountingSource::new(&["France", "Ghana"]);
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Ger");
    assert!(c.wait_for_results(WAIT));

    // Two characters pasted at once.
    c.on_text_changed("Germa");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(source.lookups(), 2);
}

// ============================================================================
// Results and layout
// ============================================================================

#[test]
fn test_france_germany_georgia_scenario() {
    let source = CountingSource::new(&["France", "Germany", "Georgia"]);
    let mut c = controller_with(source, SuggestOptions::new().with_min_chars_to_show(1));

    c.on_text_changed("G");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Germany", "Georgia"]);
    assert!(c.is_visible());
    assert_eq!(c.dropdown().frame().height(), 44.0 * 2.0);

    c.on_text_changed("Ge");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Germany", "Georgia"]);
    assert!(c.is_visible());

    c.on_text_changed("Ged");
    assert!(c.wait_for_results(WAIT));
    assert!(c.results().is_empty());
    assert!(!c.is_visible());
}

#[test]
fn test_row_cap_limits_height_not_results() {
    let mut c = controller_with(
        european(),
        SuggestOptions::new()
            .with_min_chars_to_show(1)
            .with_max_visible_rows(2)
            .with_row_height(32.0),
    );

    c.on_text_changed("G");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.row_count(), 5);
    assert_eq!(c.dropdown().frame().height(), 64.0);
    assert_eq!(c.dropdown().frame().width(), FIELD_FRAME.width());
    assert_eq!(c.visible_rows(), 0..2);

    c.on_row_selected(4).unwrap();
    assert_eq!(c.field().text(), "Grenada");
}

#[test]
fn test_results_changed_reports_row_count() {
    let mut c = controller_with(european(), SuggestOptions::new().with_min_chars_to_show(1));
    let counts = Arc::new(Mutex::new(Vec::new()));
    let log = counts.clone();
    c.results_changed.connect(move |count| log.lock().push(*count));

    c.on_text_changed("Gr");
    assert!(c.wait_for_results(WAIT));
    c.on_text_changed("Gh");
    assert!(c.wait_for_results(WAIT));
    c.on_text_changed("Gz");
    assert!(c.wait_for_results(WAIT));

    assert_eq!(*counts.lock(), vec![2, 1, 0]);
}

#[test]
fn test_dropdown_in_ancestor_container() {
    let field = MemoryField::new(FIELD_FRAME).with_ancestor(ContainerId(3), Point::new(16.0, 200.0));
    let mut c =
        SuggestionController::with_options(european(), field, SuggestOptions::default()).unwrap();
    c.set_dropdown_parent(DropdownParent::Container(ContainerId(3)));

    c.on_text_changed("Gre");
    assert!(c.wait_for_results(WAIT));

    assert_eq!(c.dropdown().parent(), DropdownParent::Container(ContainerId(3)));
    assert_eq!(c.dropdown().frame(), Rect::new(36.0, 330.0, 280.0, 88.0));
}

#[test]
fn test_suppressed_display_tracks_results_but_stays_hidden() {
    let mut c = controller_with(european(), SuggestOptions::new().with_suppress_display(true));
    let shown = Arc::new(AtomicUsize::new(0));
    let counter = shown.clone();
    c.visibility_changed.connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    c.on_text_changed("Gre");
    assert!(c.wait_for_results(WAIT));

    assert_eq!(c.row_count(), 2);
    assert!(!c.is_visible());
    assert!(!c.dropdown().is_attached());
    assert_eq!(shown.load(Ordering::SeqCst), 0);

    c.show();
    assert!(!c.is_visible());
}

#[test]
fn test_suppressing_while_visible_hides_on_next_result() {
    let mut c = controller_with(european(), SuggestOptions::new().with_min_chars_to_show(1));
    let hidden = Arc::new(AtomicUsize::new(0));
    let counter = hidden.clone();
    c.visibility_changed.connect(move |visibility| {
        if *visibility == Visibility::Hidden {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    c.on_text_changed("G");
    assert!(c.wait_for_results(WAIT));
    assert!(c.is_visible());

    c.configure(
        SuggestOptions::new()
            .with_min_chars_to_show(1)
            .with_suppress_display(true),
    );
    c.on_text_changed("Ge");
    assert!(c.wait_for_results(WAIT));

    assert_eq!(c.visibility(), Visibility::Hidden);
    assert!(!c.dropdown().is_attached());
    assert_eq!(c.results(), ["Germany", "Georgia"]);
    assert_eq!(hidden.load(Ordering::SeqCst), 1);
}

#[test]
fn test_show_without_results_is_a_no_op() {
    let mut c = controller_with(european(), SuggestOptions::default());
    c.show();
    assert!(!c.is_visible());
    assert!(!c.dropdown().is_attached());
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_row_selection_writes_text_hides_and_notifies() {
    let mut c = controller_with(european(), SuggestOptions::new().with_min_chars_to_show(1));
    let picked = Arc::new(Mutex::new(Vec::new()));
    let delegate_log = picked.clone();
    c.set_delegate(move |row: usize| delegate_log.lock().push(row));
    let activated = Arc::new(Mutex::new(None));
    let activated_log = activated.clone();
    c.row_activated
        .connect(move |text| *activated_log.lock() = Some(text.clone()));

    c.on_text_changed("Ge");
    assert!(c.wait_for_results(WAIT));
    let expected = c.row_text(1).unwrap();

    c.on_row_selected(1).unwrap();

    assert_eq!(c.field().text(), expected);
    assert_eq!(expected, "Georgia");
    assert!(!c.is_visible());
    assert!(c.results().is_empty());
    assert_eq!(*picked.lock(), vec![1]);
    assert_eq!(activated.lock().as_deref(), Some("Georgia"));
}

#[test]
fn test_out_of_range_selection_leaves_state_unchanged() {
    let mut c = controller_with(european(), SuggestOptions::new().with_min_chars_to_show(1));
    let picked = Arc::new(AtomicUsize::new(0));
    let counter = picked.clone();
    c.set_delegate(move |_: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    c.field_mut().set_text("Gr");
    c.on_text_changed("Gr");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.row_count(), 2);

    let result = c.on_row_selected(5);
    assert!(matches!(
        result,
        Err(SuggestError::IndexOutOfRange { index: 5, len: 2 })
    ));
    assert!(c.is_visible());
    assert_eq!(c.row_count(), 2);
    assert_eq!(c.field().text(), "Gr");
    assert_eq!(picked.load(Ordering::SeqCst), 0);
}

#[test]
fn test_selection_uses_derived_display_text() {
    let source = Arc::new(CountrySource(vec![
        Country { name: "Germany", code: "DE" },
        Country { name: "Georgia", code: "GE" },
    ]));
    let mut c = controller_with(source, SuggestOptions::default());

    c.on_text_changed("Geo");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results()[0].code, "GE");

    c.on_row_selected(0).unwrap();
    assert_eq!(c.field().text(), "Georgia (GE)");
}

// ============================================================================
// Asynchronous delivery
// ============================================================================

#[test]
fn test_superseded_result_is_discarded() {
    let source = european();
    let mut c = controller_with(source.clone(), SuggestOptions::default());

    c.on_text_changed("Ger");
    c.on_text_changed("Gre");
    pump(&mut c, 2);

    assert_eq!(source.lookups(), 2);
    assert_eq!(c.results(), ["Greece", "Grenada"]);
    assert!(!c.is_search_pending());
}

#[test]
fn test_older_sequence_is_rejected_after_newer_submission() {
    let mut c = controller_with(european(), SuggestOptions::default());

    c.on_text_changed("Gre");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Greece", "Grenada"]);

    // Lookup 2 is now outstanding; a late answer to lookup 1 must not land.
    c.on_text_changed("Gha");
    let late = SearchResponse {
        sequence: 1,
        query: "Gre".to_owned(),
        items: vec!["Grenada".to_owned()],
        failed: false,
    };
    assert!(!c.on_search_result(late.clone()));
    assert_eq!(c.results(), ["Greece", "Grenada"]);
    assert!(c.is_visible());
    assert!(c.is_search_pending());

    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Ghana"]);

    // Still rejected once the newer result has been applied.
    assert!(!c.on_search_result(late));
    assert_eq!(c.results(), ["Ghana"]);
}

#[test]
fn test_result_arriving_after_hide_is_discarded() {
    let mut c = controller_with(european(), SuggestOptions::default());

    c.on_text_changed("Gre");
    c.hide();
    pump(&mut c, 1);

    assert!(!c.is_visible());
    assert!(c.results().is_empty());
}

#[test]
fn test_panicking_lookup_hides_dropdown() {
    let source = Arc::new(FlakySource(StringListSource::from(vec!["Ghana", "Greece"])));
    let mut c = controller_with(source, SuggestOptions::new().with_min_chars_to_show(1));

    c.on_text_changed("Gh");
    assert!(c.wait_for_results(WAIT));
    assert!(c.is_visible());

    c.on_text_changed("Gxz");
    assert!(c.wait_for_results(WAIT));
    assert!(!c.is_visible());
    assert!(c.results().is_empty());

    // The controller keeps working afterwards.
    c.on_text_changed("Gr");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Greece"]);
}

// ============================================================================
// Host lifecycle
// ============================================================================

#[test]
fn test_pending_edit_builds_candidate_text() {
    let source = european();
    let mut c = controller_with(source, SuggestOptions::default());
    c.field_mut().set_text("Ge");

    c.on_pending_edit(2..2, "r");
    assert_eq!(c.last_query(), "Ger");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Germany"]);

    c.field_mut().set_text("Ger");
    c.on_pending_edit(2..3, "");
    assert_eq!(c.last_query(), "Ge");
    assert!(!c.is_visible());
}

#[test]
fn test_focus_round_trip() {
    let mut c = controller_with(european(), SuggestOptions::default());
    c.field_mut().set_text("Gha");

    c.on_editing_began();
    assert!(c.wait_for_results(WAIT));
    assert!(c.is_visible());

    c.on_editing_ended();
    assert!(!c.is_visible());
    assert!(!c.dropdown().is_attached());

    c.on_editing_began();
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.results(), ["Ghana"]);
}

#[test]
fn test_configure_takes_effect_on_next_event() {
    let mut c = controller_with(european(), SuggestOptions::default());
    c.on_text_changed("G");
    assert!(!c.is_search_pending());

    c.configure(SuggestOptions::new().with_min_chars_to_show(1));
    c.on_text_changed("G");
    assert!(c.wait_for_results(WAIT));
    assert_eq!(c.row_count(), 5);
}
