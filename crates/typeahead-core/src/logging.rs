//! Logging facilities for typeahead.
//!
//! typeahead uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("typeahead=debug,typeahead_core=info")
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`], so subsystems can be
//! filtered independently.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "typeahead_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "typeahead_core::signal";
    /// Worker thread target.
    pub const WORKER: &str = "typeahead_core::worker";
    /// Thread affinity checks target.
    pub const THREAD_CHECK: &str = "typeahead_core::thread_check";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for timing an operation such as a single lookup.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "typeahead::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// Thin wrappers around the `tracing` macros with the core target filled in.
#[macro_export]
macro_rules! typeahead_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "typeahead_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! typeahead_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "typeahead_core", $($arg)*)
    };
}
