//! Thread affinity checks.
//!
//! Widget state in typeahead is owned by a single interaction thread. Objects
//! record the thread they were created on with [`ThreadAffinity`] and assert
//! on it at the points where state is mutated:
//!
//! ```
//! use typeahead_core::thread_check::ThreadAffinity;
//!
//! struct Counter {
//!     affinity: ThreadAffinity,
//!     value: i32,
//! }
//!
//! impl Counter {
//!     fn bump(&mut self) {
//!         self.affinity.debug_assert_same_thread();
//!         self.value += 1;
//!     }
//! }
//!
//! let mut counter = Counter { affinity: ThreadAffinity::current(), value: 0 };
//! counter.bump();
//! ```
//!
//! Debug assertions compile to nothing in release builds; use
//! [`ThreadAffinity::assert_same_thread`] where the check must always run.

use std::thread::ThreadId;

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if called from a thread other than the bound one.
    #[track_caller]
    pub fn assert_same_thread(&self) {
        let current = std::thread::current();
        if current.id() != self.thread_id {
            tracing::error!(
                target: "typeahead_core::thread_check",
                expected = ?self.thread_id,
                actual = ?current.id(),
                thread_name = current.name().unwrap_or("<unnamed>"),
                "thread affinity violation"
            );
            panic!(
                "object accessed from a foreign thread (bound to {:?}, called from {:?})",
                self.thread_id,
                current.id()
            );
        }
    }

    /// Like [`assert_same_thread`](Self::assert_same_thread), but only in debug builds.
    #[inline]
    #[track_caller]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }
}
