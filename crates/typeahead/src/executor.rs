//! Background lookup execution.
//!
//! A [`SearchExecutor`] owns a private serial [`Worker`] thread. Each submitted
//! query runs the source's `lookup` on that thread and the outcome is posted,
//! tagged with its sequence number, to the mailbox the controller drains on the
//! interaction thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use typeahead_core::{MailboxSender, PerfSpan, Worker, WorkerConfig};

use crate::error::{Result, SuggestError};
use crate::source::SuggestionSource;

/// The outcome of one lookup, delivered back to the interaction thread.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse<T> {
    /// Sequence number assigned when the lookup was submitted.
    pub sequence: u64,
    /// The query the lookup ran for.
    pub query: String,
    /// Matching items in source order. Empty if the lookup failed.
    pub items: Vec<T>,
    /// Set when the lookup panicked.
    pub failed: bool,
}

/// Runs lookups for a [`SuggestionSource`] off the interaction thread.
pub struct SearchExecutor<S: SuggestionSource> {
    worker: Worker<SearchResponse<S::Item>>,
    source: Arc<S>,
    reply: MailboxSender<SearchResponse<S::Item>>,
    latest_sequence: u64,
}

impl<S: SuggestionSource> SearchExecutor<S> {
    /// Spawn the worker thread. Responses are posted to `reply`.
    pub fn new(source: Arc<S>, reply: MailboxSender<SearchResponse<S::Item>>) -> Result<Self> {
        Self::with_config(source, reply, WorkerConfig::with_name("typeahead-search"))
    }

    /// Spawn the worker thread with explicit worker settings.
    pub fn with_config(
        source: Arc<S>,
        reply: MailboxSender<SearchResponse<S::Item>>,
        config: WorkerConfig,
    ) -> Result<Self> {
        let worker = Worker::with_config(config)?;
        Ok(Self {
            worker,
            source,
            reply,
            latest_sequence: 0,
        })
    }

    /// Queue a lookup for `query` and return its sequence number.
    ///
    /// Lookups run in submission order. A superseded lookup is not cancelled;
    /// the caller drops its response on delivery.
    pub fn submit(&mut self, query: &str) -> Result<u64> {
        let sequence = self.latest_sequence + 1;
        let source = Arc::clone(&self.source);
        let reply = self.reply.clone();
        let query = query.to_owned();

        let task = move || {
            let _perf = PerfSpan::new("lookup");
            match catch_unwind(AssertUnwindSafe(|| source.lookup(&query))) {
                Ok(items) => SearchResponse {
                    sequence,
                    query,
                    items,
                    failed: false,
                },
                Err(_) => {
                    tracing::error!(
                        target: crate::targets::EXECUTOR,
                        sequence,
                        query = %query,
                        "lookup panicked; delivering no suggestions"
                    );
                    SearchResponse {
                        sequence,
                        query,
                        items: Vec::new(),
                        failed: true,
                    }
                }
            }
        };

        let callback = move |response: SearchResponse<S::Item>| {
            if reply.post(response).is_err() {
                tracing::debug!(
                    target: crate::targets::EXECUTOR,
                    sequence,
                    "controller gone; dropping lookup result"
                );
            }
        };

        self.worker
            .send_with_callback(task, callback)
            .map_err(SuggestError::ExecutorUnavailable)?;
        self.latest_sequence = sequence;

        tracing::trace!(target: crate::targets::EXECUTOR, sequence, "lookup queued");
        Ok(sequence)
    }

    /// Sequence number of the most recently submitted lookup, or 0.
    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    /// Number of lookups queued or running.
    pub fn pending(&self) -> usize {
        self.worker.pending_tasks()
    }

    /// Whether new lookups are accepted.
    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Stop accepting lookups, finish the queued ones, and join the worker.
    pub fn shutdown(&self) {
        self.worker.stop_and_join();
    }

    /// The data source lookups run against.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }
}

impl<S: SuggestionSource> std::fmt::Debug for SearchExecutor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchExecutor")
            .field("worker", &self.worker)
            .field("latest_sequence", &self.latest_sequence)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(SearchResponse<String>: Send);
static_assertions::assert_impl_all!(SearchExecutor<crate::source::StringListSource>: Send);
