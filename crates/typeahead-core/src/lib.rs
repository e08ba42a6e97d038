//! Core runtime for typeahead.
//!
//! This crate provides the plumbing the suggestion widget is built on, none of
//! which knows anything about suggestions:
//!
//! - **Signals**: type-safe observer notifications ([`Signal`])
//! - **Workers**: a dedicated serial background thread ([`Worker`])
//! - **Mailboxes**: hand-off of results onto the interaction thread ([`Mailbox`])
//! - **Thread affinity**: debug checks that state stays on its owning thread
//! - **Logging**: `tracing` targets and helpers
//!
//! # Worker + Mailbox Example
//!
//! ```
//! use std::time::Duration;
//! use typeahead_core::{Worker, WorkerConfig, mailbox};
//!
//! let worker = Worker::<usize>::with_config(WorkerConfig::default()).unwrap();
//! let (sender, inbox) = mailbox();
//!
//! worker
//!     .send_with_callback(|| "background".len(), move |len| {
//!         let _ = sender.post(len);
//!     })
//!     .unwrap();
//!
//! // On the interaction thread:
//! assert_eq!(inbox.recv_timeout(Duration::from_secs(5)), Some(10));
//! worker.stop_and_join();
//! ```

mod error;
pub mod logging;
pub mod mailbox;
pub mod signal;
pub mod thread_check;
pub mod worker;

pub use error::{CoreError, Result};
pub use logging::PerfSpan;
pub use mailbox::{Mailbox, MailboxSender, mailbox};
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
pub use worker::{Worker, WorkerConfig};
