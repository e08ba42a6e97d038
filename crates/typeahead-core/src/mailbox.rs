//! Hand-off of results onto the interaction thread.
//!
//! Background work never touches widget state directly. Instead, it posts a
//! message into a [`Mailbox`] owned by the widget, and the host drains that
//! mailbox from its interaction (UI) thread, typically once per event-loop
//! iteration. This keeps all state mutation on a single thread without locks.
//!
//! # How It Works
//!
//! 1. The widget creates a mailbox pair with [`mailbox`] and hands the
//!    [`MailboxSender`] to whatever produces results off-thread.
//! 2. The producer calls [`MailboxSender::post`] from any thread.
//! 3. The host calls [`Mailbox::drain`] (non-blocking) or
//!    [`Mailbox::recv_timeout`] (blocking) on the interaction thread and
//!    applies each message.
//!
//! ```
//! use typeahead_core::mailbox::mailbox;
//!
//! let (sender, inbox) = mailbox::<u32>();
//! std::thread::spawn(move || {
//!     sender.post(7).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(inbox.drain(), vec![7]);
//! ```

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::{CoreError, Result};

/// Create a connected sender/mailbox pair.
pub fn mailbox<M: Send + 'static>() -> (MailboxSender<M>, Mailbox<M>) {
    let (sender, receiver) = unbounded();
    (MailboxSender { sender }, Mailbox { receiver })
}

/// The producing side of a mailbox. Cheap to clone, usable from any thread.
pub struct MailboxSender<M> {
    sender: Sender<M>,
}

impl<M> Clone for MailboxSender<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M: Send + 'static> MailboxSender<M> {
    /// Post a message for the interaction thread.
    ///
    /// Fails with [`CoreError::MailboxClosed`] if the mailbox has been dropped.
    pub fn post(&self, message: M) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| CoreError::MailboxClosed)
    }
}

/// The consuming side of a mailbox, owned by the interaction thread.
pub struct Mailbox<M> {
    receiver: Receiver<M>,
}

impl<M: Send + 'static> Mailbox<M> {
    /// Take every message currently waiting, in arrival order, without blocking.
    pub fn drain(&self) -> Vec<M> {
        let messages: Vec<M> = self.receiver.try_iter().collect();
        if !messages.is_empty() {
            crate::typeahead_trace!(count = messages.len(), "mailbox drained");
        }
        messages
    }

    /// Take the next message without blocking.
    pub fn try_recv(&self) -> Option<M> {
        self.receiver.try_recv().ok()
    }

    /// Block until a message arrives or `timeout` elapses.
    ///
    /// Returns `None` on timeout or when every sender has been dropped.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<M> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until a message arrives, `deadline` passes, or all senders are gone.
    pub fn recv_deadline(&self, deadline: Instant) -> Option<M> {
        self.receiver.recv_deadline(deadline).ok()
    }

    /// Number of messages waiting to be drained.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no messages are waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<M> std::fmt::Debug for Mailbox<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("pending", &self.receiver.len())
            .finish()
    }
}
