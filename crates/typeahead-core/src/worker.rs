//! Worker pattern for dedicated background thread processing.
//!
//! A [`Worker`] owns one dedicated thread with its own bounded task queue.
//! Tasks run strictly one at a time, in submission order, which makes it the
//! natural home for work that must never overlap with itself, such as the
//! lookups behind a suggestion dropdown.
//!
//! Results are handed to a callback that runs on the worker thread right after
//! the task. Callbacks that need to reach the interaction thread post into a
//! [`Mailbox`](crate::mailbox::Mailbox).
//!
//! # Example
//!
//! ```no_run
//! use typeahead_core::mailbox::mailbox;
//! use typeahead_core::worker::{Worker, WorkerConfig};
//!
//! let worker = Worker::<String>::with_config(WorkerConfig::default()).unwrap();
//! let (sender, inbox) = mailbox();
//!
//! worker
//!     .send_with_callback(
//!         || "computed value".to_string(),
//!         move |result| {
//!             let _ = sender.post(result);
//!         },
//!     )
//!     .unwrap();
//!
//! // Later, on the interaction thread:
//! for value in inbox.drain() {
//!     println!("Got: {}", value);
//! }
//!
//! worker.stop_and_join();
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::Mutex;

use crate::error::{CoreError, Result};

/// Default capacity for the worker's task queue.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// How often an idle worker re-checks whether it has been stopped.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for creating a Worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name for the worker thread.
    pub name: String,
    /// Capacity of the task queue.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "typeahead-worker".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerConfig {
    /// Create a new configuration with the given thread name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Internal state shared between the Worker handle and worker thread.
struct WorkerState {
    /// Whether the worker accepts new tasks.
    running: AtomicBool,
    /// Count of queued or executing tasks.
    pending_tasks: AtomicUsize,
}

/// A task sent to the worker.
enum WorkerTask<T> {
    /// Execute a task and hand its result to the callback.
    Execute {
        task: Box<dyn FnOnce() -> T + Send>,
        callback: Box<dyn FnOnce(T) + Send>,
    },
    /// Shutdown signal.
    Shutdown,
}

/// A dedicated worker thread with its own task queue.
///
/// # Type Parameter
///
/// - `T`: The result type produced by tasks.
///
/// # Thread Safety
///
/// `Worker<T>` is `Send + Sync`; multiple threads can submit tasks
/// concurrently and they are still executed one at a time.
pub struct Worker<T: Send + 'static> {
    task_sender: Sender<WorkerTask<T>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<WorkerState>,
    name: String,
}

impl<T: Send + 'static> Worker<T> {
    /// Spawn the worker thread. It starts processing tasks immediately.
    pub fn with_config(config: WorkerConfig) -> Result<Self> {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        let state = Arc::new(WorkerState {
            running: AtomicBool::new(true),
            pending_tasks: AtomicUsize::new(0),
        });

        let thread_state = state.clone();
        let handle = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || {
                worker_loop(receiver, &thread_state);
                thread_state.running.store(false, Ordering::Release);
            })
            .map_err(|err| CoreError::WorkerSpawn(err.to_string()))?;

        tracing::debug!(target: "typeahead_core::worker", name = %config.name, "worker started");

        Ok(Self {
            task_sender: sender,
            handle: Mutex::new(Some(handle)),
            state,
            name: config.name,
        })
    }

    /// Check if the worker still accepts tasks.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Get the number of queued or executing tasks.
    pub fn pending_tasks(&self) -> usize {
        self.state.pending_tasks.load(Ordering::Acquire)
    }

    /// Send a task with a callback for result delivery.
    ///
    /// The callback runs on the worker thread immediately after the task.
    /// If the task panics, the panic is logged, the callback is dropped
    /// without being called, and the worker keeps serving later tasks.
    pub fn send_with_callback<F, C>(&self, task: F, callback: C) -> Result<()>
    where
        F: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        if !self.is_running() {
            return Err(CoreError::WorkerStopped);
        }

        self.state.pending_tasks.fetch_add(1, Ordering::AcqRel);

        let worker_task = WorkerTask::Execute {
            task: Box::new(task),
            callback: Box::new(callback),
        };

        match self.task_sender.try_send(worker_task) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
                crate::typeahead_warn!(name = %self.name, "worker queue full, task rejected");
                Err(CoreError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                self.state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
                Err(CoreError::WorkerStopped)
            }
        }
    }

    /// Request the worker to stop after processing remaining tasks.
    ///
    /// Non-blocking. No new tasks are accepted afterwards; use `join()` to
    /// wait for the thread to exit.
    pub fn stop(&self) {
        if self.state.running.swap(false, Ordering::AcqRel) {
            tracing::debug!(target: "typeahead_core::worker", name = %self.name, "worker stop requested");
        }
        let _ = self.task_sender.try_send(WorkerTask::Shutdown);
    }

    /// Wait for the worker thread to finish.
    ///
    /// Returns `true` if the worker was joined successfully, `false` if
    /// already joined or the thread panicked.
    pub fn join(&self) -> bool {
        let mut handle = self.handle.lock();
        if let Some(h) = handle.take() {
            h.join().is_ok()
        } else {
            false
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }
}

impl<T: Send + 'static> Drop for Worker<T> {
    fn drop(&mut self) {
        // Non-blocking; the thread exits once the queue drains.
        self.stop();
    }
}

impl<T: Send + 'static> std::fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

/// The main worker loop that processes tasks.
fn worker_loop<T: Send + 'static>(receiver: Receiver<WorkerTask<T>>, state: &WorkerState) {
    loop {
        match receiver.recv_timeout(IDLE_POLL_INTERVAL) {
            Ok(WorkerTask::Execute { task, callback }) => run_task(task, callback, state),
            Ok(WorkerTask::Shutdown) => {
                // Process remaining tasks before exiting
                while let Ok(task) = receiver.try_recv() {
                    if let WorkerTask::Execute { task, callback } = task {
                        run_task(task, callback, state);
                    }
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if !state.running.load(Ordering::Acquire)
                    && state.pending_tasks.load(Ordering::Acquire) == 0
                {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn run_task<T>(
    task: Box<dyn FnOnce() -> T + Send>,
    callback: Box<dyn FnOnce(T) + Send>,
    state: &WorkerState,
) {
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(result) => callback(result),
        Err(_) => {
            tracing::error!(target: "typeahead_core::worker", "worker task panicked, result dropped");
        }
    }
    state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
}

static_assertions::assert_impl_all!(Worker<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::mailbox;
    use std::sync::atomic::AtomicI32;

    #[test]
    fn test_worker_creation() {
        let worker = Worker::<i32>::with_config(WorkerConfig::default()).unwrap();
        assert!(worker.is_running());
        assert_eq!(worker.pending_tasks(), 0);
        assert!(worker.stop_and_join());
    }

    #[test]
    fn test_send_with_callback() {
        let worker = Worker::<String>::with_config(WorkerConfig::default()).unwrap();
        let (sender, inbox) = mailbox();

        worker
            .send_with_callback(
                || "hello".to_string(),
                move |result| {
                    sender.post(result).unwrap();
                },
            )
            .unwrap();

        let received = inbox.recv_timeout(Duration::from_secs(2));
        assert_eq!(received.as_deref(), Some("hello"));

        worker.stop_and_join();
    }

    #[test]
    fn test_graceful_shutdown_drains_queue() {
        let worker = Worker::<i32>::with_config(WorkerConfig::default()).unwrap();
        let counter = Arc::new(AtomicI32::new(0));

        for _ in 0..5 {
            let counter_clone = counter.clone();
            worker
                .send_with_callback(
                    move || {
                        thread::sleep(Duration::from_millis(10));
                        1
                    },
                    move |n| {
                        counter_clone.fetch_add(n, Ordering::SeqCst);
                    },
                )
                .unwrap();
        }

        worker.stop();
        worker.join();

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_sequential_processing() {
        let worker = Worker::<i32>::with_config(WorkerConfig::default()).unwrap();
        let (sender, inbox) = mailbox();

        for i in 0..10 {
            let sender = sender.clone();
            worker
                .send_with_callback(move || i, move |n| sender.post(n).unwrap())
                .unwrap();
        }

        worker.stop_and_join();
        assert_eq!(inbox.drain(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_send_after_stop() {
        let worker = Worker::<i32>::with_config(WorkerConfig::default()).unwrap();
        worker.stop();

        let result = worker.send_with_callback(|| 42, |_| {});
        assert_eq!(result, Err(CoreError::WorkerStopped));

        worker.join();
    }

    #[test]
    fn test_queue_full() {
        let config = WorkerConfig {
            queue_capacity: 1,
            ..WorkerConfig::with_name("narrow-worker")
        };
        let worker = Worker::<()>::with_config(config).unwrap();
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);

        // Occupy the worker thread, then fill the single queue slot.
        worker
            .send_with_callback(
                move || {
                    let _ = gate_rx.recv();
                },
                |_| {},
            )
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        worker.send_with_callback(|| (), |_| {}).unwrap();

        assert_eq!(
            worker.send_with_callback(|| (), |_| {}),
            Err(CoreError::QueueFull)
        );

        gate_tx.send(()).unwrap();
        worker.stop_and_join();
    }

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let worker = Worker::<i32>::with_config(WorkerConfig::default()).unwrap();
        let (sender, inbox) = mailbox();

        let panicking_sender = sender.clone();
        worker
            .send_with_callback(
                || panic!("lookup exploded"),
                move |n| panicking_sender.post(n).unwrap(),
            )
            .unwrap();
        worker
            .send_with_callback(|| 7, move |n| sender.post(n).unwrap())
            .unwrap();

        assert_eq!(inbox.recv_timeout(Duration::from_secs(2)), Some(7));
        assert!(inbox.is_empty());
        worker.stop_and_join();
    }
}
