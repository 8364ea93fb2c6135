//! Thread-safe queue for handing changes back to the UI thread.
//!
//! [`History`](crate::History) and [`Target`](crate::Target) live on the UI
//! thread. Background work (loading a face of a cube map, re-encoding a
//! binary asset) finishes elsewhere and pushes the resulting change into a
//! [`ChangeQueue`]. The editor drains the queue each frame and records the
//! changes through its history.

use std::fmt;

use parking_lot::Mutex;

use crate::change::{Change, ChangeError, Editable};
use crate::history::History;

/// A queued change that failed to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFailure {
    pub description: String,
    pub error: ChangeError,
}

/// Outcome of [`ChangeQueue::drain_into`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of changes recorded in the history.
    pub recorded: usize,
    /// Changes that failed to apply, in submission order. None of them were
    /// recorded.
    pub failures: Vec<QueuedFailure>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A thread-safe queue of pending [`Change`]s.
///
/// [`push()`](Self::push) only requires `&self`, so the queue can be shared
/// behind an `Arc` with worker threads.
///
/// ```ignore
/// let queue = Arc::new(ChangeQueue::<CubeTexture>::new());
/// let worker_queue = queue.clone();
/// std::thread::spawn(move || {
///     let face = decode_face(path);
///     worker_queue.push(Box::new(ReplaceFace { index, old, new: face }));
/// });
///
/// // Later, on the UI thread:
/// let report = queue.drain_into(&mut history, &mut cube_texture);
/// ```
pub struct ChangeQueue<T: Editable> {
    queue: Mutex<Vec<Box<dyn Change<T>>>>,
}

impl<T: Editable> ChangeQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues a change.
    pub fn push(&self, change: Box<dyn Change<T>>) {
        self.queue.lock().push(change);
    }

    /// Takes every queued change, in submission order.
    pub fn drain(&self) -> Vec<Box<dyn Change<T>>> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Applies and records every queued change through `history`, in
    /// submission order.
    ///
    /// The lock is released before the first change runs, so workers can keep
    /// pushing while the batch is recorded; their changes wait for the next
    /// drain. A change that fails to apply is skipped and reported.
    pub fn drain_into(&self, history: &mut History<T>, target: &mut T) -> DrainReport {
        let mut report = DrainReport::default();
        for change in self.drain() {
            let description = change.description().to_owned();
            match history.add(change, target) {
                Ok(_) => report.recorded += 1,
                Err(error) => {
                    log::debug!("Queued change '{description}' rejected: {error}");
                    report.failures.push(QueuedFailure { description, error });
                }
            }
        }
        if report.recorded > 0 {
            log::debug!("Recorded {} queued changes", report.recorded);
        }
        report
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<T: Editable> Default for ChangeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for ChangeQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeQueue")
            .field("pending", &self.len())
            .finish()
    }
}
