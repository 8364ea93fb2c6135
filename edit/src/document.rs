//! Editor-facing document: a model, its history, and user notifications.
//!
//! [`Document`] is what an asset editor (texture, cube texture, binary)
//! holds per open file. Toolbar buttons bind to [`Document::toolbar`] and
//! call [`undo`](Document::undo), [`redo`](Document::redo) and
//! [`save`](Document::save). None of these panic: failures are logged,
//! queued as dismissable [`Notification`]s for the UI to show, and returned
//! to the caller.

use std::sync::LazyLock;

use crate::change::{Change, ChangeError, ChangeResult, Editable};
use crate::config::HistoryConfig;
use crate::history::{DEFAULT_MAX_UNDO, History};
use crate::queue::ChangeQueue;
use crate::signal::ChangeSignal;
use crate::target::Target;

/// Signalled on the document target whenever the undo/redo/save state may
/// have changed.
pub static HISTORY_CHANGED: LazyLock<ChangeSignal> =
    LazyLock::new(|| ChangeSignal::leaf("history changed"));

/// Enabled state of the undo/redo/save toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarState {
    pub undo: bool,
    pub redo: bool,
    pub save: bool,
}

/// A user-visible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
}

/// Dismissable failure messages, oldest first.
#[derive(Debug, Default)]
pub struct Notifications {
    entries: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message and returns its id.
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
        });
        id
    }

    /// Removes a message. Returns `false` if it was already dismissed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|notification| notification.id != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One open, editable asset.
pub struct Document<T: Editable> {
    model: T,
    history: History<T>,
    target: Target,
    notifications: Notifications,
}

impl<T: Editable> Document<T> {
    pub fn new(model: T) -> Self {
        Self::with_capacity(model, DEFAULT_MAX_UNDO)
    }

    pub fn with_config(model: T, config: &HistoryConfig) -> Self {
        Self::with_capacity(model, config.max_undo)
    }

    pub fn with_capacity(model: T, max_undo: usize) -> Self {
        Self {
            model,
            history: History::new(max_undo),
            target: Target::new(),
            notifications: Notifications::new(),
        }
    }

    pub fn model(&self) -> &T {
        &self.model
    }

    pub fn history(&self) -> &History<T> {
        &self.history
    }

    /// The document-level bus. Carries [`HISTORY_CHANGED`] and whatever the
    /// model's own target is wired into it.
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Applies a change and records it in the history.
    pub fn apply(&mut self, change: Box<dyn Change<T>>) -> ChangeResult {
        let description = change.description().to_owned();
        match self.history.add(change, &mut self.model) {
            Ok(_) => {
                self.history_changed();
                Ok(())
            }
            Err(error) => Err(self.report(&description, error)),
        }
    }

    pub fn undo(&mut self) -> ChangeResult {
        match self.history.undo(&mut self.model) {
            Ok(()) => {
                self.history_changed();
                Ok(())
            }
            Err(error) => Err(self.report("Undo", error)),
        }
    }

    pub fn redo(&mut self) -> ChangeResult {
        match self.history.redo(&mut self.model) {
            Ok(()) => {
                self.history_changed();
                Ok(())
            }
            Err(error) => Err(self.report("Redo", error)),
        }
    }

    /// Persists the model through `writer`, then marks the current head as
    /// saved. If `writer` fails, the document stays dirty.
    pub fn save(&mut self, writer: impl FnOnce(&T) -> ChangeResult) -> ChangeResult {
        if let Err(error) = writer(&self.model) {
            return Err(self.report("Save", error));
        }
        self.history.save();
        log::info!("Document saved");
        self.history_changed();
        Ok(())
    }

    /// Records every change waiting in `queue`. Failed changes are reported
    /// and skipped. Returns the number of changes recorded.
    ///
    /// The history change is signalled once for the whole drain.
    pub fn apply_queued(&mut self, queue: &ChangeQueue<T>) -> usize {
        let report = queue.drain_into(&mut self.history, &mut self.model);
        for failure in report.failures {
            self.report(&failure.description, failure.error);
        }
        if report.recorded > 0 {
            self.history_changed();
        }
        report.recorded
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_save(&self) -> bool {
        self.history.can_save()
    }

    pub fn toolbar(&self) -> ToolbarState {
        ToolbarState {
            undo: self.can_undo(),
            redo: self.can_redo(),
            save: self.can_save(),
        }
    }

    fn history_changed(&self) {
        self.target.signal_change(&HISTORY_CHANGED);
    }

    fn report(&mut self, context: &str, error: ChangeError) -> ChangeError {
        if error.is_no_op() {
            log::debug!("{context}: {error}");
        } else {
            log::warn!("{context} failed: {error}");
            self.notifications.push(format!("{context} failed: {error}"));
        }
        error
    }
}

impl<T: Editable> std::fmt::Debug for Document<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("history", &self.history)
            .field("target", &self.target)
            .field("notifications", &self.notifications.len())
            .finish()
    }
}
