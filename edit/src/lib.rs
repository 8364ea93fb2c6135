//! # RedLilium Edit
//!
//! Reversible changes, undo/redo history and change notification shared by
//! every RedLilium asset editor (texture, cube texture, binary).
//!
//! - [`Change`] - a reversible edit (Command pattern), with the standard
//!   [`FnChange`], [`PropertyChange`] and [`CombinedChange`] constructors
//! - [`History`] - bounded linear undo/redo log with a save marker
//! - [`Target`] - change-notification bus with filters, batching and wiring
//! - [`ChangeSignal`] - identity-compared signals with a parent/member
//!   taxonomy resolved by [`is_change`]
//! - [`Document`] - a model plus its history, as seen by editor toolbars
//! - [`ChangeQueue`] - hands changes from worker threads to the UI thread
//!
//! # Data flow
//!
//! A controller builds a [`Change`] capturing before/after state and passes
//! it to [`History::add`]. Applying the change runs the model's setters,
//! which call [`Target::signal_change`]; subscribed views re-render if their
//! filters match. [`History::undo`] and [`History::redo`] go through the
//! same setters and therefore the same notifications.
//!
//! Everything except [`ChangeQueue`] is single-threaded and lives on the UI
//! thread.

mod binding;
mod change;
mod config;
mod document;
mod history;
mod queue;
mod signal;
mod target;

pub use binding::ScopedSubscription;
pub use change::{
    Change, ChangeError, ChangeResult, CombinedChange, Editable, FnChange, PropertyChange,
    func_change,
};
pub use config::{ConfigError, HistoryConfig};
pub use document::{Document, HISTORY_CHANGED, Notification, Notifications, ToolbarState};
pub use history::{ChangeId, DEFAULT_MAX_UNDO, History};
pub use queue::{ChangeQueue, DrainReport, QueuedFailure};
pub use signal::{ChangeKind, ChangeSignal, is_change};
pub use target::{Batch, Callback, Filter, Subscription, Target, wire_targets};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
