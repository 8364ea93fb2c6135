//! Change-notification bus.
//!
//! A [`Target`] is owned by whatever model or editor needs to be observed.
//! Views [`subscribe`](Target::subscribe) with a callback and optional
//! [`Filter`]s; model setters call [`signal_change`](Target::signal_change).
//!
//! # Ordering
//!
//! Subscribers are notified **most recently subscribed first**. A bridge
//! registered after a view therefore sees each signal before that view does.
//!
//! # Batching
//!
//! [`begin_batch`](Target::begin_batch) returns a [`Batch`] guard. While any
//! batch is open, signals are buffered. When the outermost batch is
//! committed, subscribers receive one [`ChangeSignal::multi`] holding the
//! buffered signals; discarding the outermost batch drops them, so observers
//! never see half of a failed multi-step mutation. Nested batches only count
//! depth: their signals always wait for the outermost batch.
//!
//! # Threading
//!
//! Everything here is single-threaded (`Rc` + `RefCell`) and meant for the
//! UI thread. Work finishing on another thread goes through a
//! [`ChangeQueue`](crate::ChangeQueue) instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::signal::ChangeSignal;

/// A subscriber callback.
pub type Callback = Box<dyn Fn(&ChangeSignal)>;

/// A predicate over signals. A subscription fires only if all of its
/// filters match.
pub struct Filter(Box<dyn Fn(&ChangeSignal) -> bool>);

impl Filter {
    pub fn new(predicate: impl Fn(&ChangeSignal) -> bool + 'static) -> Self {
        Self(Box::new(predicate))
    }

    /// Matches signals that [are](crate::is_change) `category`.
    pub fn is(category: &ChangeSignal) -> Self {
        let category = category.clone();
        Self::new(move |change| change.is(&category))
    }

    /// Matches signals that are any of `categories`.
    pub fn any_of(categories: impl IntoIterator<Item = ChangeSignal>) -> Self {
        let categories: Vec<_> = categories.into_iter().collect();
        Self::new(move |change| categories.iter().any(|category| change.is(category)))
    }

    pub fn matches(&self, change: &ChangeSignal) -> bool {
        (self.0)(change)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}

struct Listener {
    filters: Vec<Filter>,
    callback: Callback,
}

impl Listener {
    fn matches(&self, change: &ChangeSignal) -> bool {
        self.filters.iter().all(|filter| filter.matches(change))
    }
}

#[derive(Default)]
struct TargetState {
    /// Sorted by id; ids only grow, so the vector is in subscription order.
    listeners: Vec<(u64, Rc<Listener>)>,
    next_id: u64,
    depth: usize,
    pending: Vec<ChangeSignal>,
}

impl TargetState {
    fn position(&self, id: u64) -> Result<usize, usize> {
        self.listeners.binary_search_by_key(&id, |(listener_id, _)| *listener_id)
    }

    fn contains(&self, id: u64) -> bool {
        self.position(id).is_ok()
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.position(id) {
            Ok(index) => {
                self.listeners.remove(index);
                true
            }
            Err(_) => false,
        }
    }
}

/// An observable change-notification bus.
///
/// `Target` is a cheap handle: clones share the same subscribers and batch
/// state. A model typically stores one and signals through it from its
/// setters.
#[derive(Clone, Default)]
pub struct Target {
    state: Rc<RefCell<TargetState>>,
}

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for every signal matching all `filters`.
    ///
    /// An empty filter list matches every signal. A subscription added while
    /// a signal is being delivered does not receive that signal.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ChangeSignal) + 'static,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((
            id,
            Rc::new(Listener {
                filters: filters.into_iter().collect(),
                callback: Box::new(callback),
            }),
        ));
        log::trace!("Subscribed listener {id} ({} total)", state.listeners.len());
        Subscription {
            target: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Delivers `change` to every matching subscriber, or buffers it while a
    /// batch is open.
    pub fn signal_change(&self, change: &ChangeSignal) {
        {
            let mut state = self.state.borrow_mut();
            if state.depth > 0 {
                state.pending.push(change.clone());
                return;
            }
        }
        self.dispatch(change);
    }

    /// Opens a batch. Batches nest; nested batches only count depth and the
    /// outermost one decides whether subscribers are notified.
    pub fn begin_batch(&self) -> Batch {
        let mut state = self.state.borrow_mut();
        state.depth += 1;
        Batch {
            target: self.clone(),
            level: state.depth,
            finished: false,
        }
    }

    /// Runs `f` inside a batch.
    ///
    /// If `f` succeeds, the batch is committed; if it fails, the batch is
    /// discarded and the error is returned unchanged.
    pub fn accumulate_changes<R, E>(&self, f: impl FnOnce() -> Result<R, E>) -> Result<R, E> {
        let batch = self.begin_batch();
        match f() {
            Ok(value) => {
                batch.commit();
                Ok(value)
            }
            Err(error) => {
                batch.discard();
                Err(error)
            }
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth() > 0
    }

    /// Returns the number of open batches.
    pub fn batch_depth(&self) -> usize {
        self.state.borrow().depth
    }

    fn dispatch(&self, change: &ChangeSignal) {
        // Snapshot so callbacks may subscribe, delete or signal reentrantly.
        let snapshot: Vec<(u64, Rc<Listener>)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .rev()
            .map(|(id, listener)| (*id, listener.clone()))
            .collect();
        log::trace!(
            "Signal '{}' to {} listeners",
            change.description(),
            snapshot.len()
        );

        for (id, listener) in snapshot {
            if !self.state.borrow().contains(id) {
                continue;
            }
            if listener.matches(change) {
                (listener.callback)(change);
            }
        }
    }

    fn end_batch(&self, commit: bool, level: usize) {
        let flushed = {
            let mut state = self.state.borrow_mut();
            debug_assert_eq!(
                state.depth, level,
                "batches must be closed in reverse order of opening"
            );
            state.depth = state.depth.saturating_sub(1);
            // Inner batches leave their signals for the outermost one: the
            // changes they buffered may still be applied to the model.
            if state.depth > 0 {
                return;
            }
            std::mem::take(&mut state.pending)
        };
        if !commit {
            log::trace!("Discarded batch of {} signals", flushed.len());
        } else if !flushed.is_empty() {
            log::trace!("Flushing batch of {} signals", flushed.len());
            self.dispatch(&ChangeSignal::multi(flushed));
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Target")
            .field("subscribers", &state.listeners.len())
            .field("depth", &state.depth)
            .field("pending", &state.pending.len())
            .finish()
    }
}

/// Forwards signals from `parent` into `child`, unchanged.
///
/// Used to propagate a resource's changes into its editor's bus, and the
/// editor's into the application's. The relay holds `child` weakly: once
/// every handle to the child is dropped, forwarding stops.
pub fn wire_targets(
    parent: &Target,
    child: &Target,
    filters: impl IntoIterator<Item = Filter>,
) -> Subscription {
    let child = Rc::downgrade(&child.state);
    parent.subscribe(
        move |change| {
            if let Some(state) = child.upgrade() {
                Target { state }.signal_change(change);
            }
        },
        filters,
    )
}

/// A registered (filters, callback) pair on a [`Target`].
///
/// Dropping a `Subscription` does **not** unsubscribe; call
/// [`delete`](Self::delete), or convert it into a
/// [`ScopedSubscription`](crate::ScopedSubscription).
#[must_use = "the subscription stays registered until `delete` is called"]
pub struct Subscription {
    target: Weak<RefCell<TargetState>>,
    id: u64,
}

impl Subscription {
    /// Unregisters the callback.
    ///
    /// No invocation happens after this returns, including when called from
    /// inside a callback of the same target. Deleting twice is a no-op.
    pub fn delete(&self) {
        if let Some(state) = self.target.upgrade()
            && state.borrow_mut().remove(self.id)
        {
            log::trace!("Deleted listener {}", self.id);
        }
    }

    /// Returns `true` until the subscription is deleted or its target dropped.
    pub fn is_active(&self) -> bool {
        self.target
            .upgrade()
            .is_some_and(|state| state.borrow().contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Scope guard returned by [`Target::begin_batch`].
///
/// Must be closed with [`commit`](Self::commit) or
/// [`discard`](Self::discard). Dropping it unclosed discards, so an early
/// return or a panic never leaks a half-finished batch to subscribers.
/// Batches must be closed in reverse order of opening; debug builds assert
/// it. Only the outermost batch's choice matters: an inner discard keeps its
/// signals for the enclosing batch.
#[must_use = "an unclosed batch discards its signals when dropped"]
pub struct Batch {
    target: Target,
    level: usize,
    finished: bool,
}

impl Batch {
    /// Closes the batch. If it is the outermost one, subscribers receive a
    /// single multi signal with everything buffered.
    pub fn commit(mut self) {
        self.finished = true;
        self.target.end_batch(true, self.level);
    }

    /// Closes the batch. If it is the outermost one, everything buffered is
    /// dropped without notifying.
    pub fn discard(mut self) {
        self.finished = true;
        self.target.end_batch(false, self.level);
    }
}

impl Drop for Batch {
    fn drop(&mut self) {
        if !self.finished {
            self.target.end_batch(false, self.level);
        }
    }
}

impl fmt::Debug for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch").field("level", &self.level).finish()
    }
}
