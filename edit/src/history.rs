//! Bounded linear undo/redo history.
//!
//! [`History`] keeps the applied changes of one document, oldest first, plus
//! a cursor counting how many of the newest entries are currently undone.
//! Adding a change after undoing discards the undone tail, so the history is
//! always a single line, never a tree.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::change::{Change, ChangeError, ChangeResult, Editable};
use crate::config::HistoryConfig;

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Identity of a recorded change.
///
/// Every change accepted by [`History::add`] gets a fresh id. Ids are never
/// reused, so a stored id compares equal to [`History::last_change`] only
/// while that very entry is the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeId(u64);

static NEXT_CHANGE_ID: AtomicU64 = AtomicU64::new(1);

impl ChangeId {
    fn next() -> Self {
        Self(NEXT_CHANGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where the document was when it was last saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavePoint {
    /// The head at save time (`None` = nothing applied yet).
    At(Option<ChangeId>),
    /// The saved state can no longer be reached by undo/redo.
    Lost,
}

struct Entry<T: Editable> {
    id: ChangeId,
    change: Box<dyn Change<T>>,
}

/// Manages the undo/redo log of one document.
///
/// Entries live in a bounded [`VecDeque`], oldest at the front. When adding
/// pushes the log past its capacity, the oldest entry is dropped.
///
/// `undo_depth` is the number of newest entries that are currently
/// reverted: `0` means nothing to redo, `len()` means nothing to undo.
///
/// # Example
///
/// ```ignore
/// let mut history = History::new(50);
/// let mut texture = TextureAsset::new();
///
/// history.add(Box::new(set_wrap), &mut texture)?;
/// history.undo(&mut texture)?;
/// history.redo(&mut texture)?;
/// ```
pub struct History<T: Editable> {
    entries: VecDeque<Entry<T>>,
    undo_depth: usize,
    capacity: usize,
    saved: SavePoint,
}

impl<T: Editable> History<T> {
    /// Creates an empty history holding at most `capacity` changes.
    ///
    /// A capacity of `0` is treated as `1`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            undo_depth: 0,
            capacity,
            saved: SavePoint::At(None),
        }
    }

    pub fn with_config(config: &HistoryConfig) -> Self {
        Self::new(config.max_undo)
    }

    /// Applies a change to the target and records it as the new head.
    ///
    /// Any undone entries are discarded first. If the history is full, the
    /// oldest entry is evicted.
    ///
    /// If the change fails to apply, it is not recorded and the history is
    /// left untouched.
    pub fn add(
        &mut self,
        mut change: Box<dyn Change<T>>,
        target: &mut T,
    ) -> ChangeResult<ChangeId> {
        change.apply(target)?;

        if self.undo_depth > 0 {
            let keep = self.entries.len() - self.undo_depth;
            self.entries.truncate(keep);
            log::debug!("Discarded {} redo entries", self.undo_depth);
            self.undo_depth = 0;
        }

        let id = ChangeId::next();
        log::debug!("Recorded change: {}", change.description());
        self.entries.push_back(Entry { id, change });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("Evicted oldest change: {}", evicted.change.description());
                // The evicted change stays applied, so neither the empty head
                // nor the evicted head describes the saved state any more.
                if matches!(self.saved, SavePoint::At(None))
                    || self.saved == SavePoint::At(Some(evicted.id))
                {
                    self.saved = SavePoint::Lost;
                }
            }
        }
        Ok(id)
    }

    /// Reverts the head change.
    ///
    /// Returns [`ChangeError::NothingToUndo`] if every entry is already
    /// undone. If the revert fails, the cursor stays where it was so the
    /// undo can be retried.
    pub fn undo(&mut self, target: &mut T) -> ChangeResult {
        let index = self.head_index().ok_or(ChangeError::NothingToUndo)?;
        let entry = &mut self.entries[index];
        entry.change.revert(target)?;
        log::debug!("Undo: {}", entry.change.description());
        self.undo_depth += 1;
        Ok(())
    }

    /// Re-applies the most recently undone change.
    ///
    /// Returns [`ChangeError::NothingToRedo`] if nothing is undone. If the
    /// apply fails, the cursor stays where it was.
    pub fn redo(&mut self, target: &mut T) -> ChangeResult {
        if self.undo_depth == 0 {
            return Err(ChangeError::NothingToRedo);
        }
        let index = self.entries.len() - self.undo_depth;
        let entry = &mut self.entries[index];
        entry.change.apply(target)?;
        log::debug!("Redo: {}", entry.change.description());
        self.undo_depth -= 1;
        Ok(())
    }

    /// Returns `true` if there are changes that can be undone.
    pub fn can_undo(&self) -> bool {
        self.undo_depth < self.entries.len()
    }

    /// Returns `true` if there are changes that can be redone.
    pub fn can_redo(&self) -> bool {
        self.undo_depth > 0
    }

    /// Identity of the head change, or `None` if nothing is applied.
    ///
    /// Documents use this as a dirty marker: see [`save`](Self::save) and
    /// [`can_save`](Self::can_save).
    pub fn last_change(&self) -> Option<ChangeId> {
        self.head_index().map(|index| self.entries[index].id)
    }

    /// Records the current head as the saved state.
    pub fn save(&mut self) {
        self.saved = SavePoint::At(self.last_change());
    }

    /// Returns `true` if the current head differs from the one recorded by
    /// the last [`save`](Self::save).
    ///
    /// A fresh history counts as saved. Undoing back to the saved head makes
    /// this `false` again.
    pub fn can_save(&self) -> bool {
        match self.saved {
            SavePoint::At(head) => head != self.last_change(),
            SavePoint::Lost => true,
        }
    }

    /// Returns an iterator over undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .take(self.entries.len() - self.undo_depth)
            .rev()
            .map(|entry| entry.change.description())
    }

    /// Returns an iterator over redo descriptions, next to redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .skip(self.entries.len() - self.undo_depth)
            .map(|entry| entry.change.description())
    }

    /// Returns the number of changes that can be undone.
    pub fn undo_count(&self) -> usize {
        self.entries.len() - self.undo_depth
    }

    /// Returns the number of changes that can be redone.
    pub fn redo_count(&self) -> usize {
        self.undo_depth
    }

    /// Returns the number of recorded changes, undone ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of recorded changes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry.
    ///
    /// If the current state was the saved state, it remains so after
    /// clearing. Otherwise the save point is permanently lost.
    pub fn clear(&mut self) {
        let was_saved = !self.can_save();
        self.entries.clear();
        self.undo_depth = 0;
        self.saved = if was_saved {
            SavePoint::At(None)
        } else {
            SavePoint::Lost
        };
    }

    fn head_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(self.undo_depth + 1)
    }
}

impl<T: Editable> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.entries.len())
            .field("undo_depth", &self.undo_depth)
            .field("capacity", &self.capacity)
            .field("saved", &self.saved)
            .finish()
    }
}
