//! Editable targets and reversible changes.
//!
//! This module defines the core abstractions of the undo/redo layer:
//!
//! - [`Editable`] — marker trait for types that can be edited
//! - [`Change`] — a reversible unit of edit (Command pattern)
//! - [`FnChange`], [`PropertyChange`], [`CombinedChange`] — the standard
//!   constructors controllers use when wrapping model setters
//! - [`ChangeError`] / [`ChangeResult`] — error handling for changes
//!
//! Changes are self-contained: each implementation stores whatever data it
//! needs (old/new values, indices, pixel data, etc.) and receives the model
//! as `&mut T` when applied or reverted.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for types that serve as editing targets.
///
/// Implement this on any model a document edits — a texture description,
/// a cube map, a binary blob, a scene graph.
///
/// ```ignore
/// struct TextureAsset { /* ... */ }
/// impl Editable for TextureAsset {}
/// ```
pub trait Editable: 'static {}

/// Error type for change execution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    /// [`History::undo`](crate::History::undo) was called with nothing left to undo.
    #[error("nothing to undo")]
    NothingToUndo,
    /// [`History::redo`](crate::History::redo) was called with nothing left to redo.
    #[error("nothing to redo")]
    NothingToRedo,
    /// The object the change refers to was not found.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in an invalid state for this change.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
    /// A combined change failed and restoring its members failed as well.
    ///
    /// The model is left partially changed.
    #[error("{cause} (rollback failed: {rollback})")]
    RollbackFailed {
        cause: Box<ChangeError>,
        rollback: Box<ChangeError>,
    },
}

impl ChangeError {
    /// Returns `true` for the "nothing to undo/redo" errors.
    ///
    /// These leave every state untouched and are usually not worth
    /// showing to the user.
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

/// Result type for change operations.
pub type ChangeResult<T = ()> = Result<T, ChangeError>;

/// A reversible edit (Command pattern).
///
/// A change captures enough state to move the model forward
/// ([`apply`](Self::apply)) and back ([`revert`](Self::revert)). For a given
/// captured before/after pair, `apply` followed by `revert` must restore the
/// pre-apply state exactly, and `revert` followed by `apply` must restore the
/// post-apply state exactly.
///
/// Both directions are expected to be fast and synchronous. Work that needs
/// a thread (disk I/O, encoding) happens outside the change; its result is
/// pushed back through a [`ChangeQueue`](crate::ChangeQueue).
///
/// # Object Safety
///
/// The trait is dyn-compatible so that different change types can share one
/// [`History`](crate::History) as `Box<dyn Change<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct SetWrap {
///     old: WrapMode,
///     new: WrapMode,
/// }
///
/// impl Change<TextureAsset> for SetWrap {
///     fn apply(&mut self, target: &mut TextureAsset) -> ChangeResult {
///         target.set_wrap(self.new);
///         Ok(())
///     }
///
///     fn revert(&mut self, target: &mut TextureAsset) -> ChangeResult {
///         target.set_wrap(self.old);
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Set wrap mode"
///     }
/// }
/// ```
pub trait Change<T: Editable>: fmt::Debug + Send {
    /// Applies the change to the target (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> ChangeResult;

    /// Reverses the change (undo direction).
    ///
    /// Must restore the target to the state before [`apply`](Self::apply)
    /// was called.
    fn revert(&mut self, target: &mut T) -> ChangeResult;

    /// A short, human-readable description for history panels and menus.
    fn description(&self) -> &str {
        "Change"
    }
}

/// A change built from two closures.
///
/// ```ignore
/// let change = FnChange::new(
///     |t: &mut TextureAsset| t.set_width(512),
///     |t: &mut TextureAsset| t.set_width(256),
/// )
/// .named("Resize texture");
/// ```
pub struct FnChange<T, A, R> {
    apply: A,
    revert: R,
    description: Cow<'static, str>,
    _target: PhantomData<fn(&mut T)>,
}

impl<T, A, R> FnChange<T, A, R>
where
    T: Editable,
    A: FnMut(&mut T) -> ChangeResult + Send + 'static,
    R: FnMut(&mut T) -> ChangeResult + Send + 'static,
{
    /// Creates a change that runs `apply` forward and `revert` backward.
    pub fn new(apply: A, revert: R) -> Self {
        Self {
            apply,
            revert,
            description: Cow::Borrowed("Change"),
            _target: PhantomData,
        }
    }

    /// Sets the description shown in the history panel.
    pub fn named(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }
}

impl<T, A, R> Change<T> for FnChange<T, A, R>
where
    T: Editable,
    A: FnMut(&mut T) -> ChangeResult + Send + 'static,
    R: FnMut(&mut T) -> ChangeResult + Send + 'static,
{
    fn apply(&mut self, target: &mut T) -> ChangeResult {
        (self.apply)(target)
    }

    fn revert(&mut self, target: &mut T) -> ChangeResult {
        (self.revert)(target)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<T, A, R> fmt::Debug for FnChange<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnChange")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`FnChange::new`], boxed for [`History::add`](crate::History::add).
pub fn func_change<T, A, R>(apply: A, revert: R) -> Box<dyn Change<T>>
where
    T: Editable,
    A: FnMut(&mut T) -> ChangeResult + Send + 'static,
    R: FnMut(&mut T) -> ChangeResult + Send + 'static,
{
    Box::new(FnChange::new(apply, revert))
}

/// Sets a single model property from `old` to `new` through a setter.
///
/// This is the "set wrap mode from X to Y" change controllers build for
/// every inspector field.
pub struct PropertyChange<T, V> {
    description: Cow<'static, str>,
    setter: fn(&mut T, V) -> ChangeResult,
    old: V,
    new: V,
}

impl<T: Editable, V: Clone + fmt::Debug + Send + 'static> PropertyChange<T, V> {
    pub fn new(
        description: impl Into<Cow<'static, str>>,
        setter: fn(&mut T, V) -> ChangeResult,
        old: V,
        new: V,
    ) -> Self {
        Self {
            description: description.into(),
            setter,
            old,
            new,
        }
    }

    /// The value restored by [`Change::revert`].
    pub fn old_value(&self) -> &V {
        &self.old
    }

    /// The value written by [`Change::apply`].
    pub fn new_value(&self) -> &V {
        &self.new
    }
}

impl<T: Editable, V: Clone + fmt::Debug + Send + 'static> Change<T> for PropertyChange<T, V> {
    fn apply(&mut self, target: &mut T) -> ChangeResult {
        (self.setter)(target, self.new.clone())
    }

    fn revert(&mut self, target: &mut T) -> ChangeResult {
        (self.setter)(target, self.old.clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<T, V: fmt::Debug> fmt::Debug for PropertyChange<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChange")
            .field("description", &self.description)
            .field("old", &self.old)
            .field("new", &self.new)
            .finish()
    }
}

/// Several changes recorded as one undo step.
///
/// Members are applied in order and reverted in reverse order. The
/// composite is atomic: if a member fails, the members already processed
/// are restored before the error is returned, so the model ends up exactly
/// where it started. If that restoration fails too, the result is
/// [`ChangeError::RollbackFailed`].
pub struct CombinedChange<T: Editable> {
    changes: Vec<Box<dyn Change<T>>>,
    description: Cow<'static, str>,
}

impl<T: Editable> CombinedChange<T> {
    pub fn new(changes: Vec<Box<dyn Change<T>>>) -> Self {
        Self {
            changes,
            description: Cow::Borrowed("Multiple changes"),
        }
    }

    /// Sets the description shown in the history panel.
    pub fn named(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a member; it will be applied after the existing ones.
    pub fn push(&mut self, change: Box<dyn Change<T>>) {
        self.changes.push(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl<T: Editable> fmt::Debug for CombinedChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedChange")
            .field("description", &self.description)
            .field("changes", &self.changes)
            .finish()
    }
}

impl<T: Editable> Change<T> for CombinedChange<T> {
    fn apply(&mut self, target: &mut T) -> ChangeResult {
        for index in 0..self.changes.len() {
            if let Err(cause) = self.changes[index].apply(target) {
                for applied in self.changes[..index].iter_mut().rev() {
                    if let Err(rollback) = applied.revert(target) {
                        return Err(ChangeError::RollbackFailed {
                            cause: Box::new(cause),
                            rollback: Box::new(rollback),
                        });
                    }
                }
                return Err(cause);
            }
        }
        Ok(())
    }

    fn revert(&mut self, target: &mut T) -> ChangeResult {
        for index in (0..self.changes.len()).rev() {
            if let Err(cause) = self.changes[index].revert(target) {
                for reverted in self.changes[index + 1..].iter_mut() {
                    if let Err(rollback) = reverted.apply(target) {
                        return Err(ChangeError::RollbackFailed {
                            cause: Box::new(cause),
                            rollback: Box::new(rollback),
                        });
                    }
                }
                return Err(cause);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
