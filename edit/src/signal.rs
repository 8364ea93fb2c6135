//! Change signals and their taxonomy.
//!
//! A [`ChangeSignal`] is the value a [`Target`](crate::Target) broadcasts
//! when its model changes. Signals compare by identity, and a signal can
//! describe which broader category it belongs to:
//!
//! - [`ChangeKind::Leaf`] — a plain category or event
//! - [`ChangeKind::Extended`] — a leaf tagged with a parent category
//! - [`ChangeKind::Multi`] — a batch of signals flushed by an accumulation
//!
//! [`is_change`] walks these links, so a subscriber filtering on a coarse
//! category ("any wrapping change") sees every finer signal chained to it
//! without a central list of leaf variants.
//!
//! ```ignore
//! static WRAP: LazyLock<ChangeSignal> = LazyLock::new(|| ChangeSignal::leaf("wrap"));
//! static WRAP_S: LazyLock<ChangeSignal> =
//!     LazyLock::new(|| ChangeSignal::extended(&WRAP, "wrap s"));
//!
//! assert!(is_change(&WRAP_S, &WRAP));
//! assert!(!is_change(&WRAP, &WRAP_S));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The shape of a [`ChangeSignal`].
#[derive(Debug)]
pub enum ChangeKind {
    /// A signal with only a description.
    Leaf { description: Cow<'static, str> },
    /// A signal that also "is" its parent (and the parent's ancestors).
    Extended {
        parent: ChangeSignal,
        description: Cow<'static, str>,
    },
    /// Several signals delivered as one. "Is" anything any member is.
    Multi { members: Vec<ChangeSignal> },
}

/// A shared, identity-compared change signal.
///
/// Cloning is cheap and keeps the identity: clones compare equal, while two
/// signals built separately never do, even with the same description.
#[derive(Clone)]
pub struct ChangeSignal(Arc<ChangeKind>);

impl ChangeSignal {
    /// Creates a leaf signal.
    pub fn leaf(description: impl Into<Cow<'static, str>>) -> Self {
        Self(Arc::new(ChangeKind::Leaf {
            description: description.into(),
        }))
    }

    /// Creates a signal belonging to the `parent` category.
    pub fn extended(parent: &ChangeSignal, description: impl Into<Cow<'static, str>>) -> Self {
        Self(Arc::new(ChangeKind::Extended {
            parent: parent.clone(),
            description: description.into(),
        }))
    }

    /// Bundles several signals into one.
    pub fn multi(members: Vec<ChangeSignal>) -> Self {
        Self(Arc::new(ChangeKind::Multi { members }))
    }

    pub fn kind(&self) -> &ChangeKind {
        &self.0
    }

    pub fn description(&self) -> &str {
        match self.kind() {
            ChangeKind::Leaf { description } | ChangeKind::Extended { description, .. } => {
                description
            }
            ChangeKind::Multi { .. } => "multiple changes",
        }
    }

    /// The broader category this signal belongs to, if any.
    pub fn parent(&self) -> Option<&ChangeSignal> {
        match self.kind() {
            ChangeKind::Extended { parent, .. } => Some(parent),
            _ => None,
        }
    }

    /// The bundled signals of a multi signal; empty for other kinds.
    pub fn members(&self) -> &[ChangeSignal] {
        match self.kind() {
            ChangeKind::Multi { members } => members,
            _ => &[],
        }
    }

    /// Returns `true` if both handles refer to the same signal.
    pub fn same(&self, other: &ChangeSignal) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Shorthand for [`is_change(self, target)`](is_change).
    pub fn is(&self, target: &ChangeSignal) -> bool {
        is_change(self, target)
    }
}

impl PartialEq for ChangeSignal {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for ChangeSignal {}

impl fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ChangeKind::Leaf { description } => f.debug_tuple("Leaf").field(description).finish(),
            ChangeKind::Extended {
                parent,
                description,
            } => f
                .debug_struct("Extended")
                .field("description", description)
                .field("parent", parent)
                .finish(),
            ChangeKind::Multi { members } => f.debug_tuple("Multi").field(members).finish(),
        }
    }
}

/// Returns `true` if `change` is `target` or belongs to it.
///
/// Resolution order: identity, then multi members (any member that is the
/// target), then the parent chain. The relation is not symmetric: a leaf is
/// its ancestor categories, never the reverse.
pub fn is_change(change: &ChangeSignal, target: &ChangeSignal) -> bool {
    let mut current = change;
    loop {
        if current.same(target) {
            return true;
        }
        match current.kind() {
            ChangeKind::Leaf { .. } => return false,
            ChangeKind::Extended { parent, .. } => current = parent,
            ChangeKind::Multi { members } => {
                return members.iter().any(|member| is_change(member, target));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity() {
        let a = ChangeSignal::leaf("width");
        let b = ChangeSignal::leaf("width");

        assert!(is_change(&a, &a));
        assert!(is_change(&a, &a.clone()));
        assert!(!is_change(&a, &b));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn extended_is_parent_not_reverse() {
        let parent = ChangeSignal::leaf("wrap");
        let leaf = ChangeSignal::extended(&parent, "wrap s");

        assert!(is_change(&leaf, &parent));
        assert!(!is_change(&parent, &leaf));
        assert_eq!(leaf.parent(), Some(&parent));
        assert_eq!(parent.parent(), None);
    }

    #[test]
    fn extended_chain_reaches_ancestors() {
        let sampler = ChangeSignal::leaf("sampler");
        let wrap = ChangeSignal::extended(&sampler, "wrap");
        let wrap_t = ChangeSignal::extended(&wrap, "wrap t");
        let filter = ChangeSignal::extended(&sampler, "filter");

        assert!(wrap_t.is(&wrap));
        assert!(wrap_t.is(&sampler));
        assert!(!wrap_t.is(&filter));
        assert!(!sampler.is(&wrap_t));
    }

    #[test]
    fn multi_is_any_member() {
        let width = ChangeSignal::leaf("width");
        let height = ChangeSignal::leaf("height");
        let format = ChangeSignal::leaf("format");
        let wrap = ChangeSignal::leaf("wrap");
        let wrap_s = ChangeSignal::extended(&wrap, "wrap s");

        let batch = ChangeSignal::multi(vec![width.clone(), wrap_s]);

        assert!(batch.is(&width));
        assert!(batch.is(&wrap));
        assert!(!batch.is(&height));
        assert!(!batch.is(&format));
        assert!(!width.is(&batch));
        assert!(batch.is(&batch));
    }

    #[test]
    fn nested_multi() {
        let width = ChangeSignal::leaf("width");
        let inner = ChangeSignal::multi(vec![width.clone()]);
        let outer = ChangeSignal::multi(vec![inner.clone()]);

        assert!(outer.is(&width));
        assert!(outer.is(&inner));
    }

    #[test]
    fn empty_multi_matches_only_itself() {
        let width = ChangeSignal::leaf("width");
        let empty = ChangeSignal::multi(Vec::new());

        assert!(!empty.is(&width));
        assert!(empty.is(&empty));
        assert!(empty.members().is_empty());
    }

    #[test]
    fn descriptions() {
        let wrap = ChangeSignal::leaf("wrap");
        let wrap_s = ChangeSignal::extended(&wrap, String::from("wrap s"));
        let batch = ChangeSignal::multi(vec![wrap.clone(), wrap_s.clone()]);

        assert_eq!(wrap.description(), "wrap");
        assert_eq!(wrap_s.description(), "wrap s");
        assert_eq!(batch.description(), "multiple changes");
        assert_eq!(batch.members(), &[wrap, wrap_s]);
    }

    #[test]
    fn debug_shows_kind() {
        let wrap = ChangeSignal::leaf("wrap");
        let wrap_s = ChangeSignal::extended(&wrap, "wrap s");
        let debug = format!("{:?}", ChangeSignal::multi(vec![wrap_s]));
        assert!(debug.contains("Multi"));
        assert!(debug.contains("Extended"));
        assert!(debug.contains("wrap s"));
    }
}
