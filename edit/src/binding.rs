//! Scoped subscriptions for view components.
//!
//! A view subscribes when it mounts and must unsubscribe when it unmounts.
//! [`ScopedSubscription`] ties the second step to `Drop`, so a view only
//! has to keep the guard in its state.

use std::fmt;

use crate::signal::ChangeSignal;
use crate::target::{Filter, Subscription, Target};

/// A [`Subscription`] that is deleted when dropped.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct ScopedSubscription {
    inner: Subscription,
}

impl ScopedSubscription {
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        self.inner.delete();
    }
}

impl fmt::Debug for ScopedSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedSubscription").field(&self.inner).finish()
    }
}

impl Subscription {
    /// Converts into a guard that unsubscribes on drop.
    pub fn scoped(self) -> ScopedSubscription {
        ScopedSubscription { inner: self }
    }
}

impl Target {
    /// Subscribes for the lifetime of the returned guard.
    ///
    /// ```ignore
    /// struct WrapInspector {
    ///     _binding: ScopedSubscription,
    /// }
    ///
    /// impl WrapInspector {
    ///     fn mount(texture: &Target, redraw: Redraw) -> Self {
    ///         let _binding = texture.bind(move |_| redraw.request(), [Filter::is(&WRAP)]);
    ///         Self { _binding }
    ///     }
    /// }
    /// ```
    pub fn bind(
        &self,
        callback: impl Fn(&ChangeSignal) + 'static,
        filters: impl IntoIterator<Item = Filter>,
    ) -> ScopedSubscription {
        self.subscribe(callback, filters).scoped()
    }
}
