//! Unsubscribe handles returned by the dispatcher

use super::key::EventKey;
use super::listener::ListenerId;
use std::fmt;
use std::sync::Weak;

/// Removal side of a registry, independent of its payload type
pub(crate) trait Detach: Send + Sync {
    /// Remove the listener `id` under `key`, pruning the key if it empties.
    /// Returns false when nothing matched.
    fn detach(&self, key: &EventKey, id: ListenerId) -> bool;

    fn contains(&self, key: &EventKey, id: ListenerId) -> bool;
}

/// Handle for exactly one listener record.
///
/// [`unsubscribe`](Self::unsubscribe) is idempotent: only the first call that
/// finds the record removes anything. Dropping the handle does NOT
/// unsubscribe; use [`guard`](Self::guard) for that. The handle keeps only a
/// weak reference, so it never extends the dispatcher's lifetime.
#[derive(Clone)]
pub struct Subscription {
    key: EventKey,
    id: ListenerId,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub(crate) fn new(key: EventKey, id: ListenerId, registry: Weak<dyn Detach>) -> Self {
        Self { key, id, registry }
    }

    pub fn key(&self) -> &EventKey {
        &self.key
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered.
    ///
    /// False once unsubscribed, removed by `off`/`clear`, consumed as a once
    /// listener, or when the dispatcher is gone.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(&self.key, self.id))
    }

    /// Remove this listener. Returns true only if this call removed it.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.detach(&self.key, self.id),
            None => false,
        }
    }

    /// Turn the handle into a guard that unsubscribes when dropped
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard { subscription: self }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

/// Unsubscribes its listener on drop
#[derive(Debug)]
#[must_use = "dropping the guard immediately unsubscribes the listener"]
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
