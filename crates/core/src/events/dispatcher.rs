//! Synchronous in-process publish/subscribe dispatcher
//!
//! Listeners are grouped by [`EventKey`] and delivered to in registration
//! order. Delivery semantics:
//!   - `emit` snapshots the key's listeners before calling any of them, so a
//!     listener added during emission waits for the next emit and a listener
//!     removed during emission is still called in the current round.
//!   - A failing listener (returned error or caught panic) is reported and
//!     delivery continues with the next one.
//!   - Once listeners are removed after the whole delivery pass.
//!
//! The registry sits behind a single `parking_lot::Mutex` that is never held
//! while a callback runs, so callbacks may subscribe, unsubscribe or emit
//! re-entrantly.

use super::config::DispatcherConfig;
use super::key::EventKey;
use super::listener::{Callback, Context, Listener, ListenerId};
use super::reporter::{FailureKind, FailureReporter, ListenerFailure, TracingReporter};
use super::subscription::{Detach, Subscription};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type Registry<P> = IndexMap<EventKey, Vec<Arc<Listener<P>>>>;

struct Shared<P> {
    registry: Mutex<Registry<P>>,
    next_id: AtomicU64,
    config: DispatcherConfig,
    reporter: Arc<dyn FailureReporter>,
}

impl<P> Shared<P> {
    /// Remove every listener under `key` matching `predicate` and prune the
    /// key if it ends up empty. Returns the number removed.
    fn remove_where(&self, key: &EventKey, mut predicate: impl FnMut(&Listener<P>) -> bool) -> usize {
        let mut registry = self.registry.lock();
        let Some(listeners) = registry.get_mut(key) else {
            return 0;
        };
        let before = listeners.len();
        listeners.retain(|listener| !predicate(&**listener));
        let removed = before - listeners.len();
        if listeners.is_empty() {
            registry.shift_remove(key);
        }
        removed
    }
}

impl<P> Detach for Shared<P> {
    fn detach(&self, key: &EventKey, id: ListenerId) -> bool {
        let removed = self.remove_where(key, |listener| listener.id == id) > 0;
        if removed {
            debug!(
                dispatcher = %self.config.name,
                event_key = %key,
                listener_id = id,
                "Event listener unsubscribed"
            );
        }
        removed
    }

    fn contains(&self, key: &EventKey, id: ListenerId) -> bool {
        self.registry
            .lock()
            .get(key)
            .is_some_and(|listeners| listeners.iter().any(|listener| listener.id == id))
    }
}

/// Removes the once listeners claimed during one `emit` pass
struct OnceCleanup<'a, P> {
    shared: &'a Shared<P>,
    key: &'a EventKey,
    consumed: Vec<ListenerId>,
}

impl<P> Drop for OnceCleanup<'_, P> {
    fn drop(&mut self) {
        if self.consumed.is_empty() {
            return;
        }
        let consumed = &self.consumed;
        self.shared
            .remove_where(self.key, |listener| consumed.contains(&listener.id));
    }
}

/// In-process event dispatcher.
///
/// `P` is the payload type; it defaults to `serde_json::Value` for callers
/// that want untyped payloads. Clones share one registry.
pub struct Dispatcher<P = serde_json::Value> {
    shared: Arc<Shared<P>>,
}

impl<P: 'static> Dispatcher<P> {
    /// Create a dispatcher with the default configuration
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher that logs failures through `tracing`
    pub fn with_config(config: DispatcherConfig) -> Self {
        let reporter = Arc::new(TracingReporter::new(config.failure_level));
        Self::with_reporter(config, reporter)
    }

    /// Create a dispatcher with a custom failure reporter
    pub fn with_reporter(config: DispatcherConfig, reporter: Arc<dyn FailureReporter>) -> Self {
        debug!(
            dispatcher = %config.name,
            reporter = reporter.name(),
            catch_panics = config.catch_panics,
            "Event dispatcher created"
        );
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(IndexMap::new()),
                next_id: AtomicU64::new(1),
                config,
                reporter,
            }),
        }
    }

    /// Configuration this dispatcher was built with
    pub fn config(&self) -> &DispatcherConfig {
        &self.shared.config
    }

    /// Register a persistent listener under `key`
    pub fn subscribe(
        &self,
        key: impl Into<EventKey>,
        callback: Callback<P>,
        context: Option<Context>,
    ) -> Subscription {
        self.register(key.into(), callback, context, false)
    }

    /// Register a listener that is removed after its first delivery
    pub fn subscribe_once(
        &self,
        key: impl Into<EventKey>,
        callback: Callback<P>,
        context: Option<Context>,
    ) -> Subscription {
        self.register(key.into(), callback, context, true)
    }

    /// Subscribe an unbound, infallible payload closure
    pub fn on<F>(&self, key: impl Into<EventKey>, callback: F) -> Subscription
    where
        F: Fn(Option<&P>) + Send + Sync + 'static,
    {
        self.subscribe(key, Callback::payload_only(callback), None)
    }

    /// Once-only form of [`on`](Self::on)
    pub fn once<F>(&self, key: impl Into<EventKey>, callback: F) -> Subscription
    where
        F: Fn(Option<&P>) + Send + Sync + 'static,
    {
        self.subscribe_once(key, Callback::payload_only(callback), None)
    }

    fn register(
        &self,
        key: EventKey,
        callback: Callback<P>,
        context: Option<Context>,
        once: bool,
    ) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let listener = Arc::new(Listener::new(id, callback, context, once));
        let count = {
            let mut registry = self.shared.registry.lock();
            let listeners = registry.entry(key.clone()).or_default();
            listeners.push(listener);
            listeners.len()
        };
        debug!(
            dispatcher = %self.shared.config.name,
            event_key = %key,
            listener_id = id,
            once,
            listeners = count,
            "Event listener subscribed"
        );
        let registry = Arc::downgrade(&self.shared);
        let registry: Weak<dyn Detach> = registry;
        Subscription::new(key, id, registry)
    }

    /// Deliver `payload` to every listener currently registered under `key`.
    ///
    /// Never fails: emitting to a key without listeners does nothing, and
    /// listener failures go to the reporter.
    pub fn emit<'a>(&self, key: impl Into<EventKey>, payload: impl Into<Option<&'a P>>) {
        let key = key.into();
        let payload = payload.into();

        let snapshot: Vec<Arc<Listener<P>>> = {
            let registry = self.shared.registry.lock();
            match registry.get(&key) {
                Some(listeners) => listeners.clone(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!(
                dispatcher = %self.shared.config.name,
                event_key = %key,
                "No listeners for event"
            );
            return;
        }

        // Claimed once listeners are removed when this guard drops, which
        // also happens when a listener panic unwinds out of `emit`.
        let mut cleanup = OnceCleanup {
            shared: &self.shared,
            key: &key,
            consumed: Vec::new(),
        };
        let mut delivered = 0usize;
        let mut failed = 0usize;

        for listener in &snapshot {
            // A once listener already claimed by a re-entrant emit is skipped.
            if !listener.claim() {
                continue;
            }
            if listener.once {
                cleanup.consumed.push(listener.id);
            }
            delivered += 1;

            if let Err(kind) = self.invoke(listener, payload) {
                failed += 1;
                self.shared.reporter.report(&ListenerFailure {
                    dispatcher: self.shared.config.name.clone(),
                    key: key.clone(),
                    listener_id: listener.id,
                    kind,
                });
            }
        }

        let once_removed = cleanup.consumed.len();
        drop(cleanup);

        trace!(
            dispatcher = %self.shared.config.name,
            event_key = %key,
            listeners_notified = delivered,
            listeners_failed = failed,
            once_removed,
            "Event emitted"
        );
    }

    fn invoke(&self, listener: &Listener<P>, payload: Option<&P>) -> Result<(), FailureKind> {
        let call = || listener.callback.call(listener.context.as_ref(), payload);
        if self.shared.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(call)) {
                Ok(result) => result.map_err(FailureKind::Returned),
                Err(panic) => Err(FailureKind::from_panic(panic)),
            }
        } else {
            call().map_err(FailureKind::Returned)
        }
    }

    /// Remove listeners under `key`.
    ///
    /// - no `callback`: every listener under `key` (any `context` is ignored)
    /// - `callback` only: every listener with that callback, whatever its context
    /// - `callback` and `context`: only listeners bound to exactly that pair
    ///
    /// Returns the number of listeners removed.
    pub fn off(
        &self,
        key: impl Into<EventKey>,
        callback: Option<&Callback<P>>,
        context: Option<&Context>,
    ) -> usize {
        let key = key.into();
        let removed = match callback {
            None => self.take_key(&key),
            Some(callback) => self
                .shared
                .remove_where(&key, |listener| listener.matches(callback, context)),
        };
        if removed > 0 {
            debug!(
                dispatcher = %self.shared.config.name,
                event_key = %key,
                removed,
                "Event listeners removed"
            );
        }
        removed
    }

    /// Remove `key` and all its listeners. Returns the number removed.
    pub fn clear_key(&self, key: impl Into<EventKey>) -> usize {
        let key = key.into();
        let removed = self.take_key(&key);
        if removed > 0 {
            debug!(
                dispatcher = %self.shared.config.name,
                event_key = %key,
                removed,
                "Event key cleared"
            );
        }
        removed
    }

    /// Remove every key and every listener
    pub fn clear(&self) {
        let keys = {
            let mut registry = self.shared.registry.lock();
            let keys = registry.len();
            registry.clear();
            keys
        };
        debug!(
            dispatcher = %self.shared.config.name,
            keys,
            "Event dispatcher cleared"
        );
    }

    fn take_key(&self, key: &EventKey) -> usize {
        self.shared
            .registry
            .lock()
            .shift_remove(key)
            .map_or(0, |listeners| listeners.len())
    }

    /// Number of listeners currently registered under `key`
    pub fn listener_count(&self, key: impl Into<EventKey>) -> usize {
        let key = key.into();
        self.shared.registry.lock().get(&key).map_or(0, Vec::len)
    }

    /// Whether `key` has at least one listener
    pub fn has_listeners(&self, key: impl Into<EventKey>) -> bool {
        self.listener_count(key) > 0
    }

    /// Snapshot of every key with at least one listener, in first-subscribed order
    pub fn event_keys(&self) -> Vec<EventKey> {
        self.shared.registry.lock().keys().cloned().collect()
    }
}

impl<P: 'static> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.shared.registry.lock().len();
        f.debug_struct("Dispatcher")
            .field("name", &self.shared.config.name)
            .field("keys", &keys)
            .finish()
    }
}
