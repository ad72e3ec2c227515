//! Listener callbacks, bound contexts and the records the registry stores

use crate::errors::ListenerResult;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Dispatcher-unique id assigned to every listener record
pub type ListenerId = u64;

/// Closure type for listener callbacks.
///
/// The bound context, if any, is passed as the first argument.
pub type ListenerFn<P> = dyn Fn(Option<&Context>, Option<&P>) -> ListenerResult + Send + Sync;

/// A shareable listener callback.
///
/// Identity is the identity of the underlying allocation: clones of one
/// `Callback` are the same callback, two separately constructed callbacks are
/// not, even when built from identical closures.
pub struct Callback<P> {
    inner: Arc<ListenerFn<P>>,
}

impl<P> Callback<P> {
    /// Wrap a fallible callback. Errors are reported, never propagated.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Option<&Context>, Option<&P>) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(callback),
        }
    }

    /// Wrap a callback that cannot fail
    pub fn infallible<F>(callback: F) -> Self
    where
        F: Fn(Option<&Context>, Option<&P>) + Send + Sync + 'static,
    {
        Self::new(move |context, payload| {
            callback(context, payload);
            Ok(())
        })
    }

    /// Wrap a callback that only looks at the payload
    pub fn payload_only<F>(callback: F) -> Self
    where
        F: Fn(Option<&P>) + Send + Sync + 'static,
    {
        Self::infallible(move |_, payload| callback(payload))
    }

    /// Whether both handles wrap the same callback allocation
    pub fn ptr_eq(&self, other: &Callback<P>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn call(&self, context: Option<&Context>, payload: Option<&P>) -> ListenerResult {
        (self.inner)(context, payload)
    }
}

impl<P> Clone for Callback<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for Callback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Opaque value bound to a listener and handed back on every delivery.
///
/// Compared by identity, like [`Callback`].
#[derive(Clone)]
pub struct Context {
    inner: Arc<dyn Any + Send + Sync>,
}

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Reuse an existing shared value as the context
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { inner: value }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether both handles share one bound value
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// One subscription as stored in the registry
pub(crate) struct Listener<P> {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback<P>,
    pub(crate) context: Option<Context>,
    pub(crate) once: bool,
    consumed: AtomicBool,
}

impl<P> Listener<P> {
    pub(crate) fn new(
        id: ListenerId,
        callback: Callback<P>,
        context: Option<Context>,
        once: bool,
    ) -> Self {
        Self {
            id,
            callback,
            context,
            once,
            consumed: AtomicBool::new(false),
        }
    }

    /// Claim the single delivery of a once listener.
    ///
    /// Always true for persistent listeners.
    pub(crate) fn claim(&self) -> bool {
        !self.once || !self.consumed.swap(true, Ordering::AcqRel)
    }

    /// Whether this record matches an `off` filter.
    ///
    /// A missing context in the filter matches any bound context.
    pub(crate) fn matches(&self, callback: &Callback<P>, context: Option<&Context>) -> bool {
        if !self.callback.ptr_eq(callback) {
            return false;
        }
        match context {
            None => true,
            Some(context) => self
                .context
                .as_ref()
                .is_some_and(|bound| bound.ptr_eq(context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_identity_survives_clone() {
        let a: Callback<i32> = Callback::payload_only(|_| {});
        let b = a.clone();
        let c: Callback<i32> = Callback::payload_only(|_| {});
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_context_identity_and_downcast() {
        let a = Context::new(String::from("form"));
        let b = Context::new(String::from("form"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("form"));
        assert!(a.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_once_listener_claims_once() {
        let listener = Listener::new(1, Callback::<i32>::payload_only(|_| {}), None, true);
        assert!(listener.claim());
        assert!(!listener.claim());

        let persistent = Listener::new(2, Callback::<i32>::payload_only(|_| {}), None, false);
        assert!(persistent.claim());
        assert!(persistent.claim());
    }

    #[test]
    fn test_matches_wildcard_and_exact_context() {
        let cb: Callback<i32> = Callback::payload_only(|_| {});
        let ctx1 = Context::new(1u8);
        let ctx2 = Context::new(2u8);
        let bound = Listener::new(1, cb.clone(), Some(ctx1.clone()), false);
        let unbound = Listener::new(2, cb.clone(), None, false);

        assert!(bound.matches(&cb, None));
        assert!(bound.matches(&cb, Some(&ctx1)));
        assert!(!bound.matches(&cb, Some(&ctx2)));
        assert!(unbound.matches(&cb, None));
        assert!(!unbound.matches(&cb, Some(&ctx1)));
        assert!(!bound.matches(&Callback::payload_only(|_| {}), None));
    }
}
