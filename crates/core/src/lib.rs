//! Core of `tidings`: a synchronous, in-process publish/subscribe dispatcher.
//!
//! ## Key Components
//!
//! - **`events`**: the [`Dispatcher`], event keys, listener callbacks and
//!   contexts, unsubscribe handles and the failure reporting seam.
//! - **`errors`**: the crate `Error` enum and `Result` alias, plus the
//!   `ListenerError` a callback may return.
//! - **`testing`**: helpers for asserting on listener failures.

pub mod errors;
pub mod events;
pub mod testing;

pub use self::{
    errors::{Error, ListenerError, ListenerResult, Result},
    events::{
        Callback, Context, Dispatcher, DispatcherConfig, EventKey, FailureLevel, FailureReporter,
        Subscription, SubscriptionGuard, Token,
    },
};
