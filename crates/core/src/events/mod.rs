//! In-process event dispatching
//!
//! A [`Dispatcher`] maps [`EventKey`]s to listener records and delivers
//! payloads synchronously. Listener failures never reach the emitting caller;
//! they are handed to a [`FailureReporter`], which logs through `tracing` by
//! default.

pub mod config;
pub mod dispatcher;
pub mod key;
pub mod listener;
pub mod reporter;
pub mod subscription;

pub use config::{DispatcherConfig, FailureLevel, DEFAULT_DISPATCHER_NAME};
pub use dispatcher::Dispatcher;
pub use key::{EventKey, Token};
pub use listener::{Callback, Context, ListenerFn, ListenerId};
pub use reporter::{FailureKind, FailureReporter, ListenerFailure, TracingReporter};
pub use subscription::{Subscription, SubscriptionGuard};
