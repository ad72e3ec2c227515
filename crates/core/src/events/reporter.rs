//! Diagnostic channel for listener failures

use super::config::FailureLevel;
use super::key::EventKey;
use super::listener::ListenerId;
use crate::errors::ListenerError;
use std::any::Any;
use tracing::{error, warn};

/// Why a listener invocation failed
#[derive(Debug, thiserror::Error)]
pub enum FailureKind {
    #[error("listener returned an error: {0}")]
    Returned(#[source] ListenerError),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl FailureKind {
    pub(crate) fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        FailureKind::Panicked(message)
    }
}

/// A listener failure observed during `emit`
#[derive(Debug)]
pub struct ListenerFailure {
    /// Label of the dispatcher that caught the failure
    pub dispatcher: String,
    /// Event key being emitted
    pub key: EventKey,
    pub listener_id: ListenerId,
    pub kind: FailureKind,
}

/// Receives listener failures caught by a dispatcher.
///
/// Called synchronously from `emit`, after the failing listener returned and
/// before the next listener runs. The registry lock is not held.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &ListenerFailure);

    /// Reporter name for debugging
    fn name(&self) -> &'static str;
}

/// Logs listener failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter {
    level: FailureLevel,
}

impl TracingReporter {
    pub fn new(level: FailureLevel) -> Self {
        Self { level }
    }
}

impl FailureReporter for TracingReporter {
    fn report(&self, failure: &ListenerFailure) {
        match self.level {
            FailureLevel::Error => error!(
                dispatcher = %failure.dispatcher,
                event_key = %failure.key,
                listener_id = failure.listener_id,
                error = %failure.kind,
                "Event listener failed"
            ),
            FailureLevel::Warn => warn!(
                dispatcher = %failure.dispatcher,
                event_key = %failure.key,
                listener_id = failure.listener_id,
                error = %failure.kind,
                "Event listener failed"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
