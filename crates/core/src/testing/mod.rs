//! Test support: a failure reporter that records instead of logging

use crate::events::{EventKey, FailureKind, FailureReporter, ListenerFailure, ListenerId};
use parking_lot::Mutex;

/// A listener failure as captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    pub dispatcher: String,
    pub key: EventKey,
    pub listener_id: ListenerId,
    /// Rendered [`FailureKind`]
    pub message: String,
    pub panicked: bool,
}

/// Collects every reported failure for later assertions
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<RecordedFailure>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures recorded so far
    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.failures.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, failure: &ListenerFailure) {
        self.failures.lock().push(RecordedFailure {
            dispatcher: failure.dispatcher.clone(),
            key: failure.key.clone(),
            listener_id: failure.listener_id,
            message: failure.kind.to_string(),
            panicked: matches!(failure.kind, FailureKind::Panicked(_)),
        });
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
