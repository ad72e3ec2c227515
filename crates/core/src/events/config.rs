//! Configuration and builder for the dispatcher

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default label attached to dispatcher log lines
pub const DEFAULT_DISPATCHER_NAME: &str = "dispatcher";

/// Level at which [`TracingReporter`](super::TracingReporter) logs listener failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureLevel {
    #[default]
    Error,
    Warn,
}

/// Configuration for a [`Dispatcher`](super::Dispatcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Label attached to every log line this dispatcher writes
    pub name: String,
    /// Catch panicking listeners and report them like returned errors
    pub catch_panics: bool,
    /// Level used when logging listener failures
    pub failure_level: FailureLevel,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DISPATCHER_NAME.to_string(),
            catch_panics: true,
            failure_level: FailureLevel::default(),
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set whether listener panics are caught
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Set the level listener failures are logged at
    pub fn with_failure_level(mut self, failure_level: FailureLevel) -> Self {
        self.failure_level = failure_level;
        self
    }

    /// Parse a JSON document and validate it. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("dispatcher name must not be empty"));
        }
        Ok(())
    }
}
