/// Result type alias for tidings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tidings operations
///
/// Dispatching itself never fails; these variants cover loading and
/// validating dispatcher configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

/// Error returned by a listener callback.
///
/// The dispatcher never propagates these to the emitter; they are handed to
/// the configured [`FailureReporter`](crate::events::FailureReporter).
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ListenerError {
    pub fn msg(message: impl Into<String>) -> Self {
        ListenerError::Message(message.into())
    }

    /// Wrap any error type as a listener failure
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ListenerError::Other(Box::new(error))
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        ListenerError::Message(message)
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        ListenerError::Message(message.to_string())
    }
}

/// What a listener callback returns
pub type ListenerResult = std::result::Result<(), ListenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = Error::configuration("dispatcher name must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: dispatcher name must not be empty"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_listener_error_from_str() {
        let err: ListenerError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_listener_error_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ListenerError::other(io);
        assert_eq!(err.to_string(), "disk gone");
    }
}
