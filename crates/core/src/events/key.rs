//! Event keys: named keys compared by value, tokens compared by identity

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique key that only compares equal to itself (and its clones).
///
/// Two tokens created with the same description are still distinct keys.
#[derive(Clone)]
pub struct Token {
    id: u64,
    description: Option<Arc<str>>,
}

impl Token {
    /// Create a new token without a description
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    /// Create a new token carrying a description for logs
    pub fn with_description(description: impl Into<Arc<str>>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::new()
        }
    }

    /// Description given at creation, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "Token({description})"),
            None => write!(f, "Token(#{})", self.id),
        }
    }
}

/// Identifier under which listeners are grouped
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// String key, equal to any other name with the same text
    Name(Arc<str>),
    /// Identity key, equal only to clones of the same token
    Token(Token),
}

impl EventKey {
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        EventKey::Name(name.into())
    }

    /// Create a key backed by a fresh [`Token`]
    pub fn unique(description: impl Into<Arc<str>>) -> Self {
        EventKey::Token(Token::with_description(description))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            EventKey::Name(name) => Some(&**name),
            EventKey::Token(_) => None,
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Name(name) => f.write_str(name),
            EventKey::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        EventKey::Name(name.into())
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        EventKey::Name(name.into())
    }
}

impl From<Token> for EventKey {
    fn from(token: Token) -> Self {
        EventKey::Token(token)
    }
}

impl From<&Token> for EventKey {
    fn from(token: &Token) -> Self {
        EventKey::Token(token.clone())
    }
}

impl From<&EventKey> for EventKey {
    fn from(key: &EventKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_compare_by_value() {
        assert_eq!(EventKey::from("greet"), EventKey::from("greet".to_string()));
        assert_ne!(EventKey::from("greet"), EventKey::from("ping"));
    }

    #[test]
    fn test_tokens_compare_by_identity() {
        let a = Token::with_description("save");
        let b = Token::with_description("save");
        assert_ne!(EventKey::from(&a), EventKey::from(&b));
        assert_eq!(EventKey::from(&a), EventKey::from(a.clone()));
    }

    #[test]
    fn test_token_never_equals_name() {
        let token = Token::with_description("greet");
        assert_ne!(EventKey::from(token), EventKey::from("greet"));
    }

    #[test]
    fn test_keys_hash_consistently() {
        let token = Token::new();
        let mut set = HashSet::new();
        set.insert(EventKey::from("a"));
        set.insert(EventKey::from("a"));
        set.insert(EventKey::from(&token));
        set.insert(EventKey::from(&token));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(EventKey::from("greet").to_string(), "greet");
        assert_eq!(EventKey::unique("submit").to_string(), "Token(submit)");
        assert!(Token::new().to_string().starts_with("Token(#"));
    }
}
