//! Key Module
//!
//! Argument validation and key namespacing shared by every cache operation.

use crate::error::{CacheError, Result};

// == Validation ==
/// Rejects empty keys before any round trip is attempted.
///
/// `what` names the argument in the error message ("key", "set key", ...).
pub(crate) fn ensure_key(key: &str, what: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument(format!(
            "{} cannot be empty",
            capitalize(what)
        )));
    }
    Ok(())
}

/// Validates every key of a batch.
pub(crate) fn ensure_keys<K: AsRef<str>>(keys: &[K], what: &str) -> Result<()> {
    keys.iter().try_for_each(|key| ensure_key(key.as_ref(), what))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// == Key Namespace ==
/// Prefix applied to every key and hash key a client touches.
///
/// An empty prefix leaves keys unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyNamespace {
    prefix: String,
}

impl KeyNamespace {
    /// Creates a namespace from a raw prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Maps an application key to the stored key.
    pub fn apply(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    /// Maps a batch of application keys to stored keys.
    pub fn apply_all<K: AsRef<str>>(&self, keys: &[K]) -> Vec<String> {
        keys.iter().map(|key| self.apply(key.as_ref())).collect()
    }

    /// Maps a glob pattern to one restricted to this namespace.
    ///
    /// Glob metacharacters inside the prefix are escaped so they match literally.
    pub fn apply_pattern(&self, pattern: &str) -> String {
        let mut scoped = String::with_capacity(self.prefix.len() + pattern.len());
        for c in self.prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                scoped.push('\\');
            }
            scoped.push(c);
        }
        scoped.push_str(pattern);
        scoped
    }

    /// Maps a stored key back to the application key.
    pub fn strip(&self, stored: &str) -> String {
        stored
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(stored)
            .to_string()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_key_rejects_empty() {
        let result = ensure_key("", "set key");
        match result {
            Err(CacheError::InvalidArgument(msg)) => assert_eq!(msg, "Set key cannot be empty"),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_key_accepts_whitespace() {
        assert!(ensure_key(" ", "key").is_ok());
        assert!(ensure_key("my Key", "key").is_ok());
    }

    #[test]
    fn test_ensure_keys_stops_on_first_empty() {
        assert!(ensure_keys(&["a", "b"], "key").is_ok());
        assert!(ensure_keys(&["a", "", "c"], "key").is_err());
        assert!(ensure_keys::<&str>(&[], "key").is_ok());
    }

    #[test]
    fn test_empty_namespace_is_identity() {
        let ns = KeyNamespace::default();
        assert_eq!(ns.apply("user:1"), "user:1");
        assert_eq!(ns.strip("user:1"), "user:1");
        assert_eq!(ns.apply_pattern("user:*"), "user:*");
    }

    #[test]
    fn test_namespace_apply_and_strip() {
        let ns = KeyNamespace::new("app:");
        assert_eq!(ns.apply("user:1"), "app:user:1");
        assert_eq!(ns.strip("app:user:1"), "user:1");
        assert_eq!(ns.apply_all(&["a", "b"]), vec!["app:a", "app:b"]);
    }

    #[test]
    fn test_namespace_strip_foreign_key_unchanged() {
        let ns = KeyNamespace::new("app:");
        assert_eq!(ns.strip("other:1"), "other:1");
    }

    #[test]
    fn test_namespace_pattern_escapes_prefix() {
        let ns = KeyNamespace::new("tenant[1]*:");
        assert_eq!(ns.apply_pattern("k?y"), "tenant\\[1\\]\\*:k?y");
    }
}
