//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate so API keys never show up in logs or
//! `Debug` output of the configs that carry them.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// An API key or token that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the value for use in a request header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = SecretString::new("sk-very-secret");
        assert_eq!(format!("{:?}", key), "[REDACTED]");
        assert_eq!(key.expose(), "sk-very-secret");
    }
}
