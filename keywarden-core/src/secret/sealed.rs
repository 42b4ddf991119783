//! Opaque secret slot carried by vault entries

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// A secret released by a credential locker
///
/// Starts empty when an entry is listed and is only filled by an explicit
/// retrieval. The contents can be revealed or taken but are never printed,
/// and are zeroized when dropped.
#[derive(Default)]
pub struct SealedSecret {
    inner: Option<SecretString>,
}

impl SealedSecret {
    /// Creates an empty slot
    #[must_use]
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Seals a secret; empty strings produce an empty slot
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        if secret.expose_secret().is_empty() {
            Self::empty()
        } else {
            Self {
                inner: Some(secret),
            }
        }
    }

    /// Whether the slot holds nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns a copy of the secret, if present
    #[must_use]
    pub fn reveal(&self) -> Option<SecretString> {
        self.inner.clone()
    }

    /// Moves the secret out, leaving the slot empty
    pub fn take(&mut self) -> Option<SecretString> {
        self.inner.take()
    }

    /// Drops the secret
    pub fn clear(&mut self) {
        self.inner = None;
    }
}

impl fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("SealedSecret(<empty>)")
        } else {
            f.write_str("SealedSecret(<sealed>)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_seals_to_empty() {
        let sealed = SealedSecret::new(SecretString::from(String::new()));
        assert!(sealed.is_empty());
        assert!(sealed.reveal().is_none());
    }

    #[test]
    fn test_take_empties_slot() {
        let mut sealed = SealedSecret::new(SecretString::from("s3cret".to_string()));
        assert!(!sealed.is_empty());

        let secret = sealed.take().unwrap();
        assert_eq!(secret.expose_secret(), "s3cret");
        assert!(sealed.is_empty());
    }

    #[test]
    fn test_debug_never_shows_secret() {
        let sealed = SealedSecret::new(SecretString::from("s3cret".to_string()));
        assert_eq!(format!("{sealed:?}"), "SealedSecret(<sealed>)");
    }
}
