//! Credential values handed to the store format.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::store_file::FileHandle;

/// Password plus optional key file needed to decrypt a store
///
/// Immutable once built. The password is held as a [`SecretString`], is
/// redacted from `Debug` output and is never serialized.
#[derive(Clone)]
pub struct CredentialValue {
    key_file: Option<FileHandle>,
    password: SecretString,
}

impl CredentialValue {
    /// Creates a credential from a password and an optional key file
    #[must_use]
    pub const fn new(key_file: Option<FileHandle>, password: SecretString) -> Self {
        Self { key_file, password }
    }

    /// Creates a password-only credential
    #[must_use]
    pub fn from_password(password: impl Into<String>) -> Self {
        Self::new(None, SecretString::from(password.into()))
    }

    /// Key file reference, if any
    #[must_use]
    pub fn key_file(&self) -> Option<&FileHandle> {
        self.key_file.as_ref()
    }

    /// The password
    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    /// Whether the password is empty
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialValue")
            .field("key_file", &self.key_file.as_ref().map(|k| k.name().to_string()))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What the interactive prompt returns when the user confirms
#[derive(Clone)]
pub struct PromptResponse {
    /// Key file chosen by the user
    pub key_file: Option<FileHandle>,
    /// Password typed by the user
    pub password: SecretString,
}

impl PromptResponse {
    /// Creates a prompt response
    #[must_use]
    pub const fn new(key_file: Option<FileHandle>, password: SecretString) -> Self {
        Self { key_file, password }
    }
}

impl fmt::Debug for PromptResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptResponse")
            .field("key_file", &self.key_file.as_ref().map(|k| k.name().to_string()))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl From<PromptResponse> for CredentialValue {
    fn from(response: PromptResponse) -> Self {
        Self::new(response.key_file, response.password)
    }
}
