//! Credential locker trait and vault entry type
//!
//! A locker is the platform key-value store behind the vault: it lists,
//! adds and removes entries keyed by (resource, username) and decrypts an
//! entry's secret on request. Lockers report failures as [`SecretError`];
//! deciding what a failure means is left to [`super::SecretVault`].

use secrecy::SecretString;

use crate::error::SecretResult;

use super::sealed::SealedSecret;

/// A saved credential as listed by a locker
#[derive(Debug)]
pub struct VaultEntry {
    resource: String,
    username: String,
    secret: SealedSecret,
}

impl VaultEntry {
    /// Creates an entry whose secret has not been retrieved
    #[must_use]
    pub fn new(resource: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            username: username.into(),
            secret: SealedSecret::empty(),
        }
    }

    /// Resource tag the entry belongs to
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Username half of the entry key
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret slot
    #[must_use]
    pub const fn secret(&self) -> &SealedSecret {
        &self.secret
    }

    /// Mutable access to the secret slot, for lockers filling it in
    pub fn secret_mut(&mut self) -> &mut SealedSecret {
        &mut self.secret
    }

    /// Whether this entry sits at (resource, username)
    #[must_use]
    pub fn is_keyed(&self, resource: &str, username: &str) -> bool {
        self.resource == resource && self.username == username
    }
}

/// Platform store of saved credentials
pub trait CredentialLocker: Send + Sync {
    /// Returns a unique identifier for this locker
    fn backend_id(&self) -> &'static str;

    /// Lists every entry, with empty secret slots
    ///
    /// # Errors
    /// Returns `SecretError` if the store cannot be enumerated.
    fn retrieve_all(&self) -> SecretResult<Vec<VaultEntry>>;

    /// Looks up the entry at (resource, username)
    ///
    /// # Errors
    /// Returns `SecretError` if the store cannot be queried.
    fn retrieve(&self, resource: &str, username: &str) -> SecretResult<Option<VaultEntry>> {
        Ok(self
            .retrieve_all()?
            .into_iter()
            .find(|e| e.is_keyed(resource, username)))
    }

    /// Adds an entry
    ///
    /// # Errors
    /// Returns `SecretError::StoreFailed` if the entry cannot be written.
    fn add(&self, resource: &str, username: &str, secret: &SecretString) -> SecretResult<()>;

    /// Decrypts the entry's secret into its sealed slot
    ///
    /// # Errors
    /// Returns `SecretError::RetrieveFailed` if the secret cannot be read.
    fn retrieve_password(&self, entry: &mut VaultEntry) -> SecretResult<()>;

    /// Removes the entry at the same key as `entry`
    ///
    /// # Errors
    /// Returns `SecretError::DeleteFailed` if the entry cannot be removed.
    fn remove(&self, entry: &VaultEntry) -> SecretResult<()>;
}
