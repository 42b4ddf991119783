//! Saved-credential vault
//!
//! [`SecretVault`] pairs a [`CredentialLocker`] with a [`PresenceVerifier`]
//! and applies the addressing rules for saved credentials:
//!
//! - entries are keyed by (resource tag, username), the username defaulting
//!   to [`VaultSettings::default_username`]
//! - a lookup with a single candidate ignores the username
//! - locker failures are logged and reported as `false` or `None`

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::config::VaultSettings;
use crate::tracing::field_names::{CANDIDATES, ERROR, RESOURCE};
use crate::tracing::span_names::{CREDENTIAL_STORE, VAULT_FIND};

use super::backend::{CredentialLocker, VaultEntry};
use super::presence::{PresenceVerifier, VerificationResult};

/// Platform vault of saved store passwords
#[derive(Clone)]
pub struct SecretVault {
    locker: Arc<dyn CredentialLocker>,
    presence: Arc<dyn PresenceVerifier>,
    settings: VaultSettings,
}

impl SecretVault {
    /// Creates a vault over a locker and a presence gate
    #[must_use]
    pub fn new(
        locker: Arc<dyn CredentialLocker>,
        presence: Arc<dyn PresenceVerifier>,
        settings: VaultSettings,
    ) -> Self {
        Self {
            locker,
            presence,
            settings,
        }
    }

    /// Addressing settings in use
    #[must_use]
    pub const fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Identifier of the underlying locker
    #[must_use]
    pub fn backend_id(&self) -> &'static str {
        self.locker.backend_id()
    }

    /// Resource tag for a store identifier
    #[must_use]
    pub fn resource_tag(&self, store_id: &str) -> String {
        self.settings.resource_tag(store_id)
    }

    /// Whether the user-presence gate is available
    pub async fn is_supported(&self) -> bool {
        self.presence.is_supported().await
    }

    /// Asks the user to confirm presence
    pub async fn request_verification(&self, message: &str) -> VerificationResult {
        self.presence.request_verification(message).await
    }

    /// Saves `secret` at (resource, username), replacing any existing entry
    ///
    /// Returns `false` without touching the locker when `secret` is empty,
    /// and `false` when the locker fails.
    #[instrument(
        name = CREDENTIAL_STORE,
        level = "debug",
        skip(self, username, secret),
        fields({ RESOURCE } = %resource)
    )]
    pub fn store(&self, resource: &str, username: Option<&str>, secret: &SecretString) -> bool {
        if secret.expose_secret().is_empty() {
            debug!("Refusing to save an empty secret");
            return false;
        }

        let username = self.settings.username_or_default(username);

        match self.locker.retrieve(resource, username) {
            Ok(Some(existing)) => {
                if let Err(e) = self.locker.remove(&existing) {
                    warn!({ ERROR } = %e, "Could not replace saved credential");
                    return false;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!({ ERROR } = %e, "Could not query saved credentials");
                return false;
            }
        }

        match self.locker.add(resource, username, secret) {
            Ok(()) => {
                debug!(backend = self.locker.backend_id(), "Saved credential");
                true
            }
            Err(e) => {
                warn!({ ERROR } = %e, "Could not save credential");
                false
            }
        }
    }

    /// Finds the saved entry for `resource`
    ///
    /// With several entries under the same resource the username (or the
    /// default username) must match exactly.
    #[instrument(
        name = VAULT_FIND,
        level = "debug",
        skip(self, username),
        fields({ RESOURCE } = %resource, { CANDIDATES } = tracing::field::Empty)
    )]
    pub fn find(&self, resource: &str, username: Option<&str>) -> Option<VaultEntry> {
        let all = match self.locker.retrieve_all() {
            Ok(all) => all,
            Err(e) => {
                warn!({ ERROR } = %e, "Could not list saved credentials");
                return None;
            }
        };

        let mut candidates: Vec<VaultEntry> = all
            .into_iter()
            .filter(|e| e.resource() == resource)
            .collect();
        tracing::Span::current().record(CANDIDATES, candidates.len());

        match candidates.len() {
            0 => None,
            1 => candidates.pop(),
            _ => {
                let username = self.settings.username_or_default(username);
                candidates.into_iter().find(|e| e.username() == username)
            }
        }
    }

    /// Decrypts the entry's secret into its sealed slot
    ///
    /// Returns `false` with an empty slot when the locker fails or the saved
    /// secret is empty.
    pub fn retrieve_secret(&self, entry: &mut VaultEntry) -> bool {
        if let Err(e) = self.locker.retrieve_password(entry) {
            debug!({ RESOURCE } = %entry.resource(), "Saved credential unreadable");
            warn!({ ERROR } = %e, "Could not read saved credential");
            entry.secret_mut().clear();
            return false;
        }
        !entry.secret().is_empty()
    }

    /// Removes a saved entry, returning whether it was removed
    pub fn remove(&self, entry: &VaultEntry) -> bool {
        match self.locker.remove(entry) {
            Ok(()) => true,
            Err(e) => {
                debug!({ RESOURCE } = %entry.resource(), "Saved credential not removed");
                warn!({ ERROR } = %e, "Could not remove saved credential");
                false
            }
        }
    }

    /// Removes every saved entry, returning how many were removed
    pub fn clear_all(&self) -> usize {
        let entries = match self.locker.retrieve_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!({ ERROR } = %e, "Could not list saved credentials");
                return 0;
            }
        };
        entries.iter().filter(|e| self.remove(e)).count()
    }
}

impl std::fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVault")
            .field("backend", &self.locker.backend_id())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
