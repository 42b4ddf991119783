//! Credential resolution for store unlocks
//!
//! Each request runs a small state machine from scratch:
//!
//! ```text
//! CheckSupport -> VaultLookup -> VerifyAndRetrieve -> Done
//!      |               |                 |
//!      +---------------+-----------------+--> Prompt -> Done | Cancelled
//! ```
//!
//! A saved credential that cannot be used (verification declined or failed,
//! or an empty secret) is removed from the vault before falling back to the
//! prompt, so a broken entry does not fail every unlock.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, instrument};

use crate::models::{CredentialValue, StoreFile};
use crate::tracing::field_names::{STATE, STORE};
use crate::tracing::span_names::{CREDENTIAL_RESOLVE, CREDENTIAL_STORE};

use super::backend::VaultEntry;
use super::prompt::CredentialPrompt;
use super::vault::SecretVault;

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Released by the vault after user-presence verification
    Vault,
    /// Typed by the user
    Prompt,
}

/// Result of a credential request
#[derive(Debug)]
pub enum ResolveOutcome {
    /// A credential is available
    Resolved {
        /// The credential to open the store with
        credential: CredentialValue,
        /// Where it came from
        source: CredentialSource,
    },
    /// The user dismissed the prompt; the unlock must be abandoned
    Cancelled,
}

impl ResolveOutcome {
    /// Returns true if the user cancelled
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Converts into the credential, if resolved
    #[must_use]
    pub fn into_credential(self) -> Option<CredentialValue> {
        match self {
            Self::Resolved { credential, .. } => Some(credential),
            Self::Cancelled => None,
        }
    }
}

/// States of one resolution request
#[derive(Debug)]
enum ResolveState {
    CheckSupport,
    VaultLookup,
    VerifyAndRetrieve(VaultEntry),
    Prompt,
    Done(CredentialValue, CredentialSource),
    Cancelled,
}

impl ResolveState {
    const fn name(&self) -> &'static str {
        match self {
            Self::CheckSupport => "check_support",
            Self::VaultLookup => "vault_lookup",
            Self::VerifyAndRetrieve(_) => "verify_and_retrieve",
            Self::Prompt => "prompt",
            Self::Done(..) => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Resolves the credentials needed to open a store
pub struct CredentialResolver {
    vault: SecretVault,
    prompt: Arc<dyn CredentialPrompt>,
}

impl CredentialResolver {
    /// Creates a resolver over a vault and an interactive prompt
    #[must_use]
    pub fn new(vault: SecretVault, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self { vault, prompt }
    }

    /// The vault consulted before prompting
    #[must_use]
    pub const fn vault(&self) -> &SecretVault {
        &self.vault
    }

    /// Resolves credentials for `store`
    ///
    /// `username` selects among several saved credentials for the same
    /// store; `None` uses the configured default username.
    #[instrument(
        name = CREDENTIAL_RESOLVE,
        level = "debug",
        skip(self, store, username),
        fields({ STORE } = %store.name())
    )]
    pub async fn resolve(&self, store: &dyn StoreFile, username: Option<&str>) -> ResolveOutcome {
        let resource = self.vault.resource_tag(store.name());
        let mut state = ResolveState::CheckSupport;

        loop {
            debug!({ STATE } = state.name(), "Credential resolution step");
            state = match state {
                ResolveState::Done(credential, source) => {
                    info!(source = ?source, "Credentials resolved");
                    return ResolveOutcome::Resolved { credential, source };
                }
                ResolveState::Cancelled => {
                    info!("Credential prompt cancelled");
                    return ResolveOutcome::Cancelled;
                }
                ResolveState::CheckSupport => {
                    if self.vault.is_supported().await {
                        ResolveState::VaultLookup
                    } else {
                        ResolveState::Prompt
                    }
                }
                ResolveState::VaultLookup => self
                    .vault
                    .find(&resource, username)
                    .map_or(ResolveState::Prompt, ResolveState::VerifyAndRetrieve),
                ResolveState::VerifyAndRetrieve(entry) => self.verify_and_retrieve(entry).await,
                ResolveState::Prompt => match self.prompt.prompt(store).await {
                    Some(response) => ResolveState::Done(response.into(), CredentialSource::Prompt),
                    None => ResolveState::Cancelled,
                },
            };
        }
    }

    async fn verify_and_retrieve(&self, mut entry: VaultEntry) -> ResolveState {
        let message = self.vault.settings().verification_message();
        let verification = self.vault.request_verification(message).await;

        if verification.is_verified() && self.vault.retrieve_secret(&mut entry) {
            if let Some(password) = entry.secret_mut().take() {
                return ResolveState::Done(
                    CredentialValue::new(None, password),
                    CredentialSource::Vault,
                );
            }
        }

        debug!(verification = ?verification, "Saved credential unusable, removing it");
        self.vault.remove(&entry);
        ResolveState::Prompt
    }

    /// Saves `password` as the credential of `store`
    ///
    /// Returns `false` when the password is empty or the vault fails.
    #[instrument(
        name = CREDENTIAL_STORE,
        level = "debug",
        skip(self, store, username, password),
        fields({ STORE } = %store.name())
    )]
    pub fn set_credentials(
        &self,
        store: &dyn StoreFile,
        username: Option<&str>,
        password: &SecretString,
    ) -> bool {
        let resource = self.vault.resource_tag(store.name());
        self.vault.store(&resource, username, password)
    }

    /// Removes the saved credential of `store`, returning whether one was removed
    pub fn forget(&self, store: &dyn StoreFile, username: Option<&str>) -> bool {
        let resource = self.vault.resource_tag(store.name());
        self.vault
            .find(&resource, username)
            .is_some_and(|entry| self.vault.remove(&entry))
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("vault", &self.vault)
            .finish_non_exhaustive()
    }
}
