//! Cancellable credential resolution
//!
//! The interactive prompt has no timeout of its own. Callers that need to
//! abandon a pending unlock (a window closing, a shutdown) race the request
//! against a [`CancellationToken`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, instrument};

use crate::models::{CredentialValue, StoreFile};
use crate::tracing::field_names::STORE;

use super::resolver::{CredentialResolver, ResolveOutcome};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Token for cancelling pending credential requests
///
/// This token can be cloned and shared across threads. When `cancel()` is called,
/// all pending operations using this token will be cancelled.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels all operations using this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if the token has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resets the cancellation state
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Completes once the token is cancelled
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Result of a cancellable credential request
#[derive(Debug)]
pub enum AsyncCredentialResult {
    /// A credential was resolved
    Resolved(CredentialValue),
    /// The user dismissed the prompt
    Cancelled,
    /// The caller's token fired before resolution finished
    Aborted,
}

impl AsyncCredentialResult {
    /// Returns true if a credential was resolved
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true if the user dismissed the prompt
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if the caller aborted the request
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Converts to the credential, if resolved
    #[must_use]
    pub fn into_credential(self) -> Option<CredentialValue> {
        match self {
            Self::Resolved(credential) => Some(credential),
            _ => None,
        }
    }
}

impl From<ResolveOutcome> for AsyncCredentialResult {
    fn from(outcome: ResolveOutcome) -> Self {
        match outcome {
            ResolveOutcome::Resolved { credential, .. } => Self::Resolved(credential),
            ResolveOutcome::Cancelled => Self::Cancelled,
        }
    }
}

/// Credential resolver whose requests can be aborted by the caller
pub struct AsyncCredentialResolver {
    resolver: Arc<CredentialResolver>,
}

impl AsyncCredentialResolver {
    /// Creates a new async credential resolver
    #[must_use]
    pub const fn new(resolver: Arc<CredentialResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves credentials for `store` unless `cancel_token` fires first
    ///
    /// A token that is already cancelled aborts without consulting the vault.
    #[instrument(
        level = "debug",
        skip(self, store, username, cancel_token),
        fields({ STORE } = %store.name(), cancellable = true)
    )]
    pub async fn resolve_with_cancellation(
        &self,
        store: &dyn StoreFile,
        username: Option<&str>,
        cancel_token: &CancellationToken,
    ) -> AsyncCredentialResult {
        if cancel_token.is_cancelled() {
            return AsyncCredentialResult::Aborted;
        }

        tokio::select! {
            outcome = self.resolver.resolve(store, username) => {
                if cancel_token.is_cancelled() {
                    debug!("Credential request aborted after completion");
                    return AsyncCredentialResult::Aborted;
                }
                outcome.into()
            }
            () = cancel_token.cancelled() => {
                debug!("Credential request aborted");
                AsyncCredentialResult::Aborted
            }
        }
    }

    /// Gets a reference to the underlying resolver
    #[must_use]
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }
}

impl std::fmt::Debug for AsyncCredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncCredentialResolver")
            .field("resolver", &self.resolver)
            .finish()
    }
}
