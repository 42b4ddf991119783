//! Database unlock workflow
//!
//! Ties credential resolution to the store format: ask for credentials, read
//! the store bytes, decrypt, and wrap the tree as a [`Database`]. A dismissed
//! prompt is not an error; it yields `Ok(None)` and the caller should not
//! retry.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{Instrument, debug, warn};

use crate::database::Database;
use crate::error::{UnlockError, UnlockResult};
use crate::format::{StoreFormat, TreeHandle};
use crate::models::{CredentialValue, StoreFile};
use crate::secret::{
    AsyncCredentialResolver, AsyncCredentialResult, CancellationToken, CredentialResolver,
    CredentialSource, ResolveOutcome,
};
use crate::tracing::{field_names, span_names};

/// Opens and creates stores for the presentation layer
pub struct DatabaseUnlocker {
    resolver: AsyncCredentialResolver,
    format: Arc<dyn StoreFormat>,
}

impl DatabaseUnlocker {
    /// Creates an unlocker
    #[must_use]
    pub fn new(resolver: Arc<CredentialResolver>, format: Arc<dyn StoreFormat>) -> Self {
        Self {
            resolver: AsyncCredentialResolver::new(resolver),
            format,
        }
    }

    /// The credential resolver in use
    #[must_use]
    pub fn resolver(&self) -> &CredentialResolver {
        self.resolver.resolver()
    }

    /// Resolves credentials for `file` and opens it
    ///
    /// # Errors
    /// Returns `UnlockError` if the store cannot be read or decrypted.
    pub async fn unlock(&self, file: &dyn StoreFile) -> UnlockResult<Option<Database>> {
        self.unlock_and_remember(file, false).await
    }

    /// Like [`DatabaseUnlocker::unlock`], additionally saving a typed
    /// password in the vault once it has opened the store
    ///
    /// # Errors
    /// Returns `UnlockError` if the store cannot be read or decrypted.
    pub async fn unlock_and_remember(
        &self,
        file: &dyn StoreFile,
        remember: bool,
    ) -> UnlockResult<Option<Database>> {
        let span = crate::trace_operation!(
            span_names::DATABASE_UNLOCK,
            { field_names::STORE } = %file.name(),
            { field_names::OUTCOME } = tracing::field::Empty
        );

        async {
            let ResolveOutcome::Resolved { credential, source } =
                self.resolver().resolve(file, None).await
            else {
                tracing::Span::current().record(field_names::OUTCOME, "cancelled");
                return Ok(None);
            };

            let typed_password: Option<SecretString> = (remember
                && source == CredentialSource::Prompt)
                .then(|| credential.password().clone());

            let database = self.open_with(file, credential)?;
            tracing::Span::current().record(field_names::OUTCOME, "unlocked");

            if let Some(password) = typed_password {
                if !self.resolver().set_credentials(file, None, &password) {
                    warn!("Store opened but its password could not be saved");
                }
            }

            Ok(Some(database))
        }
        .instrument(span)
        .await
    }

    /// Like [`DatabaseUnlocker::unlock`], abandoning the request when
    /// `cancel_token` fires
    ///
    /// An aborted request yields `Ok(None)`, as a dismissed prompt does.
    ///
    /// # Errors
    /// Returns `UnlockError` if the store cannot be read or decrypted.
    pub async fn unlock_cancellable(
        &self,
        file: &dyn StoreFile,
        cancel_token: &CancellationToken,
    ) -> UnlockResult<Option<Database>> {
        match self
            .resolver
            .resolve_with_cancellation(file, None, cancel_token)
            .await
        {
            AsyncCredentialResult::Resolved(credential) => {
                self.open_with(file, credential).map(Some)
            }
            AsyncCredentialResult::Cancelled | AsyncCredentialResult::Aborted => Ok(None),
        }
    }

    /// Opens `file` with a known credential
    ///
    /// # Errors
    /// - `UnlockError::Io` if the file cannot be read
    /// - `UnlockError::WrongCredential` if the credential does not match
    /// - `UnlockError::Corrupt` if the file is not a valid store
    pub fn open_with(
        &self,
        file: &dyn StoreFile,
        credential: CredentialValue,
    ) -> UnlockResult<Database> {
        let bytes = file.read_all().map_err(|e| UnlockError::Io {
            store: file.name().to_string(),
            reason: e.to_string(),
        })?;

        let tree = self
            .format
            .open(&mut bytes.as_slice(), credential)
            .map_err(|e| {
                debug!({ field_names::STORE } = %file.name(), "Open failed");
                warn!({ field_names::ERROR } = %e, "Could not open database");
                UnlockError::from_format(file.name(), e)
            })?;

        debug!({ field_names::STORE } = %file.name(), "Database unlocked");
        Ok(Database::new(tree, Arc::clone(&self.format)))
    }

    /// Creates a new empty store named `name` and writes it to `file`
    ///
    /// # Errors
    /// Returns `UnlockError` if the key file cannot be read or the store
    /// cannot be written.
    pub fn create(
        &self,
        file: &dyn StoreFile,
        name: &str,
        credential: &CredentialValue,
    ) -> UnlockResult<Database> {
        let to_unlock_error = |e| UnlockError::from_format(file.name(), e);

        let tree = TreeHandle::create(name, credential).map_err(to_unlock_error)?;
        let database = Database::new(tree, Arc::clone(&self.format));
        database.save_to(file).map_err(to_unlock_error)?;

        debug!({ field_names::STORE } = %file.name(), "Database created");
        Ok(database)
    }
}

impl std::fmt::Debug for DatabaseUnlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseUnlocker")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
