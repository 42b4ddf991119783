//! Process-local credential locker
//!
//! Keeps entries in memory for the lifetime of the locker. Used by tests and
//! by embedders that supply their own persistence.

use std::sync::Mutex;

use secrecy::SecretString;

use crate::error::{SecretError, SecretResult};

use super::backend::{CredentialLocker, VaultEntry};
use super::sealed::SealedSecret;

struct Record {
    resource: String,
    username: String,
    secret: SecretString,
}

/// In-memory [`CredentialLocker`]
#[derive(Default)]
pub struct MemoryLocker {
    records: Mutex<Vec<Record>>,
}

impl MemoryLocker {
    /// Creates an empty locker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the locker holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> SecretResult<std::sync::MutexGuard<'_, Vec<Record>>> {
        self.records
            .lock()
            .map_err(|_| SecretError::BackendUnavailable("memory locker poisoned".to_string()))
    }
}

impl std::fmt::Debug for MemoryLocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLocker")
            .field("entries", &self.len())
            .finish()
    }
}

impl CredentialLocker for MemoryLocker {
    fn backend_id(&self) -> &'static str {
        "memory"
    }

    fn retrieve_all(&self) -> SecretResult<Vec<VaultEntry>> {
        Ok(self
            .lock()?
            .iter()
            .map(|r| VaultEntry::new(r.resource.clone(), r.username.clone()))
            .collect())
    }

    fn add(&self, resource: &str, username: &str, secret: &SecretString) -> SecretResult<()> {
        let mut records = self.lock()?;
        if records
            .iter()
            .any(|r| r.resource == resource && r.username == username)
        {
            return Err(SecretError::StoreFailed(format!(
                "an entry already exists for {resource}"
            )));
        }
        records.push(Record {
            resource: resource.to_string(),
            username: username.to_string(),
            secret: secret.clone(),
        });
        Ok(())
    }

    fn retrieve_password(&self, entry: &mut VaultEntry) -> SecretResult<()> {
        let records = self.lock()?;
        let record = records
            .iter()
            .find(|r| entry.is_keyed(&r.resource, &r.username))
            .ok_or_else(|| SecretError::RetrieveFailed("entry no longer exists".to_string()))?;
        *entry.secret_mut() = SealedSecret::new(record.secret.clone());
        Ok(())
    }

    fn remove(&self, entry: &VaultEntry) -> SecretResult<()> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| !entry.is_keyed(&r.resource, &r.username));
        if records.len() == before {
            return Err(SecretError::DeleteFailed(
                "entry no longer exists".to_string(),
            ));
        }
        Ok(())
    }
}
