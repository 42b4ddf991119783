//! Shared fixtures for the integration tests

mod resolver_flow_tests;
mod store_roundtrip_tests;
mod unlock_tests;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keywarden_core::{
    CredentialPrompt, CredentialResolver, KdfParams, MemoryLocker, PresenceVerifier,
    PromptResponse, SealedFormat, SecretVault, StoreFile, VaultSettings, VerificationResult,
};
use secrecy::SecretString;

/// Cheap key derivation so round trips stay fast in debug builds
pub const TEST_KDF: KdfParams = KdfParams {
    memory_kib: 1024,
    iterations: 1,
    parallelism: 1,
};

/// Store format with the test KDF cost
pub fn test_format() -> Arc<SealedFormat> {
    Arc::new(SealedFormat::with_kdf(TEST_KDF))
}

/// In-memory store file
#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    data: Mutex<Vec<u8>>,
}

impl MemoryFile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data: Mutex::new(Vec::new()),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl StoreFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes())
    }

    fn write_all(&self, data: &[u8]) -> io::Result<()> {
        *self.data.lock().unwrap() = data.to_vec();
        Ok(())
    }
}

/// Presence verifier with a fixed answer
pub struct FixedPresence {
    pub supported: bool,
    pub result: VerificationResult,
    pub requests: AtomicUsize,
}

impl FixedPresence {
    pub fn new(supported: bool, result: VerificationResult) -> Arc<Self> {
        Arc::new(Self {
            supported,
            result,
            requests: AtomicUsize::new(0),
        })
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresenceVerifier for FixedPresence {
    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn request_verification(&self, _message: &str) -> VerificationResult {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.result
    }
}

/// Prompt that answers with a fixed password, or dismisses when `None`
pub struct ScriptedPrompt {
    pub password: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(password: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            password,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialPrompt for ScriptedPrompt {
    async fn prompt(&self, _store: &dyn StoreFile) -> Option<PromptResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.password
            .map(|p| PromptResponse::new(None, SecretString::from(p.to_string())))
    }
}

/// Resolver over a shared in-memory locker
pub fn resolver(
    locker: &Arc<MemoryLocker>,
    presence: Arc<FixedPresence>,
    prompt: Arc<ScriptedPrompt>,
) -> Arc<CredentialResolver> {
    let vault = SecretVault::new(
        Arc::clone(locker) as _,
        presence,
        VaultSettings::default(),
    );
    Arc::new(CredentialResolver::new(vault, prompt))
}

pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
