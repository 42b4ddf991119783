//! Saved credentials and credential resolution
//!
//! Store passwords can be saved in a platform vault and released after the
//! user confirms presence:
//! - [`CredentialLocker`]: the key-value store holding saved secrets
//!   (`secret-tool` for the Secret Service, or in-memory)
//! - [`PresenceVerifier`]: the gate confirming the user is present
//! - [`SecretVault`]: addressing rules on top of both
//!
//! [`CredentialResolver`] consults the vault first and falls back to the
//! interactive [`CredentialPrompt`].

mod async_resolver;
mod backend;
mod keyring;
mod memory;
mod presence;
mod prompt;
mod resolver;
mod sealed;
mod vault;

pub use async_resolver::{AsyncCredentialResolver, AsyncCredentialResult, CancellationToken};
pub use backend::{CredentialLocker, VaultEntry};
pub use keyring::{SecretToolLocker, is_secret_tool_available, parse_search_output};
pub use memory::MemoryLocker;
pub use presence::{
    CommandVerifier, PROMPT_MESSAGE_ENV, PresenceVerifier, UnsupportedPresence,
    VerificationResult, verifier_from_settings,
};
pub use prompt::CredentialPrompt;
pub use resolver::{CredentialResolver, CredentialSource, ResolveOutcome};
pub use sealed::SealedSecret;
pub use vault::SecretVault;
