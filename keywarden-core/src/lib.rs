//! `Keywarden` Core Library
//!
//! This crate provides the core of the `Keywarden` password manager: unlocking
//! encrypted password stores with saved or prompted credentials, and an
//! object view over the opened store for the presentation layer.
//!
//! # Crate Structure
//!
//! - [`models`] - Credential values and file handles
//! - [`config`] - Application settings and persistence
//! - [`secret`] - Saved-credential vault, user presence, credential resolution
//! - [`format`] - Encrypted store format and its node tree
//! - [`database`] - Group/entry adapter over an opened tree
//! - [`unlock`] - Resolve credentials and open a store in one step
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod models;
pub mod secret;
pub mod tracing;
pub mod unlock;

pub use config::{AppSettings, ConfigManager, PresenceSettings, StoreSettings, VaultSettings};
pub use database::{
    Database, Entry, EntryField, EntryTemplate, Group, GroupTemplate, Item, ItemId, ObserverId,
};
pub use error::{
    ConfigError, ConfigResult, FormatError, FormatResult, KeywardenError, SecretError,
    SecretResult, UnlockError, UnlockResult,
};
pub use format::{
    KdfParams, NoOpStatusLogger, SealedFormat, StatusLogger, StoreFormat, TreeHandle,
};
pub use models::{CredentialValue, FileHandle, LocalFile, PromptResponse, StoreFile};
pub use secret::{
    AsyncCredentialResolver, AsyncCredentialResult, CancellationToken, CommandVerifier,
    CredentialLocker, CredentialPrompt, CredentialResolver, CredentialSource, MemoryLocker,
    PresenceVerifier, ResolveOutcome, SecretToolLocker, SecretVault, UnsupportedPresence,
    VaultEntry, VerificationResult,
};
pub use unlock::DatabaseUnlocker;
