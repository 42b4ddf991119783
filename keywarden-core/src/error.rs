//! Error types for `Keywarden`
//!
//! Each layer has its own error enum. Secret backend failures stay inside the
//! vault layer, store format failures are mapped to [`UnlockError`] for the
//! consumer, and [`KeywardenError`] ties them together for callers that want a
//! single type.

use thiserror::Error;

/// Errors raised by credential locker backends
///
/// These never cross the [`crate::secret::SecretVault`] boundary: the vault
/// logs them and reports a plain `false`/`None` to its callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// The backing store is not installed or cannot be reached
    #[error("Secret backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Writing a secret failed
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// Reading a secret failed
    #[error("Failed to retrieve secret: {0}")]
    RetrieveFailed(String),

    /// Removing a secret failed
    #[error("Failed to delete secret: {0}")]
    DeleteFailed(String),

    /// libsecret (`secret-tool`) specific failure
    #[error("libsecret error: {0}")]
    LibSecret(String),
}

/// Result type for secret backend operations
pub type SecretResult<T> = std::result::Result<T, SecretError>;

/// Errors raised by a store format while opening or saving a tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The password or key file does not match the store
    #[error("The password or key file is incorrect")]
    WrongCredential,

    /// The data is not a valid store or is damaged
    #[error("The store is corrupt: {0}")]
    Corrupt(String),

    /// Reading or writing the underlying stream failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Serializing the tree failed
    #[error("Failed to serialize store: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for store format operations
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Typed unlock failure surfaced to the consumer
///
/// The message of each variant is meant to be shown to the user as is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnlockError {
    /// The supplied credential does not open the store
    #[error("The password or key file for '{0}' is incorrect")]
    WrongCredential(String),

    /// The store file is damaged or not a password store
    #[error("'{store}' could not be read: {reason}")]
    Corrupt {
        /// Store name
        store: String,
        /// What was wrong with the data
        reason: String,
    },

    /// The store could not be sealed for writing
    #[error("'{store}' could not be written: {reason}")]
    Write {
        /// Store name
        store: String,
        /// Why sealing failed
        reason: String,
    },

    /// The store bytes could not be read
    #[error("'{store}' could not be accessed: {reason}")]
    Io {
        /// Store name
        store: String,
        /// Underlying I/O failure
        reason: String,
    },
}

impl UnlockError {
    /// Maps a format failure for the named store into an unlock failure
    #[must_use]
    pub fn from_format(store: &str, err: FormatError) -> Self {
        match err {
            FormatError::WrongCredential => Self::WrongCredential(store.to_string()),
            FormatError::Corrupt(reason) => Self::Corrupt {
                store: store.to_string(),
                reason,
            },
            FormatError::Serialize(reason) => Self::Write {
                store: store.to_string(),
                reason,
            },
            FormatError::Io(reason) => Self::Io {
                store: store.to_string(),
                reason,
            },
        }
    }
}

/// Result type for unlock operations
pub type UnlockResult<T> = std::result::Result<T, UnlockError>;

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration directory could not be determined
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Reading or writing the configuration file failed
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the settings schema
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The settings could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Umbrella error for `Keywarden` operations
#[derive(Debug, Error)]
pub enum KeywardenError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Secret backend error
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// Store format error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Unlock error
    #[error(transparent)]
    Unlock(#[from] UnlockError),
}
