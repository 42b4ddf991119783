//! CLI error types and exit codes.

use keywarden_core::error::{ConfigError, FormatError, UnlockError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-unlock errors
    pub const GENERAL_ERROR: i32 = 1;
    /// The store could not be unlocked (wrong credential, corrupt or
    /// unreadable file)
    pub const UNLOCK_FAILURE: i32 = 2;
    /// The password prompt was dismissed
    pub const CANCELLED: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unlock failure, shown as is
    #[error("{0}")]
    Unlock(#[from] UnlockError),

    /// The password prompt was dismissed
    #[error("Unlock cancelled")]
    Cancelled,

    /// Store could not be written or created
    #[error("Store error: {0}")]
    Store(String),

    /// Group not found
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Entry not found
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Credential vault error
    #[error("Vault error: {0}")]
    Vault(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    Input(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<FormatError> for CliError {
    fn from(err: FormatError) -> Self {
        Self::Store(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, store writes, IO)
    /// - 2: Unlock failure
    /// - 3: Password prompt dismissed
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Unlock(UnlockError::Write { .. }) => exit_codes::GENERAL_ERROR,
            Self::Unlock(_) => exit_codes::UNLOCK_FAILURE,
            Self::Cancelled => exit_codes::CANCELLED,
            Self::Config(_)
            | Self::Store(_)
            | Self::GroupNotFound(_)
            | Self::EntryNotFound(_)
            | Self::Vault(_)
            | Self::Input(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
