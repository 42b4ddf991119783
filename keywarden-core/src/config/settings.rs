//! Application settings
//!
//! All sections use `#[serde(default)]` so a partial or older config file
//! still loads, with missing values taking their defaults.

use serde::{Deserialize, Serialize};

use crate::tracing::TracingLevel;

/// Default namespace prefix for vault resource tags
pub const DEFAULT_NAMESPACE: &str = "keywarden";

/// Username assumed when a caller does not name one
pub const DEFAULT_USERNAME: &str = "HelloUser";

/// Message shown by the user-presence prompt
pub const DEFAULT_VERIFICATION_MESSAGE: &str = "Auto login";

/// Default program used to verify user presence
pub const DEFAULT_PRESENCE_COMMAND: &str = "fprintd-verify";

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Saved-credential vault addressing
    pub vault: VaultSettings,
    /// User-presence verification
    pub presence: PresenceSettings,
    /// Store file encryption
    pub store: StoreSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// Addressing of saved credentials in the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    /// Prefix of every resource tag (`namespace/store`)
    pub namespace: String,
    /// Username used when a lookup or store does not name one
    pub default_username: String,
    /// Message passed to the user-presence prompt
    pub verification_message: String,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_username: DEFAULT_USERNAME.to_string(),
            verification_message: DEFAULT_VERIFICATION_MESSAGE.to_string(),
        }
    }
}

impl VaultSettings {
    /// Builds the resource tag for a store identifier
    ///
    /// ```
    /// use keywarden_core::config::VaultSettings;
    ///
    /// let settings = VaultSettings::default();
    /// assert_eq!(settings.resource_tag("work.kwdb"), "keywarden/work.kwdb");
    /// ```
    #[must_use]
    pub fn resource_tag(&self, store_id: &str) -> String {
        format!("{}/{}", self.namespace, store_id)
    }

    /// Resolves an optional username against the default
    #[must_use]
    pub fn username_or_default<'a>(&'a self, username: Option<&'a str>) -> &'a str {
        username.unwrap_or(&self.default_username)
    }

    /// Returns the verification message, falling back to the default when blank
    #[must_use]
    pub fn verification_message(&self) -> &str {
        if self.verification_message.trim().is_empty() {
            DEFAULT_VERIFICATION_MESSAGE
        } else {
            &self.verification_message
        }
    }
}

/// How user presence is verified before a saved secret is released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceSettings {
    /// Whether saved credentials may be used at all
    pub enabled: bool,
    /// Program run to verify presence; exit status 0 means verified
    pub command: String,
    /// Extra arguments for the program
    pub args: Vec<String>,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: DEFAULT_PRESENCE_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

/// Key derivation cost for newly written stores
///
/// Stores record the cost they were written with, so changing these values
/// only affects the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Argon2 memory in KiB
    pub kdf_memory_kib: u32,
    /// Argon2 iterations
    pub kdf_iterations: u32,
    /// Argon2 lanes
    pub kdf_parallelism: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            kdf_memory_kib: 65536,
            kdf_iterations: 3,
            kdf_parallelism: 4,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Custom `EnvFilter` directive, overrides `level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: TracingLevel::Warn.to_string(),
            filter: None,
        }
    }
}

impl LoggingSettings {
    /// Parsed level, `Warn` when the name is not recognized
    #[must_use]
    pub fn tracing_level(&self) -> TracingLevel {
        self.level.parse().unwrap_or(TracingLevel::Warn)
    }
}
