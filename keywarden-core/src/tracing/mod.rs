//! Tracing integration for structured logging
//!
//! This module wires the `tracing` crate into `Keywarden`, with spans for the
//! operations worth following in a log: credential resolution, vault access,
//! unlocking and saving stores.
//!
//! Secrets never appear in events. Usernames and store names are only
//! recorded at debug level and below.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global flag indicating whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Tracing already initialized
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Failed to create log file
    #[error("Failed to create log file: {0}")]
    FileCreationFailed(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Tracing log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Error level - only errors
    Error,
    /// Warn level - errors and warnings
    Warn,
    /// Info level - errors, warnings, and info (default)
    #[default]
    Info,
    /// Debug level - all above plus debug messages
    Debug,
    /// Trace level - all messages including trace
    Trace,
}

impl TracingLevel {
    /// Converts to tracing crate's Level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Maps a `-v` count to a level (0 keeps `Warn`)
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Output destination for tracing logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr
    #[default]
    Stderr,
    /// Output to a file
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log level
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Whether to include thread ids in events
    pub thread_ids: bool,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info,
            output: TracingOutput::Stderr,
            thread_ids: false,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Creates a new tracing configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables thread ids
    #[must_use]
    pub const fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Builds the `EnvFilter` directive for this configuration
    #[must_use]
    pub fn filter_directive(&self) -> String {
        self.filter.clone().unwrap_or_else(|| {
            format!(
                "keywarden_core={level},keywarden={level}",
                level = self.level
            )
        })
    }
}

/// Initializes the tracing subscriber with the given configuration
///
/// This function should be called once at application startup.
/// Subsequent calls will return an error.
///
/// # Errors
///
/// Returns an error if:
/// - Tracing has already been initialized
/// - The subscriber fails to initialize
/// - File output is configured but the file cannot be created
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_new(config.filter_directive())
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    match &config.output {
        TracingOutput::Stdout => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(config.thread_ids)
                        .with_writer(std::io::stdout),
                )
                .try_init()
                .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;
        }
        TracingOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(config.thread_ids)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;
        }
        TracingOutput::File { path } => {
            let file = std::fs::File::create(path)
                .map_err(|e| TracingError::FileCreationFailed(e.to_string()))?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(config.thread_ids)
                        .with_ansi(false)
                        .with_writer(file),
                )
                .try_init()
                .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;
        }
    }

    tracing::debug!(level = %config.level, "Tracing initialized");

    Ok(())
}

/// Checks if tracing has been initialized
#[must_use]
pub fn is_tracing_initialized() -> bool {
    TRACING_INITIALIZED.load(Ordering::SeqCst)
}

/// Macro for creating debug-level operation spans with standard fields
///
/// # Examples
///
/// ```ignore
/// use keywarden_core::trace_operation;
///
/// let _span = trace_operation!(span_names::DATABASE_UNLOCK, { field_names::STORE } = %file.name());
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::debug_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::debug_span!($name, $($field)*)
    };
}

/// Standard span names for `Keywarden` operations
pub mod span_names {
    /// Credential resolution span
    pub const CREDENTIAL_RESOLVE: &str = "credential.resolve";
    /// Credential store span
    pub const CREDENTIAL_STORE: &str = "credential.store";
    /// Vault lookup span
    pub const VAULT_FIND: &str = "vault.find";
    /// Database unlock span
    pub const DATABASE_UNLOCK: &str = "database.unlock";
    /// Database save span
    pub const DATABASE_SAVE: &str = "database.save";
}

/// Standard field names for tracing spans
pub mod field_names {
    /// Store identifier field.
    /// WARNING: May reveal file names. Use only at debug/trace level.
    pub const STORE: &str = "store";
    /// Vault resource tag field
    pub const RESOURCE: &str = "resource";
    /// Resolution state field
    pub const STATE: &str = "state";
    /// Outcome field
    pub const OUTCOME: &str = "outcome";
    /// Candidate count field
    pub const CANDIDATES: &str = "candidates";
    /// Error message field
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_level_from_str() {
        assert_eq!("error".parse::<TracingLevel>(), Ok(TracingLevel::Error));
        assert_eq!("WARN".parse::<TracingLevel>(), Ok(TracingLevel::Warn));
        assert_eq!("Info".parse::<TracingLevel>(), Ok(TracingLevel::Info));
        assert_eq!("debug".parse::<TracingLevel>(), Ok(TracingLevel::Debug));
        assert_eq!("trace".parse::<TracingLevel>(), Ok(TracingLevel::Trace));
        assert!("invalid".parse::<TracingLevel>().is_err());
    }

    #[test]
    fn test_tracing_level_display() {
        assert_eq!(TracingLevel::Error.to_string(), "error");
        assert_eq!(TracingLevel::Warn.to_string(), "warn");
        assert_eq!(TracingLevel::Info.to_string(), "info");
        assert_eq!(TracingLevel::Debug.to_string(), "debug");
        assert_eq!(TracingLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn test_from_verbosity() {
        assert_eq!(TracingLevel::from_verbosity(0), TracingLevel::Warn);
        assert_eq!(TracingLevel::from_verbosity(1), TracingLevel::Info);
        assert_eq!(TracingLevel::from_verbosity(2), TracingLevel::Debug);
        assert_eq!(TracingLevel::from_verbosity(9), TracingLevel::Trace);
    }

    #[test]
    fn test_tracing_config_builder() {
        let config = TracingConfig::new()
            .with_level(TracingLevel::Debug)
            .with_output(TracingOutput::Stdout)
            .with_thread_ids(true)
            .with_filter("keywarden_core=debug");

        assert_eq!(config.level, TracingLevel::Debug);
        assert_eq!(config.output, TracingOutput::Stdout);
        assert!(config.thread_ids);
        assert_eq!(config.filter_directive(), "keywarden_core=debug");
    }

    #[test]
    fn test_default_filter_directive() {
        let config = TracingConfig::new().with_level(TracingLevel::Trace);
        assert_eq!(
            config.filter_directive(),
            "keywarden_core=trace,keywarden=trace"
        );
    }

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_tracing(&TracingConfig::new().with_level(TracingLevel::Error));
        assert!(is_tracing_initialized());
        assert!(matches!(
            init_tracing(&TracingConfig::new()),
            Err(TracingError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_span_and_field_names_are_distinct() {
        let spans = [
            span_names::CREDENTIAL_RESOLVE,
            span_names::CREDENTIAL_STORE,
            span_names::VAULT_FIND,
            span_names::DATABASE_UNLOCK,
            span_names::DATABASE_SAVE,
        ];
        let fields = [
            field_names::STORE,
            field_names::RESOURCE,
            field_names::STATE,
            field_names::OUTCOME,
            field_names::CANDIDATES,
            field_names::ERROR,
        ];
        for names in [&spans[..], &fields[..]] {
            let unique: std::collections::HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
            assert!(names.iter().all(|name| !name.is_empty()));
        }
    }

    #[test]
    fn test_tracing_output_default() {
        assert_eq!(TracingOutput::default(), TracingOutput::Stderr);
    }
}
