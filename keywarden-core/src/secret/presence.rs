//! User-presence verification gate
//!
//! Before a saved secret is released the user must confirm presence, for
//! instance with a fingerprint. Both the availability check and the
//! verification suspend until the platform answers, so they are async.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::PresenceSettings;

/// Environment variable carrying the prompt message to the verifier program
pub const PROMPT_MESSAGE_ENV: &str = "KEYWARDEN_PROMPT";

/// Outcome of a verification request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    /// The user was verified
    Verified,
    /// The user dismissed the prompt
    Declined,
    /// Verification ran and did not match
    Failed,
    /// No verification mechanism could be reached
    Unavailable,
}

impl VerificationResult {
    /// Whether the secret may be released
    #[must_use]
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Platform gate confirming the user is present
#[async_trait]
pub trait PresenceVerifier: Send + Sync {
    /// Whether the gate is available on this system
    async fn is_supported(&self) -> bool;

    /// Asks the user to confirm presence, showing `message`
    async fn request_verification(&self, message: &str) -> VerificationResult;
}

/// Verifier for systems without a presence gate
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPresence;

#[async_trait]
impl PresenceVerifier for UnsupportedPresence {
    async fn is_supported(&self) -> bool {
        false
    }

    async fn request_verification(&self, _message: &str) -> VerificationResult {
        VerificationResult::Unavailable
    }
}

/// Verifies presence by running an external program
///
/// The program inherits the terminal so it can interact with the user. The
/// prompt message is passed in [`PROMPT_MESSAGE_ENV`]. Exit status 0 means
/// verified, exit status 2 means the user declined, anything else failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

impl CommandVerifier {
    /// Creates a verifier running `program` with `args`
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The program that will be run
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PresenceVerifier for CommandVerifier {
    async fn is_supported(&self) -> bool {
        Command::new("which")
            .arg(&self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn request_verification(&self, message: &str) -> VerificationResult {
        let status = Command::new(&self.program)
            .args(&self.args)
            .env(PROMPT_MESSAGE_ENV, message)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => VerificationResult::Verified,
            Ok(status) if status.code() == Some(2) => {
                debug!(program = %self.program, "Presence verification declined");
                VerificationResult::Declined
            }
            Ok(status) => {
                debug!(program = %self.program, code = ?status.code(), "Presence verification failed");
                VerificationResult::Failed
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "Presence verifier could not be started");
                VerificationResult::Unavailable
            }
        }
    }
}

/// Builds the verifier described by the settings
#[must_use]
pub fn verifier_from_settings(settings: &PresenceSettings) -> Arc<dyn PresenceVerifier> {
    if settings.enabled && !settings.command.trim().is_empty() {
        Arc::new(CommandVerifier::new(
            settings.command.clone(),
            settings.args.clone(),
        ))
    } else {
        Arc::new(UnsupportedPresence)
    }
}
