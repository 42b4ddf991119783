//! Terminal credential prompt

use std::path::PathBuf;

use async_trait::async_trait;
use keywarden_core::{CredentialPrompt, LocalFile, PromptResponse, StoreFile};
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::cli::StoreArgs;

/// Asks for the store password on the terminal
///
/// A password given on the command line (or through `KEYWARDEN_PASSWORD`)
/// is returned without asking. Closing the input (Ctrl-D) dismisses the
/// prompt.
pub struct TerminalPrompt {
    password: Option<SecretString>,
    key_file: Option<PathBuf>,
}

impl TerminalPrompt {
    /// Creates a prompt for the store described by the arguments
    pub fn from_args(store: &StoreArgs) -> Self {
        Self {
            password: store.password.clone().map(SecretString::from),
            key_file: store.key_file.clone(),
        }
    }
}

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn prompt(&self, store: &dyn StoreFile) -> Option<PromptResponse> {
        let key_file = self.key_file.clone().map(LocalFile::handle);
        if let Some(password) = &self.password {
            return Some(PromptResponse::new(key_file, password.clone()));
        }

        let label = format!("Password for '{}': ", store.name());
        match tokio::task::spawn_blocking(move || rpassword::prompt_password(label)).await {
            Ok(Ok(password)) => Some(PromptResponse::new(key_file, SecretString::from(password))),
            Ok(Err(e)) => {
                debug!(error = %e, "Password prompt closed");
                None
            }
            Err(e) => {
                warn!(error = %e, "Password prompt task failed");
                None
            }
        }
    }
}
