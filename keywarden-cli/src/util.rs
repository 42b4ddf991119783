//! Shared utility functions used across command modules.

use std::path::Path;
use std::sync::Arc;

use keywarden_core::config::{AppSettings, ConfigManager};
use keywarden_core::secret::{is_secret_tool_available, verifier_from_settings};
use keywarden_core::{
    CredentialLocker, CredentialResolver, CredentialValue, Database, DatabaseUnlocker, KdfParams,
    LocalFile, MemoryLocker, SealedFormat, SecretToolLocker, SecretVault,
};
use secrecy::SecretString;
use tracing::debug;

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::prompt::TerminalPrompt;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads settings from the configuration directory
pub fn load_settings(config_path: Option<&Path>) -> Result<AppSettings, CliError> {
    create_config_manager(config_path)?
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Creates a runtime for the async parts of the core
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new().map_err(|e| CliError::Config(format!("Runtime error: {e}")))
}

/// The system keyring locker, when `secret-tool` is installed
pub fn keyring_locker(settings: &AppSettings) -> Option<Arc<dyn CredentialLocker>> {
    is_secret_tool_available().then(|| {
        Arc::new(SecretToolLocker::with_application(
            settings.vault.namespace.clone(),
        )) as Arc<dyn CredentialLocker>
    })
}

/// Error for commands that need the system keyring
pub fn no_keyring_error() -> CliError {
    CliError::Vault("No system keyring available (secret-tool not found)".to_string())
}

/// Builds the vault from settings
///
/// Without a system keyring the vault is empty and process-local, so a
/// request to `remember` a password is refused instead of silently lost.
///
/// # Errors
/// Returns `CliError::Vault` when `remember` is set and there is no keyring.
pub fn build_vault(settings: &AppSettings, remember: bool) -> Result<SecretVault, CliError> {
    let locker = match keyring_locker(settings) {
        Some(locker) => locker,
        None if remember => return Err(no_keyring_error()),
        None => {
            debug!("secret-tool not found, saved passwords are unavailable");
            Arc::new(MemoryLocker::new())
        }
    };
    Ok(SecretVault::new(
        locker,
        verifier_from_settings(&settings.presence),
        settings.vault.clone(),
    ))
}

/// Builds an unlocker whose prompt uses the command-line arguments
///
/// # Errors
/// Returns `CliError::Vault` when `--remember` is given without a keyring.
pub fn build_unlocker(
    settings: &AppSettings,
    store: &StoreArgs,
) -> Result<DatabaseUnlocker, CliError> {
    let resolver = CredentialResolver::new(
        build_vault(settings, store.remember)?,
        Arc::new(TerminalPrompt::from_args(store)),
    );
    let format = SealedFormat::with_kdf(KdfParams::from(&settings.store));
    Ok(DatabaseUnlocker::new(Arc::new(resolver), Arc::new(format)))
}

/// Resolves credentials and opens the store named in `store`
pub fn unlock_store(
    config_path: Option<&Path>,
    store: &StoreArgs,
) -> Result<(LocalFile, Database), CliError> {
    let settings = load_settings(config_path)?;
    let file = LocalFile::new(&store.file);
    if !file.exists() {
        return Err(CliError::Input(format!(
            "Store file not found: {}",
            store.file.display()
        )));
    }

    let unlocker = build_unlocker(&settings, store)?;
    let database = runtime()?
        .block_on(unlocker.unlock_and_remember(&file, store.remember))?
        .ok_or(CliError::Cancelled)?;
    Ok((file, database))
}

/// Reads a secret from the terminal without echo
pub fn read_secret(label: &str) -> Result<SecretString, CliError> {
    rpassword::prompt_password(label)
        .map(SecretString::from)
        .map_err(|e| CliError::Input(format!("Failed to read password: {e}")))
}

/// Builds the credential for `store` from its arguments, prompting for the
/// password when none was given
pub fn credential_from_args(store: &StoreArgs, label: &str) -> Result<CredentialValue, CliError> {
    let password = match &store.password {
        Some(password) => SecretString::from(password.clone()),
        None => read_secret(label)?,
    };
    Ok(CredentialValue::new(
        store.key_file.clone().map(LocalFile::handle),
        password,
    ))
}
