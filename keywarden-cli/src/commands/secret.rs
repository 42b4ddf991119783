//! Saved-credential commands.

use std::path::Path;
use std::sync::Arc;

use keywarden_core::config::AppSettings;
use keywarden_core::secret::verifier_from_settings;
use keywarden_core::{CredentialResolver, LocalFile, SecretVault};

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::prompt::TerminalPrompt;
use crate::util::{
    build_unlocker, credential_from_args, keyring_locker, load_settings, no_keyring_error,
    runtime,
};

/// Builds a resolver over the system keyring, failing when there is none
fn keyring_resolver(
    settings: &AppSettings,
    store: &StoreArgs,
) -> Result<CredentialResolver, CliError> {
    let locker = keyring_locker(settings).ok_or_else(no_keyring_error)?;
    let vault = SecretVault::new(
        locker,
        verifier_from_settings(&settings.presence),
        settings.vault.clone(),
    );
    Ok(CredentialResolver::new(
        vault,
        Arc::new(TerminalPrompt::from_args(store)),
    ))
}

/// Remember command handler
///
/// The password is checked against the store before it is saved.
pub fn cmd_remember(config_path: Option<&Path>, store: &StoreArgs) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let resolver = keyring_resolver(&settings, store)?;
    let file = LocalFile::new(&store.file);

    let label = format!("Password for '{}': ", file_label(&store.file));
    let credential = credential_from_args(store, &label)?;
    let password = credential.password().clone();
    build_unlocker(&settings, store)?.open_with(&file, credential)?;

    if !resolver.set_credentials(&file, None, &password) {
        return Err(CliError::Vault(
            "The password could not be saved in the keyring".to_string(),
        ));
    }

    println!("Saved the password of '{}'", file_label(&store.file));
    Ok(())
}

/// Forget command handler
pub fn cmd_forget(config_path: Option<&Path>, file_path: &Path) -> Result<(), CliError> {
    let store = StoreArgs {
        file: file_path.to_path_buf(),
        key_file: None,
        password: None,
        remember: false,
    };
    let settings = load_settings(config_path)?;
    let resolver = keyring_resolver(&settings, &store)?;
    let file = LocalFile::new(file_path);

    if resolver.forget(&file, None) {
        println!("Forgot the saved password of '{}'", file_label(file_path));
    } else {
        println!("No saved password for '{}'", file_label(file_path));
    }
    Ok(())
}

/// Vault status command handler
pub fn cmd_vault_status(config_path: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;

    println!("Credential Vault Status");
    println!("=======================\n");

    let keyring = keyring_locker(&settings);
    println!(
        "Keyring (libsecret):  {}",
        if keyring.is_some() {
            "Available ✓"
        } else {
            "Not available (secret-tool not found)"
        }
    );
    println!("Namespace:            {}", settings.vault.namespace);
    println!("Default username:     {}", settings.vault.default_username);

    let verifier = verifier_from_settings(&settings.presence);
    let supported = runtime()?.block_on(verifier.is_supported());
    if !settings.presence.enabled {
        println!("Presence check:       Disabled");
    } else if supported {
        println!("Presence check:       {} ✓", settings.presence.command);
    } else {
        println!(
            "Presence check:       Not available ({} not found)",
            settings.presence.command
        );
    }

    let auto_unlock = keyring.is_some() && supported;
    println!(
        "\nAutomatic unlock:     {}",
        if auto_unlock { "Enabled" } else { "Disabled" }
    );
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_file_label_is_file_name() {
        assert_eq!(file_label(&PathBuf::from("/tmp/work.kwdb")), "work.kwdb");
    }
}
