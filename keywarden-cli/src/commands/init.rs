//! Create store command.

use std::path::Path;

use keywarden_core::{CredentialValue, LocalFile};
use secrecy::{ExposeSecret, SecretString};

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::util::{build_unlocker, load_settings, read_secret};

/// Init command handler
pub fn cmd_init(
    config_path: Option<&Path>,
    store: &StoreArgs,
    name: Option<&str>,
) -> Result<(), CliError> {
    let file = LocalFile::new(&store.file);
    if file.exists() {
        return Err(CliError::Input(format!(
            "Store file already exists: {}",
            store.file.display()
        )));
    }

    let name = name.map_or_else(|| default_name(&store.file), String::from);
    let settings = load_settings(config_path)?;
    let unlocker = build_unlocker(&settings, store)?;

    let password = match &store.password {
        Some(password) => SecretString::from(password.clone()),
        None => read_new_password()?,
    };
    if password.expose_secret().is_empty() && store.key_file.is_none() {
        return Err(CliError::Input(
            "A password or a key file is required".to_string(),
        ));
    }
    let credential = CredentialValue::new(
        store.key_file.clone().map(LocalFile::handle),
        password,
    );

    let database = unlocker
        .create(&file, &name, &credential)
        .map_err(|e| CliError::Store(e.to_string()))?;

    let remembered = store.remember
        && unlocker
            .resolver()
            .set_credentials(&file, None, credential.password());
    if store.remember && !remembered {
        eprintln!("Warning: the password could not be saved in the keyring");
    }

    println!(
        "Created store '{}' at {} (ID: {})",
        database.name(),
        store.file.display(),
        database.id()
    );
    Ok(())
}

fn read_new_password() -> Result<SecretString, CliError> {
    let password = read_secret("New store password: ")?;
    let confirm = read_secret("Repeat password: ")?;
    if password.expose_secret() != confirm.expose_secret() {
        return Err(CliError::Input("Passwords do not match".to_string()));
    }
    Ok(password)
}

/// Store name derived from the file name without its extension
fn default_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Passwords".to_string())
}
