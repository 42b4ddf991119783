//! Command handler modules for the CLI.

mod add;
mod group;
mod init;
mod list;
mod secret;
mod show;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Init { store, name } => init::cmd_init(config_path, &store, name.as_deref()),
        Commands::Ls {
            store,
            group,
            format,
        } => list::cmd_list(config_path, &store, group, format),
        Commands::Show {
            store,
            entry,
            field,
        } => show::cmd_show(config_path, &store, entry, field.map(Into::into)),
        Commands::AddEntry {
            store,
            title,
            username,
            url,
            notes,
            entry_password,
            group,
        } => add::cmd_add_entry(
            config_path,
            &store,
            &add::AddEntryParams {
                title: &title,
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                password: entry_password.as_deref(),
                group,
            },
        ),
        Commands::AddGroup {
            store,
            name,
            notes,
            group,
        } => group::cmd_add_group(config_path, &store, &name, notes.as_deref(), group),
        Commands::Remember { store } => secret::cmd_remember(config_path, &store),
        Commands::Forget { file } => secret::cmd_forget(config_path, &file),
        Commands::VaultStatus => secret::cmd_vault_status(config_path),
    }
}
