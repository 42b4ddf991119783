//! Add group command.

use std::path::Path;

use keywarden_core::{GroupTemplate, ItemId};

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::util::unlock_store;

/// Add group command handler
pub fn cmd_add_group(
    config_path: Option<&Path>,
    store: &StoreArgs,
    name: &str,
    notes: Option<&str>,
    parent: Option<ItemId>,
) -> Result<(), CliError> {
    if name.trim().is_empty() {
        return Err(CliError::Input("Group name cannot be empty".to_string()));
    }

    let (file, database) = unlock_store(config_path, store)?;
    let parent = match parent {
        Some(id) => database
            .find_group(id)
            .ok_or_else(|| CliError::GroupNotFound(id.to_string()))?,
        None => database.root(),
    };

    let mut template = GroupTemplate::new(name);
    if let Some(notes) = notes {
        template = template.with_notes(notes);
    }
    let group = parent.add_group(&template);

    database.save_to(&file)?;

    println!(
        "Added group '{}' to '{}' (ID: {})",
        group.name(),
        parent.name(),
        group.id()
    );
    Ok(())
}
