//! Show entry command.

use std::fmt::Write as _;
use std::path::Path;

use keywarden_core::{Entry, EntryField, ItemId};

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::util::unlock_store;

/// Shown instead of a non-empty password in entry details
const MASK: &str = "********";

/// Show command handler
///
/// With `field` only that value is printed, unmasked, so it can be piped
/// into a clipboard tool.
pub fn cmd_show(
    config_path: Option<&Path>,
    store: &StoreArgs,
    id: ItemId,
    field: Option<EntryField>,
) -> Result<(), CliError> {
    let (_, database) = unlock_store(config_path, store)?;
    let entry = database
        .find_entry(id)
        .ok_or_else(|| CliError::EntryNotFound(id.to_string()))?;

    match field {
        Some(field) => println!("{}", entry.get(field)),
        None => print!("{}", format_details(&entry)),
    }
    Ok(())
}

/// Entry details with the password masked
#[must_use]
pub fn format_details(entry: &Entry) -> String {
    let mut output = String::from("Entry Details:\n");
    let _ = writeln!(output, "  ID:       {}", entry.id());

    for field in EntryField::ALL {
        let value = entry.get(field);
        if value.is_empty() {
            continue;
        }
        let value = if field == EntryField::Password {
            MASK.to_string()
        } else {
            value
        };
        let label = format!("{}:", field.property_name());
        let _ = writeln!(output, "  {label:<9} {value}");
    }
    output
}
