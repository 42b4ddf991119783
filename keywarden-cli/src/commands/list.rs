//! List group contents command.

use std::fmt::Write as _;
use std::path::Path;

use keywarden_core::{Item, ItemId};

use crate::cli::{OutputFormat, StoreArgs};
use crate::error::CliError;
use crate::util::unlock_store;

/// List command handler
pub fn cmd_list(
    config_path: Option<&Path>,
    store: &StoreArgs,
    group: Option<ItemId>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let (_, database) = unlock_store(config_path, store)?;

    let group = match group {
        Some(id) => database
            .find_group(id)
            .ok_or_else(|| CliError::GroupNotFound(id.to_string()))?,
        None => database.root(),
    };

    let items: Vec<ItemOutput> = group.items().iter().map(ItemOutput::from).collect();
    match format {
        OutputFormat::Table => println!("{}", format_table(&items)),
        OutputFormat::Json => println!("{}", format_json(&items)?),
    }

    Ok(())
}

/// Format items as a table string
#[must_use]
pub fn format_table(items: &[ItemOutput]) -> String {
    if items.is_empty() {
        return "Group is empty.".to_string();
    }

    let mut output = String::new();

    let id_width = 36;
    let kind_width = 5;
    let name_width = items
        .iter()
        .map(|i| i.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let _ = writeln!(
        output,
        "{:<kind_width$}  {:<id_width$}  {:<name_width$}  USERNAME",
        "KIND", "ID", "NAME"
    );
    let _ = writeln!(
        output,
        "{:-<kind_width$}  {:-<id_width$}  {:-<name_width$}  --------",
        "", "", ""
    );

    for item in items {
        let _ = writeln!(
            output,
            "{:<kind_width$}  {:<id_width$}  {:<name_width$}  {}",
            item.kind,
            item.id,
            item.name,
            item.username.as_deref().unwrap_or("")
        );
    }

    output.trim_end().to_string()
}

/// Format items as JSON string
///
/// # Errors
///
/// Returns `CliError::Input` if JSON serialization fails.
pub fn format_json(items: &[ItemOutput]) -> Result<String, CliError> {
    serde_json::to_string_pretty(items)
        .map_err(|e| CliError::Input(format!("Failed to serialize to JSON: {e}")))
}

/// Simplified item output for CLI
///
/// Passwords are never listed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemOutput {
    pub kind: &'static str,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl From<&Item> for ItemOutput {
    fn from(item: &Item) -> Self {
        match item {
            Item::Group(group) => Self {
                kind: "group",
                id: group.id().to_string(),
                name: group.name(),
                username: None,
                url: None,
            },
            Item::Entry(entry) => Self {
                kind: "entry",
                id: entry.id().to_string(),
                name: entry.title(),
                username: non_empty(entry.username()),
                url: non_empty(entry.url()),
            },
        }
    }
}
