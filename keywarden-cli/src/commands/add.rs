//! Add entry command.

use std::path::Path;

use keywarden_core::{EntryTemplate, ItemId};
use secrecy::ExposeSecret;

use crate::cli::StoreArgs;
use crate::error::CliError;
use crate::util::{read_secret, unlock_store};

/// Parameters for the add-entry command
pub struct AddEntryParams<'a> {
    pub title: &'a str,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub password: Option<&'a str>,
    pub group: Option<ItemId>,
}

impl AddEntryParams<'_> {
    /// Builds the template with the resolved entry password
    fn template(&self, password: &str) -> EntryTemplate {
        let mut template = EntryTemplate::new(self.title).with_password(password);
        if let Some(username) = self.username {
            template = template.with_username(username);
        }
        if let Some(url) = self.url {
            template = template.with_url(url);
        }
        if let Some(notes) = self.notes {
            template = template.with_notes(notes);
        }
        template
    }
}

/// Add entry command handler
pub fn cmd_add_entry(
    config_path: Option<&Path>,
    store: &StoreArgs,
    params: &AddEntryParams<'_>,
) -> Result<(), CliError> {
    if params.title.trim().is_empty() {
        return Err(CliError::Input("Entry title cannot be empty".to_string()));
    }

    let (file, database) = unlock_store(config_path, store)?;
    let group = match params.group {
        Some(id) => database
            .find_group(id)
            .ok_or_else(|| CliError::GroupNotFound(id.to_string()))?,
        None => database.root(),
    };

    let entry = match params.password {
        Some(password) => group.add_entry(&params.template(password)),
        None => {
            let password = read_secret(&format!("Password for entry '{}': ", params.title))?;
            group.add_entry(&params.template(password.expose_secret()))
        }
    };

    database.save_to(&file)?;

    println!(
        "Added entry '{}' to '{}' (ID: {})",
        entry.title(),
        group.name(),
        entry.id()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_skips_unset_fields() {
        let params = AddEntryParams {
            title: "Bank",
            username: Some("alice"),
            url: None,
            notes: None,
            password: None,
            group: None,
        };
        let template = params.template("p@ss");
        assert_eq!(template.title, "Bank");
        assert_eq!(template.username, "alice");
        assert_eq!(template.password, "p@ss");
        assert!(template.url.is_empty());
        assert!(template.notes.is_empty());
    }
}
