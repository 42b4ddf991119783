//! Database adapter
//!
//! Wraps an opened [`TreeHandle`] into a tree of [`Group`] and [`Entry`]
//! objects for the presentation layer:
//!
//! - identities are computed once per wrapper from the node UUID
//! - children are wrapped on first traversal and cached
//! - entry field writes go straight to the tree and notify observers

mod entry;
mod group;
mod id;

use std::io::Write;
use std::sync::{Arc, OnceLock};

use tracing::{debug, instrument};

use crate::error::FormatResult;
use crate::format::{NoOpStatusLogger, StoreFormat, TreeHandle};
use crate::models::StoreFile;
use crate::tracing::field_names::STORE;
use crate::tracing::span_names::DATABASE_SAVE;

pub use entry::{Entry, EntryField, EntryTemplate, ObserverId};
pub use group::{Group, GroupTemplate, Item};
pub use id::ItemId;

/// An unlocked password store
pub struct Database {
    tree: Arc<TreeHandle>,
    format: Arc<dyn StoreFormat>,
    root: OnceLock<Group>,
}

impl Database {
    /// Wraps an opened tree
    #[must_use]
    pub fn new(tree: TreeHandle, format: Arc<dyn StoreFormat>) -> Self {
        Self::from_shared(Arc::new(tree), format)
    }

    /// Wraps a tree that may already be wrapped by another adapter
    ///
    /// Each adapter builds its own wrappers: ids match across adapters,
    /// wrapper objects do not.
    #[must_use]
    pub fn from_shared(tree: Arc<TreeHandle>, format: Arc<dyn StoreFormat>) -> Self {
        Self {
            tree,
            format,
            root: OnceLock::new(),
        }
    }

    /// The wrapped tree
    #[must_use]
    pub fn tree(&self) -> &Arc<TreeHandle> {
        &self.tree
    }

    /// Store display name
    #[must_use]
    pub fn name(&self) -> &str {
        self.tree.name()
    }

    /// Identity of the store
    #[must_use]
    pub fn id(&self) -> ItemId {
        ItemId::from_uuid(self.tree.database_id())
    }

    /// Whether there are unsaved changes
    #[must_use]
    pub fn modified(&self) -> bool {
        self.tree.is_modified()
    }

    /// Root group, wrapped on first access
    #[must_use]
    pub fn root(&self) -> Group {
        self.root
            .get_or_init(|| Group::root(Arc::clone(self.tree.root()), Arc::clone(&self.tree)))
            .clone()
    }

    /// Finds a group anywhere in the tree
    #[must_use]
    pub fn find_group(&self, id: ItemId) -> Option<Group> {
        self.root().find_group(id)
    }

    /// Finds an entry anywhere in the tree
    #[must_use]
    pub fn find_entry(&self, id: ItemId) -> Option<Entry> {
        self.root().find_entry(id)
    }

    /// Finds a group, falling back to the root when it does not exist
    #[must_use]
    pub fn group_or_root(&self, id: Option<ItemId>) -> Group {
        id.and_then(|id| self.find_group(id))
            .unwrap_or_else(|| self.root())
    }

    /// Serializes the whole tree to `writer`
    ///
    /// Clears [`Database::modified`] on success.
    ///
    /// # Errors
    /// Returns the format's error if serialization or the write fails.
    #[instrument(name = DATABASE_SAVE, level = "debug", skip_all, fields({ STORE } = %self.name()))]
    pub fn save(&self, writer: &mut dyn Write) -> FormatResult<()> {
        self.format.save(writer, &self.tree, &NoOpStatusLogger)?;
        self.tree.mark_saved();
        debug!("Store saved");
        Ok(())
    }

    /// Serializes the tree and replaces the contents of `file`
    ///
    /// # Errors
    /// Returns the format's error if serialization or the write fails.
    #[instrument(name = DATABASE_SAVE, level = "debug", skip_all, fields({ STORE } = %self.name()))]
    pub fn save_to(&self, file: &dyn StoreFile) -> FormatResult<()> {
        let mut buffer = Vec::new();
        self.format.save(&mut buffer, &self.tree, &NoOpStatusLogger)?;
        file.write_all(&buffer)?;
        self.tree.mark_saved();
        debug!(file = %file.name(), "Store written");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name())
            .field("modified", &self.modified())
            .finish_non_exhaustive()
    }
}
