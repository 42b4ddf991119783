//! Opened store tree

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use ring::digest::{SHA256, digest};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::FormatResult;
use crate::models::CredentialValue;

use super::node::{CustomIcon, GroupNode, NodeGroup, read};

/// Current document version
pub const FORMAT_VERSION: u32 = 1;

const fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Serialized contents of a store
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Document version for compatibility
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Store display name
    pub name: String,
    /// When the store was created
    pub created_at: DateTime<Utc>,
    /// Root group
    pub root: GroupNode,
    /// Custom icon table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<CustomIcon>,
}

/// Key material derived from a credential
///
/// SHA-256 of the password followed by SHA-256 of the key file contents.
/// The password hash is left out when only a key file is given.
pub struct CompositeKey(Zeroizing<Vec<u8>>);

impl CompositeKey {
    /// Derives the composite key of a credential, reading its key file
    ///
    /// # Errors
    /// Returns `FormatError::Io` if the key file cannot be read.
    pub fn from_credential(credential: &CredentialValue) -> FormatResult<Self> {
        let mut key = Zeroizing::new(Vec::with_capacity(64));

        if credential.has_password() || credential.key_file().is_none() {
            let password = credential.password().expose_secret().as_bytes();
            key.extend_from_slice(digest(&SHA256, password).as_ref());
        }
        if let Some(file) = credential.key_file() {
            let contents = Zeroizing::new(file.read_all()?);
            key.extend_from_slice(digest(&SHA256, &contents).as_ref());
        }

        Ok(Self(key))
    }

    /// Raw key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CompositeKey([REDACTED])")
    }
}

/// An opened store: the parsed tree plus what is needed to save it again
///
/// The credential itself is not kept, only its [`CompositeKey`].
#[derive(Debug)]
pub struct TreeHandle {
    document: StoreDocument,
    key: CompositeKey,
    modified: AtomicBool,
}

impl TreeHandle {
    /// Creates a new store holding an empty root group named `name`
    ///
    /// The new tree counts as modified until it is first saved.
    ///
    /// # Errors
    /// Returns `FormatError::Io` if the credential's key file cannot be read.
    pub fn create(name: impl Into<String>, credential: &CredentialValue) -> FormatResult<Self> {
        let name = name.into();
        let document = StoreDocument {
            format_version: FORMAT_VERSION,
            root: NodeGroup::new(name.clone()).into_node(),
            name,
            created_at: Utc::now(),
            icons: Vec::new(),
        };
        let tree = Self::from_parts(document, CompositeKey::from_credential(credential)?);
        tree.mark_modified();
        Ok(tree)
    }

    /// Builds a handle from a parsed document
    #[must_use]
    pub fn from_parts(document: StoreDocument, key: CompositeKey) -> Self {
        Self {
            document,
            key,
            modified: AtomicBool::new(false),
        }
    }

    /// Store display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.document.name
    }

    /// Root group node
    #[must_use]
    pub const fn root(&self) -> &GroupNode {
        &self.document.root
    }

    /// Identifier of the store, taken from its root group
    #[must_use]
    pub fn database_id(&self) -> Uuid {
        read(&self.document.root).uuid
    }

    /// Adds a custom icon to the icon table, returning its identifier
    pub fn add_custom_icon(&mut self, data: Vec<u8>) -> Uuid {
        let uuid = Uuid::new_v4();
        self.document.icons.push(CustomIcon { uuid, data });
        self.mark_modified();
        uuid
    }

    /// Image data of a custom icon
    #[must_use]
    pub fn custom_icon(&self, uuid: Uuid) -> Option<&[u8]> {
        self.document
            .icons
            .iter()
            .find(|icon| icon.uuid == uuid)
            .map(|icon| icon.data.as_slice())
    }

    /// Whether the tree has unsaved changes
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    /// Flags the tree as having unsaved changes
    pub fn mark_modified(&self) {
        self.modified.store(true, Ordering::SeqCst);
    }

    /// Clears the unsaved-changes flag after a successful save
    pub fn mark_saved(&self) {
        self.modified.store(false, Ordering::SeqCst);
    }

    /// The serialized form of the tree
    #[must_use]
    pub const fn document(&self) -> &StoreDocument {
        &self.document
    }

    /// Key the tree is sealed with
    #[must_use]
    pub const fn key(&self) -> &CompositeKey {
        &self.key
    }
}
