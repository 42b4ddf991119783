//! Parsed tree nodes
//!
//! The tree is shared between the format (which serializes it) and the
//! database adapter (which wraps and mutates it), so every node sits behind
//! an `Arc<RwLock<_>>`. A poisoned lock is recovered rather than propagated:
//! node data stays consistent because every write is a single assignment.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field key of the entry title
pub const TITLE: &str = "Title";
/// Field key of the entry username
pub const USER_NAME: &str = "UserName";
/// Field key of the entry password
pub const PASSWORD: &str = "Password";
/// Field key of the entry URL
pub const URL: &str = "URL";
/// Field key of the entry notes
pub const NOTES: &str = "Notes";

/// Shared group node
pub type GroupNode = Arc<RwLock<NodeGroup>>;
/// Shared entry node
pub type EntryNode = Arc<RwLock<NodeEntry>>;

/// Read-locks a node
pub fn read<T>(node: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    node.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write-locks a node
pub fn write<T>(node: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    node.write().unwrap_or_else(PoisonError::into_inner)
}

/// A group in the parsed tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    /// Native unique identifier
    pub uuid: Uuid,
    /// Display name
    pub name: String,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Custom icon, referencing the tree's icon table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<Uuid>,
    /// Child groups in display order
    #[serde(default)]
    pub groups: Vec<GroupNode>,
    /// Entries in display order
    #[serde(default)]
    pub entries: Vec<EntryNode>,
}

impl NodeGroup {
    /// Creates an empty group with a fresh identifier
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            notes: String::new(),
            custom_icon: None,
            groups: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Wraps the group into a shared node
    #[must_use]
    pub fn into_node(self) -> GroupNode {
        Arc::new(RwLock::new(self))
    }
}

/// A string field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// The value
    pub value: String,
    /// Whether the value should be hidden in the UI
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub protected: bool,
}

/// An attached binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name
    pub name: String,
    /// Contents
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A custom icon stored in the tree's icon table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomIcon {
    /// Identifier referenced by groups and entries
    pub uuid: Uuid,
    /// Image data
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

/// An entry in the parsed tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Native unique identifier
    pub uuid: Uuid,
    /// String fields by key (see [`TITLE`], [`USER_NAME`], ...)
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Custom icon, referencing the tree's icon table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<Uuid>,
    /// Attached binaries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries: Vec<Attachment>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

impl Default for NodeEntry {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            fields: BTreeMap::new(),
            custom_icon: None,
            binaries: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }
}

impl NodeEntry {
    /// Creates an empty entry with a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a string field, empty when absent
    #[must_use]
    pub fn field(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    /// Writes a string field; the password is stored protected
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(
            key.to_string(),
            FieldValue {
                value: value.into(),
                protected: key == PASSWORD,
            },
        );
        self.modified_at = Utc::now();
    }

    /// Wraps the entry into a shared node
    #[must_use]
    pub fn into_node(self) -> EntryNode {
        Arc::new(RwLock::new(self))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}
