//! Entry wrapper with write-through fields and change observers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::format::node::{self, EntryNode, read, write};
use crate::format::{Attachment, TreeHandle};

use super::id::ItemId;

/// The string fields of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    /// Entry title
    Title,
    /// Login name
    UserName,
    /// Password
    Password,
    /// Web address
    Url,
    /// Free-form notes
    Notes,
}

impl EntryField {
    /// All fields, in display order
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::UserName,
        Self::Password,
        Self::Url,
        Self::Notes,
    ];

    /// Key of the field in the node's field store
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => node::TITLE,
            Self::UserName => node::USER_NAME,
            Self::Password => node::PASSWORD,
            Self::Url => node::URL,
            Self::Notes => node::NOTES,
        }
    }

    /// Property name carried by change notifications
    #[must_use]
    pub const fn property_name(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::UserName => "UserName",
            Self::Password => "Password",
            Self::Url => "Url",
            Self::Notes => "Notes",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property_name())
    }
}

/// Handle returned by [`Entry::on_field_changed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type FieldObserver = Arc<dyn Fn(&Entry, EntryField) + Send + Sync>;

struct EntryInner {
    id: ItemId,
    node: EntryNode,
    tree: Arc<TreeHandle>,
    observers: Mutex<Vec<(ObserverId, FieldObserver)>>,
    next_observer: AtomicU64,
}

/// A password entry
///
/// Clones share the same wrapper: observers registered through one clone see
/// changes made through another.
#[derive(Clone)]
pub struct Entry {
    inner: Arc<EntryInner>,
}

impl Entry {
    pub(crate) fn wrap(node: EntryNode, tree: Arc<TreeHandle>) -> Self {
        let id = ItemId::from_uuid(read(&node).uuid);
        Self {
            inner: Arc::new(EntryInner {
                id,
                node,
                tree,
                observers: Mutex::new(Vec::new()),
                next_observer: AtomicU64::new(0),
            }),
        }
    }

    /// Identity of the entry
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.inner.id
    }

    /// Whether both handles refer to the same wrapper object
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reads a field, empty when unset
    #[must_use]
    pub fn get(&self, field: EntryField) -> String {
        read(&self.inner.node).field(field.key())
    }

    /// Writes a field through to the tree
    ///
    /// `None` leaves the field unchanged and notifies nobody. `Some` stores
    /// the value, marks the tree modified and notifies every observer once.
    pub fn set(&self, field: EntryField, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };

        write(&self.inner.node).set_field(field.key(), value);
        self.inner.tree.mark_modified();
        self.notify(field);
    }

    /// Entry title
    #[must_use]
    pub fn title(&self) -> String {
        self.get(EntryField::Title)
    }

    /// Sets the title
    pub fn set_title(&self, value: Option<&str>) {
        self.set(EntryField::Title, value);
    }

    /// Login name
    #[must_use]
    pub fn username(&self) -> String {
        self.get(EntryField::UserName)
    }

    /// Sets the login name
    pub fn set_username(&self, value: Option<&str>) {
        self.set(EntryField::UserName, value);
    }

    /// Password
    #[must_use]
    pub fn password(&self) -> String {
        self.get(EntryField::Password)
    }

    /// Sets the password
    pub fn set_password(&self, value: Option<&str>) {
        self.set(EntryField::Password, value);
    }

    /// Web address
    #[must_use]
    pub fn url(&self) -> String {
        self.get(EntryField::Url)
    }

    /// Sets the web address
    pub fn set_url(&self, value: Option<&str>) {
        self.set(EntryField::Url, value);
    }

    /// Notes
    #[must_use]
    pub fn notes(&self) -> String {
        self.get(EntryField::Notes)
    }

    /// Sets the notes
    pub fn set_notes(&self, value: Option<&str>) {
        self.set(EntryField::Notes, value);
    }

    /// Custom icon image, if the entry has one
    #[must_use]
    pub fn icon(&self) -> Option<Vec<u8>> {
        let icon = read(&self.inner.node).custom_icon?;
        self.inner.tree.custom_icon(icon).map(<[u8]>::to_vec)
    }

    /// Attached binaries
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        read(&self.inner.node).binaries.clone()
    }

    /// Registers a callback run synchronously after each field write
    pub fn on_field_changed<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&Self, EntryField) + Send + Sync + 'static,
    {
        let id = ObserverId(self.inner.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers().push((id, Arc::new(callback)));
        id
    }

    /// Unregisters a callback, returning whether it was registered
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|(observer, _)| *observer != id);
        observers.len() != before
    }

    fn observers(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, FieldObserver)>> {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, field: EntryField) {
        // Snapshot so callbacks may register or remove observers
        let observers: Vec<FieldObserver> = self
            .observers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in observers {
            callback(self, field);
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.inner.id)
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

/// Field values for a new entry
///
/// Empty fields are not written to the new entry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EntryTemplate {
    /// Entry title
    pub title: String,
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
    /// Web address
    pub url: String,
    /// Notes
    pub notes: String,
}

impl EntryTemplate {
    /// Creates a template with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the login name
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Sets the web address
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub(crate) fn fields(&self) -> [(EntryField, &str); 5] {
        [
            (EntryField::Title, self.title.as_str()),
            (EntryField::UserName, self.username.as_str()),
            (EntryField::Password, self.password.as_str()),
            (EntryField::Url, self.url.as_str()),
            (EntryField::Notes, self.notes.as_str()),
        ]
    }
}

impl fmt::Debug for EntryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryTemplate")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}
