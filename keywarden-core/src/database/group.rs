//! Group wrapper with lazily materialized children

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use crate::format::node::{GroupNode, NodeEntry, NodeGroup, read, write};
use crate::format::TreeHandle;

use super::entry::{Entry, EntryTemplate};
use super::id::ItemId;

struct GroupInner {
    id: ItemId,
    node: GroupNode,
    tree: Arc<TreeHandle>,
    parent: Option<Weak<GroupInner>>,
    groups: OnceLock<Mutex<Vec<Group>>>,
    entries: OnceLock<Mutex<Vec<Entry>>>,
}

/// A group of entries and subgroups
///
/// Child wrappers are created on first access to [`Group::groups`] or
/// [`Group::entries`] and cached for the lifetime of this wrapper, so
/// repeated traversal hands out the same objects. Clones share the wrapper.
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

/// A child of a group, for list views
#[derive(Debug, Clone)]
pub enum Item {
    /// A subgroup
    Group(Group),
    /// An entry
    Entry(Entry),
}

impl Item {
    /// Identity of the child
    #[must_use]
    pub fn id(&self) -> ItemId {
        match self {
            Self::Group(group) => group.id(),
            Self::Entry(entry) => entry.id(),
        }
    }
}

impl Group {
    pub(crate) fn root(node: GroupNode, tree: Arc<TreeHandle>) -> Self {
        Self::wrap(node, None, tree)
    }

    fn wrap(
        node: GroupNode,
        parent: Option<Weak<GroupInner>>,
        tree: Arc<TreeHandle>,
    ) -> Self {
        let id = ItemId::from_uuid(read(&node).uuid);
        Self {
            inner: Arc::new(GroupInner {
                id,
                node,
                tree,
                parent,
                groups: OnceLock::new(),
                entries: OnceLock::new(),
            }),
        }
    }

    /// Identity of the group
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.inner.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> String {
        read(&self.inner.node).name.clone()
    }

    /// Notes
    #[must_use]
    pub fn notes(&self) -> String {
        read(&self.inner.node).notes.clone()
    }

    /// Parent wrapper, `None` for the root or once the parent is dropped
    ///
    /// Groups created by [`Group::add_group`] report the adder's parent here,
    /// not the adder.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Self { inner })
    }

    /// Whether both handles refer to the same wrapper object
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Child groups in tree order
    #[must_use]
    pub fn groups(&self) -> Vec<Self> {
        self.group_cache().clone()
    }

    /// Entries in tree order
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entry_cache().clone()
    }

    /// Child groups followed by entries
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.groups().into_iter().map(Item::Group).collect();
        items.extend(self.entries().into_iter().map(Item::Entry));
        items
    }

    /// Searches this group and its descendants for `id`
    #[must_use]
    pub fn find_group(&self, id: ItemId) -> Option<Self> {
        if self.id() == id {
            return Some(self.clone());
        }
        self.groups().iter().find_map(|child| child.find_group(id))
    }

    /// Searches the entries of this group and its descendants for `id`
    #[must_use]
    pub fn find_entry(&self, id: ItemId) -> Option<Entry> {
        self.entries()
            .into_iter()
            .find(|entry| entry.id() == id)
            .or_else(|| self.groups().iter().find_map(|child| child.find_entry(id)))
    }

    /// Adds an entry built from the non-empty fields of `template`
    ///
    /// The tree and the cached entry list are updated under the same lock.
    pub fn add_entry(&self, template: &EntryTemplate) -> Entry {
        let mut node = NodeEntry::new();
        for (field, value) in template.fields() {
            if !value.is_empty() {
                node.set_field(field.key(), value);
            }
        }
        let node = node.into_node();
        let entry = Entry::wrap(Arc::clone(&node), Arc::clone(&self.inner.tree));

        let mut cache = self.entry_cache();
        write(&self.inner.node).entries.push(node);
        cache.push(entry.clone());
        drop(cache);

        self.inner.tree.mark_modified();
        entry
    }

    /// Adds a subgroup
    ///
    /// The tree and the cached group list are updated under the same lock.
    /// The returned wrapper's parent is this group's parent.
    pub fn add_group(&self, template: &GroupTemplate) -> Self {
        let mut node = NodeGroup::new(template.name.clone());
        if !template.notes.is_empty() {
            node.notes.clone_from(&template.notes);
        }
        let node = node.into_node();
        let group = Self::wrap(
            Arc::clone(&node),
            self.inner.parent.clone(),
            Arc::clone(&self.inner.tree),
        );

        let mut cache = self.group_cache();
        write(&self.inner.node).groups.push(node);
        cache.push(group.clone());
        drop(cache);

        self.inner.tree.mark_modified();
        group
    }

    fn group_cache(&self) -> MutexGuard<'_, Vec<Self>> {
        self.inner
            .groups
            .get_or_init(|| {
                let parent = Arc::downgrade(&self.inner);
                let groups = read(&self.inner.node)
                    .groups
                    .iter()
                    .map(|child| {
                        Self::wrap(
                            Arc::clone(child),
                            Some(parent.clone()),
                            Arc::clone(&self.inner.tree),
                        )
                    })
                    .collect();
                Mutex::new(groups)
            })
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn entry_cache(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.inner
            .entries
            .get_or_init(|| {
                let entries = read(&self.inner.node)
                    .entries
                    .iter()
                    .map(|child| Entry::wrap(Arc::clone(child), Arc::clone(&self.inner.tree)))
                    .collect();
                Mutex::new(entries)
            })
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Values for a new group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTemplate {
    /// Display name
    pub name: String,
    /// Notes, written only when non-empty
    pub notes: String,
}

impl GroupTemplate {
    /// Creates a template with a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: String::new(),
        }
    }

    /// Sets the notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
