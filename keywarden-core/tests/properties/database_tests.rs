//! Property-based tests for the database adapter
//!
//! **Validates: added items appear exactly once, wrapper caching, identity
//! stability across adapters**

use std::collections::HashSet;
use std::sync::Arc;

use keywarden_core::{
    CredentialValue, Database, EntryTemplate, GroupTemplate, KdfParams, SealedFormat, TreeHandle,
};
use proptest::prelude::*;

fn new_database() -> Database {
    let tree = TreeHandle::create("Props", &CredentialValue::from_password("pw")).unwrap();
    let format = SealedFormat::with_kdf(KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    });
    Database::new(tree, Arc::new(format))
}

fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{0,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn added_entries_appear_exactly_once(
        titles in prop::collection::vec(arb_title(), 1..12),
        materialize_first in any::<bool>(),
    ) {
        let db = new_database();
        let root = db.root();
        if materialize_first {
            prop_assert!(root.entries().is_empty());
        }

        let added: Vec<_> = titles
            .iter()
            .map(|t| root.add_entry(&EntryTemplate::new(t.clone())))
            .collect();

        let entries = root.entries();
        prop_assert_eq!(entries.len(), titles.len());
        for (entry, expected) in entries.iter().zip(&added) {
            prop_assert!(entry.ptr_eq(expected));
        }
        for (entry, title) in entries.iter().zip(&titles) {
            prop_assert_eq!(&entry.title(), title);
        }
    }

    #[test]
    fn ids_are_unique_and_shared_across_adapters(
        group_count in 0usize..6,
        entry_count in 0usize..6,
    ) {
        let db = new_database();
        let root = db.root();
        for i in 0..group_count {
            root.add_group(&GroupTemplate::new(format!("group {i}")));
        }
        for i in 0..entry_count {
            root.add_entry(&EntryTemplate::new(format!("entry {i}")));
        }

        let ids: Vec<_> = root.items().iter().map(keywarden_core::Item::id).collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), group_count + entry_count);

        let other = Database::from_shared(Arc::clone(db.tree()), Arc::new(SealedFormat::default()));
        let other_ids: Vec<_> = other.root().items().iter().map(keywarden_core::Item::id).collect();
        prop_assert_eq!(ids, other_ids);
    }

    #[test]
    fn repeated_traversal_returns_same_wrappers(depth in 1usize..5) {
        let db = new_database();
        let mut group = db.root();
        for level in 0..depth {
            let child = group.add_group(&GroupTemplate::new(format!("level {level}")));
            group = group.groups().into_iter().next().unwrap();
            prop_assert!(group.ptr_eq(&child));
        }

        let mut first = db.root();
        let mut second = db.root();
        for _ in 0..depth {
            first = first.groups().remove(0);
            second = second.groups().remove(0);
            prop_assert!(first.ptr_eq(&second));
        }
    }

    #[test]
    fn blank_template_fields_are_not_written(
        username in "[a-z]{0,8}",
        url in "[a-z]{0,8}",
    ) {
        let db = new_database();
        let entry = db.root().add_entry(
            &EntryTemplate::new("Item").with_username(username.clone()).with_url(url.clone()),
        );

        let fields = {
            let root = keywarden_core::format::node::read(db.tree().root());
            let node = keywarden_core::format::node::read(&root.entries[0]);
            node.fields.keys().cloned().collect::<HashSet<_>>()
        };
        prop_assert_eq!(fields.contains(keywarden_core::format::node::USER_NAME), !username.is_empty());
        prop_assert_eq!(fields.contains(keywarden_core::format::node::URL), !url.is_empty());
        prop_assert_eq!(entry.username(), username);
        prop_assert_eq!(entry.url(), url);
    }
}
