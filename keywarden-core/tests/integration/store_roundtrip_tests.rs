//! Saving a store and opening it again through the public API

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use keywarden_core::format::node::{self, NodeEntry, write};
use keywarden_core::format::{Attachment, StoreFormat};
use keywarden_core::{
    CredentialValue, Database, EntryField, EntryTemplate, FormatError, GroupTemplate, ItemId,
    NoOpStatusLogger, TreeHandle,
};

use super::{MemoryFile, TEST_KDF, test_format};

fn reopen(file: &MemoryFile, password: &str) -> Result<Database, FormatError> {
    let format = test_format();
    let tree = format.open(
        &mut file.bytes().as_slice(),
        CredentialValue::from_password(password),
    )?;
    Ok(Database::new(tree, format))
}

fn new_database(name: &str, password: &str) -> Database {
    let tree = TreeHandle::create(name, &CredentialValue::from_password(password)).unwrap();
    Database::new(tree, test_format())
}

#[test]
fn entry_survives_save_and_open() {
    let file = MemoryFile::new("personal.kwdb");
    let db = new_database("Personal", "hunter2");
    let entry = db.root().add_entry(
        &EntryTemplate::new("Bank")
            .with_username("alice")
            .with_password("p@ss"),
    );
    let entry_id = entry.id();
    db.save_to(&file).unwrap();

    let reopened = reopen(&file, "hunter2").unwrap();
    let entries = reopened.root().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id(), entry_id);
    assert_eq!(entries[0].title(), "Bank");
    assert_eq!(entries[0].username(), "alice");
    assert_eq!(entries[0].password(), "p@ss");
    assert_eq!(entries[0].url(), "");
    assert_eq!(entries[0].notes(), "");
}

#[test]
fn nested_groups_keep_order_and_identity() {
    let file = MemoryFile::new("nested.kwdb");
    let db = new_database("Nested", "pw");
    let root = db.root();
    let email = root.add_group(&GroupTemplate::new("Email").with_notes("mail accounts"));
    let banking = root.add_group(&GroupTemplate::new("Banking"));
    email.add_entry(&EntryTemplate::new("Work mail").with_url("https://mail.example.com"));
    db.save_to(&file).unwrap();

    let reopened = reopen(&file, "pw").unwrap();
    assert_eq!(reopened.id(), db.id());

    let groups = reopened.root().groups();
    let names: Vec<String> = groups.iter().map(keywarden_core::Group::name).collect();
    assert_eq!(names, ["Email", "Banking"]);
    assert_eq!(groups[0].id(), email.id());
    assert_eq!(groups[1].id(), banking.id());
    assert_eq!(groups[0].notes(), "mail accounts");

    let found = reopened.find_group(email.id()).unwrap();
    assert_eq!(found.entries()[0].url(), "https://mail.example.com");
}

#[test]
fn field_edits_are_saved() {
    let file = MemoryFile::new("edits.kwdb");
    let db = new_database("Edits", "pw");
    let entry = db.root().add_entry(&EntryTemplate::new("Old title"));
    db.save_to(&file).unwrap();
    assert!(!db.modified());

    entry.set_title(Some("New title"));
    entry.set_notes(Some("rotated"));
    entry.set_url(None);
    assert!(db.modified());
    db.save_to(&file).unwrap();

    let reopened = reopen(&file, "pw").unwrap();
    let entry = &reopened.root().entries()[0];
    assert_eq!(entry.get(EntryField::Title), "New title");
    assert_eq!(entry.get(EntryField::Notes), "rotated");
}

#[test]
fn icons_and_attachments_survive() {
    let file = MemoryFile::new("binary.kwdb");
    let mut tree = TreeHandle::create("Binary", &CredentialValue::from_password("pw")).unwrap();
    let icon = tree.add_custom_icon(vec![0x89, b'P', b'N', b'G']);

    let mut node_entry = NodeEntry::new();
    node_entry.set_field(node::TITLE, "Server");
    node_entry.custom_icon = Some(icon);
    node_entry
        .binaries
        .push(Attachment::new("id_ed25519.pub", b"ssh-ed25519 AAAA".to_vec()));
    write(tree.root()).entries.push(node_entry.into_node());

    let db = Database::new(tree, test_format());
    db.save_to(&file).unwrap();

    let reopened = reopen(&file, "pw").unwrap();
    let entry = &reopened.root().entries()[0];
    assert_eq!(entry.icon(), Some(vec![0x89, b'P', b'N', b'G']));
    let attachments = entry.attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].name, "id_ed25519.pub");
    assert_eq!(attachments[0].data, b"ssh-ed25519 AAAA");
}

#[test]
fn wrong_password_is_rejected() {
    let file = MemoryFile::new("locked.kwdb");
    new_database("Locked", "right").save_to(&file).unwrap();

    assert_eq!(
        reopen(&file, "wrong").unwrap_err(),
        FormatError::WrongCredential
    );
}

#[test]
fn flipped_ciphertext_byte_is_rejected() {
    let file = MemoryFile::new("tampered.kwdb");
    new_database("Tampered", "pw").save_to(&file).unwrap();

    let mut bytes = file.bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let tampered = MemoryFile::new("tampered.kwdb");
    keywarden_core::StoreFile::write_all(&tampered, &bytes).unwrap();

    assert!(reopen(&tampered, "pw").is_err());
}

#[test]
fn save_reports_progress() {
    struct Counting(AtomicUsize);

    impl keywarden_core::StatusLogger for Counting {
        fn start(&self, _operation: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn progress(&self, _percent: u8) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn end(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let tree = TreeHandle::create("Progress", &CredentialValue::from_password("pw")).unwrap();
    let logger = Counting(AtomicUsize::new(0));
    let mut out = Vec::new();
    keywarden_core::SealedFormat::with_kdf(TEST_KDF)
        .save(&mut out, &tree, &logger)
        .unwrap();

    assert!(logger.0.load(Ordering::SeqCst) >= 2);
    assert!(out.starts_with(keywarden_core::format::MAGIC));

    // The silent logger works the same way
    let mut quiet = Vec::new();
    keywarden_core::SealedFormat::with_kdf(TEST_KDF)
        .save(&mut quiet, &tree, &NoOpStatusLogger)
        .unwrap();
    assert!(!quiet.is_empty());
}

#[test]
fn two_adapters_over_one_tree_agree_on_ids() {
    let db = new_database("Shared", "pw");
    let entry = db.root().add_entry(&EntryTemplate::new("Bank"));

    let other = Database::from_shared(Arc::clone(db.tree()), test_format());
    let seen = other.root().entries();
    assert_eq!(seen[0].id(), entry.id());
    assert!(!seen[0].ptr_eq(&entry));

    let parsed: ItemId = entry.id().to_string().parse().unwrap();
    assert_eq!(parsed, seen[0].id());
}
