//! Property-based tests for the saved-credential vault
//!
//! **Validates: store/find addressing, disambiguation by username, empty
//! secret rejection**

use std::sync::Arc;

use keywarden_core::{MemoryLocker, SecretVault, UnsupportedPresence, VaultSettings};
use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};

fn vault() -> (SecretVault, Arc<MemoryLocker>) {
    let locker = Arc::new(MemoryLocker::new());
    let vault = SecretVault::new(
        locker.clone(),
        Arc::new(UnsupportedPresence),
        VaultSettings::default(),
    );
    (vault, locker)
}

// ========== Strategies ==========

fn arb_store_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}\\.kwdb"
}

fn arb_username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

fn arb_secret() -> impl Strategy<Value = String> {
    "[ -~]{1,64}"
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_secret_is_found_and_retrieved(
        store in arb_store_name(),
        username in arb_username(),
        password in arb_secret(),
    ) {
        let (vault, _) = vault();
        let resource = vault.resource_tag(&store);

        prop_assert!(vault.store(&resource, Some(username.as_str()), &SecretString::from(password.clone())));

        let mut entry = vault.find(&resource, Some(username.as_str())).unwrap();
        prop_assert_eq!(entry.username(), username.as_str());
        prop_assert!(vault.retrieve_secret(&mut entry));
        let revealed = entry.secret().reveal().unwrap();
        prop_assert_eq!(revealed.expose_secret(), password.as_str());
    }

    #[test]
    fn repeated_store_keeps_one_entry_per_key(
        store in arb_store_name(),
        passwords in prop::collection::vec(arb_secret(), 1..6),
    ) {
        let (vault, locker) = vault();
        let resource = vault.resource_tag(&store);

        for password in &passwords {
            prop_assert!(vault.store(&resource, None, &SecretString::from(password.clone())));
        }
        prop_assert_eq!(locker.len(), 1);

        let mut entry = vault.find(&resource, None).unwrap();
        prop_assert!(vault.retrieve_secret(&mut entry));
        let last = passwords.last().unwrap();
        let revealed = entry.secret().reveal().unwrap();
        prop_assert_eq!(revealed.expose_secret(), last.as_str());
    }

    #[test]
    fn username_picks_its_own_entry(
        store in arb_store_name(),
        usernames in prop::collection::btree_set(arb_username(), 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let (vault, _) = vault();
        let resource = vault.resource_tag(&store);
        let usernames: Vec<String> = usernames.into_iter().collect();

        for username in &usernames {
            let secret = SecretString::from(format!("pw-{username}"));
            prop_assert!(vault.store(&resource, Some(username.as_str()), &secret));
        }

        let chosen = pick.get(&usernames);
        let mut entry = vault.find(&resource, Some(chosen.as_str())).unwrap();
        prop_assert_eq!(entry.username(), chosen.as_str());
        prop_assert!(vault.retrieve_secret(&mut entry));
        let expected = format!("pw-{chosen}");
        let revealed = entry.secret().reveal().unwrap();
        prop_assert_eq!(revealed.expose_secret(), expected.as_str());
    }

    #[test]
    fn single_entry_is_found_for_any_username(
        store in arb_store_name(),
        saved_as in arb_username(),
        asked_as in arb_username(),
    ) {
        let (vault, _) = vault();
        let resource = vault.resource_tag(&store);
        prop_assert!(vault.store(&resource, Some(saved_as.as_str()), &SecretString::from("pw".to_string())));

        let entry = vault.find(&resource, Some(asked_as.as_str())).unwrap();
        prop_assert_eq!(entry.username(), saved_as.as_str());
    }

    #[test]
    fn other_stores_are_not_matched(
        store in arb_store_name(),
        other in arb_store_name(),
    ) {
        prop_assume!(store != other);
        let (vault, _) = vault();
        let resource = vault.resource_tag(&store);
        prop_assert!(vault.store(&resource, None, &SecretString::from("pw".to_string())));

        prop_assert!(vault.find(&vault.resource_tag(&other), None).is_none());
    }

    #[test]
    fn empty_secret_is_never_stored(
        store in arb_store_name(),
        username in proptest::option::of(arb_username()),
    ) {
        let (vault, locker) = vault();
        let resource = vault.resource_tag(&store);

        prop_assert!(!vault.store(&resource, username.as_deref(), &SecretString::from(String::new())));
        prop_assert!(locker.is_empty());
    }
}
