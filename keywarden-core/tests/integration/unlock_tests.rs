//! Unlock workflow: resolve, open, optionally remember

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keywarden_core::{
    CancellationToken, CredentialPrompt, CredentialValue, DatabaseUnlocker, EntryTemplate,
    MemoryLocker, PromptResponse, StoreFile, UnlockError, VerificationResult,
};

use super::{FixedPresence, MemoryFile, ScriptedPrompt, resolver, test_format};

fn unlocker(locker: &Arc<MemoryLocker>, prompt: Arc<ScriptedPrompt>) -> DatabaseUnlocker {
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    DatabaseUnlocker::new(resolver(locker, presence, prompt), test_format())
}

fn seeded_store(name: &str, password: &str) -> MemoryFile {
    let file = MemoryFile::new(name);
    let locker = Arc::new(MemoryLocker::new());
    let db = unlocker(&locker, ScriptedPrompt::new(None))
        .create(&file, "Personal", &CredentialValue::from_password(password))
        .unwrap();
    db.root().add_entry(
        &EntryTemplate::new("Bank")
            .with_username("alice")
            .with_password("p@ss"),
    );
    db.save_to(&file).unwrap();
    file
}

#[tokio::test]
async fn remembered_password_skips_the_prompt_next_time() {
    let file = seeded_store("personal.kwdb", "hunter2");
    let locker = Arc::new(MemoryLocker::new());
    let prompt = ScriptedPrompt::new(Some("hunter2"));
    let unlocker = unlocker(&locker, Arc::clone(&prompt));

    let db = unlocker
        .unlock_and_remember(&file, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(db.root().entries()[0].username(), "alice");
    assert_eq!(prompt.calls(), 1);
    assert_eq!(locker.len(), 1);

    let again = unlocker.unlock(&file).await.unwrap().unwrap();
    assert_eq!(again.root().entries()[0].password(), "p@ss");
    assert_eq!(prompt.calls(), 1);
}

#[tokio::test]
async fn plain_unlock_saves_nothing() {
    let file = seeded_store("personal.kwdb", "hunter2");
    let locker = Arc::new(MemoryLocker::new());
    let unlocker = unlocker(&locker, ScriptedPrompt::new(Some("hunter2")));

    assert!(unlocker.unlock(&file).await.unwrap().is_some());
    assert!(locker.is_empty());
}

#[tokio::test]
async fn wrong_password_is_not_remembered() {
    let file = seeded_store("personal.kwdb", "hunter2");
    let locker = Arc::new(MemoryLocker::new());
    let unlocker = unlocker(&locker, ScriptedPrompt::new(Some("guess")));

    let err = unlocker.unlock_and_remember(&file, true).await.unwrap_err();
    assert_eq!(err, UnlockError::WrongCredential("personal.kwdb".to_string()));
    assert!(locker.is_empty());
}

#[tokio::test]
async fn dismissed_prompt_is_not_an_error() {
    let file = seeded_store("personal.kwdb", "hunter2");
    let locker = Arc::new(MemoryLocker::new());
    let unlocker = unlocker(&locker, ScriptedPrompt::new(None));

    assert!(unlocker.unlock(&file).await.unwrap().is_none());
}

#[tokio::test]
async fn unreadable_file_is_io_error() {
    #[derive(Debug)]
    struct Missing;

    impl StoreFile for Missing {
        fn name(&self) -> &str {
            "missing.kwdb"
        }

        fn read_all(&self) -> std::io::Result<Vec<u8>> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
        }

        fn write_all(&self, _data: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
    }

    let locker = Arc::new(MemoryLocker::new());
    let unlocker = unlocker(&locker, ScriptedPrompt::new(Some("pw")));

    let err = unlocker.unlock(&Missing).await.unwrap_err();
    assert!(matches!(err, UnlockError::Io { ref store, .. } if store == "missing.kwdb"));
}

#[tokio::test]
async fn pending_prompt_can_be_abandoned() {
    struct NeverAnswers;

    #[async_trait]
    impl CredentialPrompt for NeverAnswers {
        async fn prompt(&self, _store: &dyn StoreFile) -> Option<PromptResponse> {
            std::future::pending::<Option<PromptResponse>>().await
        }
    }

    let file = seeded_store("personal.kwdb", "hunter2");
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(false, VerificationResult::Unavailable);
    let vault = keywarden_core::SecretVault::new(
        locker.clone(),
        presence,
        keywarden_core::VaultSettings::default(),
    );
    let resolver = Arc::new(keywarden_core::CredentialResolver::new(
        vault,
        Arc::new(NeverAnswers),
    ));
    let unlocker = DatabaseUnlocker::new(resolver, test_format());

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        unlocker.unlock_cancellable(&file, &token),
    )
    .await
    .expect("cancellation should end the request");
    assert!(result.unwrap().is_none());
}
