//! Credential resolution across the vault, presence and prompt
//!
//! Each test builds a resolver over a shared in-memory locker, so the
//! saved state can be inspected after a request.

use std::sync::Arc;

use keywarden_core::{CredentialSource, MemoryLocker, ResolveOutcome, VerificationResult};
use secrecy::ExposeSecret;

use super::{FixedPresence, MemoryFile, ScriptedPrompt, resolver, secret};

fn resolved_password(outcome: ResolveOutcome) -> (String, CredentialSource) {
    match outcome {
        ResolveOutcome::Resolved { credential, source } => {
            (credential.password().expose_secret().to_string(), source)
        }
        ResolveOutcome::Cancelled => panic!("expected a credential"),
    }
}

#[tokio::test]
async fn saved_password_is_used_after_verification() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    let prompt = ScriptedPrompt::new(Some("typed"));
    let resolver = resolver(&locker, Arc::clone(&presence), Arc::clone(&prompt));
    let file = MemoryFile::new("work.kwdb");

    assert!(resolver.set_credentials(&file, None, &secret("saved")));

    let (password, source) = resolved_password(resolver.resolve(&file, None).await);
    assert_eq!(password, "saved");
    assert_eq!(source, CredentialSource::Vault);
    assert_eq!(presence.requests(), 1);
    assert_eq!(prompt.calls(), 0);
    assert_eq!(locker.len(), 1);
}

#[tokio::test]
async fn declined_verification_purges_and_prompts() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Declined);
    let prompt = ScriptedPrompt::new(Some("typed"));
    let resolver = resolver(&locker, presence, Arc::clone(&prompt));
    let file = MemoryFile::new("work.kwdb");
    resolver.set_credentials(&file, None, &secret("saved"));

    let (password, source) = resolved_password(resolver.resolve(&file, None).await);
    assert_eq!(password, "typed");
    assert_eq!(source, CredentialSource::Prompt);
    assert_eq!(prompt.calls(), 1);
    assert!(locker.is_empty());
}

#[tokio::test]
async fn unsupported_presence_never_reads_the_vault() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(false, VerificationResult::Verified);
    let prompt = ScriptedPrompt::new(Some("typed"));
    let resolver = resolver(&locker, Arc::clone(&presence), prompt);
    let file = MemoryFile::new("work.kwdb");
    resolver.set_credentials(&file, None, &secret("saved"));

    let (password, source) = resolved_password(resolver.resolve(&file, None).await);
    assert_eq!(password, "typed");
    assert_eq!(source, CredentialSource::Prompt);
    assert_eq!(presence.requests(), 0);
    // Nothing was consulted, so nothing was purged
    assert_eq!(locker.len(), 1);
}

#[tokio::test]
async fn saved_passwords_are_per_store() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    let prompt = ScriptedPrompt::new(Some("typed"));
    let resolver = resolver(&locker, presence, Arc::clone(&prompt));
    let work = MemoryFile::new("work.kwdb");
    let home = MemoryFile::new("home.kwdb");

    resolver.set_credentials(&work, None, &secret("work-pw"));
    resolver.set_credentials(&home, None, &secret("home-pw"));

    let (work_pw, _) = resolved_password(resolver.resolve(&work, None).await);
    let (home_pw, _) = resolved_password(resolver.resolve(&home, None).await);
    assert_eq!(work_pw, "work-pw");
    assert_eq!(home_pw, "home-pw");
    assert_eq!(prompt.calls(), 0);
}

#[tokio::test]
async fn username_selects_among_several_entries() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    let prompt = ScriptedPrompt::new(None);
    let resolver = resolver(&locker, presence, prompt);
    let file = MemoryFile::new("shared.kwdb");

    resolver.set_credentials(&file, Some("alice"), &secret("alice-pw"));
    resolver.set_credentials(&file, Some("bob"), &secret("bob-pw"));

    let (password, _) = resolved_password(resolver.resolve(&file, Some("bob")).await);
    assert_eq!(password, "bob-pw");

    // Two candidates and no match for the default username
    assert!(resolver.resolve(&file, None).await.is_cancelled());
}

#[tokio::test]
async fn overwrite_keeps_a_single_entry() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    let resolver = resolver(&locker, presence, ScriptedPrompt::new(None));
    let file = MemoryFile::new("work.kwdb");

    assert!(resolver.set_credentials(&file, None, &secret("first")));
    assert!(resolver.set_credentials(&file, None, &secret("second")));
    assert_eq!(locker.len(), 1);

    let (password, _) = resolved_password(resolver.resolve(&file, None).await);
    assert_eq!(password, "second");
}

#[tokio::test]
async fn forget_then_prompt() {
    let locker = Arc::new(MemoryLocker::new());
    let presence = FixedPresence::new(true, VerificationResult::Verified);
    let prompt = ScriptedPrompt::new(None);
    let resolver = resolver(&locker, presence, Arc::clone(&prompt));
    let file = MemoryFile::new("work.kwdb");

    resolver.set_credentials(&file, None, &secret("saved"));
    assert!(resolver.forget(&file, None));
    assert!(!resolver.forget(&file, None));

    assert!(resolver.resolve(&file, None).await.is_cancelled());
    assert_eq!(prompt.calls(), 1);
}
