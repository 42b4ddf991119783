//! Interactive credential prompt collaborator

use async_trait::async_trait;

use crate::models::{PromptResponse, StoreFile};

/// Asks the user for the credentials of a store
///
/// Implemented by the presentation layer (a dialog, a terminal prompt).
/// Returning `None` means the user dismissed the prompt; the resolver treats
/// that as final and does not ask again.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Prompts for the password and optional key file of `store`
    async fn prompt(&self, store: &dyn StoreFile) -> Option<PromptResponse>;
}
