//! Core value types shared by the secret and database layers

mod credentials;
mod store_file;

pub use credentials::{CredentialValue, PromptResponse};
pub use store_file::{FileHandle, LocalFile, StoreFile};
