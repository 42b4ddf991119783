//! Store file format
//!
//! A [`StoreFormat`] turns bytes plus a credential into a [`TreeHandle`] and
//! writes a tree back out. The database adapter only sees the parsed nodes;
//! the on-disk layout and the cryptography stay behind this trait.

pub mod node;
mod sealed;
mod tree;

use std::io::{Read, Write};

use crate::error::FormatResult;
use crate::models::CredentialValue;

pub use node::{Attachment, CustomIcon, EntryNode, FieldValue, GroupNode, NodeEntry, NodeGroup};
pub use sealed::{KdfParams, MAGIC, SealedFormat};
pub use tree::{CompositeKey, FORMAT_VERSION, StoreDocument, TreeHandle};

/// Progress reporting for long format operations
pub trait StatusLogger {
    /// An operation started
    fn start(&self, operation: &str);

    /// Percentage completed; returns `false` to request cancellation
    fn progress(&self, percent: u8) -> bool;

    /// The operation finished
    fn end(&self);
}

/// A [`StatusLogger`] that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStatusLogger;

impl StatusLogger for NoOpStatusLogger {
    fn start(&self, _operation: &str) {}

    fn progress(&self, _percent: u8) -> bool {
        true
    }

    fn end(&self) {}
}

/// Reads and writes store files
pub trait StoreFormat: Send + Sync {
    /// Decrypts and parses a store
    ///
    /// The credential is consumed; only its derived key is kept in the
    /// returned tree.
    ///
    /// # Errors
    /// - `FormatError::WrongCredential` if the credential does not match
    /// - `FormatError::Corrupt` if the data is not a valid store
    /// - `FormatError::Io` if reading fails
    fn open(&self, reader: &mut dyn Read, credential: CredentialValue) -> FormatResult<TreeHandle>;

    /// Serializes and encrypts a tree
    ///
    /// # Errors
    /// Returns `FormatError::Serialize` or `FormatError::Io` on failure.
    fn save(
        &self,
        writer: &mut dyn Write,
        tree: &TreeHandle,
        status: &dyn StatusLogger,
    ) -> FormatResult<()>;
}
