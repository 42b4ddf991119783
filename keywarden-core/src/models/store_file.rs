//! File handle abstraction for password stores and key files.
//!
//! The core never opens paths itself: every store and key file is reached
//! through a [`StoreFile`] handle, whose `name` doubles as the store
//! identifier used to address saved credentials.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque reference to a stored file
pub trait StoreFile: Send + Sync + fmt::Debug {
    /// Stable display name of the file, used as the store identifier
    fn name(&self) -> &str;

    /// Reads the whole file
    ///
    /// # Errors
    /// Returns the underlying I/O error if the file cannot be read.
    fn read_all(&self) -> io::Result<Vec<u8>>;

    /// Replaces the file contents
    ///
    /// # Errors
    /// Returns the underlying I/O error if the file cannot be written.
    fn write_all(&self, data: &[u8]) -> io::Result<()>;
}

/// Shared handle to a [`StoreFile`]
pub type FileHandle = Arc<dyn StoreFile>;

/// A file on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    /// Creates a handle for `path`, named after its final component
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// Creates a shared handle for `path`
    #[must_use]
    pub fn handle(path: impl Into<PathBuf>) -> FileHandle {
        Arc::new(Self::new(path))
    }

    /// Path on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file currently exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl StoreFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn write_all(&self, data: &[u8]) -> io::Result<()> {
        // Write next to the target and rename so a failed save never truncates the store
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
