//! Storage collaborator.
//!
//! The lifecycle manager never touches the filesystem directly; it goes
//! through [`Storage`], keyed by `/`-separated relative paths. The shipped
//! implementation is [`FileSystemStorage`], rooted at a media directory
//! chosen by the caller (nothing is read from global settings).
//!
//! ```text
//! media_root/                  ← FileSystemStorage::new("media_root", "/media/")
//! └── images/
//!     ├── dawn.jpg             ← key "images/dawn.jpg", url "/media/images/dawn.jpg"
//!     └── dawn_640.jpg
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("no such file: '{0}'")]
    NotFound(String),
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),
}

impl StorageError {
    fn from_io(key: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io {
                key: key.to_string(),
                source: err,
            }
        }
    }
}

/// Key-addressed file storage.
pub trait Storage: Send + Sync {
    /// Physical location of `key`.
    fn path(&self, key: &str) -> Result<PathBuf, StorageError>;

    /// Public URL of `key`.
    fn url(&self, key: &str) -> String;

    /// Size of the stored file in bytes.
    fn size(&self, key: &str) -> Result<u64, StorageError>;

    fn exists(&self, key: &str) -> bool;

    /// Read the full contents of `key`.
    fn open(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or overwrite `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Missing keys yield [`StorageError::NotFound`].
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// [`Storage`] backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key under the root, refusing anything that could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for FileSystemStorage {
    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        self.resolve(key)
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    fn size(&self, key: &str) -> Result<u64, StorageError> {
        let path = self.resolve(key)?;
        std::fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| StorageError::from_io(key, e))
    }

    fn exists(&self, key: &str) -> bool {
        self.resolve(key).is_ok_and(|p| p.is_file())
    }

    fn open(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        std::fs::read(&path).map_err(|e| StorageError::from_io(key, e))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::from_io(key, e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| StorageError::from_io(key, e))
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        std::fs::remove_file(&path).map_err(|e| StorageError::from_io(key, e))
    }
}
