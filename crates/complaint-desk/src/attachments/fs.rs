use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{sanitize_file_name, AttachmentError, AttachmentStore};

/// Attachment store backed by a single flat directory.
#[derive(Debug, Clone)]
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    /// Open the store, creating the directory when it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| io_error(&root, source))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names that would escape the directory resolve to nothing.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let base = sanitize_file_name(name)?;
        Some(self.root.join(base))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> AttachmentError {
    AttachmentError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl AttachmentStore for FsAttachmentStore {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), AttachmentError> {
        let path = self.resolve(name).ok_or_else(|| {
            io_error(
                &self.root,
                std::io::Error::new(ErrorKind::InvalidInput, format!("invalid name {name:?}")),
            )
        })?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(AttachmentError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(source) => return Err(io_error(&path, source)),
        };

        if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(io_error(&path, source));
        }
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool, AttachmentError> {
        match self.resolve(name) {
            Some(path) => Ok(path.is_file()),
            None => Ok(false),
        }
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AttachmentError> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    fn remove(&self, name: &str) -> Result<(), AttachmentError> {
        let Some(path) = self.resolve(name) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(&path, source)),
        }
    }
}
