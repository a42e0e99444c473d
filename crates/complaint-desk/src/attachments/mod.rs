//! Attachment upload policy and blob storage.
//!
//! Blobs are addressed by a generated name of the form `<unix-millis>-<token>-<base name>`;
//! complaint records only ever hold that name.

mod fs;
mod policy;

pub use fs::FsAttachmentStore;
pub use policy::{
    sanitize_file_name, stored_file_name, AttachmentPolicy, AttachmentUpload, UploadRejection,
    ALLOWED_CONTENT_TYPES,
};

/// Opaque blob storage keyed by generated filenames.
pub trait AttachmentStore: Send + Sync {
    /// Fails with `AttachmentError::AlreadyExists` when `name` is taken.
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), AttachmentError>;
    fn exists(&self, name: &str) -> Result<bool, AttachmentError>;
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AttachmentError>;
    fn remove(&self, name: &str) -> Result<(), AttachmentError>;
}

/// A stored blob together with the content type it should be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentBlob {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentBlob {
    pub fn new(name: String, bytes: Vec<u8>) -> Self {
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// Stored blobs are never overwritten.
    #[error("attachment {name} already exists")]
    AlreadyExists { name: String },
    #[error("attachment storage unavailable at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
