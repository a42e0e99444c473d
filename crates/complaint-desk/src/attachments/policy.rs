use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

const STORED_TOKEN_LEN: usize = 8;

/// Content types accepted for complaint attachments. `image/jpg` is non-standard but some
/// browsers still send it.
pub const ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "application/pdf"];

/// File received alongside a complaint submission, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("Only JPG, PNG, and PDF files are allowed")]
    DisallowedType,
    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("Attachment filename is invalid")]
    InvalidName,
}

/// Size and type gate applied before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentPolicy {
    max_bytes: usize,
}

impl AttachmentPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn check_size(&self, len: usize) -> Result<(), UploadRejection> {
        if len > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Parse the declared content type and compare its essence against the allow-list.
    pub fn check_content_type(&self, declared: Option<&str>) -> Result<String, UploadRejection> {
        let parsed = declared
            .and_then(|raw| raw.trim().parse::<mime::Mime>().ok())
            .ok_or(UploadRejection::DisallowedType)?;
        let essence = parsed.essence_str().to_ascii_lowercase();

        if ALLOWED_CONTENT_TYPES.contains(&essence.as_str()) {
            Ok(essence)
        } else {
            Err(UploadRejection::DisallowedType)
        }
    }

    /// Returns the normalised content type and the sanitised original name.
    pub fn validate(&self, upload: &AttachmentUpload) -> Result<(String, String), UploadRejection> {
        let content_type = self.check_content_type(upload.content_type.as_deref())?;
        self.check_size(upload.bytes.len())?;
        let file_name =
            sanitize_file_name(&upload.file_name).ok_or(UploadRejection::InvalidName)?;
        Ok((content_type, file_name))
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Reduce a client-supplied name to its final path component.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        name if name.contains('\0') => None,
        name => Some(name.to_string()),
    }
}

/// `<unix-millis>-<8 hex chars of token>-<base name>`.
///
/// The token keeps two same-named uploads in one millisecond apart.
pub fn stored_file_name(uploaded_at: DateTime<Utc>, token: Uuid, original: &str) -> String {
    let simple = token.simple().to_string();
    format!(
        "{}-{}-{original}",
        uploaded_at.timestamp_millis(),
        &simple[..STORED_TOKEN_LEN]
    )
}
