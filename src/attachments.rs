use uuid::Uuid;

// Upload screening shared by the album, gallery, and report endpoints.
// Everything here is pure; the storage backends handle the actual bytes.

/// Uniform size ceiling across upload kinds: 50 MiB.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
pub const ALLOWED_DOCUMENT_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];

pub const ALLOWED_IMAGE_MIME_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
];
pub const ALLOWED_DOCUMENT_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

/// UploadKind
///
/// Which allow-lists apply to an incoming file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Document,
}

/// UploadError
///
/// Rejection reasons produced by `validate_upload`. Batch endpoints skip the
/// offending file; single-file paths surface these as an HTTP 415.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedMimeType(String),
    #[error("File too large. Maximum size: 50MB")]
    TooLarge,
}

/// Lowercased extension of `filename`, if it has one.
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// validate_upload
///
/// Screens a file by extension, declared MIME type, and byte length against
/// the allow-lists for `kind`.
pub fn validate_upload(
    filename: &str,
    content_type: &str,
    size: usize,
    kind: UploadKind,
) -> Result<(), UploadError> {
    let (extensions, mime_types): (&[&str], &[&str]) = match kind {
        UploadKind::Image => (&ALLOWED_IMAGE_EXTENSIONS, &ALLOWED_IMAGE_MIME_TYPES),
        UploadKind::Document => (&ALLOWED_DOCUMENT_EXTENSIONS, &ALLOWED_DOCUMENT_MIME_TYPES),
    };

    let ext = extension(filename)
        .ok_or_else(|| UploadError::UnsupportedExtension(filename.to_string()))?;
    if !extensions.contains(&ext.as_str()) {
        return Err(UploadError::UnsupportedExtension(ext));
    }
    if !mime_types.contains(&content_type) {
        return Err(UploadError::UnsupportedMimeType(content_type.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// secure_filename
///
/// Reduces a client-supplied filename to a safe single path component:
/// anything up to the last separator is discarded, whitespace becomes `_`,
/// and only ASCII alphanumerics plus `._-` survive. Returns None when nothing
/// usable remains (e.g. the name was only dots).
pub fn secure_filename(name: &str) -> Option<String> {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.' || c == '_') {
        return None;
    }
    Some(cleaned)
}

/// unique_filename
///
/// Collision-resistant stored name: a random UUID prefix joined to the
/// secured original name.
pub fn unique_filename(secured: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), secured)
}

/// CleanupOutcome
///
/// Result of removing an entity's owned attachments from storage. Cleanup is
/// best-effort: failures are recorded here and logged, never allowed to block
/// removal of the owning record.
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    /// Storage identifiers successfully removed.
    pub removed: usize,
    /// Storage identifiers that could not be removed and may need manual
    /// reconciliation.
    pub failed: Vec<String>,
}

impl CleanupOutcome {
    pub fn record_removed(&mut self) {
        self.removed += 1;
    }

    pub fn record_failure(&mut self, identifier: impl Into<String>) {
        self.failed.push(identifier.into());
    }

    /// True when every owned attachment was removed from storage.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
