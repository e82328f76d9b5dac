//! Uploaded documents: validated PDF bytes held in memory.
//!
//! pdfium reads straight from a byte slice, so an upload never needs a temp
//! file. We validate the PDF magic bytes (`%PDF`) up front so a user who picks
//! a PNG gets a clear message rather than a pdfium parse error.

use crate::error::AutofillError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Media type accepted for uploads and used for the download.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// An uploaded PDF.
///
/// Consumed by value when OCR runs; the bytes are not kept afterwards.
#[derive(Clone)]
pub struct Document {
    name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Wrap uploaded bytes, rejecting anything that is not a PDF.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AutofillError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(AutofillError::EmptyUpload { name });
        }
        if !bytes.starts_with(PDF_MAGIC) {
            let magic = bytes.iter().take(PDF_MAGIC.len()).copied().collect();
            return Err(AutofillError::NotAPdf { name, magic });
        }
        debug!("Accepted upload '{}' ({} bytes)", name, bytes.len());
        Ok(Self { name, bytes })
    }

    /// Read a PDF from disk.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AutofillError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => AutofillError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AutofillError::FileNotFound {
                path: PathBuf::from(path),
            },
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content fingerprint used to tell a re-upload of the same file from a
    /// new document.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.bytes.hash(&mut hasher);
        hasher.finish()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
