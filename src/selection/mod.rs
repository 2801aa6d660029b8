//! Local file selection: candidates, validation and preview handles
//!
//! A selection moves through three stages:
//! - [`CandidateFile`]: a file the user picked, immutable once built
//! - [`SelectionBatch`]: the ordered set of candidates that passed the [`Validator`]
//! - [`PreviewResource`]: one revocable preview per file in the current batch

pub mod preview;
pub mod validator;

pub use preview::{PreviewHandle, PreviewRegistry, PreviewResource, PreviewResourceManager};
pub use validator::{RejectionReason, Validator};

use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),
}

/// Where the bytes of a candidate live
#[derive(Debug, Clone)]
pub enum FileContent {
    InMemory(Bytes),
    /// Read lazily when the file is submitted
    OnDisk(PathBuf),
}

impl FileContent {
    pub async fn load(&self) -> io::Result<Bytes> {
        match self {
            FileContent::InMemory(bytes) => Ok(bytes.clone()),
            FileContent::OnDisk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// A file picked by the user
#[derive(Debug, Clone)]
pub struct CandidateFile {
    name: String,
    mime_type: String,
    size_bytes: u64,
    content: FileContent,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            content: FileContent::InMemory(bytes),
        }
    }

    /// Build a candidate from a path on disk.
    ///
    /// Only metadata is read here. The MIME type comes from the file
    /// extension, the same information a browser file input reports.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| FileError::Unreadable {
                path: path.clone(),
                source,
            })?;

        if !metadata.is_file() {
            return Err(FileError::NotAFile(path));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: mime_from_extension(&path).to_string(),
            name,
            size_bytes: metadata.len(),
            content: FileContent::OnDisk(path),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    pub async fn read(&self) -> io::Result<Bytes> {
        self.content.load().await
    }
}

fn mime_from_extension(path: &Path) -> mime::Mime {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg" | "jpe") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("txt") => mime::TEXT_PLAIN,
        Some("pdf") => mime::APPLICATION_PDF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Ordered, validated set of candidates. Never mutated in place; a new
/// selection or a successful upload swaps in a whole new batch.
#[derive(Debug, Clone)]
pub struct SelectionBatch {
    id: Uuid,
    files: Vec<Arc<CandidateFile>>,
}

impl SelectionBatch {
    pub(crate) fn new(files: Vec<CandidateFile>) -> Self {
        Self {
            id: Uuid::now_v7(),
            files: files.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            id: Uuid::nil(),
            files: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn files(&self) -> &[Arc<CandidateFile>] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name()).collect()
    }
}

impl Default for SelectionBatch {
    fn default() -> Self {
        Self::empty()
    }
}
