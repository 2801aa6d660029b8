use thiserror::Error;

use crate::remote::RemoteError;
use crate::selection::{FileError, RejectionReason};

/// Failed remote operation. The display text is what the user sees; the
/// transport detail stays in the source chain.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Upload failed. Please try again.")]
    UploadFailed(#[source] RemoteError),

    #[error("Failed to fetch catalog. Please try again.")]
    FetchFailed(#[source] RemoteError),
}

impl NetworkError {
    pub fn remote(&self) -> &RemoteError {
        match self {
            NetworkError::UploadFailed(e) | NetworkError::FetchFailed(e) => e,
        }
    }
}

/// Selecting files from disk failed
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Rejected(#[from] RejectionReason),
}
