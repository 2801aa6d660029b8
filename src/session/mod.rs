//! Session orchestration
//!
//! [`SyncController`] is the single entry point a presentation layer talks
//! to. It owns a [`SessionState`] and drives three independent lanes:
//! selection (validate and preview), upload (send the batch, replace the
//! catalog) and the one-shot initial fetch.

mod controller;
mod error;
mod state;
mod upload;

pub use controller::{FetchOutcome, SyncController};
pub use error::{NetworkError, SelectError};
pub use state::{CatalogEntryView, OperationStatus, PreviewView, SessionState, SessionView};
pub use upload::{SkipReason, SubmitOutcome, UploadCoordinator, UploadTicket};
