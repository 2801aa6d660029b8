//! Upload state machine: `Idle -> Uploading -> Idle`
//!
//! An upload is split into three steps so the session lock is never held
//! across the network call:
//! 1. [`UploadCoordinator::begin`] checks the guards under the lock and
//!    snapshots the batch into an [`UploadTicket`]
//! 2. [`UploadCoordinator::dispatch`] sends the request without the lock
//! 3. [`UploadCoordinator::complete`] applies the result under the lock
//!
//! [`UploadCoordinator::submit`] runs all three against a shared state.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::NetworkError;
use super::state::{OperationStatus, SessionState};
use crate::catalog::Catalog;
use crate::observability::SessionMetrics;
use crate::remote::{CatalogService, RemoteError};
use crate::selection::CandidateFile;

/// Why a submit request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyBatch,
    AlreadyUploading,
    SessionClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The response replaced the catalog
    Replaced { items: usize },
    /// No request was sent
    Skipped(SkipReason),
    /// The session closed while the request was in flight
    Discarded,
}

/// Snapshot of the batch being uploaded
#[derive(Debug)]
pub struct UploadTicket {
    batch_id: Uuid,
    files: Vec<Arc<CandidateFile>>,
}

impl UploadTicket {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub struct UploadCoordinator {
    service: Arc<dyn CatalogService>,
    metrics: Arc<SessionMetrics>,
}

impl UploadCoordinator {
    pub fn new(service: Arc<dyn CatalogService>, metrics: Arc<SessionMetrics>) -> Self {
        Self { service, metrics }
    }

    /// Move to `Uploading` if a request should go out.
    ///
    /// A running upload drops the request; it is not queued.
    pub fn begin(&self, state: &mut SessionState) -> Result<UploadTicket, SkipReason> {
        if state.closed {
            return Err(SkipReason::SessionClosed);
        }
        if state.upload_status == OperationStatus::Uploading {
            debug!("Upload already in flight, submit ignored");
            return Err(SkipReason::AlreadyUploading);
        }
        if state.selection.is_empty() {
            debug!("Nothing selected, submit ignored");
            return Err(SkipReason::EmptyBatch);
        }

        state.upload_status = OperationStatus::Uploading;
        state.error = None;

        let ticket = UploadTicket {
            batch_id: state.selection.id(),
            files: state.selection.files().to_vec(),
        };
        info!(batch_id = %ticket.batch_id, files = ticket.len(), "Upload started");

        Ok(ticket)
    }

    /// Send the ticket's files as one request
    pub async fn dispatch(&self, ticket: &UploadTicket) -> Result<Catalog, RemoteError> {
        self.metrics.upload_dispatched();
        self.service.upload(&ticket.files).await
    }

    /// Apply the response and return to `Idle`.
    ///
    /// On success the catalog is replaced and the uploaded batch cleared.
    /// If the user picked a different batch meanwhile, that newer batch is
    /// kept. On failure the catalog and selection stay as they were.
    pub fn complete(
        &self,
        state: &mut SessionState,
        ticket: UploadTicket,
        result: Result<Catalog, RemoteError>,
    ) -> Result<SubmitOutcome, NetworkError> {
        if state.closed {
            self.metrics.result_discarded();
            debug!(batch_id = %ticket.batch_id, "Session closed, upload result dropped");
            return Ok(SubmitOutcome::Discarded);
        }

        state.upload_status = OperationStatus::Idle;

        match result {
            Ok(catalog) => {
                let items = catalog.len();
                state.catalog.replace(catalog);

                if state.selection.id() == ticket.batch_id {
                    state.clear_selection();
                } else {
                    debug!(
                        uploaded = %ticket.batch_id,
                        current = %state.selection.id(),
                        "Selection changed during upload, keeping newer batch"
                    );
                }

                info!(batch_id = %ticket.batch_id, items, "Upload completed");
                Ok(SubmitOutcome::Replaced { items })
            }
            Err(e) => {
                self.metrics.upload_failed();
                warn!(batch_id = %ticket.batch_id, error = %e, "Upload failed");

                let err = NetworkError::UploadFailed(e);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Full submit against shared state; the lock is released while the
    /// request is in flight.
    pub async fn submit(&self, state: &Mutex<SessionState>) -> Result<SubmitOutcome, NetworkError> {
        let begun = {
            let mut guard = state.lock().await;
            self.begin(&mut guard)
        };

        let ticket = match begun {
            Ok(ticket) => ticket,
            Err(reason) => return Ok(SubmitOutcome::Skipped(reason)),
        };

        let result = self.dispatch(&ticket).await;

        let mut guard = state.lock().await;
        self.complete(&mut guard, ticket, result)
    }
}
