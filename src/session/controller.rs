use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::{NetworkError, SelectError};
use super::state::{OperationStatus, SessionState, SessionView};
use super::upload::{SubmitOutcome, UploadCoordinator};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::observability::{MetricsSnapshot, SessionMetrics};
use crate::remote::{CatalogService, HttpCatalogService, RemoteError};
use crate::selection::{CandidateFile, RejectionReason, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fetched catalog is now in the store
    Loaded { items: usize },
    /// The initial fetch already ran in this session
    AlreadyRequested,
    /// An upload replaced the catalog first; the older listing was dropped
    Stale,
    /// The session closed while the request was in flight
    Discarded,
}

/// Entry point for the presentation layer.
///
/// Owns the session state behind a single lock, runs the one-shot initial
/// fetch, and routes selections and submissions to the validator and the
/// [`UploadCoordinator`]. The lock is never held across a network call, so
/// a fetch and an upload can be in flight together.
pub struct SyncController {
    state: Mutex<SessionState>,
    validator: Validator,
    uploads: UploadCoordinator,
    service: Arc<dyn CatalogService>,
    metrics: Arc<SessionMetrics>,
    image_base: Option<Url>,
}

impl SyncController {
    pub fn new(service: Arc<dyn CatalogService>, validator: Validator) -> Self {
        let metrics = Arc::new(SessionMetrics::new());

        Self {
            state: Mutex::new(SessionState::new(metrics.clone())),
            validator,
            uploads: UploadCoordinator::new(service.clone(), metrics.clone()),
            service,
            metrics,
            image_base: None,
        }
    }

    /// Controller talking HTTP to the configured service
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let service = Arc::new(HttpCatalogService::new(&config.service)?);
        let image_base = Url::parse(&config.service.base_url)
            .map_err(|e| RemoteError::InvalidConfig(format!("base_url: {e}")))?;

        Ok(Self::new(service, Validator::from_config(&config.selection)).with_image_base(image_base))
    }

    /// Resolve relative catalog image URLs against `base` in views
    pub fn with_image_base(mut self, base: Url) -> Self {
        self.image_base = Some(base);
        self
    }

    /// Load the catalog once at startup.
    ///
    /// Later calls return [`FetchOutcome::AlreadyRequested`] without a
    /// request. There is no retry.
    pub async fn fetch_initial(&self) -> Result<FetchOutcome, NetworkError> {
        let revision = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Ok(FetchOutcome::Discarded);
            }
            if state.initial_fetch_requested {
                return Ok(FetchOutcome::AlreadyRequested);
            }
            state.initial_fetch_requested = true;
            state.fetch_status = OperationStatus::Fetching;
            state.error = None;
            state.catalog_revision()
        };

        info!("Fetching initial catalog");
        let result = self.service.fetch().await;

        let mut state = self.state.lock().await;
        if state.closed {
            self.metrics.result_discarded();
            debug!("Session closed, fetch result dropped");
            return Ok(FetchOutcome::Discarded);
        }
        state.fetch_status = OperationStatus::Idle;

        match result {
            Ok(catalog) if state.catalog_revision() != revision => {
                debug!(items = catalog.len(), "Catalog changed during fetch, listing dropped");
                Ok(FetchOutcome::Stale)
            }
            Ok(catalog) => {
                let items = catalog.len();
                state.catalog.replace(catalog);
                Ok(FetchOutcome::Loaded { items })
            }
            Err(e) => {
                self.metrics.fetch_failed();
                warn!(error = %e, "Initial catalog fetch failed");

                let err = NetworkError::FetchFailed(e);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Validate and select files already in memory. Returns the number of
    /// previews now live.
    pub async fn select(&self, files: Vec<CandidateFile>) -> Result<usize, RejectionReason> {
        let mut state = self.state.lock().await;
        state
            .apply_selection(&self.validator, files)
            .map(|previews| previews.len())
    }

    /// Read metadata for each path, then validate and select them.
    pub async fn select_paths(&self, paths: &[PathBuf]) -> Result<usize, SelectError> {
        self.state.lock().await.selection_status = OperationStatus::Validating;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match CandidateFile::from_path(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    let mut state = self.state.lock().await;
                    state.selection_status = OperationStatus::Idle;
                    state.error = Some(e.to_string());
                    warn!(path = %path.display(), error = %e, "Cannot read selected file");
                    return Err(e.into());
                }
            }
        }

        Ok(self.select(files).await?)
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, NetworkError> {
        self.uploads.submit(&self.state).await
    }

    /// Release every preview; results still in flight are dropped on arrival.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if !state.closed {
            info!("Session torn down");
        }
        state.close();
    }

    pub async fn view(&self) -> SessionView {
        self.state.lock().await.view(self.image_base.as_ref())
    }

    pub async fn catalog(&self) -> Catalog {
        self.state.lock().await.catalog().clone()
    }

    /// Run `f` against the current state
    pub async fn inspect<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.state.lock().await)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
