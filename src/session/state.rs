//! Owned session state and its read-only view

use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogStore, Specifications};
use crate::observability::SessionMetrics;
use crate::selection::{
    CandidateFile, PreviewResource, PreviewResourceManager, RejectionReason, SelectionBatch,
    Validator,
};

/// Progress of one operation lane. Selection, upload and fetch each have
/// their own lane and never block each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    Idle,
    Validating,
    Uploading,
    Fetching,
}

/// Everything the client knows during one session.
///
/// Operations take it by `&mut`; the only network-facing code lives in
/// the coordinators, which never hold it across a suspension point.
#[derive(Debug)]
pub struct SessionState {
    pub(crate) selection: SelectionBatch,
    pub(crate) previews: PreviewResourceManager,
    pub(crate) catalog: CatalogStore,
    pub(crate) selection_status: OperationStatus,
    pub(crate) upload_status: OperationStatus,
    pub(crate) fetch_status: OperationStatus,
    pub(crate) error: Option<String>,
    pub(crate) initial_fetch_requested: bool,
    pub(crate) closed: bool,
}

impl SessionState {
    pub fn new(metrics: Arc<SessionMetrics>) -> Self {
        Self {
            selection: SelectionBatch::empty(),
            previews: PreviewResourceManager::new(metrics),
            catalog: CatalogStore::new(),
            selection_status: OperationStatus::Idle,
            upload_status: OperationStatus::Idle,
            fetch_status: OperationStatus::Idle,
            error: None,
            initial_fetch_requested: false,
            closed: false,
        }
    }

    pub fn selection(&self) -> &SelectionBatch {
        &self.selection
    }

    pub fn previews(&self) -> &PreviewResourceManager {
        &self.previews
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.catalog()
    }

    pub fn catalog_revision(&self) -> u64 {
        self.catalog.revision()
    }

    pub fn selection_status(&self) -> OperationStatus {
        self.selection_status
    }

    pub fn upload_status(&self) -> OperationStatus {
        self.upload_status
    }

    pub fn fetch_status(&self) -> OperationStatus {
        self.fetch_status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Validate a new selection and, only if it passes, swap it in.
    ///
    /// A rejection records the error and leaves the current batch and its
    /// previews untouched.
    pub fn apply_selection(
        &mut self,
        validator: &Validator,
        files: Vec<CandidateFile>,
    ) -> Result<&[PreviewResource], RejectionReason> {
        if self.closed {
            warn!("Selection ignored, session is closed");
            return Ok(&[]);
        }

        self.selection_status = OperationStatus::Validating;
        let result = validator.validate(files);
        self.selection_status = OperationStatus::Idle;

        match result {
            Ok(batch) => {
                self.error = None;
                info!(batch_id = %batch.id(), files = batch.len(), "Selection accepted");
                self.replace_selection(batch);
                Ok(self.previews.resources())
            }
            Err(reason) => {
                warn!(file = reason.file_name(), %reason, "Selection rejected");
                self.error = Some(reason.to_string());
                Err(reason)
            }
        }
    }

    pub(crate) fn replace_selection(&mut self, batch: SelectionBatch) {
        self.previews.replace_selection(batch.files());
        self.selection = batch;
    }

    pub(crate) fn clear_selection(&mut self) {
        self.previews.release_all();
        self.selection = SelectionBatch::empty();
    }

    /// Release every preview and stop accepting results
    pub fn close(&mut self) {
        self.clear_selection();
        self.closed = true;
    }

    /// Submitting makes sense only with files selected and no upload running
    pub fn can_submit(&self) -> bool {
        !self.closed && self.upload_status != OperationStatus::Uploading && !self.selection.is_empty()
    }

    /// Snapshot for the presentation layer. Catalog image paths are
    /// resolved against `image_base` when given.
    pub fn view(&self, image_base: Option<&Url>) -> SessionView {
        SessionView {
            previews: self
                .previews
                .resources()
                .iter()
                .map(|r| PreviewView {
                    name: r.source().name().to_string(),
                    uri: r.uri(),
                })
                .collect(),
            catalog: self
                .catalog()
                .items()
                .iter()
                .map(|item| CatalogEntryView {
                    name: item.name().to_string(),
                    description: item.description().to_string(),
                    image_url: match image_base {
                        Some(base) => item.resolved_image_url(base),
                        None => item.image_url().to_string(),
                    },
                    specifications: item.specifications().clone(),
                })
                .collect(),
            uploading: self.upload_status == OperationStatus::Uploading,
            fetching: self.fetch_status == OperationStatus::Fetching,
            can_submit: self.can_submit(),
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub previews: Vec<PreviewView>,
    pub catalog: Vec<CatalogEntryView>,
    pub uploading: bool,
    pub fetching: bool,
    pub can_submit: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntryView {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub specifications: Specifications,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn state() -> (SessionState, Arc<SessionMetrics>) {
        let metrics = Arc::new(SessionMetrics::new());
        (SessionState::new(metrics.clone()), metrics)
    }

    fn file(name: &str, mime_type: &str, size: usize) -> CandidateFile {
        CandidateFile::from_bytes(name, mime_type, vec![0u8; size])
    }

    #[test]
    fn rejection_keeps_prior_batch_and_previews() {
        let (mut state, metrics) = state();
        let validator = Validator::default();

        let accepted = state
            .apply_selection(
                &validator,
                vec![file("photo.jpg", "image/jpeg", 2 * MIB), file("icon.png", "image/png", MIB)],
            )
            .unwrap();
        assert_eq!(accepted.len(), 2);
        let batch_id = state.selection().id();

        let err = state
            .apply_selection(&validator, vec![file("huge.gif", "image/gif", 6 * MIB)])
            .unwrap_err();

        assert_eq!(err, RejectionReason::TooLarge("huge.gif".to_string(), 6_291_456, 5_242_880));
        assert_eq!(state.selection().id(), batch_id);
        assert_eq!(state.selection().names(), vec!["photo.jpg", "icon.png"]);
        assert_eq!(state.previews().live_handles(), 2);
        assert_eq!(metrics.snapshot().previews_revoked, 0);
        assert_eq!(state.error(), Some("File size too large: huge.gif. Max size is 5MB."));
        assert_eq!(state.selection_status(), OperationStatus::Idle);
    }

    #[test]
    fn accepted_selection_clears_error_and_replaces_previews() {
        let (mut state, metrics) = state();
        let validator = Validator::default();

        state.apply_selection(&validator, vec![file("a.png", "image/png", 1)]).unwrap();
        let _ = state.apply_selection(&validator, vec![file("a.txt", "text/plain", 1)]);
        assert!(state.error().is_some());

        state
            .apply_selection(&validator, vec![file("b.png", "image/png", 1), file("c.gif", "image/gif", 1)])
            .unwrap();

        assert!(state.error().is_none());
        assert_eq!(state.previews().live_handles(), 2);
        assert_eq!(metrics.snapshot().previews_revoked, 1);
    }

    #[test]
    fn empty_selection_clears_batch() {
        let (mut state, _) = state();
        let validator = Validator::default();

        state.apply_selection(&validator, vec![file("a.png", "image/png", 1)]).unwrap();
        let previews = state.apply_selection(&validator, vec![]).unwrap();

        assert!(previews.is_empty());
        assert!(state.selection().is_empty());
        assert_eq!(state.previews().live_handles(), 0);
        assert!(!state.can_submit());
    }

    #[test]
    fn close_releases_previews_and_ignores_later_selections() {
        let (mut state, metrics) = state();
        let validator = Validator::default();

        state.apply_selection(&validator, vec![file("a.png", "image/png", 1)]).unwrap();
        state.close();
        state.close();

        assert_eq!(metrics.snapshot().live_previews(), 0);
        assert_eq!(metrics.snapshot().previews_revoked, 1);

        let previews = state.apply_selection(&validator, vec![file("b.png", "image/png", 1)]).unwrap();
        assert!(previews.is_empty());
        assert_eq!(state.previews().live_handles(), 0);
    }

    #[test]
    fn view_reflects_selection() {
        let (mut state, _) = state();
        state
            .apply_selection(&Validator::default(), vec![file("a.png", "image/png", 1)])
            .unwrap();

        let view = state.view(None);
        assert_eq!(view.previews.len(), 1);
        assert_eq!(view.previews[0].name, "a.png");
        assert!(view.previews[0].uri.starts_with("preview:"));
        assert!(view.can_submit);
        assert!(!view.uploading);
        assert!(view.catalog.is_empty());
    }
}
