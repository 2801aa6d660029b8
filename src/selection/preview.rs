//! Revocable preview handles for the current selection
//!
//! Handles are not `Clone`: revoking one consumes it, so a handle can be
//! revoked at most once and never handed out twice. The
//! [`PreviewResourceManager`] is the only owner of live handles.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{CandidateFile, FileContent};
use crate::observability::SessionMetrics;

const URI_SCHEME: &str = "preview:";

/// Opaque handle to a registered preview
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URI a renderer passes back to [`PreviewRegistry::resolve`]
    pub fn uri(&self) -> String {
        format!("{URI_SCHEME}{}", self.id)
    }
}

/// Lookup table from live preview URIs to file content
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<Uuid, FileContent>,
}

impl PreviewRegistry {
    fn create(&mut self, file: &CandidateFile) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live.insert(id, file.content().clone());
        PreviewHandle { id }
    }

    fn revoke(&mut self, handle: PreviewHandle) -> bool {
        self.live.remove(&handle.id).is_some()
    }

    pub fn resolve(&self, uri: &str) -> Option<&FileContent> {
        let id = uri.strip_prefix(URI_SCHEME)?.parse::<Uuid>().ok()?;
        self.live.get(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// A preview paired with the file it shows
#[derive(Debug)]
pub struct PreviewResource {
    source: Arc<CandidateFile>,
    handle: PreviewHandle,
}

impl PreviewResource {
    pub fn source(&self) -> &CandidateFile {
        &self.source
    }

    pub fn handle(&self) -> &PreviewHandle {
        &self.handle
    }

    pub fn uri(&self) -> String {
        self.handle.uri()
    }
}

/// Owns the previews of exactly one selection batch at a time
#[derive(Debug)]
pub struct PreviewResourceManager {
    registry: PreviewRegistry,
    current: Vec<PreviewResource>,
    metrics: Arc<SessionMetrics>,
}

impl PreviewResourceManager {
    pub fn new(metrics: Arc<SessionMetrics>) -> Self {
        Self {
            registry: PreviewRegistry::default(),
            current: Vec::new(),
            metrics,
        }
    }

    /// Revoke every preview of the previous batch, then create one per file.
    pub fn replace_selection(&mut self, files: &[Arc<CandidateFile>]) -> &[PreviewResource] {
        self.release_all();

        self.current = files
            .iter()
            .map(|file| {
                let handle = self.registry.create(file);
                self.metrics.preview_created();
                debug!(file = file.name(), uri = %handle.uri(), "Preview created");
                PreviewResource {
                    source: Arc::clone(file),
                    handle,
                }
            })
            .collect();

        &self.current
    }

    /// Revoke every live preview. Calling it with nothing live is a no-op.
    pub fn release_all(&mut self) {
        for resource in self.current.drain(..) {
            let uri = resource.handle.uri();
            if self.registry.revoke(resource.handle) {
                self.metrics.preview_revoked();
                debug!(file = resource.source.name(), %uri, "Preview revoked");
            }
        }
    }

    pub fn resources(&self) -> &[PreviewResource] {
        &self.current
    }

    pub fn live_handles(&self) -> usize {
        self.registry.len()
    }

    pub fn resolve(&self, uri: &str) -> Option<&FileContent> {
        self.registry.resolve(uri)
    }
}

impl Drop for PreviewResourceManager {
    fn drop(&mut self) {
        self.release_all();
    }
}
