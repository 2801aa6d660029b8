//! Session counters, traced as they change

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the preview and network lifecycle of one session
#[derive(Debug, Default)]
pub struct SessionMetrics {
    previews_created: AtomicU64,
    previews_revoked: AtomicU64,
    uploads_dispatched: AtomicU64,
    uploads_failed: AtomicU64,
    fetches_failed: AtomicU64,
    results_discarded: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview_created(&self) {
        self.previews_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "previews_created", "Metric incremented");
    }

    pub fn preview_revoked(&self) {
        self.previews_revoked.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "previews_revoked", "Metric incremented");
    }

    pub fn upload_dispatched(&self) {
        self.uploads_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "uploads_dispatched", "Metric incremented");
    }

    pub fn upload_failed(&self) {
        self.uploads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "uploads_failed", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetches_failed", "Metric incremented");
    }

    pub fn result_discarded(&self) {
        self.results_discarded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "results_discarded", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            previews_created: self.previews_created.load(Ordering::Relaxed),
            previews_revoked: self.previews_revoked.load(Ordering::Relaxed),
            uploads_dispatched: self.uploads_dispatched.load(Ordering::Relaxed),
            uploads_failed: self.uploads_failed.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            results_discarded: self.results_discarded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub previews_created: u64,
    pub previews_revoked: u64,
    pub uploads_dispatched: u64,
    pub uploads_failed: u64,
    pub fetches_failed: u64,
    pub results_discarded: u64,
}

impl MetricsSnapshot {
    /// Preview handles created and not yet revoked
    pub fn live_previews(&self) -> u64 {
        self.previews_created - self.previews_revoked
    }
}
