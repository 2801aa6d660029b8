//! Scripted catalog service for development and tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use super::{CatalogService, Result};
use crate::catalog::Catalog;
use crate::selection::CandidateFile;

/// Replays queued responses; an empty queue answers with an empty catalog.
///
/// With [`MockCatalogService::gated`], every upload parks until
/// [`release_upload`](MockCatalogService::release_upload) is called, which
/// lets a test hold an upload in flight.
#[derive(Debug, Default)]
pub struct MockCatalogService {
    uploads: Mutex<VecDeque<Result<Catalog>>>,
    fetches: Mutex<VecDeque<Result<Catalog>>>,
    uploaded_names: Mutex<Vec<Vec<String>>>,
    upload_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    upload_started: Notify,
    fetch_started: Notify,
    upload_gate: Option<Notify>,
    fetch_gate: Option<Notify>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockCatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads wait for [`release_upload`](Self::release_upload)
    pub fn gated() -> Self {
        Self {
            upload_gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    /// Fetches wait for [`release_fetch`](Self::release_fetch)
    pub fn gated_fetch() -> Self {
        Self {
            fetch_gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    pub fn push_upload(&self, response: Result<Catalog>) -> &Self {
        lock(&self.uploads).push_back(response);
        self
    }

    pub fn push_fetch(&self, response: Result<Catalog>) -> &Self {
        lock(&self.fetches).push_back(response);
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// File names of each upload request, in call order
    pub fn uploaded_names(&self) -> Vec<Vec<String>> {
        lock(&self.uploaded_names).clone()
    }

    pub async fn wait_upload_started(&self) {
        self.upload_started.notified().await;
    }

    pub async fn wait_fetch_started(&self) {
        self.fetch_started.notified().await;
    }

    pub fn release_upload(&self) {
        if let Some(gate) = &self.upload_gate {
            gate.notify_one();
        }
    }

    pub fn release_fetch(&self) {
        if let Some(gate) = &self.fetch_gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl CatalogService for MockCatalogService {
    async fn upload(&self, files: &[Arc<CandidateFile>]) -> Result<Catalog> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.uploaded_names).push(files.iter().map(|f| f.name().to_string()).collect());
        self.upload_started.notify_one();

        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }

        let next = lock(&self.uploads).pop_front();
        next.unwrap_or_else(|| Ok(Catalog::default()))
    }

    async fn fetch(&self) -> Result<Catalog> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_one();

        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }

        let next = lock(&self.fetches).pop_front();
        next.unwrap_or_else(|| Ok(Catalog::default()))
    }
}

