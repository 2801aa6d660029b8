//! Catalog service client
//!
//! [`CatalogService`] is the seam between the session state machine and
//! the network. [`HttpCatalogService`] talks to the real service;
//! [`MockCatalogService`] replays scripted responses for tests.

pub mod http;
pub mod mock;

pub use http::HttpCatalogService;
pub use mock::MockCatalogService;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::selection::CandidateFile;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Malformed catalog response: {0}")]
    MalformedBody(String),

    #[error("Cannot read {name} for upload: {source}")]
    ReadFile {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Remote catalog-generation service
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Send every file in one multipart request; returns the generated items
    async fn upload(&self, files: &[Arc<CandidateFile>]) -> Result<Catalog>;

    /// Fetch the full catalog
    async fn fetch(&self) -> Result<Catalog>;
}
