//! HTTP client for the catalog service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{CatalogService, RemoteError, Result};
use crate::catalog::Catalog;
use crate::config::ServiceConfig;
use crate::selection::CandidateFile;

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// reqwest-backed [`CatalogService`]
pub struct HttpCatalogService {
    client: Client,
    upload_url: String,
    catalog_url: String,
    upload_field: String,
    api_key: Option<String>,
}

impl HttpCatalogService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            upload_url: config.upload_url(),
            catalog_url: config.catalog_url(),
            upload_field: config.upload_field.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// One part per file, all under the shared upload field
    async fn build_form(&self, files: &[Arc<CandidateFile>]) -> Result<Form> {
        let mut form = Form::new();

        for file in files {
            let bytes = file.read().await.map_err(|source| RemoteError::ReadFile {
                name: file.name().to_string(),
                source,
            })?;

            let part = Part::bytes(bytes.to_vec())
                .file_name(file.name().to_string())
                .mime_str(file.mime_type())
                .map_err(|e| RemoteError::InvalidConfig(format!("{}: {}", file.name(), e)))?;

            form = form.part(self.upload_field.clone(), part);
        }

        Ok(form)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Catalog> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Catalog service returned an error status");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::RequestFailed(format!("Failed to read body: {}", e))
            }
        })?;

        let catalog = decode_catalog(&body)?;
        debug!(url, items = catalog.len(), "Catalog response decoded");

        Ok(catalog)
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn upload(&self, files: &[Arc<CandidateFile>]) -> Result<Catalog> {
        let form = self.build_form(files).await?;
        debug!(url = %self.upload_url, files = files.len(), "Posting upload");

        let request = self.client.post(&self.upload_url).multipart(form);
        self.send(request, &self.upload_url).await
    }

    async fn fetch(&self) -> Result<Catalog> {
        debug!(url = %self.catalog_url, "Fetching catalog");

        let request = self.client.get(&self.catalog_url);
        self.send(request, &self.catalog_url).await
    }
}

/// Decode a response body that must be a JSON array of catalog items
pub fn decode_catalog(body: &[u8]) -> Result<Catalog> {
    serde_json::from_slice(body).map_err(|e| RemoteError::MalformedBody(e.to_string()))
}
