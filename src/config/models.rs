use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Remote catalog service endpoints and transport settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// Multipart field name shared by every uploaded file
    #[serde(default = "default_upload_field")]
    pub upload_field: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// API key (loaded from environment, never from the config file)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ServiceConfig {
    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    pub fn catalog_url(&self) -> String {
        join_url(&self.base_url, &self.catalog_path)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            catalog_path: default_catalog_path(),
            upload_field: default_upload_field(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_upload_path() -> String {
    "/api/upload".to_string()
}

fn default_catalog_path() -> String {
    "/api/catalog".to_string()
}

fn default_upload_field() -> String {
    "images".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

// Catalog generation runs a captioning model per image on the service side.
fn default_request_timeout_secs() -> u64 {
    120
}

fn default_user_agent() -> String {
    concat!("smartcatalog/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Rules applied to every selection batch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: ByteSize,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_file_bytes() -> ByteSize {
    ByteSize::mebibytes(5)
}

fn default_allowed_types() -> Vec<String> {
    vec![
        mime::IMAGE_JPEG.to_string(),
        mime::IMAGE_PNG.to_string(),
        mime::IMAGE_GIF.to_string(),
    ]
}
