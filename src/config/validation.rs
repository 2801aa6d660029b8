use super::models::{Config, SelectionConfig, ServiceConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("service.base_url must be an absolute http(s) URL, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("service.{field} must start with '/', got '{value}'")]
    InvalidPath { field: &'static str, value: String },

    #[error("service.upload_field must not be empty")]
    EmptyUploadField,

    #[error("service.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("selection.max_file_bytes must be greater than zero")]
    ZeroMaxFileBytes,

    #[error("selection.allowed_types must list at least one MIME type")]
    EmptyAllowList,

    #[error("selection.allowed_types entry '{0}' is not a valid MIME type")]
    InvalidMimeType(String),

    #[error("selection.allowed_types entry '{0}' is not an image type")]
    NonImageType(String),
}

/// Validate the full configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_service(&config.service)?;
    validate_selection(&config.selection)?;
    Ok(())
}

fn validate_service(service: &ServiceConfig) -> Result<(), ValidationError> {
    match reqwest::Url::parse(&service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => return Err(ValidationError::InvalidBaseUrl(service.base_url.clone())),
    }

    for (field, value) in [
        ("upload_path", &service.upload_path),
        ("catalog_path", &service.catalog_path),
    ] {
        if !value.starts_with('/') {
            return Err(ValidationError::InvalidPath {
                field,
                value: value.clone(),
            });
        }
    }

    if service.upload_field.trim().is_empty() {
        return Err(ValidationError::EmptyUploadField);
    }

    if service.connect_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout("connect_timeout_secs"));
    }
    if service.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout("request_timeout_secs"));
    }

    Ok(())
}

fn validate_selection(selection: &SelectionConfig) -> Result<(), ValidationError> {
    if selection.max_file_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroMaxFileBytes);
    }

    if selection.allowed_types.is_empty() {
        return Err(ValidationError::EmptyAllowList);
    }

    for entry in &selection.allowed_types {
        let parsed: mime::Mime = entry
            .parse()
            .map_err(|_| ValidationError::InvalidMimeType(entry.clone()))?;

        if parsed.type_() != mime::IMAGE {
            return Err(ValidationError::NonImageType(entry.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.service.base_url = "ftp://catalog".to_string();

        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidBaseUrl(_)));

        config.service.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ValidationError::InvalidBaseUrl(_)
        ));
    }

    #[test]
    fn test_rejects_relative_paths() {
        let mut config = Config::default();
        config.service.catalog_path = "api/catalog".to_string();

        let err = validate(&config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidPath { field: "catalog_path", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_allow_list() {
        let mut config = Config::default();
        config.selection.allowed_types = vec![];
        assert!(matches!(validate(&config).unwrap_err(), ValidationError::EmptyAllowList));

        config.selection.allowed_types = vec!["jpeg".to_string()];
        assert!(matches!(
            validate(&config).unwrap_err(),
            ValidationError::InvalidMimeType(_)
        ));

        config.selection.allowed_types = vec!["application/pdf".to_string()];
        assert!(matches!(
            validate(&config).unwrap_err(),
            ValidationError::NonImageType(_)
        ));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = Config::default();
        config.selection.max_file_bytes = ByteSize(0);
        assert!(matches!(validate(&config).unwrap_err(), ValidationError::ZeroMaxFileBytes));

        let mut config = Config::default();
        config.service.request_timeout_secs = 0;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ValidationError::ZeroTimeout("request_timeout_secs")
        ));
    }
}
