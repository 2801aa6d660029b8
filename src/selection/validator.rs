use thiserror::Error;

use super::{CandidateFile, SelectionBatch};
use crate::config::SelectionConfig;
use crate::humanize::ByteSize;

/// Why a selection batch was refused. Carries the first offending file only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// File name, reported type, and a label for the allowed types
    #[error("Unsupported file type: {0}. Only {2} are allowed.")]
    UnsupportedType(String, String, String),

    /// File name, size in bytes, limit in bytes
    #[error("File size too large: {0}. Max size is {max}.", max = human(.2))]
    TooLarge(String, u64, u64),
}

fn human(bytes: &u64) -> ByteSize {
    ByteSize(*bytes)
}

impl RejectionReason {
    pub fn file_name(&self) -> &str {
        match self {
            RejectionReason::UnsupportedType(name, ..) | RejectionReason::TooLarge(name, ..) => {
                name
            }
        }
    }
}

/// Accepts or rejects a whole selection.
///
/// Files are checked in selection order, type before size, and the first
/// violation ends the check.
#[derive(Debug, Clone)]
pub struct Validator {
    allowed: Vec<mime::Mime>,
    max_bytes: ByteSize,
}

impl Validator {
    pub fn new(allowed: Vec<mime::Mime>, max_bytes: ByteSize) -> Self {
        Self { allowed, max_bytes }
    }

    /// Entries that do not parse are skipped; config validation reports them.
    pub fn from_config(config: &SelectionConfig) -> Self {
        let allowed = config
            .allowed_types
            .iter()
            .filter_map(|t| t.parse::<mime::Mime>().ok())
            .collect();

        Self::new(allowed, config.max_file_bytes)
    }

    pub fn max_bytes(&self) -> ByteSize {
        self.max_bytes
    }

    pub fn validate(&self, files: Vec<CandidateFile>) -> Result<SelectionBatch, RejectionReason> {
        for file in &files {
            self.check(file)?;
        }

        Ok(SelectionBatch::new(files))
    }

    fn check(&self, file: &CandidateFile) -> Result<(), RejectionReason> {
        if !self.is_allowed(file.mime_type()) {
            return Err(RejectionReason::UnsupportedType(
                file.name().to_string(),
                file.mime_type().to_string(),
                self.allowed_label(),
            ));
        }

        if file.size_bytes() > self.max_bytes.as_u64() {
            return Err(RejectionReason::TooLarge(
                file.name().to_string(),
                file.size_bytes(),
                self.max_bytes.as_u64(),
            ));
        }

        Ok(())
    }

    fn is_allowed(&self, mime_type: &str) -> bool {
        let Ok(actual) = mime_type.parse::<mime::Mime>() else {
            return false;
        };

        self.allowed
            .iter()
            .any(|a| a.type_() == actual.type_() && a.subtype() == actual.subtype())
    }

    /// "JPEG, PNG, and GIF" for the default allow-list
    fn allowed_label(&self) -> String {
        let names: Vec<String> = self
            .allowed
            .iter()
            .map(|m| m.subtype().as_str().to_uppercase())
            .collect();

        match names.as_slice() {
            [] => "no types".to_string(),
            [one] => one.clone(),
            [a, b] => format!("{a} and {b}"),
            [init @ .., last] => format!("{}, and {}", init.join(", "), last),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(
            vec![mime::IMAGE_JPEG, mime::IMAGE_PNG, mime::IMAGE_GIF],
            ByteSize::mebibytes(5),
        )
    }
}
