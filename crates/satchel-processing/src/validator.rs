use satchel_core::{ToolsConfig, ToolsError};

/// Content validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Content type not allowed: {content_type} (allowed: {allowed:?})")]
    ContentTypeNotAllowed {
        content_type: String,
        allowed: Vec<String>,
    },
}

impl From<ValidationError> for ToolsError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ContentTypeNotAllowed { content_type, .. } => {
                ToolsError::FileTypeNotAllowed { content_type }
            }
        }
    }
}

/// Allow-list check for sniffed content types
///
/// Entries are compared case-insensitively against the full sniffed value,
/// parameters included (`text/plain; charset=utf-8` must be listed as such).
/// An empty allow-list accepts every type.
#[derive(Clone, Debug, Default)]
pub struct ContentTypeValidator {
    allowed_content_types: Vec<String>,
}

impl ContentTypeValidator {
    pub fn new(allowed_content_types: Vec<String>) -> Self {
        Self {
            allowed_content_types,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.allowed_content_types.clone())
    }

    pub fn is_unrestricted(&self) -> bool {
        self.allowed_content_types.is_empty()
    }

    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.is_unrestricted()
            || self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }

    /// Validate a sniffed content type
    pub fn validate(&self, content_type: &str) -> Result<(), ValidationError> {
        if self.is_allowed(content_type) {
            return Ok(());
        }

        tracing::debug!(
            content_type = %content_type,
            allowed = ?self.allowed_content_types,
            "Rejected content type"
        );

        Err(ValidationError::ContentTypeNotAllowed {
            content_type: content_type.to_string(),
            allowed: self.allowed_content_types.clone(),
        })
    }
}
