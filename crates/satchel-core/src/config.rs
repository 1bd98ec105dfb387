//! Configuration module
//!
//! `ToolsConfig` is the single configuration value every satchel operation
//! reads. It is owned by the caller and passed by reference; nothing in the
//! workspace keeps a global copy. Zero limits mean "use the default".

use std::env;

use anyhow::Context;

/// Upload ceiling applied when `max_upload_bytes` is zero (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// JSON body ceiling applied when `max_json_bytes` is zero (1 MiB).
pub const DEFAULT_MAX_JSON_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Byte ceiling for a whole multipart body
    pub max_upload_bytes: u64,
    /// Sniffed MIME types accepted by uploads, compared case-insensitively.
    /// An empty list accepts everything.
    pub allowed_content_types: Vec<String>,
    /// Byte ceiling for JSON request bodies
    pub max_json_bytes: usize,
    pub allow_unknown_json_fields: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: Vec::new(),
            max_json_bytes: DEFAULT_MAX_JSON_BYTES,
            allow_unknown_json_fields: false,
        }
    }
}

impl ToolsConfig {
    /// Load configuration from the environment (and `.env` when present).
    ///
    /// | variable | default |
    /// |---|---|
    /// | `SATCHEL_MAX_UPLOAD_BYTES` | 1 GiB |
    /// | `SATCHEL_ALLOWED_CONTENT_TYPES` | empty (allow all), comma separated |
    /// | `SATCHEL_MAX_JSON_BYTES` | 1 MiB |
    /// | `SATCHEL_ALLOW_UNKNOWN_JSON_FIELDS` | `false` |
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_upload_bytes = match env::var("SATCHEL_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("SATCHEL_MAX_UPLOAD_BYTES is not a number: {}", raw))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let max_json_bytes = match env::var("SATCHEL_MAX_JSON_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SATCHEL_MAX_JSON_BYTES is not a number: {}", raw))?,
            Err(_) => DEFAULT_MAX_JSON_BYTES,
        };

        let allowed_content_types = env::var("SATCHEL_ALLOWED_CONTENT_TYPES")
            .map(|raw| parse_content_type_list(&raw))
            .unwrap_or_default();

        let allow_unknown_json_fields = env::var("SATCHEL_ALLOW_UNKNOWN_JSON_FIELDS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let config = Self {
            max_upload_bytes,
            allowed_content_types,
            max_json_bytes,
            allow_unknown_json_fields,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for content_type in &self.allowed_content_types {
            let essence = content_type.split(';').next().unwrap_or("").trim();
            let mut halves = essence.splitn(2, '/');
            let top = halves.next().unwrap_or("");
            let sub = halves.next().unwrap_or("");
            if top.is_empty() || sub.is_empty() || sub.contains('/') {
                return Err(anyhow::anyhow!(
                    "Allowed content type '{}' is not a MIME type (expected type/subtype)",
                    content_type
                ));
            }
        }
        Ok(())
    }

    /// Effective multipart ceiling
    pub fn upload_limit(&self) -> u64 {
        if self.max_upload_bytes == 0 {
            DEFAULT_MAX_UPLOAD_BYTES
        } else {
            self.max_upload_bytes
        }
    }

    /// Effective JSON body ceiling
    pub fn json_limit(&self) -> usize {
        if self.max_json_bytes == 0 {
            DEFAULT_MAX_JSON_BYTES
        } else {
            self.max_json_bytes
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_json_bytes(mut self, bytes: usize) -> Self {
        self.max_json_bytes = bytes;
        self
    }

    pub fn with_unknown_json_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_json_fields = allow;
        self
    }
}

fn parse_content_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolsConfig::default();
        assert_eq!(config.upload_limit(), 1024 * 1024 * 1024);
        assert_eq!(config.json_limit(), 1024 * 1024);
        assert!(config.allowed_content_types.is_empty());
        assert!(!config.allow_unknown_json_fields);
    }

    #[test]
    fn test_zero_limits_fall_back_to_defaults() {
        let config = ToolsConfig::default()
            .with_max_upload_bytes(0)
            .with_max_json_bytes(0);
        assert_eq!(config.upload_limit(), DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.json_limit(), DEFAULT_MAX_JSON_BYTES);
    }

    #[test]
    fn test_builders() {
        let config = ToolsConfig::default()
            .with_max_upload_bytes(10)
            .with_max_json_bytes(20)
            .with_allowed_content_types(["image/png", "image/jpeg"])
            .with_unknown_json_fields(true);
        assert_eq!(config.upload_limit(), 10);
        assert_eq!(config.json_limit(), 20);
        assert_eq!(config.allowed_content_types, vec!["image/png", "image/jpeg"]);
        assert!(config.allow_unknown_json_fields);
    }

    #[test]
    fn test_validate_rejects_malformed_mime() {
        let config = ToolsConfig::default().with_allowed_content_types(["png"]);
        assert!(config.validate().is_err());

        let config = ToolsConfig::default().with_allowed_content_types(["image/"]);
        assert!(config.validate().is_err());

        let config =
            ToolsConfig::default().with_allowed_content_types(["text/plain; charset=utf-8"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_content_type_list() {
        assert_eq!(
            parse_content_type_list(" image/png, ,image/gif "),
            vec!["image/png".to_string(), "image/gif".to_string()]
        );
        assert!(parse_content_type_list("").is_empty());
    }
}
