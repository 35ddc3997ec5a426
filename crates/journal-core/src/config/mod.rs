//! Client configuration.
//!
//! Provides the `ClientConfig` struct shared by every front end to locate the
//! diary service and size its requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;
use crate::{Error, Result};

/// Base address used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
/// Environment variable overriding the API base address.
pub const API_BASE_URL_ENV: &str = "JOURNAL_API_URL";
/// Every request is abandoned after this long.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Page size requested by list and search operations.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(with = "timeout_secs", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: default_timeout(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Builds a config for an explicit base URL with default timeout and page size.
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.as_ref())?,
            ..Self::default()
        })
    }

    /// Resolves the base URL from the first non-empty candidate, falling back
    /// to `JOURNAL_API_URL` and then the built-in default.
    pub fn resolve(candidates: &[Option<String>]) -> Result<Self> {
        let explicit = candidates
            .iter()
            .cloned()
            .find_map(normalize_text_option)
            .or_else(|| normalize_text_option(std::env::var(API_BASE_URL_ENV).ok()));

        match explicit {
            Some(url) => Self::new(url),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trim, validate the scheme and strip trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

const fn default_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
