//! Configuration for [`GeminiClient`](crate::GeminiClient).
//!
//! The API key is the only value read from the environment. Everything else
//! is set by the composing program through the builder methods.
//!
//! ```ignore
//! let config = GeminiConfig::from_env()?
//!     .with_model("gemini-2.5-pro")
//!     .with_timeout(Duration::from_secs(60));
//! let client = GeminiClient::new(config)?;
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::{API_KEY_ENV, DEFAULT_MODEL, GEMINI_API_BASE};

/// Connection settings for the Gemini generate-content endpoint.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// API root without a trailing slash. Default: [`GEMINI_API_BASE`].
    pub base_url: String,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout: None,
        }
    }

    /// Build a config from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::from_key(key)
    }

    fn from_key(key: String) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!("{API_KEY_ENV} is not set")));
        }
        Ok(Self::new(key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, GEMINI_API_BASE);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn blank_key_is_config_error() {
        assert!(matches!(
            GeminiConfig::from_key("   ".into()),
            Err(Error::Config(_))
        ));
        assert_eq!(GeminiConfig::from_key(" abc \n".into()).unwrap().api_key, "abc");
    }

    #[test]
    fn builders_override_defaults() {
        let config = GeminiConfig::new("k")
            .with_model("gemini-2.5-pro")
            .with_base_url("http://127.0.0.1:9999/v1beta/")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn debug_redacts_key() {
        let shown = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("redacted"));
    }
}
