//! Client configuration, read from the environment (`.env` is honoured by the binary).

use crate::errors::{AppError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Bearer token attached to every request when present.
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_string(), access_token: None }
    }
}

impl ClientConfig {
    /// Reads `KYC_API_URL` and `KYC_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("KYC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let access_token = std::env::var("KYC_ACCESS_TOKEN").ok().filter(|t| !t.trim().is_empty());
        Self::new(api_url, access_token)
    }

    pub fn new(api_url: impl Into<String>, access_token: Option<String>) -> Result<Self> {
        let api_url = api_url.into().trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(AppError::ConfigError(format!(
                "KYC_API_URL must start with http:// or https:// (got '{}')",
                api_url
            )));
        }
        Ok(Self { api_url, access_token })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://localhost:8000/api/", None).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000/api");
    }

    #[test]
    fn non_http_urls_are_refused() {
        assert!(matches!(ClientConfig::new("localhost:8000", None), Err(AppError::ConfigError(_))));
    }
}
