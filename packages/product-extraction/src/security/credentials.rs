//! Render-service credentials.

use secrecy::{ExposeSecret, SecretString};

const API_KEY_VAR: &str = "FIRECRAWL_API_KEY";
const API_URL_VAR: &str = "FIRECRAWL_API_URL";

/// API key and optional endpoint override for the remote renderer.
///
/// The key lives in a [`SecretString`], so `Debug` output never shows it.
#[derive(Debug)]
pub struct RenderCredentials {
    api_key: SecretString,
    pub base_url: Option<String>,
}

impl RenderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: secret(api_key.into()),
            base_url: None,
        }
    }

    /// Read `FIRECRAWL_API_KEY` and `FIRECRAWL_API_URL`.
    pub fn from_env() -> Option<Self> {
        Self::from_vars(std::env::var(API_KEY_VAR).ok(), std::env::var(API_URL_VAR).ok())
    }

    /// Build credentials from raw variable values.
    ///
    /// A missing or blank key means the renderer is not configured. A blank
    /// URL is treated as unset.
    pub fn from_vars(api_key: Option<String>, base_url: Option<String>) -> Option<Self> {
        let api_key = api_key.map(|key| key.trim().to_string()).filter(|key| !key.is_empty())?;
        let credentials = Self::new(api_key);

        Some(match base_url.map(|url| url.trim().to_string()) {
            Some(url) if !url.is_empty() => credentials.with_base_url(url),
            _ => credentials,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Only for building the outgoing `Authorization` header.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl Clone for RenderCredentials {
    fn clone(&self) -> Self {
        Self {
            api_key: secret(self.api_key().to_string()),
            base_url: self.base_url.clone(),
        }
    }
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into_boxed_str())
}
