use anyhow::{Context, Result};
use dotenvy::dotenv;
use product_extraction::RenderCredentials;
use secrecy::SecretString;
use std::env;
use std::str::FromStr;

use crate::auth::{parse_provisioned_tokens, ExtensionToken};

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    /// `None` when `FIRECRAWL_API_KEY` is unset or blank
    pub render_credentials: Option<RenderCredentials>,
    pub render_wait_ms: u64,
    pub strategy_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    /// `EXTENSION_TOKENS`: comma-separated `token:user_id` pairs that
    /// authenticate the browser extension until the process restarts
    pub extension_tokens: Vec<ExtensionToken>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: parse_or("PORT", env::var("PORT").ok(), 8080)?,
            render_credentials: RenderCredentials::from_env(),
            render_wait_ms: parse_or("RENDER_WAIT_MS", env::var("RENDER_WAIT_MS").ok(), 3000)?,
            strategy_timeout_secs: parse_or(
                "STRATEGY_TIMEOUT_SECS",
                env::var("STRATEGY_TIMEOUT_SECS").ok(),
                45,
            )?,
            fetch_timeout_secs: parse_or(
                "FETCH_TIMEOUT_SECS",
                env::var("FETCH_TIMEOUT_SECS").ok(),
                20,
            )?,
            jwt_secret: env::var("JWT_SECRET")
                .map(|secret| SecretString::new(secret.into_boxed_str()))
                .context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "import-server".to_string()),
            extension_tokens: match env::var("EXTENSION_TOKENS") {
                Ok(raw) => parse_provisioned_tokens(&raw).context("Invalid EXTENSION_TOKENS")?,
                Err(_) => Vec::new(),
            },
            allowed_origins: split_origins(env::var("ALLOWED_ORIGINS").ok()),
        })
    }

    pub fn render_configured(&self) -> bool {
        self.render_credentials.is_some()
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        None => Ok(default),
    }
}

fn split_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
