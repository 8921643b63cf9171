use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::analyzer::RendererKind;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    /// Enables Firebase anonymous sign-in; local identities otherwise
    pub firebase_api_key: Option<String>,
    /// Enables the Firestore store; in-memory otherwise
    pub firebase_project_id: Option<String>,
    pub app_id: String,
    pub default_location: String,
    pub markup_renderer: RendererKind,
    pub session_ttl_hours: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            gemini_model: optional("GEMINI_MODEL"),
            gemini_base_url: optional("GEMINI_BASE_URL"),
            firebase_api_key: optional("FIREBASE_API_KEY"),
            firebase_project_id: optional("FIREBASE_PROJECT_ID"),
            app_id: optional("APP_ID").unwrap_or_else(|| "default-app-id".to_string()),
            default_location: optional("DEFAULT_LOCATION")
                .unwrap_or_else(|| "Lucknow".to_string()),
            markup_renderer: optional("MARKUP_RENDERER")
                .map(|value| value.parse::<RendererKind>().map_err(anyhow::Error::msg))
                .transpose()
                .context("MARKUP_RENDERER must be 'lite' or 'commonmark'")?
                .unwrap_or_default(),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("SESSION_TTL_HOURS must be a valid number")?,
        })
    }
}

impl Config {
    /// Idle time after which a visitor session is dropped.
    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        ttl_from_hours(self.session_ttl_hours)
    }
}

fn ttl_from_hours(hours: u64) -> Result<chrono::Duration> {
    let seconds = hours
        .checked_mul(3600)
        .context("SESSION_TTL_HOURS is too large")?;
    chrono::Duration::from_std(std::time::Duration::from_secs(seconds))
        .context("SESSION_TTL_HOURS is too large")
}

/// Unset and blank are treated the same.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
