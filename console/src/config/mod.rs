//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the backend base URL, the session file location, and timing knobs for
//! search debouncing and HTTP requests.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub http_timeout_seconds: u64,
    pub search_debounce_ms: u64,
    pub page_size: u32,
    pub search_page_size: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:4005".to_string());

        let session_file = env::var("SESSION_FILE")
            .unwrap_or_else(|_| "~/.config/console/session.json".to_string());
        let session_file = expanduser::expanduser(&session_file)
            .context("SESSION_FILE path could not be expanded")?;

        let http_timeout_seconds = env::var("HTTP_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECONDS must be a valid number")?;

        let search_debounce_ms = env::var("SEARCH_DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<u64>()
            .context("SEARCH_DEBOUNCE_MS must be a valid number")?;

        let page_size = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("PAGE_SIZE must be a valid number")?;

        let search_page_size = env::var("SEARCH_PAGE_SIZE")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u32>()
            .context("SEARCH_PAGE_SIZE must be a valid number")?;

        Ok(Config {
            api_base_url,
            session_file,
            http_timeout_seconds,
            search_debounce_ms,
            page_size,
            search_page_size,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
