use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::domains::races::reconcile::DEFAULT_SIMILARITY_THRESHOLD;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Make.com webhook endpoint. Publication is skipped when unset.
    pub webhook_url: Option<String>,
    pub similarity_threshold: u8,
    /// Directory for per-source raw record snapshots.
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let similarity_threshold: u8 = env::var("SIMILARITY_THRESHOLD")
            .unwrap_or_else(|_| DEFAULT_SIMILARITY_THRESHOLD.to_string())
            .parse()
            .context("SIMILARITY_THRESHOLD must be a valid number")?;
        anyhow::ensure!(
            similarity_threshold <= 100,
            "SIMILARITY_THRESHOLD must be between 0 and 100"
        );

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:carreras.db?mode=rwc".to_string()),
            webhook_url: env::var("WEBHOOK_URL").ok().filter(|url| !url.is_empty()),
            similarity_threshold,
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
        })
    }
}
