//! Shared HTTP client for the listing scrapers.
//!
//! Static HTML sites only; no JavaScript rendering. A browser-like
//! User-Agent keeps the calendar sites from serving bot pages.

use std::time::Duration;

use anyhow::{Context, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("Failed to create HTTP client")
}

/// Fetch one page of HTML, treating any non-2xx status as an error.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {} for {}", status, url);
    }

    response
        .text()
        .await
        .context("Failed to read response body")
}
