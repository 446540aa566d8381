//! Minimal Make.com webhook client.
//!
//! Posts one race listing per call to a scenario webhook URL. The scenario
//! side handles formatting and publication; this client only delivers the
//! payload and reports whether the webhook accepted it.
//!
//! # Example
//!
//! ```rust,ignore
//! use make_webhook::{RacePayload, WebhookClient};
//!
//! let client = WebhookClient::new("https://hook.eu1.make.com/abc123".into());
//!
//! let payload = RacePayload {
//!     titulo: "Carrera Popular Murcia 5K".into(),
//!     fecha: "2026-06-01".into(),
//!     ubicacion: "Murcia".into(),
//!     imagen: None,
//!     link: None,
//! };
//! client.post_race(&payload).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, WebhookError};
pub use types::{quote_url, RacePayload};

pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Deliver one race to the webhook. `Ok(())` means the scenario accepted
    /// the payload (2xx); any other status is returned as an error so the
    /// caller can decide whether to retry on a later run.
    pub async fn post_race(&self, payload: &RacePayload) -> Result<()> {
        tracing::debug!(titulo = %payload.titulo, "Posting race to webhook");

        let resp = self.client.post(&self.url).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}
