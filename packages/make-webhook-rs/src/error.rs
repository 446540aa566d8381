//! Typed errors for the webhook client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebhookError>;

/// Errors that can occur while delivering a payload to the webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The webhook answered with a non-success status code
    #[error("webhook returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}
