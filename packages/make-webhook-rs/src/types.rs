use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters left untouched when escaping a URL for the webhook payload.
///
/// Matches the classic form-quoting rule: alphanumerics and `_.-~` pass
/// through, and `:` and `/` are kept so an already-valid URL stays readable.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

/// Percent-encode a URL for inclusion in a webhook payload, preserving
/// `:` and `/` so the scheme and path structure survive.
pub fn quote_url(raw: &str) -> String {
    utf8_percent_encode(raw, URL_SAFE).to_string()
}

/// One race listing as the Make.com scenario expects it.
///
/// Field names are the Spanish keys the scenario was built around, so they
/// serialize as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePayload {
    pub titulo: String,
    pub fecha: String,
    pub ubicacion: String,
    pub imagen: Option<String>,
    pub link: Option<String>,
}
