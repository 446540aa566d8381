use serde::{Deserialize, Serialize};

/// One race listing exactly as a source adapter scraped it.
///
/// `date_text` is whatever the site printed. Normalization happens during
/// reconciliation so an unparsable date can be reported instead of silently
/// lost. Adapters skip listings without a title; every other field is
/// best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRace {
    pub title: String,
    pub date_text: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    pub registration_url: Option<String>,
    pub source_id: String,
}
