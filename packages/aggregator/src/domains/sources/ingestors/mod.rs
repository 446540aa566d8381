//! Site-specific scrapers producing uniform `RawRace` records.
//!
//! The sites are server-rendered HTML, so each scraper is a thin pair of
//! pure parse functions over `scraper` selectors plus an HTTP fetch. Parse
//! functions never fail; a listing that does not match the expected markup
//! is skipped.

pub mod alcanza;
pub mod babelsport;
pub mod lineadesalida;

pub use alcanza::AlcanzaSource;
pub use babelsport::BabelsportSource;
pub use lineadesalida::LineaDeSalidaSource;

use url::Url;

/// Resolve a scraped `href` or `src` against the site base. Absolute inputs
/// pass through; junk yields `None` rather than a broken link.
pub(crate) fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(base)
        .ok()?
        .join(href)
        .ok()
        .map(|url| url.to_string())
}
