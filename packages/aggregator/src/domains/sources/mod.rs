//! Race calendar sources.
//!
//! Each adapter scrapes one listing site into uniform `RawRace` records so
//! downstream reconciliation never cares where a record came from.

pub mod ingestors;

use async_trait::async_trait;

use crate::domains::races::models::RawRace;

pub use ingestors::{AlcanzaSource, BabelsportSource, LineaDeSalidaSource};

/// A scrapeable race calendar.
#[async_trait]
pub trait RaceSource: Send + Sync {
    /// Stable identifier recorded on every record this source emits.
    fn source_id(&self) -> &'static str;

    /// Scrape the full calendar. Errors fail the whole source; the caller
    /// decides whether that aborts the run.
    async fn fetch(&self) -> anyhow::Result<Vec<RawRace>>;
}

/// Source ids ranked by how complete their listings usually are, strongest
/// first. Breaks ties between same-date duplicates carrying equal detail.
pub const SOURCE_PRIORITY: [&str; 3] = [
    ingestors::alcanza::SOURCE_ID,
    ingestors::lineadesalida::SOURCE_ID,
    ingestors::babelsport::SOURCE_ID,
];

/// Every known source, in fetch order.
pub fn all_sources(client: &reqwest::Client) -> Vec<Box<dyn RaceSource>> {
    vec![
        Box::new(AlcanzaSource::new(client.clone())),
        Box::new(LineaDeSalidaSource::new(client.clone())),
        Box::new(BabelsportSource::new(client.clone())),
    ]
}
