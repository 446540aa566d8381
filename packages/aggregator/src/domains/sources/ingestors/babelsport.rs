//! Scraper for the babelsport.com upcoming-events page.
//!
//! Each event is a `div.row.p-3` card with two direct columns: poster on
//! the left, details on the right. The details column carries the title in
//! an `<h3>`, the date in the first `<span>`, the town in a right-aligned
//! column div, and the reglamento / inscription buttons.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::domains::races::models::RawRace;
use crate::domains::sources::RaceSource;
use crate::kernel::http;

use super::absolutize;

pub const SOURCE_ID: &str = "BABELSPORT";

const EVENTS_URL: &str = "https://www.babelsport.com/eventos-proximos/";
const BASE_URL: &str = "https://www.babelsport.com/";

pub struct BabelsportSource {
    client: reqwest::Client,
}

impl BabelsportSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RaceSource for BabelsportSource {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch(&self) -> anyhow::Result<Vec<RawRace>> {
        info!(url = EVENTS_URL, "Scraping babelsport events");
        let html = http::fetch_html(&self.client, EVENTS_URL).await?;
        let races = parse_events(&html);
        info!(count = races.len(), "babelsport scrape complete");
        Ok(races)
    }
}

fn parse_events(html: &str) -> Vec<RawRace> {
    let document = Html::parse_document(html);
    let Ok(card_sel) = Selector::parse("div.row.p-3") else { return Vec::new() };
    let Ok(title_sel) = Selector::parse("h3") else { return Vec::new() };
    let Ok(date_sel) = Selector::parse("span") else { return Vec::new() };
    let Ok(location_sel) = Selector::parse("div.col-7.mb-4.text-end") else { return Vec::new() };
    let Ok(img_sel) = Selector::parse("img") else { return Vec::new() };
    let Ok(link_sel) = Selector::parse("a") else { return Vec::new() };

    let mut races = Vec::new();

    for card in document.select(&card_sel) {
        let columns: Vec<ElementRef> = card
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "div")
            .collect();
        // Poster column and details column; anything else is filler markup.
        if columns.len() < 2 {
            continue;
        }
        let (image_col, data_col) = (columns[0], columns[1]);

        let Some(title) = data_col
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        // The first span is the date. An empty one still produces a record
        // so the dropped date shows up in the reconciliation report.
        let Some(date_text) = data_col
            .select(&date_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
        else {
            continue;
        };

        let location = data_col
            .select(&location_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let image_url = image_col
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| absolutize(BASE_URL, src));

        let mut detail_url = None;
        let mut registration_url = None;
        for link in data_col.select(&link_sel) {
            let Some(href) = link.value().attr("href") else { continue };
            let label = link.text().collect::<String>().trim().to_uppercase();
            if label.contains("REGLAMENTO") {
                detail_url = absolutize(BASE_URL, href);
            } else if label.contains("INSCRÍBETE") {
                registration_url = absolutize(BASE_URL, href);
            }
        }

        races.push(RawRace {
            title,
            date_text,
            location,
            image_url,
            detail_url,
            registration_url,
            source_id: SOURCE_ID.to_string(),
        });
    }

    races
}
