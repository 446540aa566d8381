//! Scraper for the alcanzatumeta.es race calendar.
//!
//! The calendar is one big `<table>`, one race per row: date cell, poster
//! cell, race type, then an event cell holding the title in a `<strong>`,
//! the town, and the action buttons. The date cell hides a machine
//! timestamp inside a `display: none` span that must not leak into the
//! visible date text.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::domains::races::models::RawRace;
use crate::domains::sources::RaceSource;
use crate::kernel::http;

use super::absolutize;

pub const SOURCE_ID: &str = "ALCANZATUMETA";

const CALENDAR_URL: &str = "https://www.alcanzatumeta.es/calendario.php";
const BASE_URL: &str = "https://www.alcanzatumeta.es/";

/// Button captions in the event cell. Whatever text fragment follows the
/// title is the town, unless it is one of these.
const BUTTON_LABELS: [&str; 4] = [
    "FICHA DE EVENTO",
    "INSCRIBIRSE",
    "LISTADO DE INSCRITOS",
    "LISTA DE ESPERA",
];

pub struct AlcanzaSource {
    client: reqwest::Client,
}

impl AlcanzaSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RaceSource for AlcanzaSource {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch(&self) -> anyhow::Result<Vec<RawRace>> {
        info!(url = CALENDAR_URL, "Scraping alcanzatumeta calendar");
        let html = http::fetch_html(&self.client, CALENDAR_URL).await?;
        let races = parse_calendar(&html);
        info!(count = races.len(), "alcanzatumeta scrape complete");
        Ok(races)
    }
}

fn parse_calendar(html: &str) -> Vec<RawRace> {
    let document = Html::parse_document(html);
    let Ok(row_sel) = Selector::parse("tr") else { return Vec::new() };
    let Ok(cell_sel) = Selector::parse("td") else { return Vec::new() };
    let Ok(title_sel) = Selector::parse("strong") else { return Vec::new() };
    let Ok(img_sel) = Selector::parse("img") else { return Vec::new() };
    let Ok(link_sel) = Selector::parse("a") else { return Vec::new() };

    let mut races = Vec::new();

    for row in document.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        // Header and separator rows have fewer cells.
        if cells.len() < 5 {
            continue;
        }

        let event_cell = cells[3];
        let Some(title) = event_cell
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let date_text = text_without_spans(cells[0]);

        let image_url = cells[1]
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| absolutize(BASE_URL, src));

        let location = event_cell
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .nth(1)
            .filter(|t| !is_button_label(t))
            .map(str::to_string);

        let mut detail_url = None;
        let mut registration_url = None;
        for link in event_cell.select(&link_sel) {
            let Some(href) = link.value().attr("href") else { continue };
            let label = link.text().collect::<String>().trim().to_uppercase();
            if label.contains("FICHA") {
                detail_url = absolutize(BASE_URL, href);
            } else if label.contains("INSCRIBIRSE") {
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

/// Visible text of a cell, skipping `<span>` subtrees.
fn text_without_spans(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(cell, &mut out);
    out.trim().to_string()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            if el.value().name() != "span" {
                collect_text(el, out);
            }
        }
    }
}

fn is_button_label(text: &str) -> bool {
    let upper = text.to_uppercase();
    BUTTON_LABELS.iter().any(|label| upper.contains(label))
}
