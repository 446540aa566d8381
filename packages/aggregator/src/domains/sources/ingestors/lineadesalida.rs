//! Crawler for the lineadesalida.net race listings.
//!
//! Unlike the other calendars this site spreads races over a paginated
//! index, one card per race, with the interesting fields only on each
//! race's own page. The crawl therefore walks `?page=N` until the site
//! stops answering or the list runs dry, visiting every detail page on the
//! way. The site is a small community server, so requests stay sequential
//! with a delay between every one.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domains::races::models::RawRace;
use crate::domains::sources::RaceSource;
use crate::kernel::http;

use super::absolutize;

pub const SOURCE_ID: &str = "LINEADESALIDA";

const LIST_URL: &str = "https://lineadesalida.net/proximas-carreras";
const BASE_URL: &str = "https://lineadesalida.net/";

/// Hard stop for pagination in case the site ever starts echoing the last
/// page forever.
const MAX_PAGES: u32 = 50;

const DETAIL_DELAY: Duration = Duration::from_secs(1);
const PAGE_DELAY: Duration = Duration::from_secs(2);

pub struct LineaDeSalidaSource {
    client: reqwest::Client,
}

impl LineaDeSalidaSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_detail(&self, url: &str) -> anyhow::Result<Option<RawRace>> {
        let html = http::fetch_html(&self.client, url).await?;
        Ok(parse_detail(&html, url))
    }
}

#[async_trait]
impl RaceSource for LineaDeSalidaSource {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch(&self) -> anyhow::Result<Vec<RawRace>> {
        info!(url = LIST_URL, "Crawling lineadesalida race listings");

        let mut races = Vec::new();
        let mut page = 1u32;

        loop {
            if page > MAX_PAGES {
                warn!(page, "Stopping pagination at safety cap");
                break;
            }

            let url = if page == 1 {
                LIST_URL.to_string()
            } else {
                format!("{LIST_URL}?page={page}")
            };

            debug!(page, url = %url, "Fetching race list page");
            let html = match http::fetch_html(&self.client, &url).await {
                Ok(html) => html,
                Err(error) => {
                    // Walking past the last page answers with an error
                    // status, so this is the normal way out. Races already
                    // collected are kept.
                    debug!(page, error = %error, "End of pagination");
                    break;
                }
            };

            let links = parse_list_page(&html);
            if links.is_empty() {
                debug!(page, "No more listings");
                break;
            }

            for link in &links {
                match self.fetch_detail(link).await {
                    Ok(Some(race)) => races.push(race),
                    Ok(None) => debug!(url = %link, "Detail page missing expected structure"),
                    Err(error) => warn!(url = %link, error = %error, "Failed to read race detail"),
                }
                sleep(DETAIL_DELAY).await;
            }

            page += 1;
            sleep(PAGE_DELAY).await;
        }

        info!(count = races.len(), "lineadesalida crawl complete");
        Ok(races)
    }
}

/// Detail page links from one index page, in listing order.
fn parse_list_page(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(container_sel) = Selector::parse("#todasCarrerasDiv") else { return Vec::new() };
    let Ok(item_sel) = Selector::parse("div.col.d-flex.justify-content-center") else {
        return Vec::new();
    };
    let Ok(link_sel) = Selector::parse("a") else { return Vec::new() };

    let Some(container) = document.select(&container_sel).next() else {
        return Vec::new();
    };

    container
        .select(&item_sel)
        .filter_map(|item| item.select(&link_sel).next())
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| absolutize(BASE_URL, href))
        .collect()
}

fn parse_detail(html: &str, page_url: &str) -> Option<RawRace> {
    let document = Html::parse_document(html);
    let container_sel = Selector::parse("div.row.mt-3").ok()?;
    let title_sel = Selector::parse("h3").ok()?;
    let info_sel = Selector::parse("div.col-12.col-md.mb-1.text-center").ok()?;
    let img_sel = Selector::parse("img").ok()?;
    let rules_sel = Selector::parse("div.row.px-2.py-3").ok()?;
    let link_sel = Selector::parse("a").ok()?;

    let container = document.select(&container_sel).next()?;

    let title = container
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())?;

    let image_url = container
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| absolutize(BASE_URL, src));

    // The info row reads "Lugar: X", "Fecha: Y", "Hora: Z" in template
    // order. A page with fewer cells keeps its record but with nothing to
    // normalize, so the dropped date surfaces in the reconciliation report.
    let info: Vec<String> = container
        .select(&info_sel)
        .map(|el| el.text().map(str::trim).collect::<String>())
        .collect();
    let (location, date_text) = if info.len() >= 3 {
        (
            Some(after_colon(&info[0])).filter(|l| !l.is_empty()),
            after_colon(&info[1]),
        )
    } else {
        (None, String::new())
    };

    // The reglamento block sits outside the data container.
    let detail_url = document
        .select(&rules_sel)
        .next()
        .and_then(|section| section.select(&link_sel).next())
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| absolutize(BASE_URL, href));

    // Registration is not linked anywhere; the site convention is the race
    // page plus /invitado.
    let registration_url = Some(format!("{}/invitado", page_url.trim_end_matches('/')));

    Some(RawRace {
        title,
        date_text,
        location,
        image_url,
        detail_url,
        registration_url,
        source_id: SOURCE_ID.to_string(),
    })
}

fn after_colon(text: &str) -> String {
    text.rsplit(':').next().unwrap_or_default().trim().to_string()
}
