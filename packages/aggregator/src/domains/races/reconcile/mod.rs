//! Reconciliation: raw scraped listings in, canonical races out.
//!
//! Records are grouped by normalized date, then near-duplicate titles
//! within each group are collapsed onto a single representative. Records
//! whose date cannot be read are reported, not silently dropped.

pub mod dates;
pub mod similarity;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domains::races::models::{image_is_placeholder, Race, RawRace};

pub use dates::{normalize_date, DateError};
pub use similarity::{token_sort_ratio, DEFAULT_SIMILARITY_THRESHOLD};

/// Region recorded when a listing does not say where the race is held.
pub const DEFAULT_REGION: &str = "Murcia";

/// Why a raw record did not make it into the canonical output.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The scraped date text could not be normalized.
    UnparsableDate { date_text: String },
    /// A same-date record was judged to be the same race.
    DuplicateOf { kept_title: String, score: u8 },
}

/// A dropped record, with enough context to log it.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRace {
    pub title: String,
    pub source_id: String,
    pub reason: SkipReason,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Canonical races, date ascending.
    pub races: Vec<Race>,
    pub skipped: Vec<SkippedRace>,
}

/// Collapse raw listings into canonical races.
///
/// Two same-date records merge when their title similarity is strictly
/// greater than `threshold`; records on different dates never merge, no
/// matter how alike their titles are. `priority` ranks source ids for
/// tie-breaking, strongest first.
pub fn reconcile(raw: Vec<RawRace>, threshold: u8, priority: &[&str]) -> ReconcileOutcome {
    let mut skipped = Vec::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<RawRace>> = BTreeMap::new();

    for record in raw {
        match dates::normalize_date(&record.date_text) {
            Ok(date) => by_date.entry(date).or_default().push(record),
            Err(_) => skipped.push(SkippedRace {
                title: record.title,
                source_id: record.source_id,
                reason: SkipReason::UnparsableDate {
                    date_text: record.date_text,
                },
            }),
        }
    }

    let mut races = Vec::new();
    for (date, mut group) in by_date {
        // Richest record first, then source priority, then title, so the
        // surviving representative does not depend on scrape order.
        group.sort_by(|a, b| {
            completeness(b)
                .cmp(&completeness(a))
                .then_with(|| {
                    source_rank(&a.source_id, priority).cmp(&source_rank(&b.source_id, priority))
                })
                .then_with(|| a.title.cmp(&b.title))
        });

        while !group.is_empty() {
            let keeper = group.remove(0);
            group.retain(|candidate| {
                let score = similarity::token_sort_ratio(&keeper.title, &candidate.title);
                if score > threshold {
                    skipped.push(SkippedRace {
                        title: candidate.title.clone(),
                        source_id: candidate.source_id.clone(),
                        reason: SkipReason::DuplicateOf {
                            kept_title: keeper.title.clone(),
                            score,
                        },
                    });
                    false
                } else {
                    true
                }
            });
            races.push(canonicalize(keeper, date));
        }
    }

    ReconcileOutcome { races, skipped }
}

/// How much useful detail a record carries. Higher survives clustering.
fn completeness(raw: &RawRace) -> u8 {
    let mut score = 0;
    if raw.location.as_deref().is_some_and(|l| !l.is_empty()) {
        score += 1;
    }
    if !image_is_placeholder(raw.image_url.as_deref()) {
        score += 1;
    }
    if raw.detail_url.as_deref().is_some_and(|u| !u.is_empty()) {
        score += 1;
    }
    if raw.registration_url.as_deref().is_some_and(|u| !u.is_empty()) {
        score += 1;
    }
    score
}

fn source_rank(source_id: &str, priority: &[&str]) -> usize {
    priority
        .iter()
        .position(|p| *p == source_id)
        .unwrap_or(priority.len())
}

/// Promote the surviving record of a date group to a catalog race.
fn canonicalize(raw: RawRace, date: NaiveDate) -> Race {
    Race {
        title: raw.title,
        date,
        location: raw
            .location
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        image_url: raw.image_url.filter(|u| !u.is_empty()),
        detail_url: raw.detail_url.filter(|u| !u.is_empty()),
        registration_url: raw.registration_url.filter(|u| !u.is_empty()),
        source_id: raw.source_id,
        published: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIORITY: [&str; 3] = ["ALCANZATUMETA", "LINEADESALIDA", "BABELSPORT"];

    fn raw(title: &str, date_text: &str, source_id: &str) -> RawRace {
        RawRace {
            title: title.to_string(),
            date_text: date_text.to_string(),
            location: None,
            image_url: None,
            detail_url: None,
            registration_url: None,
            source_id: source_id.to_string(),
        }
    }

    #[test]
    fn test_same_date_near_duplicates_collapse() {
        let outcome = reconcile(
            vec![
                raw("5K Run", "01-06-2026", "ALCANZATUMETA"),
                raw("5 K Run!", "1/6/26", "BABELSPORT"),
                raw("Maratón Murcia", "02-06-2026", "ALCANZATUMETA"),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        assert_eq!(outcome.races.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::DuplicateOf {
                kept_title: "5K Run".to_string(),
                score: 92,
            }
        );
    }

    #[test]
    fn test_mixed_date_formats_converge_before_clustering() {
        let outcome = reconcile(
            vec![
                raw("5K Run", "01 Jun 26", "ALCANZATUMETA"),
                raw("5 K Run!", "1-06-2026", "BABELSPORT"),
                raw("10K Trail", "02 Jun 26", "LINEADESALIDA"),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        let dates: Vec<NaiveDate> = outcome.races.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(),
            ]
        );
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn test_different_dates_never_merge() {
        let outcome = reconcile(
            vec![
                raw("Gran Premio de Fondo", "01-06-2026", "ALCANZATUMETA"),
                raw("Gran Premio de Fondo", "08-06-2026", "ALCANZATUMETA"),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        assert_eq!(outcome.races.len(), 2);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_unparsable_date_is_reported() {
        let outcome = reconcile(
            vec![raw("Cross del Valle", "Desconocida", "LINEADESALIDA")],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        assert!(outcome.races.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::UnparsableDate {
                date_text: "Desconocida".to_string(),
            }
        );
    }

    #[test]
    fn test_output_is_date_ascending() {
        let outcome = reconcile(
            vec![
                raw("Carrera C", "15-08-2026", "ALCANZATUMETA"),
                raw("Carrera A", "01-06-2026", "ALCANZATUMETA"),
                raw("Carrera B", "10-07-2026", "ALCANZATUMETA"),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        let dates: Vec<NaiveDate> = outcome.races.iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(outcome.races[0].title, "Carrera A");
    }

    #[test]
    fn test_merge_requires_strictly_greater_than_threshold() {
        // "5K Run" vs "5 K Run!" scores exactly 92.
        let records = vec![
            raw("5K Run", "01-06-2026", "ALCANZATUMETA"),
            raw("5 K Run!", "01-06-2026", "BABELSPORT"),
        ];

        let at_score = reconcile(records.clone(), 92, &PRIORITY);
        assert_eq!(at_score.races.len(), 2, "score equal to threshold keeps both");

        let below_score = reconcile(records, 91, &PRIORITY);
        assert_eq!(below_score.races.len(), 1);
    }

    #[test]
    fn test_richest_record_survives_regardless_of_order() {
        let poor = raw("Cross de la Huerta", "05-10-2026", "ALCANZATUMETA");
        let mut rich = raw("Cross de la Huerta", "05-10-2026", "BABELSPORT");
        rich.location = Some("Alcantarilla".to_string());
        rich.image_url = Some("https://example.com/cartel.png".to_string());
        rich.registration_url = Some("https://example.com/inscripcion".to_string());

        for records in [
            vec![poor.clone(), rich.clone()],
            vec![rich.clone(), poor.clone()],
        ] {
            let outcome = reconcile(records, DEFAULT_SIMILARITY_THRESHOLD, &PRIORITY);
            assert_eq!(outcome.races.len(), 1);
            let kept = &outcome.races[0];
            assert_eq!(kept.source_id, "BABELSPORT");
            assert_eq!(kept.location, "Alcantarilla");
            assert_eq!(kept.image_url.as_deref(), Some("https://example.com/cartel.png"));
        }
    }

    #[test]
    fn test_placeholder_image_does_not_count_as_detail() {
        use crate::domains::races::models::PLACEHOLDER_IMAGE_URL;

        let mut placeholder = raw("San Silvestre", "31-12-2026", "BABELSPORT");
        placeholder.image_url = Some(PLACEHOLDER_IMAGE_URL.to_string());
        let mut real = raw("San Silvestre", "31-12-2026", "LINEADESALIDA");
        real.image_url = Some("https://example.com/sansilvestre.png".to_string());

        let outcome = reconcile(
            vec![placeholder, real],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );
        assert_eq!(outcome.races.len(), 1);
        assert_eq!(
            outcome.races[0].image_url.as_deref(),
            Some("https://example.com/sansilvestre.png")
        );
    }

    #[test]
    fn test_equal_detail_falls_back_to_source_priority() {
        let outcome = reconcile(
            vec![
                raw("Media Maratón", "01-03-2026", "BABELSPORT"),
                raw("Media Maratón", "01-03-2026", "ALCANZATUMETA"),
            ],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        assert_eq!(outcome.races.len(), 1);
        assert_eq!(outcome.races[0].source_id, "ALCANZATUMETA");
    }

    #[test]
    fn test_missing_location_defaults_to_region() {
        let outcome = reconcile(
            vec![raw("10K del Puerto", "01-06-2026", "ALCANZATUMETA")],
            DEFAULT_SIMILARITY_THRESHOLD,
            &PRIORITY,
        );

        assert_eq!(outcome.races[0].location, DEFAULT_REGION);
        assert!(!outcome.races[0].published);
    }

    #[test]
    fn test_empty_input_is_fine() {
        let outcome = reconcile(Vec::new(), DEFAULT_SIMILARITY_THRESHOLD, &PRIORITY);
        assert!(outcome.races.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}
