//! Canonical race catalog, one row per title.
//!
//! The catalog outlives individual sync runs. Two columns have special
//! update rules: `published` belongs to the publisher and is never written
//! by sync updates, and a real poster image is never downgraded back to a
//! placeholder.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Image URL the calendar sites emit while a race has no poster yet.
/// Treated the same as a missing image when deciding whether an incoming
/// image may overwrite the stored one.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://www.alcanzatumeta.es/assets/images/no_image.png";

/// True when a stored image slot is effectively empty and may be replaced.
pub fn image_is_placeholder(url: Option<&str>) -> bool {
    match url {
        None => true,
        Some(u) => u.is_empty() || u == PLACEHOLDER_IMAGE_URL,
    }
}

/// What an upsert did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// One reconciled race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Race {
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    pub registration_url: Option<String>,
    pub source_id: String,
    pub published: bool,
}

impl Race {
    /// Create the catalog table and index if missing.
    pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS carreras (
                title TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                location TEXT NOT NULL,
                image_url TEXT,
                detail_url TEXT,
                registration_url TEXT,
                source_id TEXT NOT NULL,
                published INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create carreras table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_carreras_date ON carreras(date)")
            .execute(pool)
            .await
            .context("Failed to create carreras date index")?;

        Ok(())
    }

    pub async fn find_by_title(title: &str, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM carreras WHERE title = ?")
            .bind(title)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new race or refresh an existing row in place.
    ///
    /// On update, `published` is left alone so a re-sync never unflags a
    /// race the publisher already posted, and the stored image is only
    /// replaced while it is missing or still the placeholder.
    pub async fn upsert(&self, pool: &SqlitePool) -> Result<UpsertOutcome> {
        match Self::find_by_title(&self.title, pool).await? {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO carreras
                        (title, date, location, image_url, detail_url, registration_url, source_id)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&self.title)
                .bind(self.date)
                .bind(&self.location)
                .bind(&self.image_url)
                .bind(&self.detail_url)
                .bind(&self.registration_url)
                .bind(&self.source_id)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to insert race `{}`", self.title))?;

                tracing::debug!(title = %self.title, date = %self.date, "Inserted new race");
                Ok(UpsertOutcome::Inserted)
            }
            Some(stored) => {
                let image_url = if image_is_placeholder(stored.image_url.as_deref()) {
                    self.image_url.as_deref()
                } else {
                    stored.image_url.as_deref()
                };

                sqlx::query(
                    r#"
                    UPDATE carreras
                    SET date = ?,
                        location = ?,
                        image_url = ?,
                        detail_url = ?,
                        registration_url = ?,
                        source_id = ?
                    WHERE title = ?
                    "#,
                )
                .bind(self.date)
                .bind(&self.location)
                .bind(image_url)
                .bind(&self.detail_url)
                .bind(&self.registration_url)
                .bind(&self.source_id)
                .bind(&self.title)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to update race `{}`", self.title))?;

                tracing::debug!(title = %self.title, date = %self.date, "Updated existing race");
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    /// All races on or after `today`, soonest first.
    pub async fn find_upcoming(today: NaiveDate, pool: &SqlitePool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM carreras WHERE date >= ? ORDER BY date ASC, title ASC",
        )
        .bind(today)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// The earliest upcoming race the publisher has not posted yet.
    pub async fn next_unpublished(today: NaiveDate, pool: &SqlitePool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM carreras
            WHERE date >= ? AND published = 0
            ORDER BY date ASC, title ASC
            LIMIT 1
            "#,
        )
        .bind(today)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_published(title: &str, pool: &SqlitePool) -> Result<()> {
        sqlx::query("UPDATE carreras SET published = 1 WHERE title = ?")
            .bind(title)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to flag race `{title}` as published"))?;
        Ok(())
    }

    /// Delete rows dated strictly before `cutoff`. Returns how many went.
    pub async fn delete_before(cutoff: NaiveDate, pool: &SqlitePool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM carreras WHERE date < ?")
            .bind(cutoff)
            .execute(pool)
            .await
            .context("Failed to prune past races")?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM carreras")
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Date formatted for human-facing listings, day first.
    pub fn display_date(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(image_is_placeholder(None));
        assert!(image_is_placeholder(Some("")));
        assert!(image_is_placeholder(Some(PLACEHOLDER_IMAGE_URL)));
        assert!(!image_is_placeholder(Some(
            "https://www.alcanzatumeta.es/assets/images/cartel.png"
        )));
    }

    #[test]
    fn test_display_date_is_day_first() {
        let race = Race {
            title: "Media Maratón".into(),
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            location: "Murcia".into(),
            image_url: None,
            detail_url: None,
            registration_url: None,
            source_id: "ALCANZATUMETA".into(),
            published: false,
        };
        assert_eq!(race.display_date(), "01/06/2026");
    }
}
