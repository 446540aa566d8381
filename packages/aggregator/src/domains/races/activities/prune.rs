//! Retention: drop races that finished long enough ago.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use crate::domains::races::models::Race;

/// Delete races dated more than `keep_days` before `today`.
pub async fn prune_past(keep_days: i64, today: NaiveDate, pool: &SqlitePool) -> Result<u64> {
    let cutoff = today - chrono::Duration::days(keep_days);
    let removed = Race::delete_before(cutoff, pool).await?;
    info!(removed, cutoff = %cutoff, "Pruned past races");
    Ok(removed)
}
