//! Push the next unannounced race to the Make.com webhook.

use anyhow::Result;
use chrono::NaiveDate;
use make_webhook::{quote_url, RacePayload, WebhookClient};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::domains::races::models::Race;

/// What a publication attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No webhook URL configured; publication is turned off.
    Disabled,
    /// Every upcoming race is already published.
    NothingPending,
    Published { title: String },
    /// Delivery failed; the race keeps its unpublished flag for a retry.
    SendFailed { title: String },
}

/// Publish the earliest upcoming race that has not been announced yet.
///
/// The published flag only flips after the webhook accepts the payload, so a
/// failed delivery is retried on the next run.
pub async fn publish_next(
    webhook: Option<&WebhookClient>,
    today: NaiveDate,
    pool: &SqlitePool,
) -> Result<PublishOutcome> {
    let Some(client) = webhook else {
        info!("WEBHOOK_URL not configured; skipping publication");
        return Ok(PublishOutcome::Disabled);
    };

    let Some(race) = Race::next_unpublished(today, pool).await? else {
        info!("No unpublished upcoming races");
        return Ok(PublishOutcome::NothingPending);
    };

    let payload = RacePayload {
        titulo: race.title.clone(),
        fecha: race.date.to_string(),
        ubicacion: race.location.clone(),
        imagen: race.image_url.as_deref().map(quote_url),
        link: race.registration_url.clone(),
    };

    match client.post_race(&payload).await {
        Ok(()) => {
            Race::mark_published(&race.title, pool).await?;
            info!(title = %race.title, date = %race.date, "Race published");
            Ok(PublishOutcome::Published { title: race.title })
        }
        Err(error) => {
            error!(
                title = %race.title,
                error = %error,
                "Webhook delivery failed; race stays unpublished"
            );
            Ok(PublishOutcome::SendFailed { title: race.title })
        }
    }
}
