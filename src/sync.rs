use anyhow::Context as _;
use reqwest::header::AUTHORIZATION;

use crate::cli::SyncArgs;
use crate::formats::{CapturedReservation, SyncPayload};
use crate::store::CaptureStore;

/// Collection endpoint on the sync server.
pub fn sync_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/api/extension/sync/")
}

/// Deliver one captured batch to the sync server.
///
/// Failures are logged and swallowed: the records are already in the
/// local store and nothing here retries. The response body is logged but
/// never parsed; delivery is fire-and-forget.
pub async fn forward_batch(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    channel: &str,
    bookings: &[CapturedReservation],
) {
    if bookings.is_empty() {
        tracing::debug!(channel, "empty batch; nothing to sync");
        return;
    }

    let endpoint = sync_endpoint(base_url);
    let payload = SyncPayload {
        channel: channel.to_owned(),
        bookings: bookings.to_vec(),
    };

    let result = client
        .post(&endpoint)
        .header(AUTHORIZATION, format!("Token {token}"))
        .json(&payload)
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status();
            match response.text().await {
                Ok(body) => {
                    tracing::info!(%status, body, channel, count = payload.bookings.len(), "sync response");
                }
                Err(err) => tracing::warn!(%status, ?err, channel, "read sync response body"),
            }
        }
        Err(err) => {
            tracing::warn!(
                endpoint,
                ?err,
                channel,
                "sync request failed; batch stays in the local store"
            );
        }
    }
}

/// `sync` subcommand: re-send everything in the store, one request per
/// channel. Unlike the in-pipeline forwarder this is user-invoked, so
/// missing credentials fail loudly instead of silently skipping.
pub async fn run(args: SyncArgs) -> anyhow::Result<()> {
    let store = CaptureStore::new(&args.store);
    let file = store.load()?;

    let (Some(base_url), Some(token)) = (file.sync_base_url.as_deref(), file.sync_token.as_deref())
    else {
        anyhow::bail!(
            "sync credentials are not configured; run `staycapture config --token <token> --base-url <url>`"
        );
    };

    let mut by_channel: Vec<(String, Vec<CapturedReservation>)> = Vec::new();
    for reservation in &file.captured_reservations {
        if let Some(only) = args.channel.as_deref()
            && !reservation.channel.eq_ignore_ascii_case(only)
        {
            continue;
        }
        match by_channel
            .iter_mut()
            .find(|(channel, _)| channel == &reservation.channel)
        {
            Some((_, bookings)) => bookings.push(reservation.clone()),
            None => by_channel.push((reservation.channel.clone(), vec![reservation.clone()])),
        }
    }

    if by_channel.is_empty() {
        tracing::info!("no stored reservations to sync");
        return Ok(());
    }

    let client = crate::capture::http_client().context("build sync client")?;
    for (channel, bookings) in &by_channel {
        tracing::info!(channel, count = bookings.len(), "re-sending stored reservations");
        forward_batch(&client, base_url, token, channel, bookings).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slashes() {
        assert_eq!(
            sync_endpoint("https://vision.example"),
            "https://vision.example/api/extension/sync/"
        );
        assert_eq!(
            sync_endpoint("https://vision.example/"),
            "https://vision.example/api/extension/sync/"
        );
    }
}
