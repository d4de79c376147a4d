use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::channels::{self, ChannelProfile};
use crate::cli::CaptureArgs;
use crate::extract;
use crate::formats::CapturedReservation;
use crate::store::{self, CaptureStore};

/// What one capture pass produced. `batch` is the freshly extracted set
/// (pre-dedup): that is what gets forwarded, not the merged store.
#[derive(Debug)]
pub struct PassOutcome {
    pub profile: &'static ChannelProfile,
    pub batch: Vec<CapturedReservation>,
    pub new_records: usize,
    pub total_stored: usize,
    pub sync_token: Option<String>,
    pub sync_base_url: Option<String>,
}

pub async fn run(args: CaptureArgs) -> anyhow::Result<()> {
    let page_url = Url::parse(&args.url).context("parse --url")?;
    let hostname = page_url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("--url must have a host: {page_url}"))?;
    if channels::detect(hostname).is_none() {
        // No profile, no work: the page is not even fetched.
        tracing::info!(host = hostname, "no channel profile matches this host");
        return Ok(());
    }

    let store = CaptureStore::new(&args.store);
    let client = http_client()?;

    let html = load_page(&client, &page_url, args.page.as_deref().map(Path::new)).await?;
    let Some(outcome) = run_pass(&store, &page_url, &html)? else {
        return Ok(());
    };

    // One-shot invocation: await the forward so the process does not exit
    // under it. Failures are still only logged.
    forward(&client, &outcome).await;
    Ok(())
}

/// Extract, dedup, and persist one page. Returns `None` when no channel
/// profile matches the page's host; the pipeline stays inactive.
///
/// Safe to trigger repeatedly for the same page: re-extracted records
/// collide on their confirmation codes and the store is unchanged.
pub fn run_pass(
    store: &CaptureStore,
    page_url: &Url,
    html: &str,
) -> anyhow::Result<Option<PassOutcome>> {
    let hostname = page_url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("page url must have a host: {page_url}"))?;
    let Some(profile) = channels::detect(hostname) else {
        tracing::info!(host = hostname, "no channel profile matches this host");
        return Ok(None);
    };

    let batch = extract::extract_reservations(profile, html, page_url.as_str())
        .with_context(|| format!("extract {} reservations", profile.display_name))?;

    let mut file = store.load()?;
    let before = file.captured_reservations.len();
    file.captured_reservations = store::merge_batch(&file.captured_reservations, &batch);
    let total_stored = file.captured_reservations.len();
    store.save(&file)?;

    tracing::info!(
        channel = profile.display_name,
        extracted = batch.len(),
        new = total_stored - before,
        stored = total_stored,
        "capture pass complete"
    );

    Ok(Some(PassOutcome {
        profile,
        batch,
        new_records: total_stored - before,
        total_stored,
        sync_token: file.sync_token,
        sync_base_url: file.sync_base_url,
    }))
}

/// Forward the pass's fresh batch using the credentials snapshotted from
/// the store. Either credential missing means the batch silently stays
/// queued locally.
pub async fn forward(client: &reqwest::Client, outcome: &PassOutcome) {
    let (Some(base_url), Some(token)) =
        (outcome.sync_base_url.as_deref(), outcome.sync_token.as_deref())
    else {
        tracing::debug!("sync credentials not configured; captures stay local");
        return;
    };

    crate::sync::forward_batch(
        client,
        base_url,
        token,
        outcome.profile.display_name,
        &outcome.batch,
    )
    .await;
}

/// Read a saved page snapshot, or fetch the live page when none is given.
pub async fn load_page(
    client: &reqwest::Client,
    page_url: &Url,
    page_file: Option<&Path>,
) -> anyhow::Result<String> {
    match page_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read page snapshot: {}", path.display())),
        None => fetch_page(client, page_url).await,
    }
}

async fn fetch_page(client: &reqwest::Client, url: &Url) -> anyhow::Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned {status}");
    }

    response
        .text()
        .await
        .with_context(|| format!("read page body: {url}"))
}

/// Shared HTTP client. The browser-like User-Agent keeps booking sites
/// from serving their bot interstitial instead of the listing.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .context("build http client")
}
