use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use notify_debouncer_full::{
    DebounceEventResult, new_debouncer,
    notify::{EventKind, RecursiveMode},
};
use tokio::io::AsyncBufReadExt as _;
use tokio::sync::mpsc;
use url::Url;

use crate::capture::{self, http_client};
use crate::channels;
use crate::cli::WatchArgs;
use crate::store::CaptureStore;

/// Path fragments that mark a reservations listing page. Change
/// notifications for pages outside these paths are ignored.
pub const RESERVATION_PATH_PATTERNS: &[&str] =
    &["/hosting/reservations", "/reservations", "/bookings"];

pub fn is_reservations_path(path: &str) -> bool {
    RESERVATION_PATH_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern))
}

/// `watch` subcommand: the page-change observer.
///
/// The snapshot file stands in for the live document; every rewrite of it
/// is a re-render. Three things trigger a capture pass: a debounced change
/// notification (gated on the reservations-page path patterns), one
/// attempt a fixed settle delay after startup, and a newline on stdin (the
/// capture-now control). Pass failures are logged and the watcher keeps
/// running; Ctrl-C stops it.
pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let page_url = Url::parse(&args.url).context("parse --url")?;
    let hostname = page_url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("--url must have a host: {page_url}"))?;
    let Some(profile) = channels::detect(hostname) else {
        tracing::info!(host = hostname, "no channel profile matches this host; not watching");
        return Ok(());
    };

    let page_path = PathBuf::from(&args.page);
    let watched_name = page_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("--page must name a file: {}", page_path.display()))?
        .to_os_string();
    let watch_dir = page_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let store = CaptureStore::new(&args.store);
    let client = http_client()?;

    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let mut debouncer = new_debouncer(
        Duration::from_millis(args.debounce_ms),
        None,
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                let changed = events.iter().any(|event| {
                    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                        && event
                            .paths
                            .iter()
                            .any(|path| path.file_name() == Some(watched_name.as_os_str()))
                });
                if changed {
                    let _ = change_tx.send(());
                }
            }
            Err(errors) => {
                for err in errors {
                    tracing::warn!(?err, "page watcher error");
                }
            }
        },
    )
    .context("start page watcher")?;
    debouncer
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch {}", watch_dir.display()))?;

    // Capture-now control: any line on stdin.
    let (manual_tx, mut manual_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(_)) = lines.next_line().await {
            if manual_tx.send(()).is_err() {
                break;
            }
        }
    });

    tracing::info!(
        channel = profile.display_name,
        page = %page_path.display(),
        store = %store.path().display(),
        "watching; press Enter to capture now, Ctrl-C to stop"
    );

    // One attempt shortly after startup, giving async content time to land.
    tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
    capture_pass(&client, &store, &page_url, &page_path).await;

    loop {
        tokio::select! {
            Some(()) = change_rx.recv() => {
                if !is_reservations_path(page_url.path()) {
                    tracing::debug!(path = page_url.path(), "not a reservations page; ignoring change");
                    continue;
                }
                capture_pass(&client, &store, &page_url, &page_path).await;
            }
            Some(()) = manual_rx.recv() => {
                tracing::info!("manual capture trigger");
                capture_pass(&client, &store, &page_url, &page_path).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watcher");
                break;
            }
        }
    }

    Ok(())
}

/// One observer-triggered pass. Extraction, dedup, and the store write run
/// to completion here; forwarding is spawned and never awaited.
async fn capture_pass(
    client: &reqwest::Client,
    store: &CaptureStore,
    page_url: &Url,
    page_path: &Path,
) {
    let html = match std::fs::read_to_string(page_path) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(page = %page_path.display(), ?err, "read page snapshot failed");
            return;
        }
    };

    match capture::run_pass(store, page_url, &html) {
        Ok(Some(outcome)) => {
            let client = client.clone();
            tokio::spawn(async move {
                capture::forward(&client, &outcome).await;
            });
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(?err, "capture pass failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservations_paths_match_the_fixed_patterns() {
        assert!(is_reservations_path("/hosting/reservations"));
        assert!(is_reservations_path("/hosting/reservations/upcoming"));
        assert!(is_reservations_path("/rm/bookings"));
        assert!(is_reservations_path("/reservations"));
    }

    #[test]
    fn other_paths_do_not_match() {
        assert!(!is_reservations_path("/"));
        assert!(!is_reservations_path("/hosting/listings"));
        assert!(!is_reservations_path("/account/settings"));
    }
}
