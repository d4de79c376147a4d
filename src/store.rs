use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::ConfigArgs;
use crate::formats::{CapturedReservation, StoreFile};

/// Persistent capture store: one JSON file holding the deduplicated
/// reservation sequence plus the sync credentials.
///
/// Reads and writes are whole-file; the write is a temp-file-plus-rename
/// so readers never observe a partial store. The read-modify-write of a
/// capture pass is not locked against other writers.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    path: PathBuf,
}

impl CaptureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty store.
    pub fn load(&self) -> anyhow::Result<StoreFile> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreFile::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read store: {}", self.path.display()));
            }
        };

        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse store: {}", self.path.display()))
    }

    /// Single atomic write: temp file in the same directory, then rename.
    pub fn save(&self, file: &StoreFile) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store dir: {}", parent.display()))?;
        }

        let tmp_path = self
            .path
            .with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
        let data = serde_json::to_vec_pretty(file).context("serialize store")?;
        std::fs::write(&tmp_path, &data)
            .with_context(|| format!("write tmp store: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("rename tmp store to: {}", self.path.display()))?;

        Ok(())
    }
}

/// Merge a freshly captured batch into the stored sequence.
///
/// Pure and deterministic: stored records come first, then the batch, and
/// only the first occurrence of each confirmation code survives. Records
/// are never mutated, so a re-captured reservation keeps its first-seen
/// status and price.
pub fn merge_batch(
    existing: &[CapturedReservation],
    batch: &[CapturedReservation],
) -> Vec<CapturedReservation> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + batch.len());
    for record in existing.iter().chain(batch) {
        if seen.insert(record.confirmation_code.clone()) {
            merged.push(record.clone());
        }
    }
    merged
}

/// `config` subcommand: the out-of-band write path for sync credentials.
pub fn configure(args: ConfigArgs) -> anyhow::Result<()> {
    if args.token.is_none() && args.base_url.is_none() {
        anyhow::bail!("nothing to configure: pass --token and/or --base-url");
    }

    let store = CaptureStore::new(&args.store);
    let mut file = store.load()?;
    if let Some(token) = args.token {
        file.sync_token = Some(token);
    }
    if let Some(base_url) = args.base_url {
        file.sync_base_url = Some(base_url.trim_end_matches('/').to_owned());
    }
    store.save(&file)?;

    tracing::info!(store = %store.path().display(), "sync configuration saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, price: f64) -> CapturedReservation {
        CapturedReservation {
            channel: "Airbnb".to_owned(),
            guest_name: format!("guest-{code}"),
            raw_date_text: "Jan 1 - Jan 5".to_owned(),
            check_in: Some("Jan 1".to_owned()),
            check_out: Some("Jan 5".to_owned()),
            raw_price_text: format!("${price}"),
            total_price: price,
            status: "Confirmed".to_owned(),
            confirmation_code: code.to_owned(),
            captured_at: "2026-01-01T00:00:00Z".to_owned(),
            source_url: "https://www.airbnb.com/hosting/reservations".to_owned(),
        }
    }

    #[test]
    fn merge_appends_new_codes_in_arrival_order() {
        let existing = vec![record("A", 1.0)];
        let batch = vec![record("B", 2.0), record("C", 3.0)];

        let merged = merge_batch(&existing, &batch);
        let codes: Vec<&str> = merged
            .iter()
            .map(|r| r.confirmation_code.as_str())
            .collect();
        assert_eq!(codes, ["A", "B", "C"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let batch = vec![record("A", 1.0), record("B", 2.0)];

        let once = merge_batch(&[], &batch);
        let twice = merge_batch(&once, &batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_keeps_the_first_seen_record_on_collision() {
        let existing = vec![record("ABC", 100.0)];
        let batch = vec![record("ABC", 200.0)];

        let merged = merge_batch(&existing, &batch);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].total_price, 100.0);
    }

    #[test]
    fn merge_dedups_within_a_single_batch_too() {
        let batch = vec![record("A", 1.0), record("A", 9.0), record("B", 2.0)];

        let merged = merge_batch(&[], &batch);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].total_price, 1.0);
    }

    #[test]
    fn missing_store_file_loads_as_empty() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let store = CaptureStore::new(temp.path().join("store.json"));

        let file = store.load()?;
        assert!(file.captured_reservations.is_empty());
        assert!(file.sync_token.is_none());
        assert!(file.sync_base_url.is_none());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let store = CaptureStore::new(temp.path().join("store.json"));

        let file = StoreFile {
            captured_reservations: vec![record("A", 1.0)],
            sync_token: Some("token".to_owned()),
            sync_base_url: Some("https://vision.example".to_owned()),
        };
        store.save(&file)?;

        let loaded = store.load()?;
        assert_eq!(loaded.captured_reservations, file.captured_reservations);
        assert_eq!(loaded.sync_token.as_deref(), Some("token"));
        assert_eq!(loaded.sync_base_url.as_deref(), Some("https://vision.example"));
        Ok(())
    }
}
