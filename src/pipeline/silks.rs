// src/pipeline/silks.rs

//! Silk image passes run after extraction.
//!
//! The download pass fills `horse_silk` (a path relative to the image
//! directory), the upload pass fills `horse_silk_url_s3`. Both reuse what a
//! prior capture already stored for the same silk URL.

use std::path::Path;

use crate::error::Result;
use crate::models::RaceRecord;
use crate::pipeline::capture::PriorDataset;
use crate::services::{ImageFetcher, Pacer};
use crate::storage::local::write_atomic;
use crate::storage::{BlobStore, silk_key};
use crate::utils::file_name_from_url;

/// Counters of a silk pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SilkStats {
    pub fetched: usize,
    pub reused: usize,
    pub failed: usize,
}

/// Download silks into `{image_dir}/{race_id}/{file_name}`.
///
/// A failed download is logged and leaves `horse_silk` empty.
pub async fn download_silks(
    races: &mut [RaceRecord],
    prior: &PriorDataset,
    fetcher: &dyn ImageFetcher,
    image_dir: &Path,
    pacer: &dyn Pacer,
) -> SilkStats {
    log::info!("Downloading images...");
    let mut stats = SilkStats::default();
    let total = races.len();

    for (i, race) in races.iter_mut().enumerate() {
        let mut fetched_any = false;

        for horse in race.horses.iter_mut() {
            let Some(silk_url) = horse.silk_url.as_deref() else {
                continue;
            };

            if let Some(file) = prior.silk_file(silk_url) {
                horse.silk_file = Some(file.to_string());
                stats.reused += 1;
                continue;
            }

            let Some(file_name) = file_name_from_url(silk_url) else {
                log::warn!("Cannot derive a file name from silk URL {}", silk_url);
                stats.failed += 1;
                continue;
            };

            fetched_any = true;
            let relative = silk_key(&race.race_id, &file_name);
            let stored = match fetcher.fetch(silk_url).await {
                Ok(bytes) => write_atomic(&image_dir.join(&relative), &bytes).await,
                Err(e) => Err(e),
            };
            match stored {
                Ok(()) => {
                    horse.silk_file = Some(relative);
                    stats.fetched += 1;
                }
                Err(e) => {
                    log::warn!("Silk download failed for {}: {}", silk_url, e);
                    stats.failed += 1;
                }
            }
        }

        if fetched_any && i + 1 < total {
            pacer.pause().await;
        }
    }

    log::info!(
        "Silks: {} downloaded, {} reused, {} failed",
        stats.fetched,
        stats.reused,
        stats.failed
    );
    stats
}

/// Upload downloaded silks under their `horse_silk` key.
///
/// Unless `force`, a silk already uploaded by a prior capture keeps its
/// object URL. Blob store failures are returned to the caller.
pub async fn upload_silks(
    races: &mut [RaceRecord],
    prior: &PriorDataset,
    blobs: &dyn BlobStore,
    image_dir: &Path,
    force: bool,
) -> Result<SilkStats> {
    let mut stats = SilkStats::default();

    for race in races.iter_mut() {
        for horse in race.horses.iter_mut() {
            let Some(silk_url) = horse.silk_url.as_deref() else {
                continue;
            };

            if !force {
                if let Some(url) = prior.silk_object_url(silk_url) {
                    horse.silk_object_url = Some(url.to_string());
                    stats.reused += 1;
                    continue;
                }
            }

            let Some(key) = horse.silk_file.as_deref() else {
                continue;
            };

            let bytes = match tokio::fs::read(image_dir.join(key)).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Silk file {} unreadable: {}", key, e);
                    stats.failed += 1;
                    continue;
                }
            };

            let url = blobs.put(key, bytes, content_type_for(key)).await?;
            horse.silk_object_url = Some(url);
            stats.fetched += 1;
        }
    }

    log::info!(
        "Silks: {} uploaded, {} reused, {} failed",
        stats.fetched,
        stats.reused,
        stats.failed
    );
    Ok(stats)
}

/// MIME type from a file extension.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{HorseRecord, normalize};
    use crate::services::NoPacer;
    use crate::storage::LocalBlobStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeFetcher {
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> crate::error::Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.contains("broken") {
                Err(AppError::image(url, "404"))
            } else {
                Ok(b"<svg/>".to_vec())
            }
        }
    }

    fn race_with_silk(url: &str, silk: &str) -> RaceRecord {
        let mut race = RaceRecord::new(url);
        let mut winner = HorseRecord::new(Some("1".into()), None, None);
        winner.silk_url = Some(silk.to_string());
        race.horses = vec![winner, HorseRecord::new(Some("2".into()), None, None)];
        race
    }

    #[tokio::test]
    async fn test_download_writes_under_race_id() {
        let tmp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::new();
        let mut races = vec![race_with_silk(
            "https://e.com/r/1",
            "https://images.e.com/silks/1234.svg",
        )];

        let stats = download_silks(
            &mut races,
            &PriorDataset::default(),
            &fetcher,
            tmp.path(),
            &NoPacer,
        )
        .await;

        let expected = format!("{}/1234.svg", races[0].race_id);
        assert_eq!(stats.fetched, 1);
        assert_eq!(races[0].horses[0].silk_file.as_deref(), Some(expected.as_str()));
        assert_eq!(races[0].horses[1].silk_file, None);
        assert!(tmp.path().join(&expected).exists());
    }

    #[tokio::test]
    async fn test_download_failure_leaves_field_empty() {
        let tmp = TempDir::new().unwrap();
        let mut races = vec![race_with_silk("https://e.com/r/1", "https://e.com/broken.svg")];

        let stats = download_silks(
            &mut races,
            &PriorDataset::default(),
            &FakeFetcher::new(),
            tmp.path(),
            &NoPacer,
        )
        .await;

        assert_eq!(stats.failed, 1);
        assert_eq!(races[0].horses[0].silk_file, None);
    }

    #[tokio::test]
    async fn test_download_reuses_prior_file() {
        let tmp = TempDir::new().unwrap();
        let mut old = race_with_silk("https://e.com/r/0", "https://e.com/s/9.svg");
        old.horses[0].silk_file = Some("old-race/9.svg".into());
        let prior = PriorDataset::new(normalize(&[old]));

        let fetcher = FakeFetcher::new();
        let mut races = vec![race_with_silk("https://e.com/r/1", "https://e.com/s/9.svg")];
        let stats = download_silks(&mut races, &prior, &fetcher, tmp.path(), &NoPacer).await;

        assert_eq!(stats.reused, 1);
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert_eq!(races[0].horses[0].silk_file.as_deref(), Some("old-race/9.svg"));
    }

    #[tokio::test]
    async fn test_upload_uses_silk_file_as_key() {
        let images = TempDir::new().unwrap();
        let blobs_dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(blobs_dir.path());

        let mut races = vec![race_with_silk("https://e.com/r/1", "https://e.com/s/1.svg")];
        download_silks(
            &mut races,
            &PriorDataset::default(),
            &FakeFetcher::new(),
            images.path(),
            &NoPacer,
        )
        .await;

        let stats = upload_silks(&mut races, &PriorDataset::default(), &blobs, images.path(), false)
            .await
            .unwrap();

        let key = races[0].horses[0].silk_file.clone().unwrap();
        assert_eq!(stats.fetched, 1);
        assert!(races[0].horses[0].silk_object_url.is_some());
        assert_eq!(blobs.get(&key).await.unwrap(), Some(b"<svg/>".to_vec()));
    }

    #[tokio::test]
    async fn test_upload_reuses_prior_url_unless_forced() {
        let images = TempDir::new().unwrap();
        let blobs_dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(blobs_dir.path());

        let mut old = race_with_silk("https://e.com/r/0", "https://e.com/s/1.svg");
        old.horses[0].silk_object_url = Some("https://s3-eu-west-2.amazonaws.com/b/x/1.svg".into());
        let prior = PriorDataset::new(normalize(&[old]));

        let mut races = vec![race_with_silk("https://e.com/r/1", "https://e.com/s/1.svg")];
        let stats = upload_silks(&mut races, &prior, &blobs, images.path(), false)
            .await
            .unwrap();
        assert_eq!(stats.reused, 1);
        assert_eq!(
            races[0].horses[0].silk_object_url.as_deref(),
            Some("https://s3-eu-west-2.amazonaws.com/b/x/1.svg")
        );

        let mut races = vec![race_with_silk("https://e.com/r/1", "https://e.com/s/1.svg")];
        let stats = upload_silks(&mut races, &prior, &blobs, images.path(), true)
            .await
            .unwrap();
        assert_eq!(stats.reused, 0);
        assert_eq!(races[0].horses[0].silk_object_url, None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("abc/1234.svg"), "image/svg+xml");
        assert_eq!(content_type_for("abc/1234.PNG"), "image/png");
        assert_eq!(content_type_for("raw-data/1.json"), "application/json");
        assert_eq!(content_type_for("abc/noext"), "application/octet-stream");
    }
}
