// src/pipeline/run.rs

//! End-to-end run: capture, audit, silks, document, tables.

use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{CompiledSelectors, Config, RaceRecord, normalize};
use crate::pipeline::audit::FormatAuditor;
use crate::pipeline::capture::{CaptureSettings, Capturer, PriorDataset};
use crate::pipeline::silks::{download_silks, upload_silks};
use crate::services::{ImageFetcher, Pacer, PageRenderer};
use crate::storage::{BlobStore, TableStore, WriteMode, load_document, raw_data_key, save_document};
use crate::utils::has_web_scheme;

/// Per-invocation parameters.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Listing page to capture
    pub url: String,
    /// Where the raw data document is written
    pub out_file: PathBuf,
    /// Root directory of downloaded silks
    pub image_dir: PathBuf,
    /// Re-extract races already captured
    pub force: bool,
    /// Publish the races saved in `out_file` instead of scraping
    pub from_document: bool,
}

/// External collaborators of a run.
pub struct Collaborators<'a> {
    pub renderer: &'a dyn PageRenderer,
    pub page_pacer: &'a dyn Pacer,
    pub image_pacer: &'a dyn Pacer,
    pub images: &'a dyn ImageFetcher,
    pub blobs: &'a dyn BlobStore,
    pub tables: &'a dyn TableStore,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub races: usize,
    pub prize_rows: usize,
    pub horse_rows: usize,
    pub skipped: usize,
    pub format_issues: usize,
}

/// Capture the listing and publish everything new.
pub async fn run(config: &Config, options: &RunOptions, deps: &Collaborators<'_>) -> Result<RunSummary> {
    if !has_web_scheme(&options.url) {
        return Err(AppError::validation(format!(
            "URL must start with http:// or https://: {}",
            options.url
        )));
    }

    let selectors = CompiledSelectors::compile(&config.selectors)?;
    let auditor = FormatAuditor::new(config.positions.clone())?;

    let mut prior = PriorDataset::new(deps.tables.load().await?);
    log::info!("{} races already captured", prior.len());

    let (mut races, skipped) = if options.from_document {
        let races = load_document(&options.out_file).await?.ok_or_else(|| {
            AppError::config(format!("no saved document at {}", options.out_file.display()))
        })?;
        log::info!("Loaded {} races from {}", races.len(), options.out_file.display());
        (select_from_document(races, &mut prior, options.force), 0)
    } else {
        let settings = CaptureSettings {
            force: options.force,
            anchor_retries: config.scraper.anchor_retries,
            full_result_label: config.scraper.full_result_label.clone(),
            listing_wait_for: config.selectors.time_list.clone(),
            detail_wait_for: config.selectors.result_section.clone(),
        };
        let capturer = Capturer::new(deps.renderer, deps.page_pacer, &selectors, settings);
        let report = capturer.capture_listing(&options.url, &mut prior).await?;
        let skipped = report.skipped();
        (report.races, skipped)
    };

    let format_issues = auditor.audit_and_log(&races);

    if races.is_empty() {
        log::info!("Nothing new to publish");
        return Ok(RunSummary {
            skipped,
            format_issues,
            ..RunSummary::default()
        });
    }

    if !options.from_document {
        download_silks(
            &mut races,
            &prior,
            deps.images,
            &options.image_dir,
            deps.image_pacer,
        )
        .await;
    }
    // The document reaches disk before any blob or table I/O.
    save_document(&options.out_file, &races).await?;
    upload_silks(&mut races, &prior, deps.blobs, &options.image_dir, options.force).await?;

    publish_document(options, &races, deps.blobs).await?;

    let new_rows = normalize(&races);
    let summary = RunSummary {
        races: new_rows.race_info.len(),
        prize_rows: new_rows.prize_info.len(),
        horse_rows: new_rows.horse_record.len(),
        skipped,
        format_issues,
    };

    if options.force {
        let mut tables = prior.into_tables();
        tables.extend(new_rows);
        deps.tables.write(&tables, WriteMode::Replace).await?;
    } else {
        deps.tables.write(&new_rows, WriteMode::Append).await?;
    }

    log::info!(
        "Done: {} races, {} prize rows, {} horse rows ({} skipped)",
        summary.races,
        summary.prize_rows,
        summary.horse_rows,
        summary.skipped
    );
    Ok(summary)
}

/// Keep the saved races the table store does not hold yet.
///
/// With `force` every saved race is kept and its prior rows are discarded.
fn select_from_document(races: Vec<RaceRecord>, prior: &mut PriorDataset, force: bool) -> Vec<RaceRecord> {
    races
        .into_iter()
        .filter(|race| {
            if !prior.contains(&race.url) {
                return true;
            }
            if force {
                prior.discard(&race.url);
                true
            } else {
                log::info!("Skipping {}: already captured", race.url);
                false
            }
        })
        .collect()
}

/// Save the document again with uploaded silk URLs and publish it.
async fn publish_document(options: &RunOptions, races: &[RaceRecord], blobs: &dyn BlobStore) -> Result<()> {
    let bytes = save_document(&options.out_file, races).await?;
    let file_name = options
        .out_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::config(format!("bad output path {}", options.out_file.display())))?;
    let url = blobs
        .put(&raw_data_key(file_name), bytes, "application/json")
        .await?;
    log::info!("Uploaded raw data to {}", url);
    Ok(())
}
