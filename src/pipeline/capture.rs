// src/pipeline/capture.rs

//! Incremental capture of a listing page.
//!
//! Races already present in the prior dataset are skipped unless the run is
//! forced, in which case their prior rows are discarded and the page is
//! extracted again. Links are visited oldest first.

use std::collections::HashMap;
use std::fmt;

use crate::dom::Page;
use crate::error::{AppError, Result};
use crate::extract::{ListingEntry, extract_listing, extract_race};
use crate::models::{CompiledSelectors, RaceRecord, Tables};
use crate::services::{Pacer, PageRenderer};

/// Previously captured races, loaded from the table store.
#[derive(Debug, Clone, Default)]
pub struct PriorDataset {
    tables: Tables,
    by_url: HashMap<String, String>,
}

impl PriorDataset {
    pub fn new(tables: Tables) -> Self {
        let by_url = tables
            .race_info
            .iter()
            .map(|r| (r.url.clone(), r.race_id.clone()))
            .collect();
        Self { tables, by_url }
    }

    pub fn race_id(&self, url: &str) -> Option<&str> {
        self.by_url.get(url).map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }

    /// Drop a race and every prize and horse row keyed by its identifier.
    pub fn discard(&mut self, url: &str) -> Option<DiscardedRace> {
        let (url, race_id) = self.by_url.remove_entry(url)?;
        let rows = self.tables.take_race(&race_id);
        log::debug!("Discarded {} prior rows of {}", rows.row_count(), url);
        Some(DiscardedRace { url, race_id, rows })
    }

    /// Put back a race removed by [`PriorDataset::discard`].
    pub fn restore(&mut self, discarded: DiscardedRace) {
        log::debug!("Restored {} prior rows of {}", discarded.rows.row_count(), discarded.url);
        self.tables.extend(discarded.rows);
        self.by_url.insert(discarded.url, discarded.race_id);
    }

    /// Local silk file of a prior starter with the same silk URL.
    pub fn silk_file(&self, silk_url: &str) -> Option<&str> {
        self.tables
            .horse_record
            .iter()
            .filter(|h| h.horse.silk_url.as_deref() == Some(silk_url))
            .find_map(|h| h.horse.silk_file.as_deref())
    }

    /// Uploaded silk URL of a prior starter with the same silk URL.
    pub fn silk_object_url(&self, silk_url: &str) -> Option<&str> {
        self.tables
            .horse_record
            .iter()
            .filter(|h| h.horse.silk_url.as_deref() == Some(silk_url))
            .find_map(|h| h.horse.silk_object_url.as_deref())
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn into_tables(self) -> Tables {
        self.tables
    }
}

/// Prior rows of a race set aside while it is captured again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedRace {
    pub url: String,
    pub race_id: String,
    pub rows: Tables,
}

/// Why a listed race was not captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Present in the prior dataset and the run is not forced
    AlreadyCaptured,
    /// The item has no usable "Full result" link
    NoResultLink,
    /// The detail page could not be rendered
    RenderFailed(String),
    /// The detail page rendered without its required structure
    ExtractionFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCaptured => f.write_str("already captured"),
            Self::NoResultLink => f.write_str("no full result link"),
            Self::RenderFailed(msg) => write!(f, "render failed: {}", msg),
            Self::ExtractionFailed(msg) => write!(f, "extraction failed: {}", msg),
        }
    }
}

/// What happened to one listed race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Captured { url: String, race_id: String },
    Skipped { url: Option<String>, reason: SkipReason },
}

/// Result of capturing one listing page.
#[derive(Debug, Default)]
pub struct CaptureReport {
    /// One outcome per listed race, in visiting order
    pub outcomes: Vec<LinkOutcome>,
    /// Captured races, in visiting order
    pub races: Vec<RaceRecord>,
}

impl CaptureReport {
    pub fn captured(&self) -> usize {
        self.races.len()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.races.len()
    }

    fn skip(&mut self, url: Option<String>, reason: SkipReason) {
        match &url {
            Some(url) => log::info!("Skipping {}: {}", url, reason),
            None => log::warn!("Skipping listing item: {}", reason),
        }
        self.outcomes.push(LinkOutcome::Skipped { url, reason });
    }
}

/// Capture behavior knobs.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Re-extract races already in the prior dataset
    pub force: bool,
    /// Extra renders of a detail page that comes back without its anchors
    pub anchor_retries: u32,
    /// Text of the full result link on the listing page
    pub full_result_label: String,
    /// Selector the renderer waits for on the listing page
    pub listing_wait_for: String,
    /// Selector the renderer waits for on a detail page
    pub detail_wait_for: String,
}

/// Drives the renderer over a listing page and its detail pages.
pub struct Capturer<'a> {
    renderer: &'a dyn PageRenderer,
    pacer: &'a dyn Pacer,
    selectors: &'a CompiledSelectors,
    settings: CaptureSettings,
}

impl<'a> Capturer<'a> {
    pub fn new(
        renderer: &'a dyn PageRenderer,
        pacer: &'a dyn Pacer,
        selectors: &'a CompiledSelectors,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            renderer,
            pacer,
            selectors,
            settings,
        }
    }

    /// Render the listing page and capture its races.
    ///
    /// Failing to render the listing itself is an error; per-race failures
    /// become skip outcomes.
    pub async fn capture_listing(
        &self,
        listing_url: &str,
        prior: &mut PriorDataset,
    ) -> Result<CaptureReport> {
        log::info!("Opening listing {}", listing_url);
        let html = self
            .renderer
            .render(listing_url, Some(&self.settings.listing_wait_for))
            .await?;

        let entries = {
            let page = Page::parse(listing_url, &html);
            extract_listing(&page, self.selectors, &self.settings.full_result_label)
        };
        log::info!("{} races found", entries.len());

        Ok(self.capture_entries(entries, prior).await)
    }

    /// Capture listed races, visiting them in reverse page order.
    pub async fn capture_entries(
        &self,
        entries: Vec<ListingEntry>,
        prior: &mut PriorDataset,
    ) -> CaptureReport {
        let mut report = CaptureReport::default();
        let mut visited = false;

        for entry in entries.into_iter().rev() {
            let Some(url) = entry.url else {
                report.skip(None, SkipReason::NoResultLink);
                continue;
            };

            if prior.contains(&url) && !self.settings.force {
                report.skip(Some(url), SkipReason::AlreadyCaptured);
                continue;
            }
            let discarded = prior.discard(&url);
            if let Some(d) = &discarded {
                log::info!("Recapturing {} (race {})", url, d.race_id);
            }

            if visited {
                self.pacer.pause().await;
            }
            visited = true;

            match self.capture_race(&url).await {
                Ok(race) => {
                    report.outcomes.push(LinkOutcome::Captured {
                        url: url.clone(),
                        race_id: race.race_id.clone(),
                    });
                    report.races.push(race);
                }
                Err(reason) => {
                    if let Some(d) = discarded {
                        prior.restore(d);
                    }
                    report.skip(Some(url), reason);
                }
            }
        }

        report
    }

    /// Render and extract one detail page, re-rendering while its anchors are missing.
    pub async fn capture_race(&self, url: &str) -> std::result::Result<RaceRecord, SkipReason> {
        log::info!("Parsing race detail for {}", url);
        let attempts = self.settings.anchor_retries + 1;
        let mut last_failure = SkipReason::RenderFailed("not attempted".to_string());

        for attempt in 1..=attempts {
            let html = match self
                .renderer
                .render(url, Some(&self.settings.detail_wait_for))
                .await
            {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("Render attempt {}/{} failed: {}", attempt, attempts, e);
                    last_failure = SkipReason::RenderFailed(e.to_string());
                    continue;
                }
            };

            let extracted = {
                let page = Page::parse(url, &html);
                extract_race(&page, self.selectors)
            };

            match extracted {
                Ok(race) => {
                    log::info!(
                        "Captured {} {} ({} runners)",
                        race.time.as_deref().unwrap_or("?"),
                        race.course.as_deref().unwrap_or("?"),
                        race.horses.len()
                    );
                    return Ok(race);
                }
                Err(e @ AppError::MissingAnchor { .. }) => {
                    log::warn!("Extraction attempt {}/{} failed: {}", attempt, attempts, e);
                    last_failure = SkipReason::ExtractionFailed(e.to_string());
                }
                Err(e) => return Err(SkipReason::ExtractionFailed(e.to_string())),
            }
        }

        Err(last_failure)
    }
}
