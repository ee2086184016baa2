// src/models/mod.rs

//! Domain models for the results capture.
//!
//! Records produced by the extractor, their relational form, and the
//! configuration that drives a run.

mod config;
mod position;
mod race;
mod selectors;
mod tables;

// Re-export all public types
pub use config::{Config, PacingConfig, RendererKind, ScraperConfig, StorageConfig};
pub use position::{FinishPosition, PositionCodes};
pub use race::{HorseRecord, PrizeRecord, RaceRecord, race_id_for};
pub use selectors::{CompiledSelectors, PageSelectors, RowMarkers};
pub use tables::{HorseRecordRow, PrizeInfoRow, RaceInfoRow, TableRow, Tables, normalize};
