// src/extract/mod.rs

//! Page-to-record extraction.
//!
//! - `fields`: value extractors for single nodes and node pairs
//! - `rows`: horse table rows grouped into starters
//! - `race`: one detail page into a `RaceRecord`
//! - `listing`: result links of a listing page

pub mod fields;
pub mod listing;
pub mod race;
pub mod rows;

pub use listing::{ListingEntry, extract_listing};
pub use race::{check_anchors, extract_race};
pub use rows::{RowEvent, RowKind, reduce_rows};
