//! Pipeline stages of a capture run.
//!
//! - `capture`: render the listing and extract the races not captured yet
//! - `audit`: warn about fields with an unexpected shape
//! - `silks`: download and upload silk images
//! - `run`: the whole sequence, ending with the document and table writes

pub mod audit;
pub mod capture;
pub mod run;
pub mod silks;

pub use audit::{FormatAuditor, FormatIssue};
pub use capture::{
    CaptureReport, CaptureSettings, Capturer, DiscardedRace, LinkOutcome, PriorDataset, SkipReason,
};
pub use run::{Collaborators, RunOptions, RunSummary, run};
pub use silks::{SilkStats, download_silks, upload_silks};
