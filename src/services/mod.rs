//! Collaborators the capture talks to.
//!
//! - Page rendering (`PageRenderer`): plain HTTP or Browserless
//! - Pacing between requests (`Pacer`)
//! - Silk image retrieval (`ImageFetcher`)

mod images;
mod pacing;
mod renderer;

pub use images::{HttpImageFetcher, ImageFetcher};
pub use pacing::{NoPacer, Pacer, RandomPacer};
pub use renderer::{BrowserlessRenderer, HttpRenderer, PageRenderer, renderer_from_config};
