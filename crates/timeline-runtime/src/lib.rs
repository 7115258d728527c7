//! Pointer-driven editing on top of the display timeline: range dragging for
//! the zoom, speed and annotation tracks, scrubbing, waveform resampling and
//! the geometry the presentation layer draws.

use thiserror::Error;
use timeline::TimelineError;

mod config;
pub use config::*;
mod drag;
pub use drag::*;
mod host;
pub use host::*;
mod runtime;
pub use runtime::*;
mod view;
pub use view::*;
mod waveform;
pub use waveform::*;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
