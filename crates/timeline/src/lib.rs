use thiserror::Error;

mod display;
pub use display::*;
mod edits;
pub use edits::*;
mod pieces;
pub use pieces::*;
mod ruler;
pub use ruler::*;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid segment {id}: start {start} is after end {end}")]
    InvalidSegment { id: String, start: f64, end: f64 },
    #[error("item not found: {0}")]
    ItemNotFound(String),
}

/// Seconds on either time axis.
pub type Seconds = f64;

/// Replaces NaN and infinities with zero so downstream clamping stays total.
pub fn sanitize(value: Seconds) -> Seconds {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
