//! Splits the edited timeline into runs of constant speed and zoom.
//!
//! Renderers walk the pieces in order: each piece is a source-time range
//! played back at a single speed with at most one active zoom.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EditDecisionList, Seconds};

const BREAKPOINT_EPSILON: f64 = f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveZoom {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePiece {
    pub start: Seconds,
    pub end: Seconds,
    pub speed: f64,
    pub zoom: Option<ActiveZoom>,
}

impl TimelinePiece {
    fn unedited(duration: Seconds) -> Self {
        Self {
            start: 0.0,
            end: duration,
            speed: 1.0,
            zoom: None,
        }
    }

    /// Wall-clock length of the piece once its speed is applied.
    pub fn output_duration(&self) -> Seconds {
        let speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            1.0
        };
        (self.end - self.start) / speed
    }
}

/// Enabled segments as `(start, end)` sorted by start; the whole recording
/// when nothing is enabled.
pub fn enabled_ranges(edits: &EditDecisionList, duration: Seconds) -> Vec<(Seconds, Seconds)> {
    let mut ranges: Vec<(Seconds, Seconds)> = edits
        .segments
        .iter()
        .filter(|segment| segment.enabled)
        .map(|segment| (segment.start_time, segment.end_time))
        .collect();

    if ranges.is_empty() {
        ranges.push((0.0, duration));
    }

    ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranges
}

pub fn plan_pieces(edits: &EditDecisionList, duration: Seconds) -> Vec<TimelinePiece> {
    let mut pieces = Vec::new();

    for (range_start, range_end) in enabled_ranges(edits, duration) {
        if range_end <= range_start {
            continue;
        }

        let inside = |t: Seconds| t > range_start && t < range_end;
        let mut breakpoints = vec![range_start, range_end];
        for (start, end) in edits
            .speed
            .iter()
            .map(|s| (s.start_time, s.end_time))
            .chain(edits.zoom.iter().map(|z| (z.start_time, z.end_time)))
        {
            if inside(start) {
                breakpoints.push(start);
            }
            if inside(end) {
                breakpoints.push(end);
            }
        }

        breakpoints.sort_by(|a, b| a.total_cmp(b));
        breakpoints.dedup_by(|a, b| (*a - *b).abs() < BREAKPOINT_EPSILON);

        for pair in breakpoints.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end <= start {
                continue;
            }

            let speed = edits
                .speed
                .iter()
                .find(|effect| start >= effect.start_time && start < effect.end_time)
                .map(|effect| effect.speed)
                .unwrap_or(1.0);

            let zoom = edits
                .zoom
                .iter()
                .find(|effect| start >= effect.start_time && start < effect.end_time)
                .filter(|effect| effect.scale > 1.0)
                .map(|effect| ActiveZoom {
                    scale: effect.scale,
                    x: effect.x,
                    y: effect.y,
                });

            pieces.push(TimelinePiece {
                start,
                end,
                speed,
                zoom,
            });
        }
    }

    if pieces.is_empty() {
        pieces.push(TimelinePiece::unedited(duration));
    }

    debug!(pieces = pieces.len(), "planned timeline pieces");
    pieces
}

/// Whether the plan differs from playing the recording straight through.
pub fn is_edited(pieces: &[TimelinePiece], duration: Seconds) -> bool {
    let [piece] = pieces else {
        return true;
    };
    piece.start > 0.001
        || (piece.end - duration).abs() > 0.001
        || (piece.speed - 1.0).abs() > 0.01
        || piece.zoom.is_some()
}

pub fn output_duration(pieces: &[TimelinePiece]) -> Seconds {
    pieces.iter().map(TimelinePiece::output_duration).sum()
}
