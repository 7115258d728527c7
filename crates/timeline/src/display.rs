//! Source <-> display time mapping.
//!
//! The display timeline is the concatenation of every enabled segment,
//! ordered by source start and placed back-to-back with no gaps. Cut
//! regions have no width on the display axis.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{sanitize, Seconds, Segment};

/// Placement of one visible segment on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDisplayInfo {
    pub id: String,
    pub display_start: Seconds,
    pub display_end: Seconds,
    /// Source start clamped to `[0, duration]`.
    pub clamped_start: Seconds,
    /// Source end clamped to `[0, duration]`.
    pub clamped_end: Seconds,
}

impl SegmentDisplayInfo {
    pub fn display_duration(&self) -> Seconds {
        self.display_end - self.display_start
    }
}

/// How close a dragged edge must get to a snap point before it sticks.
///
/// The effective tolerance is `max(timeline_duration * ratio, floor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapTolerance {
    pub ratio: f64,
    pub floor: Seconds,
}

impl Default for SnapTolerance {
    fn default() -> Self {
        Self {
            ratio: 0.005,
            floor: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMetrics {
    duration: Seconds,
    timeline_duration: Seconds,
    segments: Vec<SegmentDisplayInfo>,
    snap_points: Vec<Seconds>,
    snap: SnapTolerance,
}

impl DisplayMetrics {
    pub fn new(segments: &[Segment], duration: Seconds) -> Self {
        Self::with_snap(segments, duration, SnapTolerance::default())
    }

    pub fn with_snap(segments: &[Segment], duration: Seconds, snap: SnapTolerance) -> Self {
        let duration = sanitize(duration).max(0.0);

        let mut enabled: Vec<&Segment> = segments.iter().filter(|s| s.enabled).collect();
        enabled.sort_by(|a, b| sanitize(a.start_time).total_cmp(&sanitize(b.start_time)));

        let mut infos = Vec::with_capacity(enabled.len());
        let mut display_offset = 0.0;
        for segment in enabled {
            let clamped_start = sanitize(segment.start_time).clamp(0.0, duration);
            let clamped_end = sanitize(segment.end_time).clamp(0.0, duration);
            let clamped_duration = clamped_end - clamped_start;
            if clamped_duration <= 0.0 {
                continue;
            }
            infos.push(SegmentDisplayInfo {
                id: segment.id.clone(),
                display_start: display_offset,
                display_end: display_offset + clamped_duration,
                clamped_start,
                clamped_end,
            });
            display_offset += clamped_duration;
        }

        let timeline_duration = if infos.is_empty() {
            duration
        } else {
            display_offset
        };

        let mut snap_points = vec![0.0, timeline_duration];
        for info in &infos {
            snap_points.push(info.display_start);
            snap_points.push(info.display_end);
        }
        snap_points.sort_by(|a, b| a.total_cmp(b));
        snap_points.dedup();

        trace!(
            segments = infos.len(),
            duration,
            timeline_duration,
            "rebuilt display metrics"
        );

        Self {
            duration,
            timeline_duration,
            segments: infos,
            snap_points,
            snap,
        }
    }

    /// Raw duration of the source media.
    pub fn duration(&self) -> Seconds {
        self.duration
    }

    /// Length of the edited timeline as the user sees it.
    pub fn timeline_duration(&self) -> Seconds {
        self.timeline_duration
    }

    pub fn segments(&self) -> &[SegmentDisplayInfo] {
        &self.segments
    }

    pub fn segment(&self, id: &str) -> Option<&SegmentDisplayInfo> {
        self.segments.iter().find(|info| info.id == id)
    }

    pub fn snap_points(&self) -> &[Seconds] {
        &self.snap_points
    }

    pub fn snap_tolerance(&self) -> Seconds {
        (self.timeline_duration * self.snap.ratio).max(self.snap.floor)
    }

    /// Maps a source time onto the display axis.
    ///
    /// A time inside a cut region lands at the end of the closest visible
    /// segment before it, or at 0 when nothing precedes it.
    pub fn source_to_display_time(&self, source_time: Seconds) -> Seconds {
        let t = sanitize(source_time);
        if self.segments.is_empty() {
            return t.clamp(0.0, self.duration);
        }

        let mut fallback = 0.0;
        for info in &self.segments {
            if t >= info.clamped_start && t <= info.clamped_end {
                return info.display_start + (t - info.clamped_start);
            }
            if t > info.clamped_end {
                fallback = info.display_end;
            }
        }
        fallback
    }

    /// Maps a display time back onto the source axis.
    ///
    /// The first segment whose display range contains the time wins, so an
    /// exact boundary between two abutting segments resolves to the end of
    /// the earlier one.
    pub fn display_to_source_time(&self, display_time: Seconds) -> Seconds {
        let d = sanitize(display_time).max(0.0);
        let Some(last) = self.segments.last() else {
            return d.min(self.duration);
        };

        self.segments
            .iter()
            .find(|info| d >= info.display_start && d <= info.display_end)
            .map(|info| info.clamped_start + (d - info.display_start))
            .unwrap_or(last.clamped_end)
    }

    /// Returns the first snap point within tolerance of `display_time`, or
    /// the time itself when none is close enough.
    pub fn snapped_display_time(&self, display_time: Seconds) -> Seconds {
        let d = sanitize(display_time);
        let tolerance = self.snap_tolerance();
        self.snap_points
            .iter()
            .copied()
            .find(|point| (point - d).abs() <= tolerance)
            .unwrap_or(d)
    }

    /// `display_time` as a percentage of the timeline width; 0 on an empty timeline.
    pub fn display_percent(&self, display_time: Seconds) -> f64 {
        if self.timeline_duration <= 0.0 {
            return 0.0;
        }
        sanitize(display_time) / self.timeline_duration * 100.0
    }
}
