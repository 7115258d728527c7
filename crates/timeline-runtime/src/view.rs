use serde::Serialize;
use timeline::{DisplayMetrics, RangedItem, RulerMarker, Seconds};

use crate::LocalOverride;

/// Measured bounds of the timeline container, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimelineGeometry {
    pub left: f64,
    pub width: f64,
}

impl TimelineGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }

    /// Fraction of the width under `client_x`, clamped to `[0, 1]`; 0 when
    /// the container has no width.
    pub fn fraction_at(&self, client_x: f64) -> f64 {
        if !self.is_measurable() || !client_x.is_finite() {
            return 0.0;
        }
        ((client_x - self.left) / self.width).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentBlock {
    pub id: String,
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBlock {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    pub left_percent: f64,
    pub width_percent: f64,
    pub dragging: bool,
}

/// Everything the presentation layer needs to draw one frame of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub timeline_duration: Seconds,
    pub playhead_percent: f64,
    pub ruler: Vec<RulerMarker>,
    pub segments: Vec<SegmentBlock>,
    pub zoom: Vec<ItemBlock>,
    pub speed: Vec<ItemBlock>,
    pub annotations: Vec<ItemBlock>,
}

pub fn segment_blocks(metrics: &DisplayMetrics) -> Vec<SegmentBlock> {
    metrics
        .segments()
        .iter()
        .map(|info| SegmentBlock {
            id: info.id.clone(),
            left_percent: metrics.display_percent(info.display_start),
            width_percent: metrics.display_percent(info.display_duration()),
        })
        .collect()
}

/// Lays items out on the display axis, substituting the in-flight range for
/// the item named by `local_override`.
pub fn item_blocks<T: RangedItem>(
    items: &[T],
    metrics: &DisplayMetrics,
    local_override: Option<&LocalOverride>,
) -> Vec<ItemBlock> {
    items
        .iter()
        .map(|item| {
            let active = local_override.filter(|o| o.id == item.id());
            let (start_time, end_time) = match active {
                Some(o) => (o.start_time, o.end_time),
                None => (item.start_time(), item.end_time()),
            };
            let display_start = metrics.source_to_display_time(start_time);
            let display_end = metrics.source_to_display_time(end_time);
            ItemBlock {
                id: item.id().to_string(),
                start_time,
                end_time,
                left_percent: metrics.display_percent(display_start),
                width_percent: metrics.display_percent((display_end - display_start).max(0.0)),
                dragging: active.is_some(),
            }
        })
        .collect()
}
