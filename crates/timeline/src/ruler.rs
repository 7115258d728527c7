use serde::{Deserialize, Serialize};

use crate::{sanitize, DisplayMetrics, Seconds};

/// A labelled tick on the timeline ruler, in display time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulerMarker {
    pub time: Seconds,
    pub position_percent: f64,
    pub label: String,
}

/// Tick spacing for a timeline of the given display length.
pub fn ruler_interval(timeline_duration: Seconds) -> Seconds {
    if timeline_duration <= 60.0 {
        10.0
    } else if timeline_duration <= 300.0 {
        30.0
    } else {
        60.0
    }
}

/// Formats display seconds as `mm:ss`, truncating fractional seconds.
pub fn format_clock(time: Seconds) -> String {
    let total = sanitize(time).max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl DisplayMetrics {
    pub fn ruler_markers(&self) -> Vec<RulerMarker> {
        let timeline_duration = self.timeline_duration();
        let interval = ruler_interval(timeline_duration);

        let mut markers = Vec::new();
        let mut index = 0u32;
        loop {
            let time = index as f64 * interval;
            if time > timeline_duration {
                break;
            }
            markers.push(RulerMarker {
                time,
                position_percent: self.display_percent(time),
                label: format_clock(time),
            });
            index += 1;
        }
        markers
    }
}
