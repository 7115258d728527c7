use serde::{Deserialize, Serialize};
use timeline::{EffectTrack, Seconds, SnapTolerance};

use crate::{Result, RuntimeError};

/// UI-feel constants for the timeline runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Snap tolerance as a fraction of the display timeline length.
    pub snap_ratio: f64,
    /// Lower bound for the snap tolerance, in display seconds.
    pub snap_floor: Seconds,
    /// Horizontal travel in pixels that turns a click into a drag.
    pub drag_threshold_px: f64,
    pub max_waveform_bars: usize,
    pub zoom_min_duration: Seconds,
    pub speed_min_duration: Seconds,
    pub annotation_min_duration: Seconds,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let snap = SnapTolerance::default();
        Self {
            snap_ratio: snap.ratio,
            snap_floor: snap.floor,
            drag_threshold_px: 2.0,
            max_waveform_bars: 180,
            zoom_min_duration: EffectTrack::Zoom.default_min_duration(),
            speed_min_duration: EffectTrack::Speed.default_min_duration(),
            annotation_min_duration: EffectTrack::Annotation.default_min_duration(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("snap_ratio", self.snap_ratio),
            ("snap_floor", self.snap_floor),
            ("drag_threshold_px", self.drag_threshold_px),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(RuntimeError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        for track in EffectTrack::all() {
            let value = self.min_duration(track);
            if !value.is_finite() || value <= 0.0 {
                return Err(RuntimeError::InvalidConfig(format!(
                    "{track} minimum duration must be positive (got {value})"
                )));
            }
        }

        if self.max_waveform_bars == 0 {
            return Err(RuntimeError::InvalidConfig(
                "max_waveform_bars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn min_duration(&self, track: EffectTrack) -> Seconds {
        match track {
            EffectTrack::Zoom => self.zoom_min_duration,
            EffectTrack::Speed => self.speed_min_duration,
            EffectTrack::Annotation => self.annotation_min_duration,
        }
    }

    pub fn snap_tolerance(&self) -> SnapTolerance {
        SnapTolerance {
            ratio: self.snap_ratio,
            floor: self.snap_floor,
        }
    }
}
