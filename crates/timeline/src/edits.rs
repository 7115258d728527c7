use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Seconds, TimelineError};

/// Mints an id for a freshly created segment or effect.
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A source-time region of the recording that survives cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Segment {
    pub fn new(start_time: Seconds, end_time: Seconds) -> Self {
        Self {
            id: new_item_id(),
            start_time,
            end_time,
            enabled: true,
        }
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.start_time > self.end_time {
            return Err(TimelineError::InvalidSegment {
                id: self.id.clone(),
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomEffect {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedEffect {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    pub speed: f64,
}

/// Box/text overlay drawn on top of the recording.
///
/// Position and size are normalized to the frame (0..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_annotation_color")]
    pub color: String,
    #[serde(default = "default_annotation_opacity")]
    pub opacity: f64,
    #[serde(default = "default_annotation_thickness")]
    pub thickness: u32,
    #[serde(default)]
    pub text: Option<String>,
}

fn default_annotation_color() -> String {
    "#FF3B30".to_string()
}

fn default_annotation_opacity() -> f64 {
    1.0
}

fn default_annotation_thickness() -> u32 {
    4
}

/// The edit list snapshot handed to the engine by the project store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDecisionList {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub zoom: Vec<ZoomEffect>,
    #[serde(default)]
    pub speed: Vec<SpeedEffect>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl EditDecisionList {
    /// An unedited timeline: one enabled segment spanning the whole recording.
    pub fn single_segment(duration: Seconds) -> Self {
        Self {
            segments: vec![Segment::new(0.0, duration)],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        self.segments.iter().try_for_each(Segment::validate)
    }
}

/// Committed start/end of a ranged item, in source time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: Seconds,
    pub end_time: Seconds,
}

impl TimeRange {
    pub fn new(start_time: Seconds, end_time: Seconds) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    pub fn duration(&self) -> Seconds {
        self.end_time - self.start_time
    }
}

/// Anything with an id and a source-time range that can be dragged on a track.
pub trait RangedItem {
    fn id(&self) -> &str;
    fn start_time(&self) -> Seconds;
    fn end_time(&self) -> Seconds;

    fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time(), self.end_time())
    }
}

macro_rules! impl_ranged_item {
    ($($ty:ty),*) => {
        $(
            impl RangedItem for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
                fn start_time(&self) -> Seconds {
                    self.start_time
                }
                fn end_time(&self) -> Seconds {
                    self.end_time
                }
            }
        )*
    };
}

impl_ranged_item!(ZoomEffect, SpeedEffect, Annotation);

pub fn find_item<'a, T: RangedItem>(items: &'a [T], id: &str) -> Result<&'a T, TimelineError> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| TimelineError::ItemNotFound(id.to_string()))
}

/// The three effect tracks that support range dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTrack {
    Zoom,
    Speed,
    Annotation,
}

impl EffectTrack {
    pub fn default_min_duration(&self) -> Seconds {
        match self {
            Self::Zoom | Self::Speed => 0.5,
            Self::Annotation => 0.1,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Zoom, Self::Speed, Self::Annotation]
    }
}

impl fmt::Display for EffectTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zoom => "zoom",
            Self::Speed => "speed",
            Self::Annotation => "annotation",
        };
        f.write_str(name)
    }
}
