use timeline::{DisplayMetrics, EditDecisionList, EffectTrack, Seconds};
use tracing::{debug, trace};

use crate::{
    item_blocks, resample_waveform, segment_blocks, DragMode, DragRelease, RangeDragController,
    Result, RuntimeConfig, TimelineGeometry, TimelineHost, TimelineView,
};

/// Composes the display metrics with one drag controller per effect track,
/// plus scrubbing, playhead and waveform concerns.
///
/// The edit list is a read-only snapshot; changes arrive through
/// [`set_snapshot`](Self::set_snapshot) after the host has applied a commit.
#[derive(Debug, Clone)]
pub struct TimelineRuntime {
    config: RuntimeConfig,
    edits: EditDecisionList,
    metrics: DisplayMetrics,
    current_time: Seconds,
    geometry: TimelineGeometry,
    zoom: RangeDragController,
    speed: RangeDragController,
    annotation: RangeDragController,
    scrubbing: bool,
}

impl TimelineRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        let controller = |track| {
            RangeDragController::new(track, config.min_duration(track), config.drag_threshold_px)
        };
        Self {
            zoom: controller(EffectTrack::Zoom),
            speed: controller(EffectTrack::Speed),
            annotation: controller(EffectTrack::Annotation),
            metrics: DisplayMetrics::with_snap(&[], 0.0, config.snap_tolerance()),
            edits: EditDecisionList::default(),
            current_time: 0.0,
            geometry: TimelineGeometry::default(),
            scrubbing: false,
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn edits(&self) -> &EditDecisionList {
        &self.edits
    }

    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn controller(&self, track: EffectTrack) -> &RangeDragController {
        match track {
            EffectTrack::Zoom => &self.zoom,
            EffectTrack::Speed => &self.speed,
            EffectTrack::Annotation => &self.annotation,
        }
    }

    fn controller_mut(&mut self, track: EffectTrack) -> &mut RangeDragController {
        match track {
            EffectTrack::Zoom => &mut self.zoom,
            EffectTrack::Speed => &mut self.speed,
            EffectTrack::Annotation => &mut self.annotation,
        }
    }

    /// Replaces the edit list snapshot and re-derives the display metrics.
    pub fn set_snapshot(&mut self, edits: EditDecisionList, duration: Seconds) {
        self.metrics =
            DisplayMetrics::with_snap(&edits.segments, duration, self.config.snap_tolerance());
        self.edits = edits;
        debug!(
            duration = self.metrics.duration(),
            timeline_duration = self.metrics.timeline_duration(),
            "timeline snapshot updated"
        );
    }

    /// Parses a snapshot serialized by the project store.
    pub fn load_snapshot_json(&mut self, json: &str, duration: Seconds) -> Result<()> {
        let edits: EditDecisionList = serde_json::from_str(json)?;
        edits.validate()?;
        self.set_snapshot(edits, duration);
        Ok(())
    }

    pub fn set_current_time(&mut self, current_time: Seconds) {
        self.current_time = current_time;
    }

    pub fn set_geometry(&mut self, geometry: TimelineGeometry) {
        self.geometry = geometry;
    }

    pub fn playhead_percent(&self) -> f64 {
        let display_time = self.metrics.source_to_display_time(self.current_time);
        self.metrics.display_percent(display_time)
    }

    /// Source time under a client x position, after snapping on the display axis.
    pub fn source_time_at(&self, client_x: f64) -> Seconds {
        let display_time = self.geometry.fraction_at(client_x) * self.metrics.timeline_duration();
        self.metrics
            .display_to_source_time(self.metrics.snapped_display_time(display_time))
    }

    /// Click on empty timeline: seek there and deselect everything. An
    /// unmeasured container resolves every click to the start.
    pub fn seek_by_click(&self, client_x: f64, host: &mut dyn TimelineHost) {
        if !self.geometry.is_measurable() {
            debug!("timeline has no width, seeking to the start");
        }
        let source_time = self.source_time_at(client_x);
        trace!(client_x, source_time, "seek");
        host.seek(source_time);
        host.clear_selection();
    }

    pub fn timeline_pointer_down(&mut self, client_x: f64, host: &mut dyn TimelineHost) {
        self.scrubbing = true;
        self.seek_by_click(client_x, host);
    }

    /// Scrubs while the primary button stays down.
    pub fn timeline_pointer_move(
        &mut self,
        client_x: f64,
        primary_held: bool,
        host: &mut dyn TimelineHost,
    ) {
        if !self.scrubbing {
            return;
        }
        if !primary_held {
            self.scrubbing = false;
            return;
        }
        self.seek_by_click(client_x, host);
    }

    pub fn timeline_pointer_up(&mut self) {
        self.scrubbing = false;
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Press on an effect's body or edge handle. Returns whether a gesture started.
    pub fn item_pointer_down(
        &mut self,
        track: EffectTrack,
        id: &str,
        mode: DragMode,
        client_x: f64,
    ) -> bool {
        match track {
            EffectTrack::Zoom => self.zoom.pointer_down(&self.edits.zoom, id, mode, client_x),
            EffectTrack::Speed => self.speed.pointer_down(&self.edits.speed, id, mode, client_x),
            EffectTrack::Annotation => {
                self.annotation
                    .pointer_down(&self.edits.annotations, id, mode, client_x)
            }
        }
    }

    pub fn item_pointer_move(&mut self, track: EffectTrack, client_x: f64) {
        self.controller_mut(track).pointer_move(client_x);
    }

    /// Processes at most one coalesced pointer move per track. Returns true
    /// if any preview changed and the view should be redrawn.
    pub fn on_animation_frame(&mut self) -> bool {
        let width = self.geometry.width;
        let zoom = self.zoom.flush(&self.edits.zoom, &self.metrics, width);
        let speed = self.speed.flush(&self.edits.speed, &self.metrics, width);
        let annotation = self
            .annotation
            .flush(&self.edits.annotations, &self.metrics, width);
        zoom || speed || annotation
    }

    /// Ends a gesture on `track`, dispatching the commit or the click.
    pub fn item_pointer_up(&mut self, track: EffectTrack, host: &mut dyn TimelineHost) {
        let width = self.geometry.width;
        let release = match track {
            EffectTrack::Zoom => self.zoom.pointer_up(&self.edits.zoom, &self.metrics, width),
            EffectTrack::Speed => self.speed.pointer_up(&self.edits.speed, &self.metrics, width),
            EffectTrack::Annotation => {
                self.annotation
                    .pointer_up(&self.edits.annotations, &self.metrics, width)
            }
        };

        match release {
            Some(DragRelease::Commit { id, range }) => host.update_effect(track, &id, range),
            Some(DragRelease::Click { id }) => {
                host.dragged_selection_reset();
                host.select_effect(track, Some(&id));
            }
            None => {}
        }
    }

    pub fn waveform(&self, raw: &[f32]) -> Vec<f32> {
        resample_waveform(raw, &self.metrics, self.config.max_waveform_bars)
    }

    pub fn view(&self) -> TimelineView {
        TimelineView {
            timeline_duration: self.metrics.timeline_duration(),
            playhead_percent: self.playhead_percent(),
            ruler: self.metrics.ruler_markers(),
            segments: segment_blocks(&self.metrics),
            zoom: item_blocks(&self.edits.zoom, &self.metrics, self.zoom.local_override()),
            speed: item_blocks(&self.edits.speed, &self.metrics, self.speed.local_override()),
            annotations: item_blocks(
                &self.edits.annotations,
                &self.metrics,
                self.annotation.local_override(),
            ),
        }
    }

    /// Drops every open gesture and pending frame without committing.
    pub fn teardown(&mut self) {
        for track in EffectTrack::all() {
            self.controller_mut(track).cancel();
        }
        self.scrubbing = false;
    }
}

impl Default for TimelineRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
