use serde::{Deserialize, Serialize};
use timeline::{find_item, sanitize, DisplayMetrics, EffectTrack, RangedItem, Seconds, TimeRange};
use tracing::{debug, trace};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// Whether the pointer has travelled far enough to count as a drag.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GestureKind {
    #[default]
    Click,
    Drag,
}

#[derive(Clone, Debug)]
pub struct DragSession {
    pub item_id: String,
    pub mode: DragMode,
    pub pointer_origin_x: f64,
    pub original_start_time: Seconds,
    pub original_end_time: Seconds,
    pub gesture: GestureKind,
}

impl DragSession {
    pub fn original_range(&self) -> TimeRange {
        TimeRange::new(self.original_start_time, self.original_end_time)
    }
}

/// Uncommitted candidate range shown while a gesture is in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalOverride {
    pub id: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
}

impl LocalOverride {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// How a finished gesture resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum DragRelease {
    Commit { id: String, range: TimeRange },
    Click { id: String },
}

/// Candidate source range for an item dragged by `delta_display` seconds on
/// the display axis.
pub fn drag_range(
    mode: DragMode,
    original: TimeRange,
    delta_display: Seconds,
    metrics: &DisplayMetrics,
    min_duration: Seconds,
) -> TimeRange {
    let duration = metrics.duration();
    let timeline_duration = metrics.timeline_duration();
    let delta = sanitize(delta_display);
    let original = TimeRange::new(sanitize(original.start_time), sanitize(original.end_time));

    match mode {
        DragMode::Move => {
            let display_start = (metrics.source_to_display_time(original.start_time) + delta)
                .clamp(0.0, timeline_duration);
            let mut start =
                metrics.display_to_source_time(metrics.snapped_display_time(display_start));
            let length = original.duration();
            let mut end = start + length;
            if end > duration {
                end = duration;
                start = (end - length).max(0.0);
            }
            TimeRange::new(start, end)
        }
        DragMode::ResizeStart => {
            let display_start =
                (metrics.source_to_display_time(original.start_time) + delta).max(0.0);
            let mut start =
                metrics.display_to_source_time(metrics.snapped_display_time(display_start));
            let end = original.end_time;
            if end - start < min_duration {
                start = end - min_duration;
            }
            TimeRange::new(start.max(0.0), end)
        }
        DragMode::ResizeEnd => {
            let display_end = (metrics.source_to_display_time(original.end_time) + delta)
                .min(timeline_duration);
            let mut end = metrics.display_to_source_time(metrics.snapped_display_time(display_end));
            let start = original.start_time;
            if end - start < min_duration {
                end = start + min_duration;
            }
            TimeRange::new(start, end.min(duration))
        }
    }
}

/// Move/resize gestures for one effect track.
///
/// Pointer moves are coalesced: only the newest position is kept until the
/// next [`flush`](Self::flush), which stands in for the animation frame.
#[derive(Debug, Clone)]
pub struct RangeDragController {
    track: EffectTrack,
    min_duration: Seconds,
    drag_threshold_px: f64,
    session: Option<DragSession>,
    local_override: Option<LocalOverride>,
    pending_x: Option<f64>,
}

impl RangeDragController {
    pub fn new(track: EffectTrack, min_duration: Seconds, drag_threshold_px: f64) -> Self {
        Self {
            track,
            min_duration,
            drag_threshold_px,
            session: None,
            local_override: None,
            pending_x: None,
        }
    }

    pub fn track(&self) -> EffectTrack {
        self.track
    }

    pub fn min_duration(&self) -> Seconds {
        self.min_duration
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn local_override(&self) -> Option<&LocalOverride> {
        self.local_override.as_ref()
    }

    pub fn has_pending_move(&self) -> bool {
        self.pending_x.is_some()
    }

    /// Starts a gesture on `id`. Returns false when the item does not exist
    /// or another gesture is already open.
    pub fn pointer_down<T: RangedItem>(
        &mut self,
        items: &[T],
        id: &str,
        mode: DragMode,
        pointer_x: f64,
    ) -> bool {
        if self.session.is_some() {
            debug!(track = %self.track, id, "ignoring pointer down during open gesture");
            return false;
        }
        let item = match find_item(items, id) {
            Ok(item) => item,
            Err(err) => {
                debug!(track = %self.track, %err, "ignoring pointer down");
                return false;
            }
        };

        let range = item.range();
        self.session = Some(DragSession {
            item_id: id.to_string(),
            mode,
            pointer_origin_x: sanitize(pointer_x),
            original_start_time: range.start_time,
            original_end_time: range.end_time,
            gesture: GestureKind::Click,
        });
        self.local_override = Some(LocalOverride {
            id: id.to_string(),
            start_time: range.start_time,
            end_time: range.end_time,
        });
        self.pending_x = None;
        debug!(track = %self.track, id, ?mode, "drag started");
        true
    }

    /// Records the newest pointer position, replacing any move that has not
    /// been flushed yet. Crossing the drag threshold is sticky and is noted
    /// immediately, even if the move itself is later coalesced away.
    pub fn pointer_move(&mut self, pointer_x: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pointer_x = sanitize(pointer_x);
        if session.gesture == GestureKind::Click
            && (pointer_x - session.pointer_origin_x).abs() > self.drag_threshold_px
        {
            trace!(track = %self.track, id = %session.item_id, "pointer crossed drag threshold");
            session.gesture = GestureKind::Drag;
        }
        if self.pending_x.replace(pointer_x).is_some() {
            trace!(track = %self.track, "coalesced pointer move");
        }
    }

    /// Recomputes the candidate range from the pending pointer move, if any.
    /// Returns true when the local override changed.
    pub fn flush<T: RangedItem>(
        &mut self,
        items: &[T],
        metrics: &DisplayMetrics,
        timeline_width_px: f64,
    ) -> bool {
        let Some(pointer_x) = self.pending_x.take() else {
            return false;
        };
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if find_item(items, &session.item_id).is_err() {
            debug!(
                track = %self.track,
                id = %session.item_id,
                "dragged item vanished, dropping gesture"
            );
            self.session = None;
            self.local_override = None;
            return false;
        }
        if !timeline_width_px.is_finite() || timeline_width_px <= 0.0 {
            debug!(track = %self.track, "timeline has no width, ignoring move");
            return false;
        }

        let delta_px = pointer_x - session.pointer_origin_x;
        let delta_display = delta_px / timeline_width_px * metrics.timeline_duration();
        let range = drag_range(
            session.mode,
            session.original_range(),
            delta_display,
            metrics,
            self.min_duration,
        );

        let next = LocalOverride {
            id: session.item_id.clone(),
            start_time: range.start_time,
            end_time: range.end_time,
        };
        if self.local_override.as_ref() == Some(&next) {
            return false;
        }
        trace!(track = %self.track, start = next.start_time, end = next.end_time, "drag preview");
        self.local_override = Some(next);
        true
    }

    /// Ends the gesture, flushing a still-pending move first.
    pub fn pointer_up<T: RangedItem>(
        &mut self,
        items: &[T],
        metrics: &DisplayMetrics,
        timeline_width_px: f64,
    ) -> Option<DragRelease> {
        self.flush(items, metrics, timeline_width_px);
        let session = self.session.take()?;
        let local_override = self.local_override.take();

        if find_item(items, &session.item_id).is_err() {
            debug!(track = %self.track, id = %session.item_id, "item vanished before release");
            return None;
        }
        if session.gesture == GestureKind::Click {
            debug!(track = %self.track, id = %session.item_id, "gesture classified as click");
            return Some(DragRelease::Click {
                id: session.item_id,
            });
        }

        let local_override = local_override?;
        debug!(
            track = %self.track,
            id = %local_override.id,
            start = local_override.start_time,
            end = local_override.end_time,
            "drag committed"
        );
        Some(DragRelease::Commit {
            range: local_override.range(),
            id: local_override.id,
        })
    }

    /// Drops the gesture and any pending move without committing.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            debug!(track = %self.track, "drag cancelled");
        }
        self.local_override = None;
        self.pending_x = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline::{Annotation, Segment, SpeedEffect, ZoomEffect};

    const EPS: f64 = 1e-9;
    const WIDTH: f64 = 1000.0;

    fn metrics(segments: &[(f64, f64)], duration: f64) -> DisplayMetrics {
        let segments: Vec<Segment> = segments
            .iter()
            .enumerate()
            .map(|(i, (start, end))| Segment {
                id: format!("s{i}"),
                start_time: *start,
                end_time: *end,
                enabled: true,
            })
            .collect();
        DisplayMetrics::new(&segments, duration)
    }

    fn zoom(id: &str, start: f64, end: f64) -> ZoomEffect {
        ZoomEffect {
            id: id.to_string(),
            start_time: start,
            end_time: end,
            scale: 2.0,
            x: 0.5,
            y: 0.5,
        }
    }

    fn annotation(id: &str, start: f64, end: f64) -> Annotation {
        Annotation {
            id: id.to_string(),
            start_time: start,
            end_time: end,
            x: 0.1,
            y: 0.1,
            width: 0.2,
            height: 0.2,
            color: "#FFFFFF".to_string(),
            opacity: 1.0,
            thickness: 2,
            text: None,
        }
    }

    #[test]
    fn move_preserves_length() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::Move, TimeRange::new(4.0, 6.0), 3.0, &m, 0.5);
        assert!((range.start_time - 7.0).abs() < EPS);
        assert!((range.end_time - 9.0).abs() < EPS);
    }

    #[test]
    fn move_slides_back_from_the_end_of_the_media() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::Move, TimeRange::new(20.0, 25.0), 8.0, &m, 0.5);
        assert_eq!(range.end_time, 30.0);
        assert!((range.start_time - 25.0).abs() < EPS);
    }

    #[test]
    fn move_clamps_at_the_origin() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::Move, TimeRange::new(2.0, 4.0), -10.0, &m, 0.5);
        assert_eq!(range, TimeRange::new(0.0, 2.0));
    }

    #[test]
    fn move_across_a_cut_lands_in_the_next_segment() {
        let m = metrics(&[(0.0, 10.0), (20.0, 25.0)], 30.0);
        // display 8 + 3.5 = 11.5 -> source 21.5
        let range = drag_range(DragMode::Move, TimeRange::new(8.0, 9.0), 3.5, &m, 0.5);
        assert!((range.start_time - 21.5).abs() < EPS);
        assert!((range.end_time - 22.5).abs() < EPS);
    }

    #[test]
    fn resize_start_snaps_to_segment_boundary() {
        let m = metrics(&[(0.0, 10.0), (20.0, 25.0)], 30.0);
        // item at source 22..24 (display 12..14); pull start to display 10.1
        let range = drag_range(DragMode::ResizeStart, TimeRange::new(22.0, 24.0), -1.9, &m, 0.5);
        // display 10 resolves to the end of the first segment
        assert_eq!(range.start_time, 10.0);
        assert_eq!(range.end_time, 24.0);
    }

    #[test]
    fn resize_start_pins_to_min_duration() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::ResizeStart, TimeRange::new(4.0, 6.0), 1.9, &m, 0.5);
        assert!((range.duration() - 0.5).abs() < EPS);
        assert_eq!(range.end_time, 6.0);
    }

    #[test]
    fn resize_start_never_goes_negative() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::ResizeStart, TimeRange::new(0.2, 0.4), 0.0, &m, 0.5);
        assert_eq!(range.start_time, 0.0);
    }

    #[test]
    fn resize_end_pins_annotation_to_min_duration() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::ResizeEnd, TimeRange::new(5.0, 6.0), -0.96, &m, 0.1);
        assert_eq!(range.start_time, 5.0);
        assert!((range.duration() - 0.1).abs() < EPS);
    }

    #[test]
    fn resize_end_is_capped_by_media_duration() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let range = drag_range(DragMode::ResizeEnd, TimeRange::new(20.0, 25.0), 50.0, &m, 0.5);
        assert_eq!(range.end_time, 30.0);
    }

    #[test]
    fn small_movement_is_a_click() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        assert!(controller.pointer_down(&items, "z", DragMode::Move, 100.0));
        controller.pointer_move(102.0);
        let release = controller.pointer_up(&items, &m, WIDTH);

        assert_eq!(release, Some(DragRelease::Click { id: "z".into() }));
        assert!(!controller.is_dragging());
        assert!(controller.local_override().is_none());
    }

    #[test]
    fn drag_commits_the_override() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        controller.pointer_down(&items, "z", DragMode::Move, 100.0);
        controller.pointer_move(200.0);
        assert!(controller.flush(&items, &m, WIDTH));
        let preview = controller.local_override().unwrap().range();
        assert!((preview.start_time - 7.0).abs() < EPS);

        match controller.pointer_up(&items, &m, WIDTH) {
            Some(DragRelease::Commit { id, range }) => {
                assert_eq!(id, "z");
                assert!((range.start_time - 7.0).abs() < EPS);
                assert!((range.end_time - 9.0).abs() < EPS);
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn drag_back_to_origin_still_commits() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        controller.pointer_down(&items, "z", DragMode::Move, 100.0);
        controller.pointer_move(150.0);
        controller.flush(&items, &m, WIDTH);
        controller.pointer_move(100.0);
        let release = controller.pointer_up(&items, &m, WIDTH);
        assert!(matches!(release, Some(DragRelease::Commit { .. })));
    }

    #[test]
    fn pending_moves_are_replaced_not_queued() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        controller.pointer_down(&items, "z", DragMode::Move, 0.0);
        controller.pointer_move(50.0);
        controller.pointer_move(400.0);
        controller.pointer_move(100.0);
        assert!(controller.has_pending_move());
        assert!(controller.flush(&items, &m, WIDTH));
        assert!(!controller.flush(&items, &m, WIDTH));

        let preview = controller.local_override().unwrap();
        assert!((preview.start_time - 7.0).abs() < EPS);
    }

    #[test]
    fn zero_width_leaves_state_untouched() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![annotation("a", 1.0, 2.0)];
        let mut controller = RangeDragController::new(EffectTrack::Annotation, 0.1, 2.0);

        controller.pointer_down(&items, "a", DragMode::ResizeEnd, 10.0);
        controller.pointer_move(300.0);
        assert!(!controller.flush(&items, &m, 0.0));
        assert!(controller.is_dragging());
        assert_eq!(controller.local_override().unwrap().range(), TimeRange::new(1.0, 2.0));
        assert_eq!(
            controller.pointer_up(&items, &m, 0.0),
            Some(DragRelease::Commit {
                id: "a".into(),
                range: TimeRange::new(1.0, 2.0),
            })
        );
    }

    #[test]
    fn travel_within_one_frame_still_counts_as_drag() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        controller.pointer_down(&items, "z", DragMode::Move, 200.0);
        controller.pointer_move(400.0);
        controller.pointer_move(200.0);
        assert_eq!(controller.session().map(|s| s.gesture), Some(GestureKind::Drag));

        assert_eq!(
            controller.pointer_up(&items, &m, WIDTH),
            Some(DragRelease::Commit {
                id: "z".into(),
                range: TimeRange::new(4.0, 6.0),
            })
        );
    }

    #[test]
    fn click_on_vanished_item_is_silent() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);

        controller.pointer_down(&items, "z", DragMode::Move, 100.0);
        let remaining: Vec<ZoomEffect> = Vec::new();
        assert_eq!(controller.pointer_up(&remaining, &m, WIDTH), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn vanished_item_drops_the_gesture() {
        let m = metrics(&[(0.0, 30.0)], 30.0);
        let items = vec![SpeedEffect {
            id: "sp".into(),
            start_time: 1.0,
            end_time: 3.0,
            speed: 2.0,
        }];
        let mut controller = RangeDragController::new(EffectTrack::Speed, 0.5, 2.0);

        controller.pointer_down(&items, "sp", DragMode::Move, 0.0);
        controller.pointer_move(500.0);
        let remaining: Vec<SpeedEffect> = Vec::new();
        assert!(!controller.flush(&remaining, &m, WIDTH));
        assert!(!controller.is_dragging());
        assert_eq!(controller.pointer_up(&remaining, &m, WIDTH), None);
    }

    #[test]
    fn pointer_down_on_unknown_item_is_ignored() {
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);
        assert!(!controller.pointer_down(&items, "missing", DragMode::Move, 0.0));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn cancel_discards_everything() {
        let items = vec![zoom("z", 4.0, 6.0)];
        let mut controller = RangeDragController::new(EffectTrack::Zoom, 0.5, 2.0);
        controller.pointer_down(&items, "z", DragMode::ResizeStart, 0.0);
        controller.pointer_move(40.0);
        controller.cancel();
        assert!(!controller.is_dragging());
        assert!(!controller.has_pending_move());
        assert!(controller.local_override().is_none());
    }
}
