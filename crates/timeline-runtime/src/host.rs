use timeline::{EffectTrack, Seconds, TimeRange};

/// Outbound side of the runtime: everything the surrounding application
/// does in response to timeline input.
///
/// The runtime never mutates the edit list itself. Commits and selections go
/// through these callbacks and come back as a fresh snapshot.
pub trait TimelineHost {
    fn seek(&mut self, source_time: Seconds);

    fn select_segment(&mut self, id: Option<&str>);

    fn select_effect(&mut self, track: EffectTrack, id: Option<&str>);

    /// Commit of a finished move/resize gesture.
    fn update_effect(&mut self, track: EffectTrack, id: &str, range: TimeRange);

    /// A press on an effect that never turned into a drag.
    fn dragged_selection_reset(&mut self);

    fn clear_selection(&mut self) {
        self.select_segment(None);
        for track in EffectTrack::all() {
            self.select_effect(track, None);
        }
    }
}
