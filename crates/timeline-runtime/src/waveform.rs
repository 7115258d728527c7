use timeline::{sanitize, DisplayMetrics};

/// Resamples a source-time amplitude array onto the display axis.
///
/// `raw` is sampled uniformly across the whole source duration. Each bar is
/// placed at the centre of an equal display-time slot, mapped back to source
/// time and filled with the nearest raw sample, so waveforms compress and
/// stretch around cuts the same way the video does. Amplitudes are clamped to
/// `[0, 1]`.
pub fn resample_waveform(raw: &[f32], metrics: &DisplayMetrics, max_bars: usize) -> Vec<f32> {
    let duration = metrics.duration();
    let timeline_duration = metrics.timeline_duration();
    if raw.is_empty() || max_bars == 0 || duration <= 0.0 || timeline_duration <= 0.0 {
        return Vec::new();
    }

    let bars = raw.len().min(max_bars);
    let last_index = (raw.len() - 1) as f64;

    (0..bars)
        .map(|bar| {
            let display_time = (bar as f64 + 0.5) / bars as f64 * timeline_duration;
            let source_time = metrics.display_to_source_time(display_time);
            let index = (source_time / duration * last_index)
                .round()
                .clamp(0.0, last_index) as usize;
            sanitize(raw[index] as f64).clamp(0.0, 1.0) as f32
        })
        .collect()
}
