//! Re-bases per-chunk timepoints into the coordinate space of the full job:
//! mark names encode rune offsets within the chunk and must be shifted by
//! the chunk's starting rune offset, while timestamps must be shifted by
//! the cumulative duration of every chunk synthesized before it.

use super::Timepoint;

/// Shift every timepoint's mark name by `char_offset` runes and its
/// timestamp by `time_offset` seconds.
///
/// A mark name must be exactly `"idx:start:end"` with all three parts
/// parsing as integers; any entry that doesn't match is dropped rather than
/// causing the whole chunk to fail, since a synthesizer emitting an
/// unexpected mark shape shouldn't take down the rest of the timeline.
pub fn adjust(timepoints: &[Timepoint], char_offset: usize, time_offset: f64) -> Vec<Timepoint> {
    timepoints
        .iter()
        .filter_map(|tp| {
            let parts: Vec<&str> = tp.mark_name.split(':').collect();
            if parts.len() != 3 {
                return None;
            }

            let idx: i64 = parts[0].parse().ok()?;
            let start: i64 = parts[1].parse().ok()?;
            let end: i64 = parts[2].parse().ok()?;

            Some(Timepoint {
                mark_name: format!(
                    "{}:{}:{}",
                    idx,
                    start + char_offset as i64,
                    end + char_offset as i64
                ),
                time_seconds: tp.time_seconds + time_offset,
            })
        })
        .collect()
}
