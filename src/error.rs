use thiserror::Error;

/// Invariant violations and fatal per-video failures.
///
/// Recoverable conditions (empty detector output, segmenter unavailability,
/// mask dimension mismatches) are not represented here; they degrade locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Frames must be fed in strictly increasing index order; smoothing and
    /// expiry state depends on it.
    #[error("frame index {frame} is not after previously processed frame {last}")]
    NonMonotonicFrame { frame: u64, last: u64 },

    /// Frame dimensions changed mid-video. Fatal for the video: the run is
    /// invalidated rather than producing an ambiguous partial result.
    #[error("frame dimensions {got_width}x{got_height} do not match video dimensions {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}
