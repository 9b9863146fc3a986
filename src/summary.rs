//! Video-level aggregation over the dense frame sequence.

use std::collections::BTreeSet;

use crate::record::{FrameRecord, VideoSummary};

/// Flatten all detections across all frames into a [`VideoSummary`].
///
/// Does not mutate its input. `max_alert_level` defaults to 1 when there are
/// no detections at all.
pub fn summarize(frames: &[FrameRecord]) -> VideoSummary {
    let mut summary = VideoSummary::default();
    let mut tracks = BTreeSet::new();

    for record in frames {
        for detection in &record.detections {
            if detection.alert_level == 3 {
                summary.has_danger_alert = true;
            }
            summary.max_alert_level = summary.max_alert_level.max(detection.alert_level);
            if let Some(track_id) = detection.track_id {
                tracks.insert(track_id);
            }
            *summary
                .class_counts
                .entry(detection.label.clone())
                .or_insert(0) += 1;
        }
    }

    summary.unique_tracks = tracks.len();
    summary
}
