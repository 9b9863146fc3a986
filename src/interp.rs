//! Temporal densification of the sparse sampled-frame sequence.
//!
//! The detector only runs on every Nth frame. [`densify`] reconstructs a
//! record for every frame of the video from the sampled ones: tracked
//! objects are linearly interpolated between their sampled appearances and
//! held at the edges of their visibility window; untracked detections are
//! carried only near the frame that produced them.
//!
//! The function is pure: same sparse input, same dense output.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::record::{Detection, FrameRecord};

/// How skipped frames are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensifyMode {
    /// Emit only the sampled frames; no reconstruction. Identity on the
    /// sparse sequence.
    #[default]
    Hold,
    /// Reconstruct every frame by per-track interpolation and holding.
    Interpolated,
}

/// Produce the dense per-frame sequence from the sampled records.
///
/// `frame_step` is the sampling stride that produced `sparse`; `max_age`
/// bounds how long a track is held past its last sampled appearance
/// (consistent with track expiry). Frame timestamps are stamped from `fps`
/// on every emitted record.
pub fn densify(
    sparse: &[FrameRecord],
    total_frames: u64,
    frame_step: u32,
    max_age: u32,
    fps: f64,
    mode: DensifyMode,
) -> Vec<FrameRecord> {
    match mode {
        DensifyMode::Hold => sparse
            .iter()
            .map(|record| {
                let mut record = record.clone();
                record.time = frame_time(record.frame, fps);
                record
            })
            .collect(),
        DensifyMode::Interpolated => interpolate(sparse, total_frames, frame_step, max_age, fps),
    }
}

fn frame_time(frame: u64, fps: f64) -> f64 {
    if fps > 0.0 { frame as f64 / fps } else { 0.0 }
}

fn interpolate(
    sparse: &[FrameRecord],
    total_frames: u64,
    frame_step: u32,
    max_age: u32,
    fps: f64,
) -> Vec<FrameRecord> {
    let sampled: BTreeMap<u64, &FrameRecord> =
        sparse.iter().map(|record| (record.frame, record)).collect();

    // Sampled appearances per track, in track-id order for deterministic
    // output ordering.
    let mut by_track: BTreeMap<u64, BTreeMap<u64, &Detection>> = BTreeMap::new();
    for record in sparse {
        for detection in &record.detections {
            if let Some(track_id) = detection.track_id {
                by_track
                    .entry(track_id)
                    .or_default()
                    .insert(record.frame, detection);
            }
        }
    }

    let mut dense = Vec::with_capacity(total_frames as usize);
    for frame in 0..total_frames {
        if let Some(record) = sampled.get(&frame) {
            let mut record = (*record).clone();
            record.time = frame_time(frame, fps);
            dense.push(record);
            continue;
        }

        let mut detections = Vec::new();
        for appearances in by_track.values() {
            if let Some(detection) = reconstruct(appearances, frame, max_age) {
                detections.push(detection);
            }
        }

        // Untracked detections only live near their originating sample.
        if let Some((&sample_frame, record)) = sampled.range(..=frame).next_back() {
            if frame - sample_frame <= frame_step as u64 {
                for detection in &record.detections {
                    if detection.track_id.is_none() {
                        detections.push(detection.clone());
                    }
                }
            }
        }

        let mut record = FrameRecord::new(frame, detections);
        record.time = frame_time(frame, fps);
        dense.push(record);
    }
    dense
}

/// Reconstruct one track's detection for an unsampled frame, if the frame
/// falls inside the track's visibility window.
fn reconstruct(
    appearances: &BTreeMap<u64, &Detection>,
    frame: u64,
    max_age: u32,
) -> Option<Detection> {
    let first = *appearances.keys().next()?;
    let last = *appearances.keys().next_back()?;

    // Not yet appeared, or gone for longer than the expiry window.
    if frame < first || frame > last + max_age as u64 {
        return None;
    }

    let prev = appearances.range(..=frame).next_back();
    let next = appearances.range(frame + 1..).next();

    match (prev, next) {
        (Some((&prev_frame, prev_det)), Some((&next_frame, next_det))) => {
            let ratio = (frame - prev_frame) as f32 / (next_frame - prev_frame) as f32;
            let mut detection = (*prev_det).clone();
            detection.bbox = prev_det.bbox.lerp(&next_det.bbox, ratio);
            Some(detection)
        }
        (Some((_, prev_det)), None) => Some((*prev_det).clone()),
        (None, Some((_, next_det))) => Some((*next_det).clone()),
        (None, None) => None,
    }
}
