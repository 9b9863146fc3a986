//! Output data model: finalized detections, frame records and video-level
//! summaries, serialized with the camelCase field names downstream consumers
//! expect.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::overlay::OverlayImage;
use crate::risk::{AlertLevel, RiskAssessment};
use crate::tracker::PercentBox;

/// Label of the synthetic detection emitted when the detector finds nothing.
pub const ANOMALY_LABEL: &str = "Anomalie";

/// Assumed real-world span of the image height for the distance figure in
/// position strings.
const DISTANCE_SPAN_METERS: f32 = 30.0;

/// One finalized detection within a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// `track_{n}` when tracked, `frame_{f}_{i}` otherwise.
    pub id: String,
    pub track_id: Option<u64>,
    pub label: String,
    pub confidence: f32,
    pub risk_level: &'static str,
    pub alert_level: u8,
    pub alert_type: &'static str,
    pub size_meters: f32,
    pub size_cm: f32,
    /// Human-readable zone/distance string, e.g. `Zone B3 · 12.5 m from threshold`.
    pub position: String,
    /// Smoothed box as percentages of image dimensions.
    pub bbox: PercentBox,
    pub has_segmentation: bool,
    /// Overlay buffer for renderers; not part of the serialized record.
    #[serde(skip)]
    pub overlay: Option<OverlayImage>,
    pub is_anomaly: bool,
}

impl Detection {
    /// Detection carrying a risk assessment, as produced by the track
    /// manager.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assessed(
        id: String,
        track_id: Option<u64>,
        label: String,
        confidence: f32,
        assessment: RiskAssessment,
        position: String,
        bbox: PercentBox,
        overlay: Option<OverlayImage>,
    ) -> Self {
        Self {
            id,
            track_id,
            label,
            confidence,
            risk_level: assessment.level.risk_label(),
            alert_level: assessment.level.level(),
            alert_type: assessment.level.alert_type(),
            size_meters: assessment.size_meters,
            size_cm: assessment.size_cm,
            position,
            bbox,
            has_segmentation: overlay.is_some(),
            overlay,
            is_anomaly: false,
        }
    }

    /// The placeholder emitted for a sampled frame where the detector found
    /// nothing: a frame is never reported with zero findings.
    pub fn anomaly() -> Self {
        Self {
            id: "anomaly_0".to_owned(),
            track_id: None,
            label: ANOMALY_LABEL.to_owned(),
            confidence: 0.5,
            risk_level: AlertLevel::Normal.risk_label(),
            alert_level: AlertLevel::Normal.level(),
            alert_type: AlertLevel::Normal.alert_type(),
            size_meters: 0.0,
            size_cm: 0.0,
            position: "Zone inconnue - Anomalie détectée".to_owned(),
            bbox: PercentBox::full_frame(),
            has_segmentation: false,
            overlay: None,
            is_anomaly: true,
        }
    }
}

/// Zone/distance position string from a box center.
///
/// The image is divided into a 4x4 grid; the vertical quadrant maps to a
/// letter from A (top) and the horizontal one to a digit from 1 (left). The
/// distance figure scales the center's height above the bottom edge linearly
/// over a fixed 30 m span.
pub fn format_position(center_x: f32, center_y: f32, img_width: u32, img_height: u32) -> String {
    let w = img_width as f32;
    let h = img_height as f32;
    if w <= 0.0 || h <= 0.0 {
        return "Zone inconnue".to_owned();
    }

    let zone_x = (center_x / (w / 4.0)) as i32 + 1;
    let zone_y = (center_y / (h / 4.0)) as i32 + 1;
    let letter = char::from(b'A' + (zone_y - 1).clamp(0, 25) as u8);

    let distance_m = (h - center_y) / h * DISTANCE_SPAN_METERS;

    format!("Zone {letter}{zone_x} · {distance_m:.1} m from threshold")
}

/// All finalized detections for one output frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub frame: u64,
    /// Seconds from video start; stamped when the report is finalized.
    pub time: f64,
    pub detections: Vec<Detection>,
    pub count: usize,
}

impl FrameRecord {
    pub fn new(frame: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame,
            time: 0.0,
            count: detections.len(),
            detections,
        }
    }
}

/// Aggregate alert statistics over a dense frame sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    /// True iff any detection reached alert level 3.
    pub has_danger_alert: bool,
    pub max_alert_level: u8,
    /// Count of distinct track identities.
    pub unique_tracks: usize,
    /// Detection tally per label.
    pub class_counts: BTreeMap<String, u64>,
}

impl Default for VideoSummary {
    fn default() -> Self {
        Self {
            has_danger_alert: false,
            max_alert_level: AlertLevel::Normal.level(),
            unique_tracks: 0,
            class_counts: BTreeMap::new(),
        }
    }
}

/// Basic metadata of the processed video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMeta {
    pub fps: f64,
    /// Seconds, `total_frames / fps`.
    pub duration: f64,
    pub total_frames: u64,
    /// Sampled frames actually run through the detector.
    pub processed_frames: u64,
    pub width: u32,
    pub height: u32,
}

/// Complete per-video output: dense frames, summary and metadata.
///
/// Owned by the caller; holds no references back into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoReport {
    pub frames: Vec<FrameRecord>,
    #[serde(flatten)]
    pub summary: VideoSummary,
    #[serde(flatten)]
    pub meta: VideoMeta,
}
