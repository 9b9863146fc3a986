//! Physical size estimation and risk classification.
//!
//! Geometry in, alert level out. Size is estimated from the segmentation
//! mask area when one is available (a closer proxy for the true footprint
//! than the bounding box) and from the bbox otherwise, then mapped onto the
//! three alert bands. Low-confidence detections are demoted one band.

use std::f32::consts::PI;

use serde::Deserialize;

/// Band boundary for a DANGER alert, in meters.
const DANGER_SIZE_METERS: f32 = 0.10;
/// Band boundary for an ATTENTION alert, in meters.
const ATTENTION_SIZE_METERS: f32 = 0.05;
/// Detections below this confidence are demoted one level.
const DEMOTION_CONFIDENCE: f32 = 0.5;

/// Size calibration parameters.
///
/// The reference width is the assumed real-world span of the image. The
/// original system fixed it at 3 m for an apron surveillance camera; it is
/// scene- and camera-dependent and was never derived from calibration data,
/// so it is a knob here rather than a constant.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Real-world width in meters assumed to span the image.
    pub reference_width_meters: f32,
    /// Ceiling on the size estimate, in meters.
    pub max_size_meters: f32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            reference_width_meters: 3.0,
            max_size_meters: 0.30,
        }
    }
}

/// Discrete alert level, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AlertLevel {
    #[default]
    Normal,
    Attention,
    Danger,
}

impl AlertLevel {
    /// Numeric level: 1, 2 or 3.
    #[inline]
    pub fn level(self) -> u8 {
        match self {
            AlertLevel::Normal => 1,
            AlertLevel::Attention => 2,
            AlertLevel::Danger => 3,
        }
    }

    pub fn risk_label(self) -> &'static str {
        match self {
            AlertLevel::Normal => "Low",
            AlertLevel::Attention => "Medium",
            AlertLevel::Danger => "High",
        }
    }

    pub fn alert_type(self) -> &'static str {
        match self {
            AlertLevel::Normal => "NORMAL",
            AlertLevel::Attention => "ATTENTION",
            AlertLevel::Danger => "DANGER",
        }
    }

    /// One level down, saturating at Normal.
    pub fn demoted(self) -> AlertLevel {
        match self {
            AlertLevel::Danger => AlertLevel::Attention,
            _ => AlertLevel::Normal,
        }
    }

    /// Annotation color for this level.
    pub fn color_rgb(self) -> [u8; 3] {
        match self {
            AlertLevel::Danger => [255, 0, 0],
            AlertLevel::Attention => [255, 165, 0],
            AlertLevel::Normal => [0, 255, 0],
        }
    }
}

/// Size and alert classification for one detection.
///
/// Derived and recomputed per detection, never stored on a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub level: AlertLevel,
    /// Estimated size in meters, rounded to 3 decimals.
    pub size_meters: f32,
    /// Estimated size in centimeters, rounded to 1 decimal.
    pub size_cm: f32,
}

/// Estimate the physical size of a detected object in meters.
///
/// With a mask area the pixel size is the equivalent diameter of a circle of
/// that area (`2 * sqrt(area / pi)`); otherwise the mean of the bbox sides.
/// Conversion to meters scales by the configured reference width over the
/// mean image dimension, clamped to `max_size_meters`.
pub fn estimate_size(
    bbox_width_px: f32,
    bbox_height_px: f32,
    img_width: u32,
    img_height: u32,
    mask_area_px: Option<f32>,
    config: &RiskConfig,
) -> f32 {
    let size_px = match mask_area_px {
        Some(area) if area > 0.0 => 2.0 * (area / PI).sqrt(),
        _ => (bbox_width_px + bbox_height_px) / 2.0,
    };

    let img_size_avg = (img_width as f32 + img_height as f32) / 2.0;
    if img_size_avg <= 0.0 {
        return 0.0;
    }

    let size_meters = size_px / img_size_avg * config.reference_width_meters;
    size_meters.clamp(0.0, config.max_size_meters)
}

/// Classify a size estimate into an alert level.
///
/// `> 10 cm` is DANGER, `5..=10 cm` ATTENTION, below that NORMAL. Below 0.5
/// confidence the level is demoted exactly one band, never below NORMAL.
pub fn classify(size_meters: f32, confidence: f32) -> RiskAssessment {
    let mut level = if size_meters > DANGER_SIZE_METERS {
        AlertLevel::Danger
    } else if size_meters >= ATTENTION_SIZE_METERS {
        AlertLevel::Attention
    } else {
        AlertLevel::Normal
    };

    if confidence < DEMOTION_CONFIDENCE {
        level = level.demoted();
    }

    RiskAssessment {
        level,
        size_meters: (size_meters * 1000.0).round() / 1000.0,
        size_cm: (size_meters * 1000.0).round() / 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_non_decreasing_in_size() {
        let sizes = [0.01, 0.04, 0.05, 0.08, 0.10, 0.11, 0.25];
        let mut last = 0;
        for size in sizes {
            let level = classify(size, 0.9).level.level();
            assert!(level >= last, "level dropped at size {size}");
            last = level;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(0.04, 0.9).level, AlertLevel::Normal);
        assert_eq!(classify(0.05, 0.9).level, AlertLevel::Attention);
        assert_eq!(classify(0.10, 0.9).level, AlertLevel::Attention);
        assert_eq!(classify(0.11, 0.9).level, AlertLevel::Danger);
    }

    #[test]
    fn test_low_confidence_demotes_one_level() {
        assert_eq!(classify(0.20, 0.4).level, AlertLevel::Attention);
        assert_eq!(classify(0.08, 0.4).level, AlertLevel::Normal);
        // Never below level 1
        assert_eq!(classify(0.01, 0.4).level, AlertLevel::Normal);
        // At exactly 0.5 no demotion applies
        assert_eq!(classify(0.20, 0.5).level, AlertLevel::Danger);
    }

    #[test]
    fn test_estimate_clamped_to_max() {
        let config = RiskConfig::default();
        // A box spanning the whole image would estimate far above 30 cm
        let size = estimate_size(640.0, 480.0, 640, 480, None, &config);
        assert_eq!(size, 0.30);
    }

    #[test]
    fn test_estimate_from_bbox_mean() {
        let config = RiskConfig::default();
        // Mean side 15 px over mean image dim 560 px at 3 m span
        let size = estimate_size(10.0, 20.0, 640, 480, None, &config);
        assert!((size - 15.0 / 560.0 * 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_prefers_mask_area() {
        let config = RiskConfig::default();
        let area = 400.0_f32;
        let expected_px = 2.0 * (area / PI).sqrt();
        let size = estimate_size(100.0, 100.0, 640, 480, Some(area), &config);
        assert!((size - expected_px / 560.0 * 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_ignores_empty_mask() {
        let config = RiskConfig::default();
        let with_zero = estimate_size(10.0, 20.0, 640, 480, Some(0.0), &config);
        let without = estimate_size(10.0, 20.0, 640, 480, None, &config);
        assert_eq!(with_zero, without);
    }

    #[test]
    fn test_assessment_rounding() {
        let assessment = classify(0.123456, 0.9);
        assert_eq!(assessment.size_meters, 0.123);
        assert_eq!(assessment.size_cm, 12.3);
    }

    #[test]
    fn test_labels_match_levels() {
        assert_eq!(AlertLevel::Normal.risk_label(), "Low");
        assert_eq!(AlertLevel::Attention.alert_type(), "ATTENTION");
        assert_eq!(AlertLevel::Danger.level(), 3);
    }
}
