//! Builder for creating RawDetection objects from various input formats.

use ndarray::Array2;

use crate::tracker::{PixelBox, RawDetection};

/// Builder for creating [`RawDetection`] objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct RawDetectionBuilder {
    bbox: PixelBox,
    confidence: f32,
    class_id: usize,
    mask: Option<Array2<bool>>,
    track_id: Option<u64>,
}

impl RawDetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = PixelBox::new(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in TLWH format (top-left x, top-left y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = PixelBox::new(x, y, x + w, y + h);
        self
    }

    /// Set bounding box in XYWH format (center x, center y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = PixelBox::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0);
        self
    }

    /// Clamp the box to image bounds immediately.
    pub fn clamp_to(mut self, img_width: u32, img_height: u32) -> Self {
        self.bbox = self.bbox.clamped(img_width, img_height);
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Attach a full-image binary segmentation mask.
    pub fn mask(mut self, mask: Array2<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Attach a track identity assigned by an upstream associator.
    pub fn track_id(mut self, track_id: u64) -> Self {
        self.track_id = Some(track_id);
        self
    }

    /// Build the final [`RawDetection`].
    pub fn build(self) -> RawDetection {
        RawDetection {
            bbox: self.bbox,
            confidence: self.confidence,
            class_id: self.class_id,
            mask: self.mask,
            track_id: self.track_id,
        }
    }
}
