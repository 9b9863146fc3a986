//! Bounding box types for the two coordinate spaces the pipeline works in.
//!
//! Detectors report boxes in source-image pixel coordinates ([`PixelBox`],
//! TLBR format). Everything downstream of association — smoothing,
//! interpolation, output records — uses boxes normalized to percentages of
//! the image dimensions ([`PercentBox`], TLWH format), so that positions
//! survive resolution changes between inference and rendering.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates: x1,y1 top-left, x2,y2 bottom-right.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl PixelBox {
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clamp the box to image bounds, preserving x1 <= x2 and y1 <= y2.
    pub fn clamped(self, img_width: u32, img_height: u32) -> Self {
        let w = img_width as f32;
        let h = img_height as f32;
        let x1 = self.x1.clamp(0.0, w);
        let y1 = self.y1.clamp(0.0, h);
        Self {
            x1,
            y1,
            x2: self.x2.clamp(x1, w),
            y2: self.y2.clamp(y1, h),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Convert to a percentage-normalized box for the given image dimensions.
    pub fn to_percent(self, img_width: u32, img_height: u32) -> PercentBox {
        let w = img_width as f32;
        let h = img_height as f32;
        if w <= 0.0 || h <= 0.0 {
            return PercentBox::default();
        }
        PercentBox {
            x: self.x1 / w * 100.0,
            y: self.y1 / h * 100.0,
            width: self.width() / w * 100.0,
            height: self.height() / h * 100.0,
        }
    }
}

/// Box expressed as percentages of image width/height, TLWH format.
///
/// All fields are in `[0, 100]` for boxes derived from clamped pixel boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PercentBox {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole-image box.
    #[inline]
    pub fn full_frame() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Calculate Intersection over Union (IoU) with another box.
    pub fn iou(&self, other: &PercentBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }

    /// Linear interpolation toward `other` per coordinate.
    ///
    /// `ratio` 0.0 returns `self`, 1.0 returns `other`.
    pub fn lerp(&self, other: &PercentBox, ratio: f32) -> PercentBox {
        PercentBox {
            x: self.x + (other.x - self.x) * ratio,
            y: self.y + (other.y - self.y) * ratio,
            width: self.width + (other.width - self.width) * ratio,
            height: self.height + (other.height - self.height) * ratio,
        }
    }
}
