//! Segmentation overlay compositing.
//!
//! Turns a binary mask region into a renderable RGBA annotation: a
//! half-transparent fill in the alert color plus a fully opaque band along
//! the mask's outer contour. Buffers are index-addressed `ndarray` arrays
//! sized to the bounding box extent; no per-pixel allocation.

use ndarray::{Array3, ArrayView2};
use serde::Deserialize;

use crate::risk::AlertLevel;

/// Compositing parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Whether overlays are produced at all.
    pub enabled: bool,
    /// Alpha of the mask interior; 102 is roughly 40% opacity.
    pub fill_alpha: u8,
    /// Thickness of the opaque contour band, in pixels.
    pub border_px: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fill_alpha: 102,
            border_px: 2,
        }
    }
}

/// RGBA annotation buffer sized to a detection's bounding box extent.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage {
    pub width: u32,
    pub height: u32,
    /// Pixel data with shape `(height, width, 4)`.
    pub pixels: Array3<u8>,
}

impl OverlayImage {
    /// The RGBA value at `(y, x)`.
    pub fn pixel(&self, y: usize, x: usize) -> [u8; 4] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
            self.pixels[[y, x, 3]],
        ]
    }
}

/// Composite a mask region into an RGBA overlay colored by alert level.
///
/// Returns `None` for a degenerate region (zero extent or no set pixel);
/// callers degrade to "no overlay" for the detection rather than failing
/// the frame.
pub fn composite(
    mask_region: ArrayView2<'_, bool>,
    level: AlertLevel,
    config: &OverlayConfig,
) -> Option<OverlayImage> {
    let (height, width) = mask_region.dim();
    if height == 0 || width == 0 || !mask_region.iter().any(|&m| m) {
        return None;
    }

    let [r, g, b] = level.color_rgb();
    let mut pixels = Array3::<u8>::zeros((height, width, 4));
    let border = config.border_px as isize;

    for y in 0..height {
        for x in 0..width {
            if !mask_region[[y, x]] {
                continue;
            }
            let alpha = if on_contour_band(&mask_region, y, x, border) {
                255
            } else {
                config.fill_alpha
            };
            pixels[[y, x, 0]] = r;
            pixels[[y, x, 1]] = g;
            pixels[[y, x, 2]] = b;
            pixels[[y, x, 3]] = alpha;
        }
    }

    Some(OverlayImage {
        width: width as u32,
        height: height as u32,
        pixels,
    })
}

/// Whether a set pixel lies within `border` pixels of the mask exterior
/// (region edges count as exterior).
fn on_contour_band(mask: &ArrayView2<'_, bool>, y: usize, x: usize, border: isize) -> bool {
    let (height, width) = mask.dim();
    for dy in -border..=border {
        for dx in -border..=border {
            let ny = y as isize + dy;
            let nx = x as isize + dx;
            if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                return true;
            }
            if !mask[[ny as usize, nx as usize]] {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn disc_mask(size: usize, radius: f32) -> Array2<bool> {
        let c = size as f32 / 2.0;
        Array2::from_shape_fn((size, size), |(y, x)| {
            let dy = y as f32 + 0.5 - c;
            let dx = x as f32 + 0.5 - c;
            (dy * dy + dx * dx).sqrt() <= radius
        })
    }

    #[test]
    fn test_fill_and_border_alpha() {
        let mask = disc_mask(21, 8.0);
        let overlay = composite(mask.view(), AlertLevel::Danger, &OverlayConfig::default()).unwrap();

        // Center of the disc: red fill at partial opacity
        assert_eq!(overlay.pixel(10, 10), [255, 0, 0, 102]);
        // Pixel on the rim: same color, fully opaque
        assert_eq!(overlay.pixel(10, 2), [255, 0, 0, 255]);
        // Outside the mask: fully transparent
        assert_eq!(overlay.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_color_follows_alert_level() {
        let mask = disc_mask(11, 4.0);
        let config = OverlayConfig::default();
        let attention = composite(mask.view(), AlertLevel::Attention, &config).unwrap();
        assert_eq!(&attention.pixel(5, 5)[..3], &[255, 165, 0]);
        let normal = composite(mask.view(), AlertLevel::Normal, &config).unwrap();
        assert_eq!(&normal.pixel(5, 5)[..3], &[0, 255, 0]);
    }

    #[test]
    fn test_empty_region_degrades_to_none() {
        let empty = Array2::<bool>::from_elem((0, 0), false);
        assert!(composite(empty.view(), AlertLevel::Normal, &OverlayConfig::default()).is_none());

        let blank = Array2::<bool>::from_elem((8, 8), false);
        assert!(composite(blank.view(), AlertLevel::Normal, &OverlayConfig::default()).is_none());
    }

    #[test]
    fn test_region_edge_counts_as_contour() {
        // Mask filling the whole region: every pixel near the edge is border
        let full = Array2::from_elem((10, 10), true);
        let overlay = composite(full.view(), AlertLevel::Normal, &OverlayConfig::default()).unwrap();
        assert_eq!(overlay.pixel(0, 0)[3], 255);
        assert_eq!(overlay.pixel(5, 5)[3], 102);
    }

    #[test]
    fn test_buffer_matches_region_extent() {
        let mask = Array2::from_elem((6, 9), true);
        let overlay = composite(mask.view(), AlertLevel::Normal, &OverlayConfig::default()).unwrap();
        assert_eq!((overlay.height, overlay.width), (6, 9));
        assert_eq!(overlay.pixels.dim(), (6, 9, 4));
    }
}
