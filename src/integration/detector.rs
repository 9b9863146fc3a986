//! Traits for the external detection and segmentation capabilities.

use ndarray::Array2;

use crate::tracker::{PixelBox, RawDetection};

/// Object detection inference capability.
///
/// Implement this trait to connect any detection model to the pipeline.
/// An empty result is a valid outcome, not an error: the pipeline reacts to
/// it by emitting a synthetic anomaly record for the frame.
///
/// # Example
///
/// ```ignore
/// use fodtrack_rs::{DetectorSource, RawDetection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectorSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectorSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `RawDetection`.
pub trait IntoRawDetections {
    fn into_raw_detections(self) -> Vec<RawDetection>;
}

impl IntoRawDetections for Vec<RawDetection> {
    fn into_raw_detections(self) -> Vec<RawDetection> {
        self
    }
}

/// Optional instance segmentation capability.
///
/// `Ok(None)` signals "unavailable" and is treated exactly like a failure:
/// the detection proceeds without an overlay and without mask-refined size.
pub trait SegmenterSource {
    type Error;

    /// Produce a binary mask aligned to the full image for the object inside
    /// `bbox`, or `None` when segmentation is unavailable.
    fn segment(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        bbox: PixelBox,
    ) -> Result<Option<Array2<bool>>, Self::Error>;
}

/// The segmenter used when none is configured: never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSegmenter;

impl SegmenterSource for NoSegmenter {
    type Error = std::convert::Infallible;

    fn segment(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
        _bbox: PixelBox,
    ) -> Result<Option<Array2<bool>>, Self::Error> {
        Ok(None)
    }
}
