//! Integration module for connecting detection and segmentation backends
//! with the tracking pipeline.
//!
//! This module provides the capability traits the core consumes ([detector],
//! [segmenter]) and the per-video [`VideoPipeline`] that drives them.
//!
//! [detector]: DetectorSource
//! [segmenter]: SegmenterSource

mod builder;
mod detector;
mod pipeline;

pub use builder::RawDetectionBuilder;
pub use detector::{DetectorSource, IntoRawDetections, NoSegmenter, SegmenterSource};
pub use pipeline::{PipelineConfig, PipelineError, VideoPipeline};
