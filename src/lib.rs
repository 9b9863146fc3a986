//! Track management, size/risk classification and temporal interpolation
//! for sparse video detection streams.
//!
//! An external detector runs on a sampled subset of a video's frames. This
//! crate turns those raw per-frame detections into a dense, identity-stable,
//! risk-annotated detection stream covering every frame:
//!
//! 1. [`tracker`] associates detections into persistent tracks and smooths
//!    their positions with an exponential filter.
//! 2. [`risk`] maps geometry and confidence to a physical size estimate and
//!    a discrete alert level.
//! 3. [`overlay`] composites segmentation masks into renderable RGBA
//!    annotations colored by alert level.
//! 4. [`interp`] reconstructs the frames the detector never saw by
//!    interpolating or holding track state.
//! 5. [`summary`] aggregates the dense stream into a video-level report.
//!
//! The [`integration`] module holds the capability traits for the external
//! detector/segmenter and the [`VideoPipeline`] wiring it all together:
//!
//! ```ignore
//! use fodtrack_rs::{PipelineConfig, VideoPipeline};
//!
//! let mut pipeline = VideoPipeline::new(my_detector, PipelineConfig::default());
//! for (index, frame) in sampled_frames {
//!     pipeline.process_sampled_frame(&frame.data, frame.width, frame.height, index)?;
//! }
//! let report = pipeline.finish(total_frames, fps);
//! ```

pub mod integration;
pub mod interp;
pub mod overlay;
pub mod record;
pub mod risk;
pub mod summary;
pub mod tracker;

mod error;

pub use error::Error;
pub use integration::{
    DetectorSource, IntoRawDetections, NoSegmenter, PipelineConfig, PipelineError,
    RawDetectionBuilder, SegmenterSource, VideoPipeline,
};
pub use interp::{DensifyMode, densify};
pub use overlay::{OverlayConfig, OverlayImage, composite};
pub use record::{Detection, FrameRecord, VideoMeta, VideoReport, VideoSummary};
pub use risk::{AlertLevel, RiskAssessment, RiskConfig, classify, estimate_size};
pub use summary::summarize;
pub use tracker::{
    AssociationStrategy, PercentBox, PixelBox, RawDetection, TrackConfig, TrackManager, TrackStore,
};
