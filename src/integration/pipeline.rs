//! Per-video processing pipeline.
//!
//! Combines a [`DetectorSource`], an optional [`SegmenterSource`] and a
//! [`TrackManager`] into the full sampled-frame-to-report flow: detect,
//! fill masks, track, then densify and summarize on [`finish`].
//!
//! A pipeline covers exactly one video. Sampled frames must be fed in
//! increasing index order; any error invalidates the run, so the caller
//! either receives a complete [`VideoReport`] or none at all. Aborting
//! between frames is always safe — just stop calling and drop the pipeline.
//!
//! [`finish`]: VideoPipeline::finish

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Error;
use crate::interp::{DensifyMode, densify};
use crate::overlay::OverlayConfig;
use crate::record::{FrameRecord, VideoMeta, VideoReport};
use crate::risk::RiskConfig;
use crate::summary::summarize;
use crate::tracker::{AssociationStrategy, FrameContext, TrackConfig, TrackManager};

use super::detector::{DetectorSource, NoSegmenter, SegmenterSource};

/// Configuration for a [`VideoPipeline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub track: TrackConfig,
    pub risk: RiskConfig,
    pub overlay: OverlayConfig,
    pub association: AssociationStrategy,
    pub densify: DensifyMode,
    /// Sampling stride the caller applies: a sampled frame every
    /// `frame_step` video frames.
    pub frame_step: u32,
    /// Class labels by detector class id; unknown ids fall back to
    /// `Class_{id}`.
    pub class_names: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            track: TrackConfig::default(),
            risk: RiskConfig::default(),
            overlay: OverlayConfig::default(),
            association: AssociationStrategy::default(),
            densify: DensifyMode::default(),
            frame_step: 5,
            class_names: Vec::new(),
        }
    }
}

/// Errors terminating a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    /// The detector capability failed. Fatal for the video.
    #[error("detector failed: {0}")]
    Detector(E),
    /// A core invariant was violated (frame order, dimensions).
    #[error(transparent)]
    Core(#[from] Error),
}

/// End-to-end processing for one video.
pub struct VideoPipeline<D: DetectorSource, S: SegmenterSource = NoSegmenter> {
    detector: D,
    segmenter: Option<S>,
    manager: TrackManager,
    config: PipelineConfig,
    sparse: Vec<FrameRecord>,
    dims: Option<(u32, u32)>,
}

impl<D: DetectorSource> VideoPipeline<D, NoSegmenter> {
    /// Create a pipeline without segmentation support.
    pub fn new(detector: D, config: PipelineConfig) -> Self {
        Self::build(detector, None, config)
    }
}

impl<D: DetectorSource, S: SegmenterSource> VideoPipeline<D, S> {
    /// Create a pipeline with a segmenter for overlays and mask-refined
    /// size estimates.
    pub fn with_segmenter(detector: D, segmenter: S, config: PipelineConfig) -> Self {
        Self::build(detector, Some(segmenter), config)
    }

    fn build(detector: D, segmenter: Option<S>, config: PipelineConfig) -> Self {
        let manager = TrackManager::new(
            config.track,
            config.association,
            config.risk,
            config.overlay,
            config.class_names.clone(),
        );
        Self {
            detector,
            segmenter,
            manager,
            config,
            sparse: Vec::new(),
            dims: None,
        }
    }

    /// Run detection, segmentation and tracking on one sampled frame.
    ///
    /// Returns the finalized record for the frame. Frame timestamps are
    /// stamped once the frame rate is known, in [`finish`](Self::finish).
    pub fn process_sampled_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        frame_index: u64,
    ) -> Result<&FrameRecord, PipelineError<D::Error>> {
        match self.dims {
            None => self.dims = Some((width, height)),
            Some((w, h)) if (w, h) != (width, height) => {
                return Err(Error::DimensionMismatch {
                    width: w,
                    height: h,
                    got_width: width,
                    got_height: height,
                }
                .into());
            }
            Some(_) => {}
        }

        let mut detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detector)?;

        if let Some(segmenter) = &mut self.segmenter {
            for det in &mut detections {
                if det.mask.is_some() {
                    continue;
                }
                match segmenter.segment(input, width, height, det.bbox) {
                    Ok(Some(mask)) => det.mask = Some(mask),
                    // Unavailable and failed are the same thing here: the
                    // detection proceeds on its bbox alone.
                    Ok(None) => {}
                    Err(_) => {
                        debug!(frame = frame_index, "segmenter failed; continuing without mask");
                    }
                }
            }
        }

        let ctx = FrameContext {
            frame_index,
            img_width: width,
            img_height: height,
        };
        let record = self.manager.process_frame(detections, &ctx)?;
        self.sparse.push(record);
        Ok(self.sparse.last().expect("record just pushed"))
    }

    /// Densify, summarize and hand the complete report to the caller.
    pub fn finish(self, total_frames: u64, fps: f64) -> VideoReport {
        let processed_frames = self.sparse.len() as u64;
        let frames = densify(
            &self.sparse,
            total_frames,
            self.config.frame_step,
            self.config.track.max_age,
            fps,
            self.config.densify,
        );
        let summary = summarize(&frames);
        let (width, height) = self.dims.unwrap_or((0, 0));

        info!(
            processed_frames,
            total_frames,
            unique_tracks = summary.unique_tracks,
            max_alert_level = summary.max_alert_level,
            "video processing finished"
        );

        VideoReport {
            frames,
            summary,
            meta: VideoMeta {
                fps,
                duration: if fps > 0.0 {
                    total_frames as f64 / fps
                } else {
                    0.0
                },
                total_frames,
                processed_frames,
                width,
                height,
            },
        }
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying track manager.
    pub fn manager(&self) -> &TrackManager {
        &self.manager
    }

    /// Sampled-frame records accumulated so far.
    pub fn sampled_frames(&self) -> &[FrameRecord] {
        &self.sparse
    }
}
