//! Per-sampled-frame track management.
//!
//! The manager owns the [`TrackStore`] and the association strategy for one
//! video and turns each sampled frame's raw detections into finalized,
//! identity-stable [`Detection`]s: clamp, associate, smooth, size/risk
//! classification, position string, overlay. Frames must arrive in strictly
//! increasing index order.

use ndarray::s;
use tracing::{debug, warn};

use crate::error::Error;
use crate::overlay::{self, OverlayConfig, OverlayImage};
use crate::record::{Detection, FrameRecord, format_position};
use crate::risk::{self, RiskConfig};
use crate::tracker::associate::{Associate, AssociationStrategy, Candidate, RawDetection};
use crate::tracker::rect::PixelBox;
use crate::tracker::store::{TrackConfig, TrackStore};

/// Per-frame processing context supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Index of the sampled frame within the video.
    pub frame_index: u64,
    pub img_width: u32,
    pub img_height: u32,
}

/// Owns all tracking state for one video.
pub struct TrackManager {
    store: TrackStore,
    associator: Box<dyn Associate>,
    risk_config: RiskConfig,
    overlay_config: OverlayConfig,
    class_names: Vec<String>,
    last_frame: Option<u64>,
}

impl TrackManager {
    pub fn new(
        track_config: TrackConfig,
        strategy: AssociationStrategy,
        risk_config: RiskConfig,
        overlay_config: OverlayConfig,
        class_names: Vec<String>,
    ) -> Self {
        Self {
            store: TrackStore::new(track_config),
            associator: strategy.build(),
            risk_config,
            overlay_config,
            class_names,
            last_frame: None,
        }
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Process one sampled frame's raw detections into a [`FrameRecord`].
    ///
    /// An empty detection set yields a single synthetic anomaly record.
    /// Expired tracks are pruned after every frame.
    pub fn process_frame(
        &mut self,
        detections: Vec<RawDetection>,
        ctx: &FrameContext,
    ) -> Result<FrameRecord, Error> {
        if let Some(last) = self.last_frame {
            if ctx.frame_index <= last {
                return Err(Error::NonMonotonicFrame {
                    frame: ctx.frame_index,
                    last,
                });
            }
        }
        self.last_frame = Some(ctx.frame_index);

        if detections.is_empty() {
            debug!(frame = ctx.frame_index, "no detections; emitting anomaly placeholder");
            self.store.expire(ctx.frame_index);
            return Ok(FrameRecord::new(ctx.frame_index, vec![Detection::anomaly()]));
        }

        let clamped: Vec<RawDetection> = detections
            .into_iter()
            .map(|mut det| {
                det.bbox = det.bbox.clamped(ctx.img_width, ctx.img_height);
                det
            })
            .collect();

        let candidates: Vec<Candidate> = clamped
            .iter()
            .map(|det| Candidate {
                bbox: det.bbox.to_percent(ctx.img_width, ctx.img_height),
                external_id: det.track_id,
            })
            .collect();
        let track_ids = self
            .associator
            .associate(&mut self.store, &candidates, ctx.frame_index);

        let mut finalized = Vec::with_capacity(clamped.len());
        for (i, det) in clamped.iter().enumerate() {
            let track_id = track_ids[i];
            let raw_percent = candidates[i].bbox;
            let smoothed = match track_id {
                Some(id) => self.store.update(id, raw_percent, ctx.frame_index),
                None => raw_percent,
            };

            let mask = usable_mask(det, ctx);
            let mask_area = mask.map(|m| m.iter().filter(|&&v| v).count() as f32);

            let size_meters = risk::estimate_size(
                det.bbox.width(),
                det.bbox.height(),
                ctx.img_width,
                ctx.img_height,
                mask_area,
                &self.risk_config,
            );
            let assessment = risk::classify(size_meters, det.confidence);

            let (center_x, center_y) = det.bbox.center();
            let position = format_position(center_x, center_y, ctx.img_width, ctx.img_height);

            let overlay = mask.and_then(|m| self.compose_overlay(m, det.bbox, assessment.level));

            let id = match track_id {
                Some(id) => format!("track_{id}"),
                None => format!("frame_{}_{i}", ctx.frame_index),
            };
            let label = self
                .class_names
                .get(det.class_id)
                .cloned()
                .unwrap_or_else(|| format!("Class_{}", det.class_id));

            finalized.push(Detection::assessed(
                id,
                track_id,
                label,
                det.confidence,
                assessment,
                position,
                smoothed,
                overlay,
            ));
        }

        let expired = self.store.expire(ctx.frame_index);
        if expired > 0 {
            debug!(frame = ctx.frame_index, expired, "expired stale tracks");
        }

        Ok(FrameRecord::new(ctx.frame_index, finalized))
    }

    /// Slice the bbox region out of the full-image mask and composite it.
    fn compose_overlay(
        &self,
        mask: &ndarray::Array2<bool>,
        bbox: PixelBox,
        level: crate::risk::AlertLevel,
    ) -> Option<OverlayImage> {
        if !self.overlay_config.enabled {
            return None;
        }

        let (mask_h, mask_w) = mask.dim();
        if mask_h == 0 || mask_w == 0 {
            return None;
        }
        let x1 = (bbox.x1.round() as usize).min(mask_w.saturating_sub(1));
        let y1 = (bbox.y1.round() as usize).min(mask_h.saturating_sub(1));
        let x2 = (bbox.x2.round() as usize).clamp(x1 + 1, mask_w);
        let y2 = (bbox.y2.round() as usize).clamp(y1 + 1, mask_h);

        let region = mask.slice(s![y1..y2, x1..x2]);
        overlay::composite(region, level, &self.overlay_config)
    }
}

/// The detection's mask, if it aligns with the frame dimensions.
///
/// A misaligned mask is treated exactly like a failed segmentation: no
/// overlay and no mask-refined size for this detection.
fn usable_mask<'a>(
    det: &'a RawDetection,
    ctx: &FrameContext,
) -> Option<&'a ndarray::Array2<bool>> {
    let mask = det.mask.as_ref()?;
    if mask.dim() != (ctx.img_height as usize, ctx.img_width as usize) {
        warn!(
            frame = ctx.frame_index,
            mask_dims = ?mask.dim(),
            "mask does not match frame dimensions; skipping segmentation"
        );
        return None;
    }
    Some(mask)
}
