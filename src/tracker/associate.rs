//! Track association strategies.
//!
//! Association answers one question per sampled frame: which track identity
//! does each raw detection belong to? Two interchangeable strategies satisfy
//! the same contract, selected once per run:
//!
//! - [`IouAssociator`] — the built-in identity-preserving associator. Solves
//!   an optimal assignment between active tracks and this frame's detections
//!   over an IoU-distance matrix; unmatched detections open new tracks.
//! - [`ExternalIdAssociator`] — trusts identities assigned by a mature
//!   upstream tracker shipped alongside the detector. Detections without an
//!   upstream id stay untracked.
//!
//! Either way the smoothing itself happens in the [`TrackStore`]; strategies
//! only decide the keys.

use ndarray::Array2;
use serde::Deserialize;

use crate::tracker::rect::{PercentBox, PixelBox};
use crate::tracker::store::TrackStore;

/// One detector output for one sampled frame.
#[derive(Debug, Clone, Default)]
pub struct RawDetection {
    /// Box in source-image pixel coordinates.
    pub bbox: PixelBox,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Detector class id.
    pub class_id: usize,
    /// Binary segmentation mask aligned to the full image, if available.
    pub mask: Option<Array2<bool>>,
    /// Track identity assigned upstream, if the detector side already ran
    /// an associator.
    pub track_id: Option<u64>,
}

/// The associator's view of one detection.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub bbox: PercentBox,
    pub external_id: Option<u64>,
}

/// Per-frame association contract: one track id (or none) per candidate,
/// in candidate order.
pub trait Associate {
    fn associate(
        &mut self,
        store: &mut TrackStore,
        candidates: &[Candidate],
        frame_index: u64,
    ) -> Vec<Option<u64>>;
}

/// Which [`Associate`] implementation a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationStrategy {
    /// Built-in IoU assignment ([`IouAssociator`]).
    #[default]
    BuiltinIou,
    /// Upstream-assigned identities ([`ExternalIdAssociator`]).
    ExternalIds,
}

impl AssociationStrategy {
    pub fn build(self) -> Box<dyn Associate> {
        match self {
            AssociationStrategy::BuiltinIou => Box::new(IouAssociator::default()),
            AssociationStrategy::ExternalIds => Box::new(ExternalIdAssociator),
        }
    }
}

/// Identity-preserving association by optimal IoU assignment.
#[derive(Debug, Clone)]
pub struct IouAssociator {
    /// Maximum accepted IoU distance (1 - IoU) for a match.
    pub match_thresh: f32,
}

impl Default for IouAssociator {
    fn default() -> Self {
        Self { match_thresh: 0.8 }
    }
}

impl Associate for IouAssociator {
    fn associate(
        &mut self,
        store: &mut TrackStore,
        candidates: &[Candidate],
        frame_index: u64,
    ) -> Vec<Option<u64>> {
        // Sorted for deterministic assignment regardless of map order.
        let mut active: Vec<(u64, PercentBox)> = store
            .active_tracks(frame_index)
            .map(|(id, entry)| (id, entry.smoothed))
            .collect();
        active.sort_by_key(|(id, _)| *id);

        let track_boxes: Vec<PercentBox> = active.iter().map(|(_, b)| *b).collect();
        let det_boxes: Vec<PercentBox> = candidates.iter().map(|c| c.bbox).collect();
        let dists = iou_distance(&track_boxes, &det_boxes);

        let (matches, unmatched) = linear_assignment(&dists, self.match_thresh);

        let mut ids: Vec<Option<u64>> = vec![None; candidates.len()];
        for (itrack, idet) in matches {
            ids[idet] = Some(active[itrack].0);
        }
        for idet in unmatched {
            ids[idet] = Some(store.allocate_id());
        }
        ids
    }
}

/// Association that trusts identities carried on the detections themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalIdAssociator;

impl Associate for ExternalIdAssociator {
    fn associate(
        &mut self,
        _store: &mut TrackStore,
        candidates: &[Candidate],
        _frame_index: u64,
    ) -> Vec<Option<u64>> {
        candidates.iter().map(|c| c.external_id).collect()
    }
}

/// IoU distance matrix (1 - IoU) between tracks (rows) and detections
/// (columns).
fn iou_distance(track_boxes: &[PercentBox], det_boxes: &[PercentBox]) -> Array2<f32> {
    let mut dists = Array2::zeros((track_boxes.len(), det_boxes.len()));
    for (i, t) in track_boxes.iter().enumerate() {
        for (j, d) in det_boxes.iter().enumerate() {
            dists[[i, j]] = 1.0 - t.iou(d);
        }
    }
    dists
}

/// Solve the assignment problem on `cost`, keeping matches with cost at most
/// `thresh`. Returns accepted (track, detection) pairs and the indices of
/// unmatched detections.
fn linear_assignment(cost: &Array2<f32>, thresh: f32) -> (Vec<(usize, usize)>, Vec<usize>) {
    let (num_rows, num_cols) = cost.dim();

    if num_cols == 0 {
        return (vec![], vec![]);
    }
    if num_rows == 0 {
        return (vec![], (0..num_cols).collect());
    }

    // lapjv needs a square matrix; pad with a prohibitive cost.
    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost[[i, j]] as f64;
        }
    }

    let mut matches = vec![];
    let mut matched_mask = vec![false; num_cols];

    if let Ok((row_to_col, _)) = lapjv::lapjv(&padded) {
        for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
            if col < num_cols && cost[[row, col]] <= thresh {
                matches.push((row, col));
                matched_mask[col] = true;
            }
        }
    }

    let unmatched = matched_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| if m { None } else { Some(i) })
        .collect();

    (matches, unmatched)
}
