//! Per-video track store with exponential position smoothing.
//!
//! The store maps a track identity to its smoothed position and recency
//! bookkeeping. One store is owned per video being processed; it starts empty
//! and is dropped with its [`TrackManager`](crate::tracker::TrackManager), so
//! no tracking state leaks between videos. Track ids are allocated from a
//! per-store counter for the same reason.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::tracker::rect::PercentBox;

/// Smoothing and expiry parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Exponential smoothing factor in `(0, 1]`. Closer to 1 follows the
    /// newest observation more closely; 0.7 damps jitter while staying
    /// responsive.
    pub alpha: f32,
    /// Sampled-frame units a track survives without a match.
    pub max_age: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            max_age: 5,
        }
    }
}

/// State held for one track between its first match and its expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEntry {
    /// Current smoothed position. Exactly one is held per track.
    pub smoothed: PercentBox,
    /// Frames since last match; 0 right after a match.
    pub age: u32,
    /// Frame index of the most recent match.
    pub last_seen: u64,
}

/// Mapping from track identity to track state for one video.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: HashMap<u64, TrackEntry>,
    config: TrackConfig,
    next_id: u64,
}

impl TrackStore {
    pub fn new(config: TrackConfig) -> Self {
        Self {
            tracks: HashMap::new(),
            config,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Allocate a fresh track id, unique within this store.
    pub fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Update or create the track under `key` and return its smoothed box.
    ///
    /// An unseen key is inserted with the raw box as-is; a seen key is
    /// smoothed per coordinate with `alpha * raw + (1 - alpha) * previous`.
    pub fn update(&mut self, key: u64, raw: PercentBox, frame_index: u64) -> PercentBox {
        match self.tracks.get_mut(&key) {
            None => {
                self.tracks.insert(
                    key,
                    TrackEntry {
                        smoothed: raw,
                        age: 0,
                        last_seen: frame_index,
                    },
                );
                raw
            }
            Some(entry) => {
                let a = self.config.alpha;
                entry.smoothed = PercentBox {
                    x: a * raw.x + (1.0 - a) * entry.smoothed.x,
                    y: a * raw.y + (1.0 - a) * entry.smoothed.y,
                    width: a * raw.width + (1.0 - a) * entry.smoothed.width,
                    height: a * raw.height + (1.0 - a) * entry.smoothed.height,
                };
                entry.age = 0;
                entry.last_seen = frame_index;
                entry.smoothed
            }
        }
    }

    /// Remove every track unseen for more than `max_age` frames.
    ///
    /// Returns the number of removed tracks. A track whose `last_seen` lies
    /// beyond `current_frame` indicates a frame-ordering bug upstream; such
    /// entries are left untouched rather than guessed at.
    pub fn expire(&mut self, current_frame: u64) -> usize {
        let max_age = self.config.max_age;
        let before = self.tracks.len();
        self.tracks.retain(|id, entry| match current_frame.checked_sub(entry.last_seen) {
            Some(since) if since > max_age as u64 => false,
            Some(since) => {
                entry.age = since as u32;
                true
            }
            None => {
                warn!(
                    track_id = id,
                    last_seen = entry.last_seen,
                    current_frame,
                    "track last seen in the future; leaving it untouched"
                );
                true
            }
        });
        before - self.tracks.len()
    }

    /// Tracks still within the visibility window at `current_frame`.
    ///
    /// Read-only: never mutates or removes entries.
    pub fn active_tracks(
        &self,
        current_frame: u64,
    ) -> impl Iterator<Item = (u64, &TrackEntry)> {
        let max_age = self.config.max_age as u64;
        self.tracks.iter().filter_map(move |(&id, entry)| {
            match current_frame.checked_sub(entry.last_seen) {
                Some(since) if since <= max_age => Some((id, entry)),
                Some(_) => None,
                // last_seen beyond current_frame: treat as just seen
                None => Some((id, entry)),
            }
        })
    }

    pub fn get(&self, key: u64) -> Option<&TrackEntry> {
        self.tracks.get(&key)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
