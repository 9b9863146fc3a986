mod associate;
mod manager;
mod rect;
mod store;

pub use associate::{
    Associate, AssociationStrategy, Candidate, ExternalIdAssociator, IouAssociator, RawDetection,
};
pub use manager::{FrameContext, TrackManager};
pub use rect::{PercentBox, PixelBox};
pub use store::{TrackConfig, TrackEntry, TrackStore};
