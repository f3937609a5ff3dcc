//! Public types for the Flashbook API.

mod raw;
mod request;
mod summary;

pub use raw::{RawBlock, RawGeneratorOutput};
pub use request::{RequestLimits, SummaryMode, SummaryRequest};
pub use summary::{
    BlockType, ContentBlock, GenerationNotes, MAX_BLOCKS, MAX_VISUAL_SLOTS, MIN_USABLE_BLOCKS,
    SummaryResponse,
};
