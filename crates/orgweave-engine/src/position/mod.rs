//! # Position Mapping
//!
//! Editors report positions in document space; language tooling works on a
//! single block. This module translates between the two using the marker
//! lines recorded in the manifest.
//!
//! - [`mapper`]: document ↔ block-local positions, ranges and locations
//! - [`offsets`]: byte offsets ↔ positions within one block's text

pub mod mapper;
pub mod offsets;
pub mod types;

pub use mapper::{
    map_location_to_document, map_range_to_block, map_range_to_document, to_block, to_document,
    to_document_at,
};
pub use offsets::{offset_to_position, position_to_offset};
pub use types::{
    BlockPosition, BlockRange, DocumentPosition, DocumentRange, Location, LocationTarget,
    Position, Range,
};
