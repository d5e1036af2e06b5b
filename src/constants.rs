//! World-shape constants.
//!
//! `CHUNK_WIDTH`/`CHUNK_HEIGHT` fix the voxel grid shape referenced
//! throughout `world::chunk` and `world::mesh`.

/// Horizontal chunk extent (X and Z).
pub const CHUNK_WIDTH: u32 = 16;
/// Vertical chunk extent (Y). Chunks span the full world height.
pub const CHUNK_HEIGHT: u32 = 256;

pub const VOXELS_PER_CHUNK: usize = (CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT) as usize;

/// Full light level (brightest).
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Default bounded-cache TTL, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
