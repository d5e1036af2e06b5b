//! Coordinate systems, block identity, and the block type registry — the
//! data model shared by every other `world` submodule.

mod block;
mod coord;
mod ray;
mod registry;

pub use block::{BlockId, Face, FaceKind, RenderType, Rgb8, Rgba8};
pub use coord::{ChunkCoordinate, LocalPos, WorldPos};
pub use ray::{Ray, RaycastHit};
pub use registry::{AtlasRef, BlockRegistry, BlockType, BlockTypeBuilder, TextureSet};
