//! Narrow interfaces to the external systems this crate never owns:
//! texture atlases, the work-scheduling runtime, the graphics uploader, and
//! the frame clock.
//!
//! The streaming controller and mesh builder are generic over these traits
//! so this crate has zero knowledge of wgpu, asset loading, or any
//! particular executor.

use crate::world::core::ChunkCoordinate;

/// A rectangle in normalized atlas-texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    pub base: [f32; 2],
    pub size: [f32; 2],
}

impl AtlasRegion {
    pub const FALLBACK: AtlasRegion = AtlasRegion { base: [0.0, 0.0], size: [1.0, 1.0] };
}

/// Resolves `(atlas, tile)` references recorded on a `BlockType` into UV
/// rectangles. Owned by whatever loaded the atlas image, outside this crate.
/// `Send + Sync` because the mesh builder runs on a worker thread.
pub trait AtlasLookup: Send + Sync {
    fn get_region(&self, atlas: &str, tile: u32) -> Option<AtlasRegion>;
}

/// Opaque handle to a unit of work dispatched on the host's task runtime.
pub trait JobHandle: Send {
    fn is_complete(&self) -> bool;
    fn cancel(&self);
}

/// Schedules generation/meshing work without this crate knowing whether the
/// runtime is a thread pool, an async executor, or something else.
pub trait TaskScheduler {
    fn schedule(&self, coord: ChunkCoordinate, job: Box<dyn FnOnce() + Send>) -> Box<dyn JobHandle>;
}

/// Uploads a built `ChunkMeshData` to the GPU and disposes of it later. The
/// mesh builder never touches a graphics API directly.
pub trait GraphicsUploader {
    type Handle: Send + Sync;
    fn upload_mesh(&self, coord: ChunkCoordinate, mesh: &crate::world::mesh::ChunkMeshData) -> Self::Handle;
    fn dispose(&self, handle: Self::Handle);
}

/// Frame/tick timing, supplied by the host loop.
pub trait Clock {
    fn delta_seconds(&self) -> f32;
}
