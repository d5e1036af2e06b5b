//! The voxel world core: chunk storage, generation, lighting, meshing, and
//! the streaming controller that ties them together for a host renderer.

pub mod cache;
pub mod chunk;
pub mod collaborators;
pub mod core;
pub mod generation;
pub mod lighting;
pub mod mesh;
pub mod noise;
pub mod scheduler;
pub mod streaming;

pub use cache::{ChunkCache, ChunkPin, SharedChunk};
pub use chunk::{Actionable, Chunk};
pub use collaborators::{AtlasLookup, AtlasRegion, Clock, GraphicsUploader, JobHandle, TaskScheduler};
pub use core::{
    AtlasRef, BlockId, BlockRegistry, BlockType, BlockTypeBuilder, ChunkCoordinate, Face, FaceKind,
    LocalPos, Ray, RaycastHit, RenderType, Rgb8, Rgba8, TextureSet, WorldPos,
};
pub use generation::{
    default_pipeline, CaveCarving, Decoration, Erosion, Fill, GenerationPipeline, GeneratorContext,
    GeneratorStage, Heightmap, LightingSeed, SurfacePainting,
};
pub use mesh::{build_chunk_mesh, ChunkMeshData, FaceKey, GeometryStream, MeshVertex, QuadWinding};
pub use noise::NoiseSource;
pub use scheduler::RayonScheduler;
pub use streaming::{StreamingConfig, StreamingController};
