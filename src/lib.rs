//! A voxel world core: chunk storage, terrain generation, lighting, and
//! greedy meshing, streamed around a moving viewer.
//!
//! This crate owns none of the surrounding engine: rendering, asset
//! loading, task scheduling and the frame clock are all injected through
//! the narrow collaborator traits in [`world::collaborators`].

pub mod constants;
pub mod error;
pub mod world;

pub use error::{CoreError, CoreResult};
pub use world::{
    AtlasLookup, AtlasRegion, BlockId, BlockRegistry, BlockType, BlockTypeBuilder, Chunk,
    ChunkCache, ChunkCoordinate, ChunkMeshData, Clock, Face, GenerationPipeline, GeneratorStage,
    GraphicsUploader, JobHandle, LocalPos, NoiseSource, Ray, RayonScheduler, RaycastHit,
    StreamingConfig, StreamingController, TaskScheduler, WorldPos,
};
