//! The terrain generation pipeline: an ordered, runtime-mutable
//! list of stages that fill a fresh chunk from a seed and coordinate.

mod context;
mod pipeline;
mod stages;

pub use context::GeneratorContext;
pub use pipeline::{GenerationPipeline, GeneratorStage};
pub use stages::{
    default_pipeline, CaveCarving, Decoration, Erosion, Fill, Heightmap, LightingSeed,
    SurfacePainting,
};
