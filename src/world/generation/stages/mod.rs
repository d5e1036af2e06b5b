//! The seven default generator stages, one per file, plus
//! `default_pipeline` which assembles them in order.

mod cave_carving;
mod decoration;
mod erosion;
mod fill;
mod heightmap;
mod lighting_seed;
mod surface_painting;

pub use cave_carving::CaveCarving;
pub use decoration::Decoration;
pub use erosion::Erosion;
pub use fill::Fill;
pub use heightmap::Heightmap;
pub use lighting_seed::LightingSeed;
pub use surface_painting::SurfacePainting;

use super::pipeline::GenerationPipeline;
use std::sync::Arc;

/// Builds a pipeline with the seven stages in their default order.
pub fn default_pipeline() -> GenerationPipeline {
    let pipeline = GenerationPipeline::new();
    pipeline.add_stage(Arc::new(Heightmap::default()));
    pipeline.add_stage(Arc::new(Erosion::default()));
    pipeline.add_stage(Arc::new(Fill::default()));
    pipeline.add_stage(Arc::new(CaveCarving::default()));
    pipeline.add_stage(Arc::new(SurfacePainting::default()));
    pipeline.add_stage(Arc::new(Decoration::default()));
    pipeline.add_stage(Arc::new(LightingSeed));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_has_stages_in_spec_order() {
        let pipeline = default_pipeline();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "heightmap",
                "erosion",
                "fill",
                "cave_carving",
                "surface_painting",
                "decoration",
                "lighting_seed",
            ]
        );
    }
}
