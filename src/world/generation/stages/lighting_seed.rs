use crate::world::generation::{GeneratorContext, GeneratorStage};

/// Marks the chunk's lighting as dirty so the propagator runs
/// before the mesh builder ever sees it.
pub struct LightingSeed;

impl GeneratorStage for LightingSeed {
    fn name(&self) -> &'static str {
        "lighting_seed"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        ctx.chunk.is_lighting_dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::Chunk;
    use crate::world::core::{BlockRegistry, ChunkCoordinate};
    use crate::world::noise::NoiseSource;

    #[test]
    fn marks_lighting_dirty() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        chunk.is_lighting_dirty = false;
        let registry = BlockRegistry::new();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(1), 1);
        LightingSeed.execute(&mut ctx).unwrap();
        assert!(ctx.chunk.is_lighting_dirty);
    }
}
