use crate::constants::CHUNK_WIDTH;
use crate::world::generation::{GeneratorContext, GeneratorStage};

/// World-space Y the heightmap curve oscillates around.
const BASE_HEIGHT: f64 = 64.0;
/// Maximum deviation from `BASE_HEIGHT` contributed by the fractal sum.
const AMPLITUDE: f64 = 40.0;
const SCALE: f64 = 0.006;
const OCTAVES: u32 = 4;
const PERSISTENCE: f64 = 0.5;

/// Samples multi-octave noise to fill the scratch heightmap. Never touches
/// `ctx.chunk` directly — `Fill` is the stage that turns these heights into
/// actual block writes.
#[derive(Default)]
pub struct Heightmap;

impl GeneratorStage for Heightmap {
    fn name(&self) -> &'static str {
        "heightmap"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let origin = ctx.world_origin;
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let world_x = (origin.x + x) as f64;
                let world_z = (origin.z + z) as f64;
                let n = ctx.noise.octaves_2d(world_x, world_z, OCTAVES, PERSISTENCE, SCALE);
                let height = (BASE_HEIGHT + n * AMPLITUDE).round() as i32;
                ctx.set_height_at(x, z, height);
            }
        }
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
    fn fills_every_column_with_a_plausible_height() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = BlockRegistry::new();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(5), 5);
        Heightmap.execute(&mut ctx).unwrap();
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let h = ctx.height_at(x, z);
                assert!((BASE_HEIGHT as i32 - AMPLITUDE as i32 - 1..=BASE_HEIGHT as i32 + AMPLITUDE as i32 + 1).contains(&h));
            }
        }
    }
}
