use crate::constants::CHUNK_WIDTH;
use crate::world::generation::{GeneratorContext, GeneratorStage};

const PERTURB_SCALE: f64 = 0.05;
const PERTURB_STRENGTH: f64 = 1.5;

/// Smooths the heightmap in place by averaging each column with its
/// in-chunk neighbors, perturbed by a small noise term so terraces don't
/// form dead-flat plateaus.
#[derive(Default)]
pub struct Erosion;

impl GeneratorStage for Erosion {
    fn name(&self) -> &'static str {
        "erosion"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let width = CHUNK_WIDTH as i32;
        let original: Vec<i32> = (0..width * width)
            .map(|i| ctx.heightmap[i as usize])
            .collect();
        let sample = |x: i32, z: i32| -> i32 {
            if (0..width).contains(&x) && (0..width).contains(&z) {
                original[GeneratorContext::heightmap_index(x, z)]
            } else {
                original[GeneratorContext::heightmap_index(x.clamp(0, width - 1), z.clamp(0, width - 1))]
            }
        };

        for z in 0..width {
            for x in 0..width {
                let world_x = (ctx.world_origin.x + x) as f64;
                let world_z = (ctx.world_origin.z + z) as f64;
                let perturb = ctx.noise.sample_2d(world_x * PERTURB_SCALE, world_z * PERTURB_SCALE)
                    * PERTURB_STRENGTH;
                let neighbor_sum = sample(x - 1, z)
                    + sample(x + 1, z)
                    + sample(x, z - 1)
                    + sample(x, z + 1)
                    + sample(x, z);
                let averaged = neighbor_sum as f64 / 5.0 + perturb;
                ctx.set_height_at(x, z, averaged.round() as i32);
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
    fn smooths_a_sharp_spike() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = BlockRegistry::new();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(3), 3);
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                ctx.set_height_at(x, z, 64);
            }
        }
        ctx.set_height_at(8, 8, 200);
        Erosion.execute(&mut ctx).unwrap();
        assert!(ctx.height_at(8, 8) < 200, "spike should be averaged down");
    }
}
