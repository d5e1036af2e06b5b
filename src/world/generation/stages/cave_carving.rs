use crate::constants::CHUNK_WIDTH;
use crate::world::core::BlockId;
use crate::world::generation::{GeneratorContext, GeneratorStage};

const CAVE_SCALE: f64 = 0.04;
const CAVE_THRESHOLD: f64 = 0.62;
const BEDROCK_LEVEL: i32 = 0;

/// Carves tunnels by setting voxels to air wherever 3-D noise crosses a
/// threshold. Never touches the bedrock floor.
#[derive(Default)]
pub struct CaveCarving;

impl GeneratorStage for CaveCarving {
    fn name(&self) -> &'static str {
        "cave_carving"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let origin = ctx.world_origin;
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let top = ctx.height_at(x, z);
                for y in (BEDROCK_LEVEL + 1)..top {
                    let world_x = (origin.x + x) as f64;
                    let world_y = (origin.y + y) as f64;
                    let world_z = (origin.z + z) as f64;
                    let n = ctx.noise.sample_3d(world_x * CAVE_SCALE, world_y * CAVE_SCALE, world_z * CAVE_SCALE);
                    if n.abs() > CAVE_THRESHOLD {
                        ctx.chunk
                            .set_block(x, y, z, BlockId::AIR, false)
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::Chunk;
    use crate::world::core::{BlockRegistry, BlockTypeBuilder, ChunkCoordinate};
    use crate::world::noise::NoiseSource;

    #[test]
    fn never_removes_bedrock() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let bedrock = registry.register(BlockTypeBuilder::new("bedrock"));
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(11), 11);
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                ctx.set_height_at(x, z, 40);
                ctx.chunk.set_block(x, 0, z, bedrock, false).unwrap();
                for y in 1..40 {
                    ctx.chunk.set_block(x, y, z, stone, false).unwrap();
                }
            }
        }
        CaveCarving.execute(&mut ctx).unwrap();
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                assert_eq!(ctx.chunk.get_block(x, 0, z).unwrap(), bedrock);
            }
        }
    }
}
