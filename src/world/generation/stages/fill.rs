use crate::constants::CHUNK_WIDTH;
use crate::world::core::BlockId;
use crate::world::generation::{GeneratorContext, GeneratorStage};

const BEDROCK_LEVEL: i32 = 0;
const DIRT_BAND: i32 = 4;
const SNOW_LINE: i32 = 100;

/// Looks up a block by name, falling back to air and logging once per call
/// site when the registry doesn't have it (a world built without a full
/// block set still generates, just without that layer).
fn block_id(registry: &crate::world::core::BlockRegistry, name: &str) -> BlockId {
    registry
        .get_by_name(name)
        .map(|b| b.id)
        .unwrap_or_else(|| {
            log::warn!("fill stage: block '{}' not registered, using air", name);
            BlockId::AIR
        })
}

/// Turns the heightmap into voxels: a bedrock floor, a stone body, a dirt
/// band, and a grass or snow cap depending on altitude.
#[derive(Default)]
pub struct Fill;

impl GeneratorStage for Fill {
    fn name(&self) -> &'static str {
        "fill"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let bedrock = block_id(ctx.registry, "bedrock");
        let stone = block_id(ctx.registry, "stone");
        let dirt = block_id(ctx.registry, "dirt");
        let grass = block_id(ctx.registry, "grass");
        let snow = block_id(ctx.registry, "snow");

        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let top = ctx.height_at(x, z).clamp(0, crate::constants::CHUNK_HEIGHT as i32 - 1);
                for y in 0..=top {
                    let id = if y <= BEDROCK_LEVEL {
                        bedrock
                    } else if y == top {
                        if top >= SNOW_LINE {
                            snow
                        } else {
                            grass
                        }
                    } else if y > top - DIRT_BAND {
                        dirt
                    } else {
                        stone
                    };
                    ctx.chunk
                        .set_block(x, y, z, id, false)
                        .map_err(|e| e.to_string())?;
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

    fn registry_with_terrain_blocks() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry.register(BlockTypeBuilder::new("bedrock"));
        registry.register(BlockTypeBuilder::new("stone"));
        registry.register(BlockTypeBuilder::new("dirt"));
        registry.register(BlockTypeBuilder::new("grass"));
        registry.register(BlockTypeBuilder::new("snow"));
        registry
    }

    #[test]
    fn writes_bedrock_stone_dirt_grass_column() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = registry_with_terrain_blocks();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(1), 1);
        ctx.set_height_at(0, 0, 20);
        Fill.execute(&mut ctx).unwrap();

        let bedrock = registry.get_by_name("bedrock").unwrap().id;
        let stone = registry.get_by_name("stone").unwrap().id;
        let dirt = registry.get_by_name("dirt").unwrap().id;
        let grass = registry.get_by_name("grass").unwrap().id;

        assert_eq!(ctx.chunk.get_block(0, 0, 0).unwrap(), bedrock);
        assert_eq!(ctx.chunk.get_block(0, 10, 0).unwrap(), stone);
        assert_eq!(ctx.chunk.get_block(0, 18, 0).unwrap(), dirt);
        assert_eq!(ctx.chunk.get_block(0, 20, 0).unwrap(), grass);
        assert_eq!(ctx.chunk.get_block(0, 21, 0).unwrap(), BlockId::AIR);
    }

    #[test]
    fn caps_with_snow_above_snow_line() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = registry_with_terrain_blocks();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(1), 1);
        ctx.set_height_at(3, 3, SNOW_LINE + 5);
        Fill.execute(&mut ctx).unwrap();
        let snow = registry.get_by_name("snow").unwrap().id;
        assert_eq!(ctx.chunk.get_block(3, SNOW_LINE + 5, 3).unwrap(), snow);
    }
}
