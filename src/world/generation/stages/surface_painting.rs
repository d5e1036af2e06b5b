use crate::constants::CHUNK_WIDTH;
use crate::world::generation::{GeneratorContext, GeneratorStage};

const SEA_LEVEL: i32 = 62;
const BEACH_BAND: i32 = 3;
const SNOW_LINE: i32 = 100;

/// Repaints each column's exposed top block by altitude: sand near sea
/// level, snow above the snow line, grass otherwise.
#[derive(Default)]
pub struct SurfacePainting;

impl GeneratorStage for SurfacePainting {
    fn name(&self) -> &'static str {
        "surface_painting"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let sand = ctx.registry.get_by_name("sand").map(|b| b.id);
        let snow = ctx.registry.get_by_name("snow").map(|b| b.id);

        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let top = ctx.height_at(x, z);
                if top < 0 || top >= crate::constants::CHUNK_HEIGHT as i32 {
                    continue;
                }
                let replacement = if (SEA_LEVEL - BEACH_BAND..=SEA_LEVEL + BEACH_BAND).contains(&top) {
                    sand
                } else if top >= SNOW_LINE {
                    snow
                } else {
                    None
                };
                if let Some(id) = replacement {
                    let current = ctx.chunk.get_block(x, top, z).map_err(|e| e.to_string())?;
                    if !current.is_air() {
                        ctx.chunk.set_block(x, top, z, id, false).map_err(|e| e.to_string())?;
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
    fn paints_sand_near_sea_level() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let grass = registry.register(BlockTypeBuilder::new("grass"));
        registry.register(BlockTypeBuilder::new("sand"));
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(2), 2);
        ctx.set_height_at(0, 0, SEA_LEVEL);
        ctx.chunk.set_block(0, SEA_LEVEL, 0, grass, false).unwrap();
        SurfacePainting.execute(&mut ctx).unwrap();
        let sand = registry.get_by_name("sand").unwrap().id;
        assert_eq!(ctx.chunk.get_block(0, SEA_LEVEL, 0).unwrap(), sand);
    }
}
