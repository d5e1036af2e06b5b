use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::world::core::BlockId;
use crate::world::generation::{GeneratorContext, GeneratorStage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const FLOWER_CHANCE: f64 = 0.01;
const TREE_CHANCE: f64 = 0.004;
const TREE_EDGE_MARGIN: i32 = 2;

/// Places discrete features — flowers and small trees — on grass columns,
/// at positions that are random but reproducible for a given world seed and
/// chunk coordinate.
#[derive(Default)]
pub struct Decoration;

impl GeneratorStage for Decoration {
    fn name(&self) -> &'static str {
        "decoration"
    }

    fn execute(&self, ctx: &mut GeneratorContext) -> Result<(), String> {
        let grass = match ctx.registry.get_by_name("grass") {
            Some(b) => b.id,
            None => return Ok(()),
        };
        let flower = ctx.registry.get_by_name("flower").map(|b| b.id);
        let log = ctx.registry.get_by_name("log").map(|b| b.id);
        let leaves = ctx.registry.get_by_name("leaves").map(|b| b.id);

        let coord = ctx.chunk.coord();
        let chunk_seed = (ctx.seed as u64)
            ^ ((coord.cx as u64) << 1)
            ^ ((coord.cy as u64) << 21)
            ^ ((coord.cz as u64) << 41);
        let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed);

        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                let top = ctx.height_at(x, z);
                if top < 0 || top >= CHUNK_HEIGHT as i32 - 1 {
                    continue;
                }
                if ctx.chunk.get_block(x, top, z).map_err(|e| e.to_string())? != grass {
                    continue;
                }
                let roll: f64 = rng.gen();
                if roll < FLOWER_CHANCE {
                    if let Some(id) = flower {
                        ctx.chunk.set_block(x, top + 1, z, id, false).map_err(|e| e.to_string())?;
                    }
                } else if roll < FLOWER_CHANCE + TREE_CHANCE
                    && (TREE_EDGE_MARGIN..CHUNK_WIDTH as i32 - TREE_EDGE_MARGIN).contains(&x)
                    && (TREE_EDGE_MARGIN..CHUNK_WIDTH as i32 - TREE_EDGE_MARGIN).contains(&z)
                {
                    if let (Some(log_id), Some(leaves_id)) = (log, leaves) {
                        self.place_tree(ctx, x, top, z, log_id, leaves_id, &mut rng)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Decoration {
    fn place_tree(
        &self,
        ctx: &mut GeneratorContext,
        x: i32,
        top: i32,
        z: i32,
        log: BlockId,
        leaves: BlockId,
        rng: &mut ChaCha8Rng,
    ) -> Result<(), String> {
        let trunk_height = rng.gen_range(4..=6);
        if top + trunk_height + 2 >= CHUNK_HEIGHT as i32 {
            return Ok(());
        }
        for dy in 1..=trunk_height {
            ctx.chunk.set_block(x, top + dy, z, log, false).map_err(|e| e.to_string())?;
        }
        let canopy_y = top + trunk_height;
        for dz in -1..=1 {
            for dx in -1..=1 {
                for dy in 0..=1 {
                    let (lx, ly, lz) = (x + dx, canopy_y + dy, z + dz);
                    if ctx.chunk.get_block(lx, ly, lz).map_err(|e| e.to_string())?.is_air() {
                        ctx.chunk.set_block(lx, ly, lz, leaves, false).map_err(|e| e.to_string())?;
                    }
                }
            }
        }
        ctx.chunk
            .set_block(x, canopy_y + 2, z, leaves, false)
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::Chunk;
    use crate::world::core::{BlockRegistry, BlockTypeBuilder, ChunkCoordinate};
    use crate::world::noise::NoiseSource;

    fn registry_with_decor_blocks() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry.register(BlockTypeBuilder::new("grass"));
        registry.register(BlockTypeBuilder::new("flower"));
        registry.register(BlockTypeBuilder::new("log"));
        registry.register(BlockTypeBuilder::new("leaves"));
        registry
    }

    #[test]
    fn same_seed_and_coordinate_places_identical_decorations() {
        let registry = registry_with_decor_blocks();
        let grass = registry.get_by_name("grass").unwrap().id;

        let run = || {
            let mut chunk = Chunk::new(ChunkCoordinate::new(4, 0, -1));
            for z in 0..CHUNK_WIDTH as i32 {
                for x in 0..CHUNK_WIDTH as i32 {
                    chunk.set_block(x, 64, z, grass, false).unwrap();
                }
            }
            let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(9), 9);
            for z in 0..CHUNK_WIDTH as i32 {
                for x in 0..CHUNK_WIDTH as i32 {
                    ctx.set_height_at(x, z, 64);
                }
            }
            Decoration.execute(&mut ctx).unwrap();
            chunk.blocks_slice().to_vec()
        };

        let a = run();
        let b = run();
        assert_eq!(a, b);
    }

    #[test]
    fn does_nothing_without_a_grass_block_registered() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = BlockRegistry::new();
        let mut ctx = GeneratorContext::new(&mut chunk, &registry, NoiseSource::new(1), 1);
        Decoration.execute(&mut ctx).unwrap();
        assert_eq!(ctx.chunk.block_count(), 0);
    }
}
