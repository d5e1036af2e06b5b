use crate::constants::CHUNK_WIDTH;
use crate::world::chunk::Chunk;
use crate::world::core::BlockRegistry;
use crate::world::noise::NoiseSource;
use glam::IVec3;

/// Per-chunk, ephemeral generation state. Exclusively owned by the task
/// running the pipeline for one chunk; dropped on completion.
pub struct GeneratorContext<'a> {
    pub chunk: &'a mut Chunk,
    pub registry: &'a BlockRegistry,
    pub world_origin: IVec3,
    pub noise: NoiseSource,
    pub seed: u32,

    /// Scratch column-height map filled by `Heightmap` and consumed by
    /// later stages (`Erosion`, `Fill`, `SurfacePainting`, `Decoration`).
    /// Indexed `x + z * CHUNK_WIDTH`. World-space Y of the topmost solid
    /// block in that column.
    pub heightmap: Vec<i32>,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(
        chunk: &'a mut Chunk,
        registry: &'a BlockRegistry,
        noise: NoiseSource,
        seed: u32,
    ) -> Self {
        let world_origin = chunk.coord().world_origin();
        let heightmap = vec![0; (CHUNK_WIDTH * CHUNK_WIDTH) as usize];
        Self {
            chunk,
            registry,
            world_origin,
            noise,
            seed,
            heightmap,
        }
    }

    pub fn heightmap_index(x: i32, z: i32) -> usize {
        (x + z * CHUNK_WIDTH as i32) as usize
    }

    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        self.heightmap[Self::heightmap_index(x, z)]
    }

    pub fn set_height_at(&mut self, x: i32, z: i32, height: i32) {
        self.heightmap[Self::heightmap_index(x, z)] = height;
    }
}
