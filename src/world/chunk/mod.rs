//! The in-memory chunk store: block grid, light grid, and per-chunk dirty
//! flags.

use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH, VOXELS_PER_CHUNK};
use crate::error::{CoreError, CoreResult};
use crate::world::core::{BlockId, ChunkCoordinate, Face, LocalPos, Rgb8};
use std::any::Any;
use std::collections::HashMap;

/// Opaque side-table payload for interactive blocks (chests, furnaces, ...).
/// The core never inspects these; they exist only so callers can stash
/// arbitrary state keyed by voxel without the core needing to know its shape.
pub trait Actionable: Any + Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// A fixed-size `CHUNK_WIDTH x CHUNK_HEIGHT x CHUNK_WIDTH` voxel volume.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoordinate,
    blocks: Vec<BlockId>,
    light_level: Vec<u8>,
    light_color: Vec<Rgb8>,
    block_count: u32,
    pub is_mesh_dirty: bool,
    pub is_lighting_dirty: bool,
    pub is_modified: bool,
    actionables: HashMap<usize, Box<dyn Actionable>>,
}

impl Chunk {
    pub fn new(coord: ChunkCoordinate) -> Self {
        Self {
            coord,
            blocks: vec![BlockId::AIR; VOXELS_PER_CHUNK],
            light_level: vec![0; VOXELS_PER_CHUNK],
            light_color: vec![Rgb8::WHITE; VOXELS_PER_CHUNK],
            block_count: 0,
            is_mesh_dirty: true,
            is_lighting_dirty: true,
            is_modified: false,
            actionables: HashMap::new(),
        }
    }

    pub fn coord(&self) -> ChunkCoordinate {
        self.coord
    }

    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    fn check_bounds(x: i32, y: i32, z: i32) -> CoreResult<LocalPos> {
        let local = LocalPos::new(x, y, z);
        if local.in_bounds() {
            Ok(local)
        } else {
            Err(CoreError::OutOfBounds {
                x,
                y,
                z,
                width: CHUNK_WIDTH,
                height: CHUNK_HEIGHT,
            })
        }
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> CoreResult<BlockId> {
        let local = Self::check_bounds(x, y, z)?;
        Ok(self.blocks[local.linear_index()])
    }

    /// Sets a block, updating `block_count` and the dirty flags. `affects_light`
    /// should be true when the old or new block's occlusion/emission differs
    /// (callers that don't have registry access handy may conservatively pass
    /// `true`; the streaming controller's edit path always knows).
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, affects_light: bool) -> CoreResult<()> {
        let local = Self::check_bounds(x, y, z)?;
        let idx = local.linear_index();
        let previous = self.blocks[idx];
        if previous == id {
            return Ok(());
        }
        match (previous.is_air(), id.is_air()) {
            (true, false) => self.block_count += 1,
            (false, true) => self.block_count -= 1,
            _ => {}
        }
        self.blocks[idx] = id;
        self.is_mesh_dirty = true;
        if affects_light {
            self.is_lighting_dirty = true;
        }
        Ok(())
    }

    pub fn get_light_level(&self, x: i32, y: i32, z: i32) -> CoreResult<u8> {
        let local = Self::check_bounds(x, y, z)?;
        Ok(self.light_level[local.linear_index()])
    }

    pub fn set_light_level(&mut self, x: i32, y: i32, z: i32, level: u8) -> CoreResult<()> {
        let local = Self::check_bounds(x, y, z)?;
        self.light_level[local.linear_index()] = level.min(15);
        Ok(())
    }

    pub fn get_light_color(&self, x: i32, y: i32, z: i32) -> CoreResult<Rgb8> {
        let local = Self::check_bounds(x, y, z)?;
        Ok(self.light_color[local.linear_index()])
    }

    pub fn set_light_color(&mut self, x: i32, y: i32, z: i32, color: Rgb8) -> CoreResult<()> {
        let local = Self::check_bounds(x, y, z)?;
        self.light_color[local.linear_index()] = color;
        Ok(())
    }

    /// Reads a voxel adjacent to `(x, y, z)` across `face`, but only when
    /// that neighbor is still inside this chunk. Returns `None` when the
    /// face crosses the chunk boundary (never when the voxel is merely air).
    pub fn try_get_adjacent_block(&self, x: i32, y: i32, z: i32, face: Face) -> Option<BlockId> {
        let (dx, dy, dz) = face.offset();
        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
        let local = LocalPos::new(nx, ny, nz);
        if local.in_bounds() {
            Some(self.blocks[local.linear_index()])
        } else {
            None
        }
    }

    pub fn actionable(&self, local_index: usize) -> Option<&dyn Actionable> {
        self.actionables.get(&local_index).map(|b| b.as_ref())
    }

    pub fn set_actionable(&mut self, local_index: usize, value: Box<dyn Actionable>) {
        self.actionables.insert(local_index, value);
    }

    pub fn remove_actionable(&mut self, local_index: usize) -> Option<Box<dyn Actionable>> {
        self.actionables.remove(&local_index)
    }

    /// Iterates `(LocalPos, BlockId)` for every voxel; used by generation
    /// stages, the light propagator, and the mesh builder.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (LocalPos, BlockId)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .map(|(idx, &id)| (LocalPos::from_linear_index(idx), id))
    }

    pub fn blocks_slice(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn light_slice(&self) -> &[u8] {
        &self.light_level
    }

    pub fn zero_light(&mut self) {
        self.light_level.iter_mut().for_each(|l| *l = 0);
    }
}
