use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH};
use glam::IVec3;

/// Identifies a chunk by its integer grid position. Converts to a world-space
/// origin by `(cx * CHUNK_WIDTH, cy * CHUNK_HEIGHT, cz * CHUNK_WIDTH)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoordinate {
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// World-space origin of this chunk (the corner with the smallest
    /// coordinates on every axis).
    pub fn world_origin(&self) -> IVec3 {
        IVec3::new(
            self.cx * CHUNK_WIDTH as i32,
            self.cy * CHUNK_HEIGHT as i32,
            self.cz * CHUNK_WIDTH as i32,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.cx + dx, self.cy + dy, self.cz + dz)
    }

    /// The chunk coordinate containing a world-space block position.
    pub fn from_world_block(world_x: i32, world_y: i32, world_z: i32) -> Self {
        Self::new(
            world_x.div_euclid(CHUNK_WIDTH as i32),
            world_y.div_euclid(CHUNK_HEIGHT as i32),
            world_z.div_euclid(CHUNK_WIDTH as i32),
        )
    }

    /// The six face-adjacent chunk coordinates.
    pub fn neighbors(&self) -> [ChunkCoordinate; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

/// A block position local to a single chunk, in `[0, CHUNK_WIDTH) x
/// [0, CHUNK_HEIGHT) x [0, CHUNK_WIDTH)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl LocalPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn in_bounds(&self) -> bool {
        (0..CHUNK_WIDTH as i32).contains(&self.x)
            && (0..CHUNK_HEIGHT as i32).contains(&self.y)
            && (0..CHUNK_WIDTH as i32).contains(&self.z)
    }

    /// `index(x,y,z) = x + z*S + y*(S*S)` — y-major linearization for fast
    /// column scans.
    pub fn linear_index(&self) -> usize {
        let s = CHUNK_WIDTH as i32;
        (self.x + self.z * s + self.y * s * s) as usize
    }

    pub fn from_linear_index(index: usize) -> Self {
        let s = CHUNK_WIDTH as usize;
        let plane = s * s;
        let y = index / plane;
        let rem = index % plane;
        let z = rem / s;
        let x = rem % s;
        Self::new(x as i32, y as i32, z as i32)
    }
}

/// A world-space block position (not chunk-relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn chunk(&self) -> ChunkCoordinate {
        ChunkCoordinate::from_world_block(self.x, self.y, self.z)
    }

    pub fn local(&self) -> LocalPos {
        let w = CHUNK_WIDTH as i32;
        let h = CHUNK_HEIGHT as i32;
        LocalPos::new(
            self.x.rem_euclid(w),
            self.y.rem_euclid(h),
            self.z.rem_euclid(w),
        )
    }

    pub fn from_chunk_local(coord: ChunkCoordinate, local: LocalPos) -> Self {
        let origin = coord.world_origin();
        Self::new(origin.x + local.x, origin.y + local.y, origin.z + local.z)
    }
}
