use crate::world::core::BlockId;
use crate::world::core::Rgb8;

/// Packed per-vertex data for all four geometry streams. 40
/// bytes wide; `flags` is stream-specific (unused for solid/billboard/item,
/// the fluid top-face marker for fluid geometry).
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub tile_base: [f32; 2],
    pub tile_size: [f32; 2],
    pub color: [u8; 4],
    pub flags: u8,
    pub _pad: [u8; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], tile_base: [f32; 2], tile_size: [f32; 2], color: [u8; 4]) -> Self {
        Self {
            position,
            uv,
            tile_base,
            tile_size,
            color,
            flags: 0,
            _pad: [0; 3],
        }
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
}

/// Grouping key used while greedily merging mask cells: two cells merge iff
/// their keys are bitwise equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceKey {
    pub block_id: BlockId,
    pub light_level: u8,
    pub light_color: Rgb8,
}

/// A (vertices, indices) pair for one render path.
#[derive(Debug, Clone, Default)]
pub struct GeometryStream {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Top/Bottom faces wind `(0,1,2)+(0,2,3)`; side faces wind `(0,2,1)+(0,3,2)`
/// so the same corner order yields an outward normal either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadWinding {
    TopBottom,
    Side,
}

impl GeometryStream {
    /// Appends a quad in CCW-from-outside order for `winding`. `verts` must
    /// already be in the matching per-face corner order.
    pub fn push_quad(&mut self, verts: [MeshVertex; 4], winding: QuadWinding) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&verts);
        let idx = match winding {
            QuadWinding::TopBottom => [base, base + 1, base + 2, base, base + 2, base + 3],
            QuadWinding::Side => [base, base + 2, base + 1, base, base + 3, base + 2],
        };
        self.indices.extend_from_slice(&idx);
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// The four independent geometry streams produced per chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMeshData {
    pub solid: GeometryStream,
    pub billboard: GeometryStream,
    pub item: GeometryStream,
    pub fluid: GeometryStream,
}
