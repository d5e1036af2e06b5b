use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a block type. `0` is reserved for air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockId(pub u16);

unsafe impl bytemuck::Pod for BlockId {}
unsafe impl bytemuck::Zeroable for BlockId {}

impl Default for BlockId {
    fn default() -> Self {
        BlockId::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);

    pub const fn new(id: u16) -> Self {
        BlockId(id)
    }

    pub fn is_air(&self) -> bool {
        *self == BlockId::AIR
    }
}

/// One of the six faces of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
    ];

    /// `(dx, dy, dz)` offset from a voxel to its neighbor across this face.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Face::Top => (0, 1, 0),
            Face::Bottom => (0, -1, 0),
            Face::Front => (0, 0, 1),
            Face::Back => (0, 0, -1),
            Face::Left => (-1, 0, 0),
            Face::Right => (1, 0, 0),
        }
    }

    /// Shader-facing direction index, per the mesh builder's lighting pack:
    /// Front=0, Back=1, Right=2, Left=3, Top=4, Bottom=5.
    pub fn direction_index(&self) -> u8 {
        match self {
            Face::Front => 0,
            Face::Back => 1,
            Face::Right => 2,
            Face::Left => 3,
            Face::Top => 4,
            Face::Bottom => 5,
        }
    }

    pub fn opposite(&self) -> Face {
        match self {
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
        }
    }
}

/// Which texture lookup a face falls back to when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    All,
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl From<Face> for FaceKind {
    fn from(f: Face) -> Self {
        match f {
            Face::Top => FaceKind::Top,
            Face::Bottom => FaceKind::Bottom,
            Face::Front => FaceKind::Front,
            Face::Back => FaceKind::Back,
            Face::Left => FaceKind::Left,
            Face::Right => FaceKind::Right,
        }
    }
}

/// How a block's geometry is streamed by the mesh builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderType {
    Solid,
    Billboard,
    Item,
    Fluid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8 { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Rgb8::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Rgba8::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_default_block() {
        assert_eq!(BlockId::default(), BlockId::AIR);
        assert!(BlockId::AIR.is_air());
    }

    #[test]
    fn faces_have_opposite_offsets() {
        for face in Face::ALL {
            let (dx, dy, dz) = face.offset();
            let (ox, oy, oz) = face.opposite().offset();
            assert_eq!((dx + ox, dy + oy, dz + oz), (0, 0, 0));
        }
    }

    #[test]
    fn direction_indices_match_shader_packing() {
        assert_eq!(Face::Front.direction_index(), 0);
        assert_eq!(Face::Back.direction_index(), 1);
        assert_eq!(Face::Right.direction_index(), 2);
        assert_eq!(Face::Left.direction_index(), 3);
        assert_eq!(Face::Top.direction_index(), 4);
        assert_eq!(Face::Bottom.direction_index(), 5);
    }
}
