use super::block::{BlockId, Face};
use super::coord::WorldPos;
use glam::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Result of a successful `StreamingController::raycast` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaycastHit {
    pub block_world_pos: WorldPos,
    pub block: BlockId,
    pub face_hit: Face,
}
