//! Single-chunk BFS light propagator.

use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH, MAX_LIGHT_LEVEL};
use crate::world::chunk::Chunk;
use crate::world::core::{BlockRegistry, BlockType, Face, LocalPos, Rgb8};
use std::collections::VecDeque;

/// `true` when a block blocks sunlight: solid, not transparent, not a
/// billboard, and not rendered as an item. Glass, billboards and items let
/// sun through.
fn blocks_sunlight(t: &BlockType) -> bool {
    !t.is_transparent && !t.is_billboard && t.render_type != crate::world::core::RenderType::Item
}

/// Decay subtracted crossing into a neighbor of this type: 2 for fluids, 1
/// otherwise, infinite (no entry) for opaque solids.
fn decay_into(t: &BlockType) -> Option<u8> {
    if t.is_opaque {
        None
    } else if t.is_liquid {
        Some(2)
    } else {
        Some(1)
    }
}

/// Recomputes `chunk.light_level`/`light_color` from scratch: zero, seed
/// sunlight top-down per column and emissive sources, then BFS-propagate
/// with per-step decay. Clears `is_lighting_dirty` and sets `is_mesh_dirty`
/// on completion.
pub fn propagate(chunk: &mut Chunk, registry: &BlockRegistry) {
    chunk.zero_light();
    let mut queue: VecDeque<LocalPos> = VecDeque::new();

    seed_sunlight(chunk, registry, &mut queue);
    seed_emissive(chunk, registry, &mut queue);

    while let Some(pos) = queue.pop_front() {
        let current = chunk
            .get_light_level(pos.x, pos.y, pos.z)
            .expect("dequeued position was in bounds");
        if current == 0 {
            continue;
        }
        for face in Face::ALL {
            let (dx, dy, dz) = face.offset();
            let (nx, ny, nz) = (pos.x + dx, pos.y + dy, pos.z + dz);
            let neighbor_local = LocalPos::new(nx, ny, nz);
            if !neighbor_local.in_bounds() {
                continue;
            }
            let neighbor_block = chunk
                .get_block(nx, ny, nz)
                .expect("neighbor_local.in_bounds() was just checked");
            let neighbor_type = registry.get_by_id(neighbor_block);
            let Some(decay) = decay_into(neighbor_type) else {
                continue;
            };
            if current <= decay {
                continue;
            }
            let candidate = current - decay;
            let existing = chunk
                .get_light_level(nx, ny, nz)
                .expect("neighbor_local.in_bounds() was just checked");
            if candidate > existing {
                chunk
                    .set_light_level(nx, ny, nz, candidate)
                    .expect("neighbor_local.in_bounds() was just checked");
                queue.push_back(neighbor_local);
            }
        }
    }

    chunk.is_lighting_dirty = false;
    chunk.is_mesh_dirty = true;
}

fn seed_sunlight(chunk: &mut Chunk, registry: &BlockRegistry, queue: &mut VecDeque<LocalPos>) {
    for z in 0..CHUNK_WIDTH as i32 {
        for x in 0..CHUNK_WIDTH as i32 {
            for y in (0..CHUNK_HEIGHT as i32).rev() {
                let block = chunk.get_block(x, y, z).expect("column scan stays in bounds");
                let block_type = registry.get_by_id(block);
                if blocks_sunlight(block_type) {
                    break;
                }
                chunk
                    .set_light_level(x, y, z, MAX_LIGHT_LEVEL)
                    .expect("column scan stays in bounds");
                queue.push_back(LocalPos::new(x, y, z));
            }
        }
    }
}

fn seed_emissive(chunk: &mut Chunk, registry: &BlockRegistry, queue: &mut VecDeque<LocalPos>) {
    let emitters: Vec<(LocalPos, u8, Rgb8)> = chunk
        .iter_blocks()
        .filter_map(|(pos, id)| {
            if id.is_air() {
                return None;
            }
            let block_type = registry.get_by_id(id);
            if block_type.emits_light == 0 {
                return None;
            }
            let color = if block_type.emits_color.is_opaque() {
                Rgb8::new(block_type.emits_color.r, block_type.emits_color.g, block_type.emits_color.b)
            } else {
                Rgb8::WHITE
            };
            Some((pos, block_type.emits_light.min(MAX_LIGHT_LEVEL), color))
        })
        .collect();

    for (pos, level, color) in emitters {
        let existing = chunk
            .get_light_level(pos.x, pos.y, pos.z)
            .expect("positions come from iter_blocks, always in bounds");
        if level > existing {
            chunk
                .set_light_level(pos.x, pos.y, pos.z, level)
                .expect("positions come from iter_blocks, always in bounds");
            chunk
                .set_light_color(pos.x, pos.y, pos.z, color)
                .expect("positions come from iter_blocks, always in bounds");
            queue.push_back(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockTypeBuilder, ChunkCoordinate};

    #[test]
    fn open_sky_column_is_fully_lit() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = BlockRegistry::new();
        propagate(&mut chunk, &registry);
        for y in 0..CHUNK_HEIGHT as i32 {
            assert_eq!(chunk.get_light_level(0, y, 0).unwrap(), MAX_LIGHT_LEVEL);
        }
    }

    #[test]
    fn sealed_cave_with_emitter_lights_only_nearby_voxels() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        let mut glow = BlockTypeBuilder::new("glowstone");
        glow.is_light_source = true;
        glow.emits_light = 15;
        let glow = registry.register(glow);

        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                for y in 0..CHUNK_HEIGHT as i32 {
                    chunk.set_block(x, y, z, stone, false).unwrap();
                }
            }
        }
        chunk.set_block(8, 8, 8, glow, false).unwrap();

        propagate(&mut chunk, &registry);

        assert_eq!(chunk.get_light_level(8, 8, 8).unwrap(), 15);
        assert_eq!(chunk.get_light_level(0, 0, 0).unwrap(), 0);
        assert!(chunk.get_light_level(9, 8, 8).unwrap() < 15);
    }

    #[test]
    fn sunlight_stops_at_blocking_roof() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                chunk.set_block(x, 200, z, stone, false).unwrap();
            }
        }

        propagate(&mut chunk, &registry);

        assert_eq!(chunk.get_light_level(0, 255, 0).unwrap(), MAX_LIGHT_LEVEL);
        assert_eq!(chunk.get_light_level(0, 199, 0).unwrap(), 0);
    }

    #[test]
    fn sunlight_through_a_window_reaches_the_floor_while_the_roofed_room_stays_dark() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        // A solid roof over the whole chunk except a single open column.
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                if x == 8 && z == 8 {
                    continue;
                }
                chunk.set_block(x, 200, z, stone, false).unwrap();
            }
        }

        propagate(&mut chunk, &registry);

        assert_eq!(chunk.get_light_level(8, 0, 8).unwrap(), MAX_LIGHT_LEVEL, "the open column should carry full sunlight to the floor");
        assert_eq!(chunk.get_light_level(0, 0, 0).unwrap(), 0, "a roofed column away from the window should stay dark");
    }

    #[test]
    fn clears_lighting_dirty_and_marks_mesh_dirty() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let registry = BlockRegistry::new();
        chunk.is_mesh_dirty = false;
        propagate(&mut chunk, &registry);
        assert!(!chunk.is_lighting_dirty);
        assert!(chunk.is_mesh_dirty);
    }
}
