//! Greedy mesh builder: turns a chunk's voxel grid into four
//! independent geometry streams (solid, billboard, item, fluid).

mod vertex;

pub use vertex::{ChunkMeshData, FaceKey, GeometryStream, MeshVertex, QuadWinding};

use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH, MAX_LIGHT_LEVEL};
use crate::world::chunk::Chunk;
use crate::world::collaborators::{AtlasLookup, AtlasRegion};
use crate::world::core::{BlockRegistry, BlockType, ChunkCoordinate, Face, FaceKind, LocalPos, Rgb8, RenderType, WorldPos};

const FLUID_TINT: [u8; 4] = [100, 150, 255, 200];
const AMBIENT_DIM: f32 = 0.08;
const LEAK_FACTOR: f32 = 0.45;

/// Builds the four geometry streams for `chunk`. `neighbor` resolves a
/// face-adjacent chunk coordinate to its loaded chunk, or `None` when it
/// isn't resident (a boundary face is then always emitted).
pub fn build_chunk_mesh<'n>(
    chunk: &Chunk,
    registry: &BlockRegistry,
    atlas: &dyn AtlasLookup,
    neighbor: impl Fn(ChunkCoordinate) -> Option<&'n Chunk>,
) -> ChunkMeshData {
    let mut mesh = ChunkMeshData::default();

    mesh_axis_faces(chunk, registry, atlas, &neighbor, Axis::Y, &mut mesh.solid);
    mesh_axis_faces(chunk, registry, atlas, &neighbor, Axis::X, &mut mesh.solid);
    mesh_axis_faces(chunk, registry, atlas, &neighbor, Axis::Z, &mut mesh.solid);

    mesh_billboards(chunk, registry, atlas, &mut mesh.billboard);
    mesh_items(chunk, registry, atlas, &mut mesh.item);
    mesh_fluids(chunk, registry, atlas, &neighbor, &mut mesh.fluid);

    mesh
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn faces(self) -> (Face, Face) {
        match self {
            Axis::X => (Face::Left, Face::Right),
            Axis::Y => (Face::Bottom, Face::Top),
            Axis::Z => (Face::Back, Face::Front),
        }
    }

    fn layer_count(self) -> i32 {
        match self {
            Axis::X | Axis::Z => CHUNK_WIDTH as i32,
            Axis::Y => CHUNK_HEIGHT as i32,
        }
    }

    fn dims(self) -> (i32, i32) {
        match self {
            Axis::X => (CHUNK_WIDTH as i32, CHUNK_HEIGHT as i32), // u=z, v=y
            Axis::Y => (CHUNK_WIDTH as i32, CHUNK_WIDTH as i32),  // u=x, v=z
            Axis::Z => (CHUNK_WIDTH as i32, CHUNK_HEIGHT as i32), // u=x, v=y
        }
    }
}

/// Owning-voxel local coordinates for a mask cell `(layer, u, v)` on `axis`.
fn owning_local(axis: Axis, layer: i32, u: i32, v: i32) -> (i32, i32, i32) {
    match axis {
        Axis::X => (layer, v, u), // x=layer, y=v, z=u
        Axis::Y => (u, layer, v), // x=u, y=layer, z=v
        Axis::Z => (u, v, layer), // x=u, y=v, z=layer
    }
}

/// `+1`/`-1` step of `face` along its own axis.
fn layer_step(face: Face) -> i32 {
    match face {
        Face::Top | Face::Front | Face::Right => 1,
        Face::Bottom | Face::Back | Face::Left => -1,
    }
}

fn is_solid_at(chunk: &Chunk, registry: &BlockRegistry, x: i32, y: i32, z: i32) -> bool {
    let local = LocalPos::new(x, y, z);
    if !local.in_bounds() {
        return false;
    }
    match chunk.get_block(x, y, z) {
        Ok(id) => !id.is_air() && registry.get_by_id(id).is_solid,
        Err(_) => false,
    }
}

fn sunlight_blocker_at(chunk: &Chunk, registry: &BlockRegistry, x: i32, y: i32, z: i32) -> bool {
    let local = LocalPos::new(x, y, z);
    if !local.in_bounds() {
        return false;
    }
    match chunk.get_block(x, y, z) {
        Ok(id) => {
            if id.is_air() {
                return false;
            }
            let t = registry.get_by_id(id);
            !t.is_transparent && !t.is_billboard && t.render_type != RenderType::Item
        }
        Err(_) => false,
    }
}

fn column_open_above(chunk: &Chunk, registry: &BlockRegistry, x: i32, y: i32, z: i32) -> bool {
    for scan_y in (y + 1)..CHUNK_HEIGHT as i32 {
        if sunlight_blocker_at(chunk, registry, x, scan_y, z) {
            return false;
        }
    }
    true
}

/// Tangential leak offsets from(Top/Bottom don't
/// leak; they're either lit or not).
fn leak_offsets(face: Face) -> &'static [(i32, i32)] {
    match face {
        Face::Front => &[(0, 1), (0, 2), (1, 1), (-1, 1)],
        Face::Back => &[(0, -1), (0, -2), (1, -1), (-1, -1)],
        Face::Left => &[(-1, 0), (-2, 0), (-1, 1), (-1, -1)],
        Face::Right => &[(1, 0), (2, 0), (1, 1), (1, -1)],
        Face::Top | Face::Bottom => &[],
    }
}

fn sky_factor(chunk: &Chunk, registry: &BlockRegistry, x: i32, y: i32, z: i32, face: Face, ao: f32) -> f32 {
    let open = column_open_above(chunk, registry, x, y, z);
    let mut sky = if open { ao } else { ao * AMBIENT_DIM };
    for (dx, dz) in leak_offsets(face) {
        let (lx, lz) = (x + dx, z + dz);
        if (0..CHUNK_WIDTH as i32).contains(&lx) && (0..CHUNK_WIDTH as i32).contains(&lz) && column_open_above(chunk, registry, lx, y, lz) {
            sky = sky.max(ao * LEAK_FACTOR);
        }
    }
    sky
}

fn propagated_light_factor(chunk: &Chunk, x: i32, y: i32, z: i32) -> f32 {
    let level = chunk.get_light_level(x, y, z).unwrap_or(0);
    if chunk.is_lighting_dirty && level == MAX_LIGHT_LEVEL {
        0.0
    } else {
        level as f32 / MAX_LIGHT_LEVEL as f32
    }
}

fn pack_light(light: f32, color: Rgb8, face: Face) -> [u8; 4] {
    let light = light.clamp(0.0, 1.0);
    [
        (color.r as f32 * light).round() as u8,
        (color.g as f32 * light).round() as u8,
        (color.b as f32 * light).round() as u8,
        face.direction_index(),
    ]
}

fn atlas_uv(atlas: &dyn AtlasLookup, block: &BlockType, face: Face) -> AtlasRegion {
    match block.texture_set.lookup(FaceKind::from(face)) {
        Some(reference) => atlas.get_region(&reference.atlas, reference.tile).unwrap_or_else(|| {
            log::warn!("atlas region missing for {}@{}", reference.atlas, reference.tile);
            AtlasRegion::FALLBACK
        }),
        None => AtlasRegion::FALLBACK,
    }
}

fn corner_position(axis: Axis, face: Face, layer: i32, cu: i32, cv: i32) -> [f32; 3] {
    let layer_pos = if layer_step(face) > 0 { layer + 1 } else { layer };
    let (x, y, z) = match axis {
        Axis::X => (layer_pos, cv, cu),
        Axis::Y => (cu, layer_pos, cv),
        Axis::Z => (cu, cv, layer_pos),
    };
    [x as f32, y as f32, z as f32]
}

fn face_visible<'n>(
    chunk: &Chunk,
    registry: &BlockRegistry,
    coord: ChunkCoordinate,
    local: LocalPos,
    face: Face,
    this_type: &BlockType,
    neighbor: &impl Fn(ChunkCoordinate) -> Option<&'n Chunk>,
) -> bool {
    let neighbor_id = if let Some(id) = chunk.try_get_adjacent_block(local.x, local.y, local.z, face) {
        Some(id)
    } else {
        let world = WorldPos::from_chunk_local(coord, local);
        let (dx, dy, dz) = face.offset();
        let neighbor_world = WorldPos::new(world.x + dx, world.y + dy, world.z + dz);
        match neighbor(neighbor_world.chunk()) {
            Some(other) => {
                let nlocal = neighbor_world.local();
                other.get_block(nlocal.x, nlocal.y, nlocal.z).ok()
            }
            None => None,
        }
    };

    let Some(id) = neighbor_id else {
        return true; // unknown neighbor chunk: edge is always visible
    };
    if id.is_air() {
        return true;
    }
    let neighbor_type = registry.get_by_id(id);
    let base_visible = !neighbor_type.is_solid || neighbor_type.is_transparent || neighbor_type.is_billboard || neighbor_type.render_type == RenderType::Item;
    if this_type.render_type == RenderType::Fluid && neighbor_type.is_liquid {
        false
    } else {
        base_visible
    }
}

fn greedy_merge(mask: &mut [Option<FaceKey>], dim_u: i32, dim_v: i32) -> Vec<(i32, i32, i32, i32, FaceKey)> {
    let (du, dv) = (dim_u as usize, dim_v as usize);
    let mut quads = Vec::new();
    let mut v = 0usize;
    while v < dv {
        let mut u = 0usize;
        while u < du {
            let idx = v * du + u;
            if let Some(key) = mask[idx] {
                let mut span_u = 1usize;
                while u + span_u < du && mask[v * du + u + span_u] == Some(key) {
                    span_u += 1;
                }
                let mut span_v = 1usize;
                'grow: while v + span_v < dv {
                    for k in 0..span_u {
                        if mask[(v + span_v) * du + u + k] != Some(key) {
                            break 'grow;
                        }
                    }
                    span_v += 1;
                }
                for dv_ in 0..span_v {
                    for du_ in 0..span_u {
                        mask[(v + dv_) * du + u + du_] = None;
                    }
                }
                quads.push((u as i32, v as i32, span_u as i32, span_v as i32, key));
                u += span_u;
            } else {
                u += 1;
            }
        }
        v += 1;
    }
    quads
}

fn corner_ao(chunk: &Chunk, registry: &BlockRegistry, axis: Axis, face: Face, outside_layer: i32, cu: i32, cv: i32, su: i32, sv: i32, dim_u: i32, dim_v: i32) -> f32 {
    let own_ou = if su == 1 { 0 } else { -1 };
    let own_ov = if sv == 1 { 0 } else { -1 };
    let mut solid_count = 0;
    for ou in [-1, 0] {
        for ov in [-1, 0] {
            if ou == own_ou && ov == own_ov {
                continue;
            }
            let (u, v) = (cu + ou, cv + ov);
            if u < 0 || v < 0 || u >= dim_u || v >= dim_v {
                continue;
            }
            let (x, y, z) = owning_local(axis, outside_layer, u, v);
            if is_solid_at(chunk, registry, x, y, z) {
                solid_count += 1;
            }
        }
    }
    1.0 - (solid_count as f32 / 3.0) * 0.7
}

fn mesh_axis_faces<'n>(
    chunk: &Chunk,
    registry: &BlockRegistry,
    atlas: &dyn AtlasLookup,
    neighbor: &impl Fn(ChunkCoordinate) -> Option<&'n Chunk>,
    axis: Axis,
    out: &mut GeometryStream,
) {
    let coord = chunk.coord();
    let (neg_face, pos_face) = axis.faces();
    let (dim_u, dim_v) = axis.dims();

    for face in [neg_face, pos_face] {
        for layer in 0..axis.layer_count() {
            let mut mask: Vec<Option<FaceKey>> = vec![None; (dim_u * dim_v) as usize];
            for v in 0..dim_v {
                for u in 0..dim_u {
                    let (x, y, z) = owning_local(axis, layer, u, v);
                    let id = match chunk.get_block(x, y, z) {
                        Ok(id) => id,
                        Err(_) => continue,
                    };
                    if id.is_air() {
                        continue;
                    }
                    let block_type = registry.get_by_id(id);
                    if block_type.render_type != RenderType::Solid {
                        continue;
                    }
                    let local = LocalPos::new(x, y, z);
                    if !face_visible(chunk, registry, coord, local, face, block_type, neighbor) {
                        continue;
                    }
                    let light_level = chunk.get_light_level(x, y, z).unwrap_or(0);
                    let light_color = chunk.get_light_color(x, y, z).unwrap_or(Rgb8::WHITE);
                    mask[(v * dim_u + u) as usize] = Some(FaceKey { block_id: id, light_level, light_color });
                }
            }

            let quads = greedy_merge(&mut mask, dim_u, dim_v);
            let outside_layer = layer + layer_step(face);
            for (u, v, span_u, span_v, key) in quads {
                let block_type = registry.get_by_id(key.block_id);
                let region = atlas_uv(atlas, block_type, face);
                let corners = [(u, v, 1, 1), (u + span_u, v, -1, 1), (u + span_u, v + span_v, -1, -1), (u, v + span_v, 1, -1)];
                let mut verts = [MeshVertex::new([0.0; 3], [0.0; 2], region.base, region.size, [0; 4]); 4];
                for (i, (cu, cv, su, sv)) in corners.iter().enumerate() {
                    let ao = corner_ao(chunk, registry, axis, face, outside_layer, *cu, *cv, *su, *sv, dim_u, dim_v);
                    let (sx, sy, sz) = owning_local(axis, layer, (*cu).clamp(0, dim_u - 1), (*cv).clamp(0, dim_v - 1));
                    let sky = sky_factor(chunk, registry, sx, sy, sz, face, ao);
                    let propagated = propagated_light_factor(chunk, sx, sy, sz);
                    let light = propagated.max(sky);
                    // Atlas V is flipped once here rather than per-sample in the shader.
                    let uv = [((*cu - u) as f32), (span_v - (*cv - v)) as f32];
                    verts[i] = MeshVertex::new(corner_position(axis, face, layer, *cu, *cv), uv, region.base, region.size, pack_light(light, key.light_color, face));
                }
                let winding = if matches!(face, Face::Top | Face::Bottom) { QuadWinding::TopBottom } else { QuadWinding::Side };
                out.push_quad(verts, winding);
            }
        }
    }
}

fn mesh_billboards(chunk: &Chunk, registry: &BlockRegistry, atlas: &dyn AtlasLookup, out: &mut GeometryStream) {
    for (local, id) in chunk.iter_blocks() {
        if id.is_air() {
            continue;
        }
        let block_type = registry.get_by_id(id);
        if !block_type.is_billboard {
            continue;
        }
        let region = atlas_uv(atlas, block_type, Face::Top);
        let light_color = chunk.get_light_color(local.x, local.y, local.z).unwrap_or(Rgb8::WHITE);
        let propagated = propagated_light_factor(chunk, local.x, local.y, local.z);
        let color = pack_light(propagated, light_color, Face::Top);
        let cx = local.x as f32 + 0.5;
        let cz = local.z as f32 + 0.5;
        let (y0, y1) = (local.y as f32, local.y as f32 + 1.0);
        let half = 0.5_f32;

        let quad_a = [
            MeshVertex::new([cx - half, y0, cz - half], [0.0, 1.0], region.base, region.size, color),
            MeshVertex::new([cx + half, y0, cz + half], [1.0, 1.0], region.base, region.size, color),
            MeshVertex::new([cx + half, y1, cz + half], [1.0, 0.0], region.base, region.size, color),
            MeshVertex::new([cx - half, y1, cz - half], [0.0, 0.0], region.base, region.size, color),
        ];
        let quad_b = [
            MeshVertex::new([cx - half, y0, cz + half], [0.0, 1.0], region.base, region.size, color),
            MeshVertex::new([cx + half, y0, cz - half], [1.0, 1.0], region.base, region.size, color),
            MeshVertex::new([cx + half, y1, cz - half], [1.0, 0.0], region.base, region.size, color),
            MeshVertex::new([cx - half, y1, cz + half], [0.0, 0.0], region.base, region.size, color),
        ];
        out.push_quad(quad_a, QuadWinding::Side);
        out.push_quad(quad_b, QuadWinding::Side);
    }
}

fn mesh_items(chunk: &Chunk, registry: &BlockRegistry, atlas: &dyn AtlasLookup, out: &mut GeometryStream) {
    for (local, id) in chunk.iter_blocks() {
        if id.is_air() {
            continue;
        }
        let block_type = registry.get_by_id(id);
        if block_type.render_type != RenderType::Item {
            continue;
        }
        let region = atlas_uv(atlas, block_type, Face::Top);
        let light_color = chunk.get_light_color(local.x, local.y, local.z).unwrap_or(Rgb8::WHITE);
        let propagated = propagated_light_factor(chunk, local.x, local.y, local.z);
        let color = pack_light(propagated, light_color, Face::Top);
        let center = [local.x as f32 + 0.5, local.y as f32 + 0.5, local.z as f32 + 0.5];
        // All four vertices share `center`; `uv` carries the corner index so
        // the shader can reconstruct camera-facing tangent offsets.
        let verts = [
            MeshVertex::new(center, [0.0, 0.0], region.base, region.size, color),
            MeshVertex::new(center, [1.0, 0.0], region.base, region.size, color),
            MeshVertex::new(center, [1.0, 1.0], region.base, region.size, color),
            MeshVertex::new(center, [0.0, 1.0], region.base, region.size, color),
        ];
        out.push_quad(verts, QuadWinding::Side);
    }
}

fn mesh_fluids<'n>(
    chunk: &Chunk,
    registry: &BlockRegistry,
    atlas: &dyn AtlasLookup,
    neighbor: &impl Fn(ChunkCoordinate) -> Option<&'n Chunk>,
    out: &mut GeometryStream,
) {
    let coord = chunk.coord();
    for (local, id) in chunk.iter_blocks() {
        if id.is_air() {
            continue;
        }
        let block_type = registry.get_by_id(id);
        if block_type.render_type != RenderType::Fluid {
            continue;
        }
        for face in Face::ALL {
            if !face_visible(chunk, registry, coord, local, face, block_type, neighbor) {
                continue;
            }
            let region = atlas_uv(atlas, block_type, face);
            let is_top = face == Face::Top;
            let (x0, y0, z0) = (local.x as f32, local.y as f32, local.z as f32);
            let (x1, y1, z1) = (x0 + 1.0, y0 + 1.0, z0 + 1.0);
            let corners: [[f32; 3]; 4] = match face {
                Face::Top => [[x0, y1, z0], [x1, y1, z0], [x1, y1, z1], [x0, y1, z1]],
                Face::Bottom => [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
                Face::Front => [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
                Face::Back => [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
                Face::Left => [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
                Face::Right => [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
            };
            let uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
            let verts = [
                MeshVertex::new(corners[0], uvs[0], region.base, region.size, FLUID_TINT).with_flags(is_top as u8),
                MeshVertex::new(corners[1], uvs[1], region.base, region.size, FLUID_TINT).with_flags(is_top as u8),
                MeshVertex::new(corners[2], uvs[2], region.base, region.size, FLUID_TINT).with_flags(is_top as u8),
                MeshVertex::new(corners[3], uvs[3], region.base, region.size, FLUID_TINT).with_flags(is_top as u8),
            ];
            let winding = if matches!(face, Face::Top | Face::Bottom) { QuadWinding::TopBottom } else { QuadWinding::Side };
            out.push_quad(verts, winding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{BlockId, BlockTypeBuilder};

    struct NoAtlas;
    impl AtlasLookup for NoAtlas {
        fn get_region(&self, _atlas: &str, _tile: u32) -> Option<AtlasRegion> {
            Some(AtlasRegion::FALLBACK)
        }
    }

    #[test]
    fn single_exposed_block_in_open_air_has_six_visible_faces() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        chunk.set_block(5, 5, 5, stone, true).unwrap();
        let mesh = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        // 6 faces, each a single quad (4 verts / 6 indices) since nothing else
        // shares a FaceKey with it.
        assert_eq!(mesh.solid.vertices.len(), 24);
        assert_eq!(mesh.solid.indices.len(), 36);
    }

    #[test]
    fn fully_buried_block_has_no_visible_faces() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        for z in 4..=6 {
            for y in 4..=6 {
                for x in 4..=6 {
                    chunk.set_block(x, y, z, stone, true).unwrap();
                }
            }
        }
        let mesh = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        // Only the outer shell is visible; the center voxel contributes nothing,
        // but we just check the center voxel's faces didn't leak through by
        // confirming total vertex count is far below "all 27 voxels fully
        // exposed" (27*24).
        assert!(mesh.solid.vertices.len() < 27 * 24);
        assert!(!mesh.solid.is_empty());
    }

    #[test]
    fn coplanar_flat_floor_merges_into_one_quad() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                chunk.set_block(x, 0, z, stone, true).unwrap();
            }
        }
        let mesh = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        // The top face of the floor should merge into a single 16x16 quad.
        let top_quads = mesh.solid.indices.len() / 6;
        assert!(top_quads < (CHUNK_WIDTH * CHUNK_WIDTH) as usize, "greedy merge should reduce quad count well below one-per-voxel");
    }

    #[test]
    fn billboard_block_produces_two_crossed_quads() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let mut flower = BlockTypeBuilder::new("flower");
        flower.is_solid = false;
        flower.is_billboard = true;
        flower.render_type = RenderType::Billboard;
        let flower = registry.register(flower);
        chunk.set_block(3, 3, 3, flower, false).unwrap();
        let mesh = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        assert_eq!(mesh.billboard.vertices.len(), 8);
        assert!(mesh.solid.is_empty());
        let _ = BlockId::AIR;
    }

    #[test]
    fn meshing_the_same_chunk_twice_is_byte_identical() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        let dirt = registry.register(BlockTypeBuilder::new("dirt"));
        for z in 0..CHUNK_WIDTH as i32 {
            for x in 0..CHUNK_WIDTH as i32 {
                chunk.set_block(x, 0, z, stone, true).unwrap();
                chunk.set_block(x, 1, z, dirt, true).unwrap();
            }
        }
        let first = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        let second = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);

        assert_eq!(bytemuck::cast_slice::<_, u8>(&first.solid.vertices), bytemuck::cast_slice::<_, u8>(&second.solid.vertices));
        assert_eq!(first.solid.indices, second.solid.indices);
    }

    #[test]
    fn a_neighbor_chunk_present_across_the_boundary_culls_the_shared_face() {
        let mut near = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut far = Chunk::new(ChunkCoordinate::new(1, 0, 0));
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        near.set_block(CHUNK_WIDTH as i32 - 1, 5, 5, stone, true).unwrap();
        far.set_block(0, 5, 5, stone, true).unwrap();

        let without_neighbor = build_chunk_mesh(&near, &registry, &NoAtlas, |_| None);
        let with_neighbor = build_chunk_mesh(&near, &registry, &NoAtlas, |c| if c == far.coord() { Some(&far) } else { None });

        assert!(
            with_neighbor.solid.vertices.len() < without_neighbor.solid.vertices.len(),
            "the +X face should be culled once the neighbor reports a solid block there"
        );
    }

    #[test]
    fn fluid_does_not_merge_and_culls_against_other_fluid() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0));
        let mut registry = BlockRegistry::new();
        let mut water = BlockTypeBuilder::new("water");
        water.is_liquid = true;
        water.is_solid = false;
        water.render_type = RenderType::Fluid;
        let water = registry.register(water);
        chunk.set_block(0, 0, 0, water, false).unwrap();
        chunk.set_block(1, 0, 0, water, false).unwrap();
        let mesh = build_chunk_mesh(&chunk, &registry, &NoAtlas, |_| None);
        // The shared face between the two water blocks must be culled.
        let expected_faces_per_block = 6;
        assert!(mesh.fluid.vertices.len() < 2 * expected_faces_per_block * 4);
    }
}
