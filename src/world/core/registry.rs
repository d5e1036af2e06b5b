//! Block type registry.
//!
//! Populated once at startup (air first), augmented by JSON definitions or
//! programmatic registration. Entries are immutable once inserted; reads
//! need no locking because the registry is treated as a process-wide
//! constant after init.

use super::block::{BlockId, FaceKind, RenderType, Rgba8};
use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::collections::HashMap;

/// A face's atlas reference: `(atlas_name, tile_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtlasRef {
    pub atlas: String,
    pub tile: u32,
}

/// Maps the six faces (plus `All`) to atlas tile references. Lookups fall
/// back to `All` when a specific face isn't set.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    pub all: Option<AtlasRef>,
    pub top: Option<AtlasRef>,
    pub bottom: Option<AtlasRef>,
    pub front: Option<AtlasRef>,
    pub back: Option<AtlasRef>,
    pub left: Option<AtlasRef>,
    pub right: Option<AtlasRef>,
}

impl TextureSet {
    pub fn lookup(&self, kind: FaceKind) -> Option<&AtlasRef> {
        let specific = match kind {
            FaceKind::All => None,
            FaceKind::Top => self.top.as_ref(),
            FaceKind::Bottom => self.bottom.as_ref(),
            FaceKind::Front => self.front.as_ref(),
            FaceKind::Back => self.back.as_ref(),
            FaceKind::Left => self.left.as_ref(),
            FaceKind::Right => self.right.as_ref(),
        };
        specific.or(self.all.as_ref())
    }
}

/// Immutable per-block properties, owned by the registry and shared
/// read-only by generation, lighting and meshing.
#[derive(Debug, Clone)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub is_solid: bool,
    pub is_transparent: bool,
    pub is_opaque: bool,
    pub is_liquid: bool,
    pub is_billboard: bool,
    pub is_breakable: bool,
    pub is_light_source: bool,
    pub emits_light: u8,
    pub emits_color: Rgba8,
    pub render_type: RenderType,
    pub texture_set: TextureSet,
    pub hardness: f32,
}

impl BlockType {
    fn air() -> Self {
        Self {
            id: BlockId::AIR,
            name: "air".to_string(),
            is_solid: false,
            is_transparent: true,
            is_opaque: false,
            is_liquid: false,
            is_billboard: false,
            is_breakable: false,
            is_light_source: false,
            emits_light: 0,
            emits_color: Rgba8::TRANSPARENT,
            render_type: RenderType::Solid,
            texture_set: TextureSet::default(),
            hardness: 0.0,
        }
    }
}

/// Builder used by `BlockRegistry::register` / `load_from_json`.
#[derive(Debug, Clone)]
pub struct BlockTypeBuilder {
    pub name: String,
    pub is_solid: bool,
    pub is_transparent: bool,
    pub is_liquid: bool,
    pub is_billboard: bool,
    pub is_breakable: bool,
    pub is_light_source: bool,
    pub emits_light: u8,
    pub emits_color: Rgba8,
    pub render_type: RenderType,
    pub texture_set: TextureSet,
    pub hardness: f32,
}

impl BlockTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_solid: true,
            is_transparent: false,
            is_liquid: false,
            is_billboard: false,
            is_breakable: true,
            is_light_source: false,
            emits_light: 0,
            emits_color: Rgba8::TRANSPARENT,
            render_type: RenderType::Solid,
            texture_set: TextureSet::default(),
            hardness: 1.0,
        }
    }

    fn build(self, id: BlockId) -> BlockType {
        // is_opaque is derived: a block occludes sight/sunlight unless it's
        // marked transparent, is a billboard, or renders as an Item.
        let is_opaque = self.is_solid
            && !self.is_transparent
            && !self.is_billboard
            && self.render_type != RenderType::Item;
        BlockType {
            id,
            name: self.name,
            is_solid: self.is_solid,
            is_transparent: self.is_transparent,
            is_opaque,
            is_liquid: self.is_liquid,
            is_billboard: self.is_billboard,
            is_breakable: self.is_breakable,
            is_light_source: self.is_light_source,
            emits_light: self.emits_light.min(15),
            emits_color: self.emits_color,
            render_type: self.render_type,
            texture_set: self.texture_set,
            hardness: self.hardness,
        }
    }
}

/// Registry mapping numeric block IDs to block types. Populated once at
/// startup; immutable thereafter.
pub struct BlockRegistry {
    by_id: HashMap<BlockId, BlockType>,
    by_name: HashMap<String, BlockId>,
    next_id: u16,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        };
        let air = BlockType::air();
        registry.by_name.insert(air.name.clone(), air.id);
        registry.by_id.insert(air.id, air);
        registry
    }

    /// Register a new block type, assigning it the next free numeric id.
    pub fn register(&mut self, builder: BlockTypeBuilder) -> BlockId {
        let id = BlockId::new(self.next_id);
        self.next_id += 1;
        let name = builder.name.clone();
        let block = builder.build(id);
        log::debug!("registered block '{}' as id {}", name, id.0);
        self.by_name.insert(name, id);
        self.by_id.insert(id, block);
        id
    }

    /// Fail-soft: returns the air block for unknown ids rather than erroring.
    pub fn get_by_id(&self, id: BlockId) -> &BlockType {
        self.by_id.get(&id).unwrap_or_else(|| {
            log::warn!("unknown block id {}; falling back to air", id.0);
            &self.by_id[&BlockId::AIR]
        })
    }

    pub fn get_by_name(&self, name: &str) -> Option<&BlockType> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    pub fn is_registered(&self, id: BlockId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Load block definitions from the bit-exact JSON format described in
    /// the external-interfaces section. Intended for init-time use only.
    pub fn load_from_json(&mut self, json: &str) -> CoreResult<Vec<BlockId>> {
        let defs: Vec<BlockDef> = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidBlockDefinition(e.to_string()))?;
        let mut ids = Vec::with_capacity(defs.len());
        for def in defs {
            ids.push(self.register(def.into_builder()));
        }
        Ok(ids)
    }
}

#[derive(Debug, Deserialize)]
struct BlockDef {
    name: String,
    #[serde(default)]
    is_solid: Option<bool>,
    #[serde(rename = "isSolid", default)]
    is_solid_camel: Option<bool>,
    #[serde(rename = "isBreakable", default)]
    is_breakable: bool,
    #[serde(rename = "isTransparent", default)]
    is_transparent: bool,
    #[serde(rename = "isBillboard", default)]
    is_billboard: bool,
    #[serde(rename = "isLiquid", default)]
    is_liquid: bool,
    #[serde(rename = "isLightSource", default)]
    is_light_source: bool,
    #[serde(rename = "emitsLight", default)]
    emits_light: u8,
    #[serde(default = "default_hardness")]
    hardness: f32,
    #[serde(default)]
    faces: HashMap<String, String>,
}

fn default_hardness() -> f32 {
    1.0
}

impl BlockDef {
    fn into_builder(self) -> BlockTypeBuilder {
        let is_solid = self.is_solid_camel.or(self.is_solid).unwrap_or(true);
        let mut texture_set = TextureSet::default();
        for (slot, value) in &self.faces {
            let atlas_ref = parse_atlas_ref(&self.name, slot, value);
            match slot.as_str() {
                "All" => texture_set.all = atlas_ref,
                "Top" => texture_set.top = atlas_ref,
                "Bottom" => texture_set.bottom = atlas_ref,
                "Front" => texture_set.front = atlas_ref,
                "Back" => texture_set.back = atlas_ref,
                "Left" => texture_set.left = atlas_ref,
                "Right" => texture_set.right = atlas_ref,
                other => log::warn!("block '{}': unknown face slot '{}'", self.name, other),
            }
        }
        BlockTypeBuilder {
            name: self.name,
            is_solid,
            is_transparent: self.is_transparent,
            is_liquid: self.is_liquid,
            is_billboard: self.is_billboard,
            is_breakable: self.is_breakable,
            is_light_source: self.is_light_source,
            emits_light: self.emits_light,
            emits_color: Rgba8::TRANSPARENT,
            render_type: if self.is_billboard {
                RenderType::Billboard
            } else if self.is_liquid {
                RenderType::Fluid
            } else {
                RenderType::Solid
            },
            texture_set,
            hardness: self.hardness,
        }
    }
}

/// Parses a `"<atlas>@<tile>"` face value. Malformed entries are logged and
/// dropped (the caller falls back to `All`) instead of failing the whole
/// load, matching `AtlasRegionMissing`'s log-once-and-substitute policy.
fn parse_atlas_ref(block_name: &str, slot: &str, value: &str) -> Option<AtlasRef> {
    match value.split_once('@') {
        Some((atlas, tile_str)) => match tile_str.parse::<u32>() {
            Ok(tile) => Some(AtlasRef {
                atlas: atlas.to_string(),
                tile,
            }),
            Err(_) => {
                log::warn!(
                    "block '{}' face '{}': non-integer tile index in '{}'",
                    block_name,
                    slot,
                    value
                );
                None
            }
        },
        None => {
            log::warn!(
                "block '{}' face '{}': malformed atlas reference '{}' (expected '<atlas>@<tile>')",
                block_name,
                slot,
                value
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_preregistered() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.get_by_name("air").unwrap().id, BlockId::AIR);
        assert!(registry.get_by_id(BlockId::AIR).is_transparent);
    }

    #[test]
    fn unknown_id_falls_back_to_air() {
        let registry = BlockRegistry::new();
        let fallback = registry.get_by_id(BlockId::new(9999));
        assert_eq!(fallback.id, BlockId::AIR);
    }

    #[test]
    fn register_assigns_increasing_ids() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(BlockTypeBuilder::new("stone"));
        let dirt = registry.register(BlockTypeBuilder::new("dirt"));
        assert_eq!(stone, BlockId::new(1));
        assert_eq!(dirt, BlockId::new(2));
    }

    #[test]
    fn load_from_json_matches_bit_exact_format() {
        let json = r#"[{
            "name": "grass",
            "isSolid": true, "isBreakable": true,
            "isTransparent": false, "isBillboard": false,
            "isLiquid": false, "isLightSource": false,
            "emitsLight": 0, "hardness": 1.0,
            "faces": {
                "All":    "blocks@535",
                "Top":    "blocks@288",
                "Bottom": "blocks@533"
            }
        }]"#;
        let mut registry = BlockRegistry::new();
        let ids = registry.load_from_json(json).unwrap();
        assert_eq!(ids.len(), 1);
        let grass = registry.get_by_name("grass").unwrap();
        assert!(grass.is_solid);
        assert!(grass.is_opaque);
        let top = grass.texture_set.lookup(FaceKind::Top).unwrap();
        assert_eq!(top.atlas, "blocks");
        assert_eq!(top.tile, 288);
        let left = grass.texture_set.lookup(FaceKind::Left).unwrap();
        assert_eq!(left.tile, 535, "missing face falls back to All");
    }

    #[test]
    fn malformed_face_reference_is_dropped_not_fatal() {
        let json = r#"[{
            "name": "weird",
            "isSolid": true,
            "faces": { "All": "no-at-sign", "Top": "blocks@notanumber" }
        }]"#;
        let mut registry = BlockRegistry::new();
        registry.load_from_json(json).unwrap();
        let weird = registry.get_by_name("weird").unwrap();
        assert!(weird.texture_set.lookup(FaceKind::All).is_none());
        assert!(weird.texture_set.lookup(FaceKind::Top).is_none());
    }
}
