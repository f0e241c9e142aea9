//! Declarative scene description.
//!
//! The diorama is not rendered from hardcoded transform literals; it is an
//! ordered list of object records parsed from an embedded JSON asset. Each
//! record names a mesh shape, up to two textures, a lighting setup and the
//! scale/rotate/translate placement of every part, and the renderer is a pure
//! function over this data.

use glam::{Vec2, Vec3, Vec4};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::abs::WrapMode;
use crate::render::material::{Light, Material};
use crate::render::meshes::{DrawSpec, Shape};
use crate::transform::TransformSpec;

/// The fixed diorama layout shipped with the viewer.
pub const SCENE_JSON: &str = include_str!("assets/scene.json");

/// Texture coordinate wrapping requested by the scene file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapDef {
    Repeat,
    ClampToEdge,
}

impl WrapDef {
    pub fn mode(self) -> WrapMode {
        match self {
            WrapDef::Repeat => WrapMode::Repeat,
            WrapDef::ClampToEdge => WrapMode::ClampToEdge,
        }
    }
}

/// One entry of the scene's texture table.
#[derive(Debug, Clone, Deserialize)]
pub struct TextureDef {
    pub path: String,
    #[serde(default)]
    pub wrap: Option<WrapDef>,
}

/// One drawable part of a scene object: a shape, its surface state and one or
/// more placements (multi-instance parts share material and draw list).
#[derive(Debug, Clone, Deserialize)]
pub struct PartDef {
    pub shape: Shape,
    /// Texture names bound to units 0 and 1, in order. Empty means the part
    /// is flat-colored through `object_color`.
    #[serde(default)]
    pub textures: Vec<String>,
    #[serde(default = "color_white")]
    pub object_color: Vec4,
    #[serde(default)]
    pub blend_factor: f32,
    #[serde(default = "uv_one")]
    pub uv_scale: Vec2,
    #[serde(default = "uv_one")]
    pub uv_scale2: Vec2,
    pub transforms: Vec<TransformSpec>,
    pub draw: Vec<DrawSpec>,
}

fn color_white() -> Vec4 {
    Vec4::ONE
}

fn uv_one() -> Vec2 {
    Vec2::ONE
}

impl PartDef {
    /// The per-draw material state this part needs.
    pub fn material(&self) -> Material {
        Material {
            has_texture: !self.textures.is_empty(),
            object_color: self.object_color,
            blend_factor: self.blend_factor,
            uv_scale: self.uv_scale,
            uv_scale2: self.uv_scale2,
        }
    }
}

/// A named grouping of parts lit by its own two lights, optionally placed
/// under a shared anchor translation.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub lights: [Light; 2],
    #[serde(default)]
    pub anchor: Option<Vec3>,
    pub parts: Vec<PartDef>,
}

/// The whole diorama: an ordered texture table and an ordered object list.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDef {
    pub textures: IndexMap<String, TextureDef>,
    pub objects: Vec<ObjectDef>,
}

impl SceneDef {
    /// Parses and validates a scene description.
    pub fn parse(s: &str) -> Result<Self, String> {
        let scene: SceneDef = serde_json::from_str(s).map_err(|e| e.to_string())?;
        scene.validate()?;
        Ok(scene)
    }

    /// Semantic checks serde cannot express: texture references must be
    /// declared, a part binds at most two texture units, and every draw must
    /// name a range its shape actually has.
    fn validate(&self) -> Result<(), String> {
        for object in &self.objects {
            for part in &object.parts {
                if part.textures.len() > 2 {
                    return Err(format!(
                        "object '{}' binds {} textures to one part, at most 2 are supported",
                        object.name,
                        part.textures.len()
                    ));
                }
                for texture in &part.textures {
                    if !self.textures.contains_key(texture) {
                        return Err(format!(
                            "object '{}' references undeclared texture '{}'",
                            object.name, texture
                        ));
                    }
                }
                if part.transforms.is_empty() {
                    return Err(format!("object '{}' has a part with no placement", object.name));
                }
                if part.draw.is_empty() {
                    return Err(format!("object '{}' has a part with no draw calls", object.name));
                }
                for draw in &part.draw {
                    if !draw.valid_for(part.shape) {
                        return Err(format!(
                            "object '{}': draw {:?} is not valid for shape {:?}",
                            object.name, draw, part.shape
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_scene_parses_and_validates() {
        let scene = SceneDef::parse(SCENE_JSON).unwrap();
        assert!(!scene.objects.is_empty());
        assert!(!scene.textures.is_empty());
    }

    #[test]
    fn test_embedded_scene_object_order_is_stable() {
        let scene = SceneDef::parse(SCENE_JSON).unwrap();
        let names: Vec<_> = scene.objects.iter().map(|o| o.name.as_str()).collect();
        // the table and board render early, the pieces follow in file order
        assert_eq!(names.first(), Some(&"table"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_ne!(names, sorted, "order must come from the file, not a sort");
    }

    #[test]
    fn test_undeclared_texture_is_rejected() {
        let json = r#"{
            "textures": {},
            "objects": [{
                "name": "ghost",
                "lights": [
                    {"color": [1,1,1], "position": [0,0,10]},
                    {"color": [1,1,1], "position": [10,0,0]}
                ],
                "parts": [{
                    "shape": "box",
                    "textures": ["missing"],
                    "transforms": [{}],
                    "draw": ["elements"]
                }]
            }]
        }"#;
        let err = SceneDef::parse(json).unwrap_err();
        assert!(err.contains("undeclared texture 'missing'"), "{err}");
    }

    #[test]
    fn test_draw_shape_mismatch_is_rejected() {
        let json = r#"{
            "textures": {},
            "objects": [{
                "name": "bad",
                "lights": [
                    {"color": [1,1,1], "position": [0,0,10]},
                    {"color": [1,1,1], "position": [10,0,0]}
                ],
                "parts": [{
                    "shape": "sphere",
                    "transforms": [{}],
                    "draw": [{"face": "top"}]
                }]
            }]
        }"#;
        let err = SceneDef::parse(json).unwrap_err();
        assert!(err.contains("not valid for shape"), "{err}");
    }

    #[test]
    fn test_untextured_part_material_uses_object_color() {
        let json = r#"{
            "textures": {},
            "objects": [{
                "name": "flat",
                "lights": [
                    {"color": [1,1,1], "position": [0,0,10]},
                    {"color": [1,1,1], "position": [10,0,0]}
                ],
                "parts": [{
                    "shape": "box",
                    "object_color": [0.2, 0.4, 0.6, 1.0],
                    "transforms": [{}],
                    "draw": ["elements"]
                }]
            }]
        }"#;
        let scene = SceneDef::parse(json).unwrap();
        let material = scene.objects[0].parts[0].material();
        assert!(!material.has_texture);
        assert_eq!(material.object_color, Vec4::new(0.2, 0.4, 0.6, 1.0));
        assert_eq!(material.blend_factor, 0.0);
        assert_eq!(material.uv_scale, Vec2::ONE);
    }

    #[test]
    fn test_every_embedded_part_passes_material_defaults_unless_blending() {
        let scene = SceneDef::parse(SCENE_JSON).unwrap();
        for object in &scene.objects {
            for part in &object.parts {
                let material = part.material();
                assert!((0.0..=1.0).contains(&material.blend_factor));
                if part.textures.len() < 2 {
                    // a single-texture part must not blend in the unit-1 sampler
                    assert_eq!(material.blend_factor, 0.0, "object '{}'", object.name);
                }
            }
        }
    }
}
