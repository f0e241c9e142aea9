//! Per-draw lighting and material state for the shared scene shader.
//!
//! The shader exposes a fixed uniform surface (two lights, ambient term,
//! texture/blend controls); [`apply_lights`] and [`apply_material`] write
//! that state. The values persist on the program until overwritten, so the
//! renderer restores [`Material::default`] at the start of every object's
//! render block to keep blend factors and UV scales from leaking into
//! unrelated draws.

use glam::{Vec2, Vec3, Vec4};
use serde::Deserialize;

use crate::abs::ShaderProgram;

/// Scene-wide ambient term, applied once per light accumulation.
pub const AMBIENT_STRENGTH: f32 = 0.8;
pub const AMBIENT_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// One of the two point lights shining on a drawn object.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Light {
    pub color: Vec3,
    pub position: Vec3,
    #[serde(default)]
    pub specular_intensity: f32,
    #[serde(default = "highlight_default")]
    pub highlight_size: f32,
}

fn highlight_default() -> f32 {
    1.0
}

/// Per-draw surface state: textured or flat-colored, with two-texture
/// blending and independent UV tiling per texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub has_texture: bool,
    pub object_color: Vec4,
    pub blend_factor: f32,
    pub uv_scale: Vec2,
    pub uv_scale2: Vec2,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            has_texture: true,
            object_color: Vec4::ONE,
            blend_factor: 0.0,
            uv_scale: Vec2::ONE,
            uv_scale2: Vec2::ONE,
        }
    }
}

/// Uploads both lights. May be called before or after [`apply_material`];
/// the state persists until overwritten.
pub fn apply_lights(program: &ShaderProgram, light1: &Light, light2: &Light) {
    program.set_uniform("light1Color", light1.color);
    program.set_uniform("light1Position", light1.position);
    program.set_uniform("specularIntensity1", light1.specular_intensity);
    program.set_uniform("highlightSize1", light1.highlight_size);

    program.set_uniform("light2Color", light2.color);
    program.set_uniform("light2Position", light2.position);
    program.set_uniform("specularIntensity2", light2.specular_intensity);
    program.set_uniform("highlightSize2", light2.highlight_size);
}

/// Uploads the per-draw material state.
pub fn apply_material(program: &ShaderProgram, material: &Material) {
    program.set_uniform("ubHasTexture", material.has_texture);
    program.set_uniform("objectColor", material.object_color);
    program.set_uniform("blendFactor", material.blend_factor);
    program.set_uniform("uvScale", material.uv_scale);
    program.set_uniform("UvScale2", material.uv_scale2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults_do_not_blend_or_tile() {
        let material = Material::default();
        assert_eq!(material.blend_factor, 0.0);
        assert_eq!(material.uv_scale, Vec2::ONE);
        assert_eq!(material.uv_scale2, Vec2::ONE);
    }

    #[test]
    fn test_light_deserializes_with_optional_specular() {
        let light: Light = serde_json::from_str(
            r#"{"color": [0.3, 0.3, 0.3], "position": [5.0, 2.0, 10.0]}"#,
        )
        .unwrap();
        assert_eq!(light.color, Vec3::splat(0.3));
        assert_eq!(light.specular_intensity, 0.0);
        assert_eq!(light.highlight_size, 1.0);
    }
}
