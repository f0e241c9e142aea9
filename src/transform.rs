//! Model-matrix composition from scale/rotate/translate primitives.
//!
//! Every object part in the scene carries a [`TransformSpec`]; the renderer
//! turns it into a model matrix right before the part's draw calls. The
//! composition order is fixed: scale in local space first, then the rotations
//! in the order given, then the translation, optionally re-based under a
//! parent anchor matrix. Inputs are not validated; a degenerate scale or NaN
//! angle flows straight into the matrix.

use glam::{Mat4, Vec3};
use serde::Deserialize;

/// One rotation step: an angle in degrees around an arbitrary axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rotation {
    pub angle: f32,
    pub axis: Vec3,
}

impl Rotation {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.axis.normalize(), self.angle.to_radians())
    }
}

/// Ordered scale -> rotations -> translation placement of one drawn part.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformSpec {
    #[serde(default = "scale_one")]
    pub scale: Vec3,
    #[serde(default)]
    pub rotations: Vec<Rotation>,
    #[serde(default)]
    pub translation: Vec3,
}

fn scale_one() -> Vec3 {
    Vec3::ONE
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotations: Vec::new(),
            translation: Vec3::ZERO,
        }
    }
}

impl TransformSpec {
    /// `Translation * Rotation_1 * ... * Rotation_n * Scale`. Rotations are
    /// applied in the order they appear; matrix products do not commute.
    pub fn matrix(&self) -> Mat4 {
        let mut model = Mat4::from_translation(self.translation);
        for rotation in &self.rotations {
            model *= rotation.matrix();
        }
        model * Mat4::from_scale(self.scale)
    }

    /// The model matrix re-based under a parent transform, for parts placed
    /// relative to a shared object anchor.
    pub fn matrix_under(&self, parent: Mat4) -> Mat4 {
        parent * self.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-5, "\n{a}\n!=\n{b}");
        }
    }

    #[test]
    fn test_composition_is_translate_rotate_scale() {
        let spec = TransformSpec {
            scale: Vec3::new(0.2, 0.02, 0.2),
            rotations: vec![Rotation {
                angle: -90.0,
                axis: Vec3::Y,
            }],
            translation: Vec3::new(-0.15, 0.0, 0.0),
        };
        let expected = Mat4::from_translation(Vec3::new(-0.15, 0.0, 0.0))
            * Mat4::from_axis_angle(Vec3::Y, (-90.0f32).to_radians())
            * Mat4::from_scale(Vec3::new(0.2, 0.02, 0.2));
        assert_mat_eq(spec.matrix(), expected);
    }

    #[test]
    fn test_rotation_order_is_respected() {
        let a = Rotation {
            angle: 270.0,
            axis: Vec3::Z,
        };
        let b = Rotation {
            angle: 45.0,
            axis: Vec3::X,
        };
        let ab = TransformSpec {
            rotations: vec![a, b],
            ..Default::default()
        };
        let ba = TransformSpec {
            rotations: vec![b, a],
            ..Default::default()
        };
        assert_mat_eq(ab.matrix(), a.matrix() * b.matrix());
        // swapping the order changes the result
        let diff = ab
            .matrix()
            .to_cols_array()
            .iter()
            .zip(ba.matrix().to_cols_array().iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max);
        assert!(diff > 1e-3);
    }

    #[test]
    fn test_anchor_prepends_parent() {
        let parent = Mat4::from_translation(Vec3::new(-2.7, 0.0, 2.39));
        let spec = TransformSpec {
            scale: Vec3::splat(0.1),
            rotations: Vec::new(),
            translation: Vec3::new(0.0, 0.003, 0.0),
        };
        assert_mat_eq(spec.matrix_under(parent), parent * spec.matrix());
    }

    #[test]
    fn test_default_transform_is_identity() {
        assert_eq!(TransformSpec::default().matrix(), Mat4::IDENTITY);
    }
}
