//! Primitive mesh registry.
//!
//! The scene is composed entirely from a small set of reusable primitive
//! shapes. [`MeshRegistry::create`] uploads one GPU mesh per shape before the
//! first frame; dropping the registry releases every buffer exactly once.
//!
//! Shapes that are drawn partially have a documented layout:
//!
//! * the box holds 24 vertices, one four-vertex triangle fan per face at
//!   offsets 0, 4, 8, 12, 16 and 20 ([`BoxFace`]), plus a full index buffer
//!   for closed-solid draws;
//! * the cylinders hold a bottom cap fan, a top cap fan and a side strip at
//!   the offsets given by [`CylinderSection`].

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::abs::{Mesh, Vertex};

/// Number of segments around the cylinder axis.
const CYLINDER_SEGMENTS: u32 = 36;
/// Vertices per cylinder cap fan: center plus a closed rim.
const CYLINDER_CAP_VERTICES: i32 = CYLINDER_SEGMENTS as i32 + 2;
/// Vertices in the cylinder side strip: two per rim point.
const CYLINDER_SIDE_VERTICES: i32 = 2 * (CYLINDER_SEGMENTS as i32 + 1);

const SPHERE_STACKS: u32 = 18;
const SPHERE_SECTORS: u32 = 36;

const TORUS_MAIN_SEGMENTS: u32 = 30;
const TORUS_TUBE_SEGMENTS: u32 = 20;
const TORUS_TUBE_RADIUS: f32 = 0.25;

/// The fixed vertex layout shared by every primitive:
/// {position, normal, uv} at attribute locations 0, 1 and 2.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SceneVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl SceneVertex {
    fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl Vertex for SceneVertex {
    fn vertex_attribs(gl: &glow::Context) {
        use glow::HasContext;
        unsafe {
            let stride = std::mem::size_of::<SceneVertex>() as i32;

            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                std::mem::size_of::<Vec3>() as i32,
            );

            // Texture coordinate attribute
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(
                2,
                2,
                glow::FLOAT,
                false,
                stride,
                (2 * std::mem::size_of::<Vec3>()) as i32,
            );
        }
    }
}

/// Every primitive shape the registry provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Plane,
    Box,
    Dice,
    Cylinder,
    TaperedCylinder,
    Sphere,
    Torus,
    Prism,
}

/// One face of the shared 24-vertex box layout, drawable as a 4-vertex fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxFace {
    Front,
    Top,
    Right,
    Left,
    Bottom,
    Back,
}

impl BoxFace {
    pub const VERTEX_COUNT: i32 = 4;

    /// Offset of the face's fan in the box vertex buffer.
    pub fn first(self) -> i32 {
        match self {
            BoxFace::Front => 0,
            BoxFace::Top => 4,
            BoxFace::Right => 8,
            BoxFace::Left => 12,
            BoxFace::Bottom => 16,
            BoxFace::Back => 20,
        }
    }
}

/// One section of the shared cylinder layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CylinderSection {
    Bottom,
    Top,
    Sides,
}

impl CylinderSection {
    /// Primitive mode, offset and vertex count of the section.
    pub fn range(self) -> (u32, i32, i32) {
        match self {
            CylinderSection::Bottom => (glow::TRIANGLE_FAN, 0, CYLINDER_CAP_VERTICES),
            CylinderSection::Top => {
                (glow::TRIANGLE_FAN, CYLINDER_CAP_VERTICES, CYLINDER_CAP_VERTICES)
            }
            CylinderSection::Sides => (
                glow::TRIANGLE_STRIP,
                2 * CYLINDER_CAP_VERTICES,
                CYLINDER_SIDE_VERTICES,
            ),
        }
    }
}

/// One draw call against a bound shape, either the full solid or a documented
/// sub-range of its layout.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawSpec {
    /// Full indexed triangle draw (plane, box, dice, sphere).
    Elements,
    /// All vertices as a triangle list (torus).
    Triangles,
    /// All vertices as one triangle strip (prism).
    Strip,
    /// One four-vertex face fan of the box layout.
    Face(BoxFace),
    /// One section of the cylinder layout.
    Section(CylinderSection),
}

impl DrawSpec {
    /// Whether this draw references a range the shape's layout actually has.
    pub fn valid_for(self, shape: Shape) -> bool {
        match self {
            DrawSpec::Elements => matches!(
                shape,
                Shape::Plane | Shape::Box | Shape::Dice | Shape::Sphere
            ),
            DrawSpec::Triangles => matches!(shape, Shape::Torus),
            DrawSpec::Strip => matches!(shape, Shape::Prism),
            DrawSpec::Face(_) => matches!(shape, Shape::Box | Shape::Dice),
            DrawSpec::Section(_) => matches!(shape, Shape::Cylinder | Shape::TaperedCylinder),
        }
    }
}

/// Owns one GPU mesh per primitive shape. Created once before the first
/// frame, destroyed exactly once when dropped.
pub struct MeshRegistry {
    plane: Mesh,
    box_mesh: Mesh,
    dice: Mesh,
    cylinder: Mesh,
    tapered_cylinder: Mesh,
    sphere: Mesh,
    torus: Mesh,
    prism: Mesh,
}

impl MeshRegistry {
    pub fn create(gl: &Arc<glow::Context>) -> Self {
        let (plane_vertices, plane_indices) = plane_geometry();
        let (box_vertices, box_indices) = box_geometry(box_face_uv);
        let (dice_vertices, dice_indices) = box_geometry(dice_face_uv);
        let cylinder_vertices = cylinder_geometry(1.0);
        let tapered_vertices = cylinder_geometry(0.5);
        let (sphere_vertices, sphere_indices) = sphere_geometry();
        let torus_vertices = torus_geometry();
        let prism_vertices = prism_geometry();

        Self {
            plane: Mesh::new(gl, &plane_vertices, &plane_indices),
            box_mesh: Mesh::new(gl, &box_vertices, &box_indices),
            dice: Mesh::new(gl, &dice_vertices, &dice_indices),
            cylinder: Mesh::new(gl, &cylinder_vertices, &[]),
            tapered_cylinder: Mesh::new(gl, &tapered_vertices, &[]),
            sphere: Mesh::new(gl, &sphere_vertices, &sphere_indices),
            torus: Mesh::new(gl, &torus_vertices, &[]),
            prism: Mesh::new(gl, &prism_vertices, &[]),
        }
    }

    pub fn get(&self, shape: Shape) -> &Mesh {
        match shape {
            Shape::Plane => &self.plane,
            Shape::Box => &self.box_mesh,
            Shape::Dice => &self.dice,
            Shape::Cylinder => &self.cylinder,
            Shape::TaperedCylinder => &self.tapered_cylinder,
            Shape::Sphere => &self.sphere,
            Shape::Torus => &self.torus,
            Shape::Prism => &self.prism,
        }
    }
}

/// Unit plane in the XZ plane, facing +Y, spanning -1..1.
fn plane_geometry() -> (Vec<SceneVertex>, Vec<u32>) {
    let vertices = vec![
        SceneVertex::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::Y, Vec2::new(0.0, 0.0)),
        SceneVertex::new(Vec3::new(1.0, 0.0, 1.0), Vec3::Y, Vec2::new(1.0, 0.0)),
        SceneVertex::new(Vec3::new(1.0, 0.0, -1.0), Vec3::Y, Vec2::new(1.0, 1.0)),
        SceneVertex::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::Y, Vec2::new(0.0, 1.0)),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

/// Corner order of each face fan, as (right, up) coefficients.
const FACE_CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Face definitions: outward normal and the (right, up) basis spanning it.
fn box_faces() -> [(Vec3, Vec3, Vec3); 6] {
    [
        (Vec3::Z, Vec3::X, Vec3::Y),      // front
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),  // top
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),  // right
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),  // left
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),  // bottom
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y), // back
    ]
}

fn box_face_uv(_face: usize, corner: usize) -> Vec2 {
    let (u, v) = FACE_CORNERS[corner];
    Vec2::new((u + 1.0) / 2.0, (v + 1.0) / 2.0)
}

/// Maps each die face into its cell of a 3x2 pip atlas.
fn dice_face_uv(face: usize, corner: usize) -> Vec2 {
    let (u, v) = FACE_CORNERS[corner];
    let cell_x = (face % 3) as f32;
    let cell_y = (face / 3) as f32;
    Vec2::new(
        (cell_x + (u + 1.0) / 2.0) / 3.0,
        (cell_y + (v + 1.0) / 2.0) / 2.0,
    )
}

/// Unit box centered on the origin, 24 vertices, 6 four-vertex face fans plus
/// a full index buffer. The UV of each corner comes from `face_uv` so the
/// dice variant can reuse the layout with an atlas mapping.
fn box_geometry(face_uv: fn(usize, usize) -> Vec2) -> (Vec<SceneVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, right, up)) in box_faces().into_iter().enumerate() {
        let base = vertices.len() as u32;
        for (corner, (r, u)) in FACE_CORNERS.into_iter().enumerate() {
            let position = (normal + right * r + up * u) * 0.5;
            vertices.push(SceneVertex::new(position, normal, face_uv(face, corner)));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// Cylinder of radius 1 from y=0 to y=1, laid out as bottom fan, top fan and
/// side strip (see [`CylinderSection`]). `top_radius` < 1 tapers it.
fn cylinder_geometry(top_radius: f32) -> Vec<SceneVertex> {
    let mut vertices = Vec::new();
    let rim = |i: u32, radius: f32, y: f32| {
        let angle = TAU * i as f32 / CYLINDER_SEGMENTS as f32;
        Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
    };

    // bottom cap fan
    vertices.push(SceneVertex::new(Vec3::ZERO, Vec3::NEG_Y, Vec2::splat(0.5)));
    for i in 0..=CYLINDER_SEGMENTS {
        let p = rim(i, 1.0, 0.0);
        vertices.push(SceneVertex::new(
            p,
            Vec3::NEG_Y,
            Vec2::new(p.x, p.z) * 0.5 + 0.5,
        ));
    }

    // top cap fan
    vertices.push(SceneVertex::new(Vec3::Y, Vec3::Y, Vec2::splat(0.5)));
    for i in 0..=CYLINDER_SEGMENTS {
        let p = rim(i, top_radius, 1.0);
        vertices.push(SceneVertex::new(
            p,
            Vec3::Y,
            Vec2::new(p.x, p.z) * 0.5 + 0.5,
        ));
    }

    // side strip, bottom/top vertex pairs around the rim
    let slope = 1.0 - top_radius;
    for i in 0..=CYLINDER_SEGMENTS {
        let angle = TAU * i as f32 / CYLINDER_SEGMENTS as f32;
        let normal = Vec3::new(angle.cos(), slope, angle.sin()).normalize();
        let u = i as f32 / CYLINDER_SEGMENTS as f32;
        vertices.push(SceneVertex::new(
            rim(i, 1.0, 0.0),
            normal,
            Vec2::new(u, 0.0),
        ));
        vertices.push(SceneVertex::new(
            rim(i, top_radius, 1.0),
            normal,
            Vec2::new(u, 1.0),
        ));
    }

    vertices
}

/// Unit sphere, indexed latitude/longitude grid.
fn sphere_geometry() -> (Vec<SceneVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for stack in 0..=SPHERE_STACKS {
        let phi = PI / 2.0 - PI * stack as f32 / SPHERE_STACKS as f32;
        for sector in 0..=SPHERE_SECTORS {
            let theta = TAU * sector as f32 / SPHERE_SECTORS as f32;
            let position = Vec3::new(
                phi.cos() * theta.cos(),
                phi.sin(),
                phi.cos() * theta.sin(),
            );
            vertices.push(SceneVertex::new(
                position,
                position,
                Vec2::new(
                    sector as f32 / SPHERE_SECTORS as f32,
                    stack as f32 / SPHERE_STACKS as f32,
                ),
            ));
        }
    }

    for stack in 0..SPHERE_STACKS {
        for sector in 0..SPHERE_SECTORS {
            let k1 = stack * (SPHERE_SECTORS + 1) + sector;
            let k2 = k1 + SPHERE_SECTORS + 1;
            if stack != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if stack != SPHERE_STACKS - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
        }
    }

    (vertices, indices)
}

/// Torus with main radius 1, drawn as a plain triangle list.
fn torus_geometry() -> Vec<SceneVertex> {
    let point = |main: u32, tube: u32| {
        let main_angle = TAU * main as f32 / TORUS_MAIN_SEGMENTS as f32;
        let tube_angle = TAU * tube as f32 / TORUS_TUBE_SEGMENTS as f32;
        let center = Vec3::new(main_angle.cos(), main_angle.sin(), 0.0);
        let normal = center * tube_angle.cos() + Vec3::Z * tube_angle.sin();
        let position = center + normal * TORUS_TUBE_RADIUS;
        let uv = Vec2::new(
            main as f32 / TORUS_MAIN_SEGMENTS as f32,
            tube as f32 / TORUS_TUBE_SEGMENTS as f32,
        );
        SceneVertex::new(position, normal, uv)
    };

    let mut vertices = Vec::new();
    for main in 0..TORUS_MAIN_SEGMENTS {
        for tube in 0..TORUS_TUBE_SEGMENTS {
            let a = point(main, tube);
            let b = point(main + 1, tube);
            let c = point(main + 1, tube + 1);
            let d = point(main, tube + 1);
            vertices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    vertices
}

/// Triangular prism, extruded along Z, encoded as a single triangle strip:
/// six side triangles followed by the two caps, stitched with degenerate
/// duplicates. Face culling stays disabled, so strip winding is irrelevant.
fn prism_geometry() -> Vec<SceneVertex> {
    let a = Vec2::new(-0.5, 0.0);
    let b = Vec2::new(0.5, 0.0);
    let c = Vec2::new(0.0, 1.0);
    let centroid = (a + b + c) / 3.0;

    let side = |corner: Vec2, z: f32| {
        let normal = (corner - centroid).normalize().extend(0.0);
        SceneVertex::new(
            corner.extend(z),
            normal,
            Vec2::new(corner.x + 0.5, corner.y),
        )
    };
    let cap = |corner: Vec2, z: f32| {
        SceneVertex::new(
            corner.extend(z),
            Vec3::Z * z.signum(),
            corner + 0.5,
        )
    };

    let (a0, a1) = (side(a, -0.5), side(a, 0.5));
    let (b0, b1) = (side(b, -0.5), side(b, 0.5));
    let (c0, c1) = (side(c, -0.5), side(c, 0.5));
    let (ca0, ca1) = (cap(a, -0.5), cap(a, 0.5));
    let (cb0, cb1) = (cap(b, -0.5), cap(b, 0.5));
    let (cc0, cc1) = (cap(c, -0.5), cap(c, 0.5));

    vec![
        // sides: three quads around the cross-section
        a0, a1, b0, b1, c0, c1, a0, a1,
        // degenerate bridge, then the z=+0.5 cap
        ca1, cb1, cc1,
        // degenerate bridge, then the z=-0.5 cap
        cc1, ca0, ca0, cc0, cb0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_faces_are_four_vertex_fans_within_buffer() {
        let (vertices, indices) = box_geometry(box_face_uv);
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for face in [
            BoxFace::Front,
            BoxFace::Top,
            BoxFace::Right,
            BoxFace::Left,
            BoxFace::Bottom,
            BoxFace::Back,
        ] {
            let first = face.first();
            assert_eq!(first % 4, 0);
            assert!(first + BoxFace::VERTEX_COUNT <= 24);
            // every vertex of the face shares the face normal
            let normal = vertices[first as usize].normal;
            for corner in 0..4 {
                assert_eq!(vertices[(first + corner) as usize].normal, normal);
            }
        }
        assert!(indices.iter().all(|&i| i < 24));
    }

    #[test]
    fn test_dice_faces_land_in_distinct_atlas_cells() {
        let (vertices, _) = box_geometry(dice_face_uv);
        let cell_of = |uv: Vec2| ((uv.x * 3.0 - 0.01).floor(), (uv.y * 2.0 - 0.01).floor());
        let mut cells: Vec<_> = (0..6)
            .map(|face| cell_of(vertices[face * 4 + 2].uv))
            .collect();
        cells.sort_by(|a, b| a.partial_cmp(b).unwrap());
        cells.dedup();
        assert_eq!(cells.len(), 6);
    }

    #[test]
    fn test_cylinder_sections_cover_the_buffer() {
        let vertices = cylinder_geometry(1.0);
        let (_, bottom_first, bottom_count) = CylinderSection::Bottom.range();
        let (_, top_first, top_count) = CylinderSection::Top.range();
        let (mode, sides_first, sides_count) = CylinderSection::Sides.range();
        assert_eq!(bottom_first, 0);
        assert_eq!(top_first, bottom_count);
        assert_eq!(sides_first, bottom_count + top_count);
        assert_eq!(
            vertices.len() as i32,
            bottom_count + top_count + sides_count
        );
        assert_eq!(mode, glow::TRIANGLE_STRIP);
    }

    #[test]
    fn test_tapered_cylinder_narrows_at_the_top() {
        let vertices = cylinder_geometry(0.5);
        let (_, top_first, top_count) = CylinderSection::Top.range();
        // skip the fan center, measure a rim vertex
        let rim = vertices[(top_first + 1) as usize].position;
        assert!((Vec2::new(rim.x, rim.z).length() - 0.5).abs() < 1e-5);
        assert_eq!(vertices.len() as i32, top_first + top_count + CylinderSection::Sides.range().2);
    }

    #[test]
    fn test_sphere_indices_in_bounds() {
        let (vertices, indices) = sphere_geometry();
        assert_eq!(
            vertices.len() as u32,
            (SPHERE_STACKS + 1) * (SPHERE_SECTORS + 1)
        );
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_torus_is_a_triangle_list_on_the_tube() {
        let vertices = torus_geometry();
        assert_eq!(
            vertices.len() as u32,
            TORUS_MAIN_SEGMENTS * TORUS_TUBE_SEGMENTS * 6
        );
        for vertex in &vertices {
            let center = Vec3::new(vertex.position.x, vertex.position.y, 0.0)
                .normalize_or_zero();
            let distance = (vertex.position - center).length();
            assert!((distance - TORUS_TUBE_RADIUS).abs() < 1e-4);
        }
    }

    #[test]
    fn test_draw_spec_validity() {
        assert!(DrawSpec::Elements.valid_for(Shape::Box));
        assert!(DrawSpec::Face(BoxFace::Top).valid_for(Shape::Dice));
        assert!(DrawSpec::Section(CylinderSection::Sides).valid_for(Shape::TaperedCylinder));
        assert!(DrawSpec::Strip.valid_for(Shape::Prism));
        assert!(DrawSpec::Triangles.valid_for(Shape::Torus));

        assert!(!DrawSpec::Face(BoxFace::Top).valid_for(Shape::Sphere));
        assert!(!DrawSpec::Section(CylinderSection::Top).valid_for(Shape::Box));
        assert!(!DrawSpec::Elements.valid_for(Shape::Torus));
    }
}
