//! Scene composition driver.
//!
//! [`Renderer`] owns every GPU-facing resource (shader program, mesh
//! registry, texture store) together with the camera, and walks the fixed
//! object list once per frame: clear, upload view/projection, then per object
//! bind mesh and textures, apply lighting and material, upload the model
//! matrix and issue the draw list. Draw order does not affect visibility
//! (depth testing is on); what matters is the reset discipline that keeps
//! blend and UV state from leaking between objects, which is applied
//! unconditionally at the start of every object block.

pub mod material;
pub mod meshes;

use std::sync::Arc;

use glam::Mat4;
use glow::HasContext;

use crate::abs::{Mesh, ShaderProgram, TextureStore};
use crate::camera::{Camera, Projection};
use crate::scene::SceneDef;
use material::{AMBIENT_COLOR, AMBIENT_STRENGTH, Material, apply_lights, apply_material};
use meshes::{BoxFace, DrawSpec, MeshRegistry};

pub struct Renderer {
    gl: Arc<glow::Context>,
    program: ShaderProgram,
    meshes: MeshRegistry,
    textures: TextureStore,
    pub camera: Camera,
    pub projection: Projection,
    viewport: (u32, u32),
}

impl Renderer {
    /// Wires up the render context. All resources must already exist; this
    /// only sets the GL state that stays fixed for the viewer's lifetime.
    pub fn new(
        gl: &Arc<glow::Context>,
        program: ShaderProgram,
        meshes: MeshRegistry,
        textures: TextureStore,
        camera: Camera,
        width: u32,
        height: u32,
    ) -> Self {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
        }
        // the samplers stay on units 0 and 1 for the program's lifetime
        program.use_program();
        program.set_uniform("uTexture", 0i32);
        program.set_uniform("uSecondTexture", 1i32);

        Self {
            gl: Arc::clone(gl),
            program,
            meshes,
            textures,
            camera,
            projection: Projection::Perspective,
            viewport: (width, height),
        }
    }

    /// Updates the GL viewport after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Renders one frame of the scene. The caller swaps buffers afterwards.
    pub fn render_frame(&self, scene: &SceneDef) {
        unsafe {
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let view = self.camera.view_matrix();
        let projection = self.projection.matrix(self.camera.zoom, self.aspect());

        self.program.use_program();
        self.program.set_uniform("view", view);
        self.program.set_uniform("projection", projection);
        self.program.set_uniform("viewPosition", self.camera.position);
        self.program.set_uniform("ambientStrength", AMBIENT_STRENGTH);
        self.program.set_uniform("ambientColor", AMBIENT_COLOR);

        for object in &scene.objects {
            // restore defaults before every object so blend factors and UV
            // scales set by a previous block never leak into this one
            apply_material(&self.program, &Material::default());
            apply_lights(&self.program, &object.lights[0], &object.lights[1]);

            let anchor = object
                .anchor
                .map(Mat4::from_translation)
                .unwrap_or(Mat4::IDENTITY);

            for part in &object.parts {
                let mesh = self.meshes.get(part.shape);
                mesh.bind();
                for (unit, name) in part.textures.iter().enumerate() {
                    if let Some(texture) = self.textures.get(name) {
                        texture.bind(unit as u32);
                    }
                }
                apply_material(&self.program, &part.material());
                for transform in &part.transforms {
                    self.program
                        .set_uniform("model", transform.matrix_under(anchor));
                    for draw in &part.draw {
                        issue_draw(mesh, *draw);
                    }
                }
                mesh.unbind();
            }
        }

        // frame-end contract: program active, no vertex array bound, blend off
        self.program.set_uniform("blendFactor", 0.0f32);
    }
}

/// Issues one draw call against a bound mesh.
fn issue_draw(mesh: &Mesh, draw: DrawSpec) {
    match draw {
        DrawSpec::Elements => mesh.draw_elements(),
        DrawSpec::Triangles => {
            mesh.draw_arrays(glow::TRIANGLES, 0, mesh.vertex_count() as i32)
        }
        DrawSpec::Strip => {
            mesh.draw_arrays(glow::TRIANGLE_STRIP, 0, mesh.vertex_count() as i32)
        }
        DrawSpec::Face(face) => {
            mesh.draw_arrays(glow::TRIANGLE_FAN, face.first(), BoxFace::VERTEX_COUNT)
        }
        DrawSpec::Section(section) => {
            let (mode, first, count) = section.range();
            mesh.draw_arrays(mode, first, count)
        }
    }
}
