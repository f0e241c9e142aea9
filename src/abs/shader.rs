//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.
//!
//! A [`ShaderProgram`] resolves every active uniform once at link time and keeps a
//! name-to-location table, so per-draw uniform updates never go through a string
//! lookup on the driver side.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;
use thiserror::Error;

/// Startup-fatal shader failures, carrying the driver's diagnostic text.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to allocate shader object: {0}")]
    Create(String),
    #[error("shader compilation failed: {0}")]
    Compile(String),
    #[error("shader program linking failed: {0}")]
    Link(String),
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, ShaderError> {
        unsafe {
            let shader = gl.create_shader(shader_type).map_err(ShaderError::Create)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(ShaderError::Compile(log));
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Writes the value to the given resolved uniform location.
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_1_i32(Some(location), *self as i32);
        }
    }
}

impl Uniform for f32 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_1_f32(Some(location), *self);
        }
    }
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_1_i32(Some(location), *self);
        }
    }
}

impl Uniform for Vec2 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_2_f32(Some(location), self.x, self.y);
        }
    }
}

impl Uniform for Vec3 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_3_f32(Some(location), self.x, self.y, self.z);
        }
    }
}

impl Uniform for Vec4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w);
        }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref());
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).set_uniform(gl, location);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    locations: HashMap<String, glow::UniformLocation>,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, ShaderError> {
        unsafe {
            let program = gl.create_program().map_err(ShaderError::Create)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ShaderError::Link(log));
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            let mut locations = HashMap::new();
            for i in 0..gl.get_active_uniforms(program) {
                if let Some(uniform) = gl.get_active_uniform(program, i) {
                    if let Some(location) = gl.get_uniform_location(program, &uniform.name) {
                        locations.insert(uniform.name, location);
                    }
                }
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                locations,
            })
        }
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program. Unknown names are
    /// ignored, matching `glGetUniformLocation` returning -1.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.locations.get(name) {
            value.set_uniform(&self.gl, location);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}
