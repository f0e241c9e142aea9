//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing mesh data on the GPU side.
//! Vertices should implement the [`Vertex`] trait.
//!
//! Meshes here are immutable after creation. The scene driver binds a mesh,
//! issues one or more full or partial draws against it, and unbinds it before
//! moving to the next object, so binding is exposed explicitly instead of being
//! hidden inside a single draw call.

use std::sync::Arc;

use glow::HasContext;

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: Option<glow::Buffer>,
    vertex_count: usize,
    index_count: usize,
}

impl Mesh {
    /// Creates a new mesh from the given vertex and index data. An empty index
    /// slice builds a vertex-only mesh for pure `draw_arrays` use.
    pub fn new<V: Vertex>(gl: &Arc<glow::Context>, vertices: &[V], indices: &[u32]) -> Self {
        unsafe {
            let vao = gl.create_vertex_array().unwrap();
            let vbo = gl.create_buffer().unwrap();

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    vertices.len() * std::mem::size_of::<V>(),
                ),
                glow::STATIC_DRAW,
            );

            let ebo = if indices.is_empty() {
                None
            } else {
                let ebo = gl.create_buffer().unwrap();
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    std::slice::from_raw_parts(
                        indices.as_ptr() as *const u8,
                        indices.len() * std::mem::size_of::<u32>(),
                    ),
                    glow::STATIC_DRAW,
                );
                Some(ebo)
            };

            V::vertex_attribs(gl);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                ebo,
                vertex_count: vertices.len(),
                index_count: indices.len(),
            }
        }
    }

    /// Binds the mesh's vertex array for subsequent draw calls.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
        }
    }

    /// Unbinds any vertex array.
    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    /// Draws the full index buffer as triangles. The mesh must be bound.
    pub fn draw_elements(&self) {
        unsafe {
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.index_count as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }
    }

    /// Draws a sub-range of the vertex buffer with the given primitive mode.
    /// The mesh must be bound.
    pub fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe {
            self.gl.draw_arrays(mode, first, count);
        }
    }

    /// Returns the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Returns the number of indices in the mesh.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            if let Some(ebo) = self.ebo {
                self.gl.delete_buffer(ebo);
            }
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
