//! The driver boundary. The render thread replays command records against a
//! `Device`; the GL implementation issues real driver calls, the headless one
//! maintains the same resource maps in memory so the pipeline is observable
//! in tests.

pub mod gl;
pub mod headless;

use std::sync::Arc;

use crate::shader::ShaderData;

use super::assets::buffer::VertexLayout;
use super::command::{BufferKind, BufferUsage, DrawCall};
use super::errors::Result;
use super::registry::Rid;

/// The synchronous, thread-affine call stream the render thread drives. All
/// methods execute on the render thread with the context current; that
/// affinity is why they are unsafe.
pub trait Device {
    unsafe fn create_vertex_array(&mut self, id: Rid) -> Result<()>;
    unsafe fn delete_vertex_array(&mut self, id: Rid) -> Result<()>;
    unsafe fn bind_vertex_array(&mut self, id: Rid) -> Result<()>;
    unsafe fn unbind_vertex_array(&mut self) -> Result<()>;
    unsafe fn attach_vertex_buffer(&mut self, vao: Rid, vbo: Rid, layout: &VertexLayout)
        -> Result<()>;
    unsafe fn attach_index_buffer(&mut self, vao: Rid, ibo: Rid) -> Result<()>;

    unsafe fn create_buffer(&mut self, id: Rid, kind: BufferKind, usage: BufferUsage)
        -> Result<()>;
    unsafe fn delete_buffer(&mut self, id: Rid, kind: BufferKind) -> Result<()>;
    unsafe fn bind_buffer(&mut self, id: Rid, kind: BufferKind) -> Result<()>;
    unsafe fn upload_buffer(&mut self, id: Rid, kind: BufferKind, data: &[u8]) -> Result<()>;

    unsafe fn create_program(&mut self, id: Rid, data: &Arc<ShaderData>) -> Result<()>;
    unsafe fn delete_program(&mut self, id: Rid) -> Result<()>;
    unsafe fn bind_program(&mut self, id: Rid) -> Result<()>;
    unsafe fn upload_uniforms(&mut self, id: Rid, bytes: &[u8]) -> Result<()>;

    unsafe fn set_clear_color(&mut self, color: [f32; 4]) -> Result<()>;
    unsafe fn clear(&mut self) -> Result<()>;

    unsafe fn draw(&mut self, call: DrawCall) -> Result<()>;
}

/// Builds the device on the render thread, after the context went current.
pub type DeviceFactory = Box<dyn FnOnce() -> crate::errors::Result<Box<dyn Device>> + Send>;
