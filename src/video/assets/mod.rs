//! Main-side wrappers for GPU-backed objects. Each wrapper registers an id
//! at construction, records creation commands through its `RenderContext`
//! and posts a deletion command from `Drop`; the ids cross the queue by
//! value, never the wrappers themselves.

pub mod buffer;
pub mod program;
pub mod vertex_array;

pub mod prelude {
    pub use super::buffer::{as_bytes, IndexBuffer, VertexBuffer, VertexElement, VertexLayout};
    pub use super::program::Program;
    pub use super::vertex_array::VertexArray;
}
