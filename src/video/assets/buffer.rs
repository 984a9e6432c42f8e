use std::{mem, slice};

use crate::shader::ShaderDataType;

use super::super::command::{BufferKind, BufferUsage, RenderCommand};
use super::super::registry::Rid;
use super::super::renderer::RenderContext;
use super::super::state::RenderState;

/// Reinterprets a slice of plain values as bytes for upload.
pub fn as_bytes<T: Copy>(values: &[T]) -> &[u8] {
    unsafe {
        slice::from_raw_parts(
            values.as_ptr() as *const u8,
            mem::size_of::<T>().wrapping_mul(values.len()),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexElement {
    pub name: String,
    pub ty: ShaderDataType,
    pub normalized: bool,
    pub offset: u32,
}

/// Describes how the bytes of one vertex buffer slice into attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexLayout {
    pub fn build() -> VertexLayoutBuilder {
        VertexLayoutBuilder(VertexLayout::default())
    }

    #[inline]
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

pub struct VertexLayoutBuilder(VertexLayout);

impl VertexLayoutBuilder {
    pub fn with<T: Into<String>>(mut self, name: T, ty: ShaderDataType, normalized: bool) -> Self {
        debug_assert!(
            ty != ShaderDataType::Struct
                && ty != ShaderDataType::Mat2
                && ty != ShaderDataType::Mat3
                && ty != ShaderDataType::Mat4,
            "vertex attributes are scalars or vectors"
        );

        self.0.elements.push(VertexElement {
            name: name.into(),
            ty,
            normalized,
            offset: self.0.stride,
        });
        self.0.stride += ty.size();
        self
    }

    #[inline]
    pub fn finish(self) -> VertexLayout {
        self.0
    }
}

/// A vertex buffer. Creation, uploads and deletion all ride the command
/// queue; the wrapper itself never touches the driver.
pub struct VertexBuffer {
    rid: Rid,
    usage: BufferUsage,
    layout: VertexLayout,
    ctx: RenderContext,
}

impl VertexBuffer {
    pub fn new<T: Copy>(
        ctx: &RenderContext,
        data: &[T],
        layout: VertexLayout,
        usage: BufferUsage,
    ) -> VertexBuffer {
        let rid = ctx.registry().register();

        ctx.submit(
            RenderState::command(),
            RenderCommand::CreateBuffer(rid, BufferKind::Vertex, usage),
        );
        ctx.submit_with_data(RenderState::command(), as_bytes(data), |ptr| {
            RenderCommand::UploadBuffer(rid, BufferKind::Vertex, ptr)
        });

        VertexBuffer {
            rid,
            usage,
            layout,
            ctx: ctx.clone(),
        }
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn bind(&self) {
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::BindBuffer(self.rid, BufferKind::Vertex),
        );
    }

    /// Replaces the buffer contents. Static buffers warn and upload anyway;
    /// the driver copes, the intent was probably `Dynamic`.
    pub fn set_data<T: Copy>(&self, data: &[T]) {
        if self.usage == BufferUsage::Static {
            warn!("{} is a static buffer, use BufferUsage::Dynamic", self.rid);
        }

        let rid = self.rid;
        self.ctx
            .submit_with_data(RenderState::command(), as_bytes(data), |ptr| {
                RenderCommand::UploadBuffer(rid, BufferKind::Vertex, ptr)
            });
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::DeleteBuffer(self.rid, BufferKind::Vertex),
        );
    }
}

/// An index buffer of `u32` indices.
pub struct IndexBuffer {
    rid: Rid,
    count: u32,
    ctx: RenderContext,
}

impl IndexBuffer {
    pub fn new(ctx: &RenderContext, indices: &[u32]) -> IndexBuffer {
        let rid = ctx.registry().register();

        ctx.submit(
            RenderState::command(),
            RenderCommand::CreateBuffer(rid, BufferKind::Index, BufferUsage::Static),
        );
        ctx.submit_with_data(RenderState::command(), as_bytes(indices), |ptr| {
            RenderCommand::UploadBuffer(rid, BufferKind::Index, ptr)
        });

        IndexBuffer {
            rid,
            count: indices.len() as u32,
            ctx: ctx.clone(),
        }
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn bind(&self) {
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::BindBuffer(self.rid, BufferKind::Index),
        );
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::DeleteBuffer(self.rid, BufferKind::Index),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_offsets() {
        let layout = VertexLayout::build()
            .with("position", ShaderDataType::Vec3, false)
            .with("uv", ShaderDataType::Vec2, false)
            .finish();

        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.elements()[0].offset, 0);
        assert_eq!(layout.elements()[1].offset, 12);
    }

    #[test]
    fn bytes_view() {
        let vertices = [1.0f32, 2.0, 3.0];
        assert_eq!(as_bytes(&vertices).len(), 12);
    }
}
