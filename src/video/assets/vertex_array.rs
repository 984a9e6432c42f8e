use super::super::command::RenderCommand;
use super::super::registry::Rid;
use super::super::renderer::RenderContext;
use super::super::state::RenderState;
use super::buffer::{IndexBuffer, VertexBuffer};

/// A vertex array object. Attaching buffers is a semantically atomic
/// bind-configure sequence, so it rides the queue as one command group.
pub struct VertexArray {
    rid: Rid,
    vertex_buffers: Vec<Rid>,
    index_buffer: Option<Rid>,
    ctx: RenderContext,
}

impl VertexArray {
    pub fn new(ctx: &RenderContext) -> VertexArray {
        let rid = ctx.registry().register();
        ctx.submit(RenderState::command(), RenderCommand::CreateVertexArray(rid));

        VertexArray {
            rid,
            vertex_buffers: Vec::new(),
            index_buffer: None,
            ctx: ctx.clone(),
        }
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    /// Ids of the attached vertex buffers, in attach order.
    #[inline]
    pub fn vertex_buffers(&self) -> &[Rid] {
        &self.vertex_buffers
    }

    #[inline]
    pub fn index_buffer(&self) -> Option<Rid> {
        self.index_buffer
    }

    pub fn bind(&self) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::BindVertexArray(self.rid));
    }

    pub fn unbind(&self) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::UnbindVertexArray);
    }

    pub fn add_vertex_buffer(&mut self, buffer: &VertexBuffer) {
        debug_assert!(!buffer.layout().is_empty(), "vertex buffer has no layout");

        self.ctx.begin_group();
        self.bind();
        buffer.bind();
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::AddVertexBuffer(Box::new((
                self.rid,
                buffer.rid(),
                buffer.layout().clone(),
            ))),
        );
        self.ctx.end_group();

        self.vertex_buffers.push(buffer.rid());
    }

    pub fn set_index_buffer(&mut self, buffer: &IndexBuffer) {
        self.ctx.begin_group();
        self.bind();
        buffer.bind();
        self.ctx.submit(
            RenderState::command(),
            RenderCommand::SetIndexBuffer(self.rid, buffer.rid()),
        );
        self.ctx.end_group();

        self.index_buffer = Some(buffer.rid());
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::DeleteVertexArray(self.rid));
    }
}
