use std::sync::Arc;

use crate::shader::{ShaderData, ShaderSource, UniformWriter};

use super::super::command::RenderCommand;
use super::super::registry::Rid;
use super::super::renderer::RenderContext;
use super::super::state::RenderState;

/// A shader program. Parsing happens here on the main thread; compilation,
/// linking and location resolution happen on the render thread when the
/// creation command executes. Several programs may share one parsed
/// `ShaderData`.
pub struct Program {
    rid: Rid,
    data: Arc<ShaderData>,
    ctx: RenderContext,
}

impl Program {
    pub fn new(ctx: &RenderContext, source: ShaderSource) -> Program {
        let data = ShaderData::parse(ctx.registry().allocate(), source);
        Program::with_data(ctx, data)
    }

    pub fn with_data(ctx: &RenderContext, data: Arc<ShaderData>) -> Program {
        let rid = ctx.registry().register();
        ctx.submit(
            RenderState::command(),
            RenderCommand::CreateProgram(Box::new((rid, data.clone()))),
        );

        Program {
            rid,
            data,
            ctx: ctx.clone(),
        }
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    #[inline]
    pub fn shader_data(&self) -> &Arc<ShaderData> {
        &self.data
    }

    /// A writer shaped like this program's uniform layout.
    pub fn writer(&self) -> UniformWriter {
        UniformWriter::new(self.data.clone())
    }

    pub fn bind(&self) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::BindProgram(self.rid));
    }

    /// Ships the writer's buffer to the render thread, which forwards every
    /// present slot to its resolved location.
    pub fn upload_uniforms(&self, writer: &UniformWriter) {
        debug_assert!(
            writer.shader_data().rid() == self.data.rid(),
            "writer built against a different shader"
        );

        let rid = self.rid;
        self.ctx
            .submit_with_data(RenderState::command(), writer.as_bytes(), |ptr| {
                RenderCommand::UploadUniforms(rid, ptr)
            });
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::DeleteProgram(self.rid));
    }
}
