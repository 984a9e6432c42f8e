//! The closed set of render commands. Every variant owns value copies of its
//! captures: ids, parameters and arena offsets. Nothing here borrows from the
//! main thread.

use std::sync::Arc;

use crate::shader::ShaderData;

use super::arena::ArenaPtr;
use super::assets::buffer::VertexLayout;
use super::registry::Rid;
use super::state::{CommandKind, StateType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawCall {
    pub vertex_array: Rid,
    pub program: Rid,
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub enum RenderCommand {
    CreateVertexArray(Rid),
    DeleteVertexArray(Rid),
    BindVertexArray(Rid),
    UnbindVertexArray,
    AddVertexBuffer(Box<(Rid, Rid, VertexLayout)>),
    SetIndexBuffer(Rid, Rid),

    CreateBuffer(Rid, BufferKind, BufferUsage),
    DeleteBuffer(Rid, BufferKind),
    BindBuffer(Rid, BufferKind),
    UploadBuffer(Rid, BufferKind, ArenaPtr<[u8]>),

    CreateProgram(Box<(Rid, Arc<ShaderData>)>),
    DeleteProgram(Rid),
    BindProgram(Rid),
    UploadUniforms(Rid, ArenaPtr<[u8]>),

    SetClearColor([f32; 4]),
    Clear,

    Draw(DrawCall),
}

impl RenderCommand {
    /// The discriminant stamped into the state word.
    pub(crate) fn kind(&self) -> CommandKind {
        match *self {
            RenderCommand::CreateVertexArray(_) => CommandKind::VertexArrayCreate,
            RenderCommand::DeleteVertexArray(_) => CommandKind::VertexArrayDelete,
            RenderCommand::BindVertexArray(_) => CommandKind::VertexArrayBind,
            RenderCommand::UnbindVertexArray => CommandKind::VertexArrayUnbind,
            RenderCommand::AddVertexBuffer(_) => CommandKind::VertexArrayAddVertexBuffer,
            RenderCommand::SetIndexBuffer(_, _) => CommandKind::VertexArraySetIndexBuffer,
            RenderCommand::CreateBuffer(_, _, _) => CommandKind::BufferCreate,
            RenderCommand::DeleteBuffer(_, _) => CommandKind::BufferDelete,
            RenderCommand::BindBuffer(_, _) => CommandKind::BufferBind,
            RenderCommand::UploadBuffer(_, _, _) => CommandKind::BufferUpload,
            RenderCommand::CreateProgram(_) => CommandKind::ProgramCreate,
            RenderCommand::DeleteProgram(_) => CommandKind::ProgramDelete,
            RenderCommand::BindProgram(_) => CommandKind::ProgramBind,
            RenderCommand::UploadUniforms(_, _) => CommandKind::UniformUpload,
            RenderCommand::SetClearColor(_) => CommandKind::SetClearColor,
            RenderCommand::Clear => CommandKind::Clear,
            RenderCommand::Draw(_) => CommandKind::Draw,
        }
    }

    pub(crate) fn ty(&self) -> StateType {
        match *self {
            RenderCommand::Draw(_) => StateType::Draw,
            _ => StateType::Command,
        }
    }
}
