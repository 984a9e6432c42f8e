//! One frame's worth of recorded commands plus the byte arena backing their
//! bulk payloads. Two frames live in a `DoubleBuf` and swap roles at the
//! frame handshake.

use super::arena::CommandArena;
use super::backends::Device;
use super::command::RenderCommand;
use super::registry::ResourceRegistry;
use super::state::RenderState;

#[derive(Debug, Clone)]
pub(crate) struct CommandRecord {
    pub state: RenderState,
    pub cmd: RenderCommand,
}

#[derive(Debug, Default)]
pub struct Frame {
    pub(crate) records: Vec<CommandRecord>,
    pub(crate) bufs: CommandArena,
}

impl Frame {
    pub fn with_capacity(capacity: usize) -> Self {
        Frame {
            records: Vec::with_capacity(16),
            bufs: CommandArena::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.records.clear();
        self.bufs.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record, stamping the group and command discriminant into the
    /// state word. Every stored record has a nonzero group and a valid type.
    pub(crate) fn push(&mut self, mut state: RenderState, group: u32, cmd: RenderCommand) {
        debug_assert!(group > 0);
        debug_assert!(state.ty() == Some(cmd.ty()));

        state.set_group(group);
        state.set_command(cmd.kind());
        self.records.push(CommandRecord { state, cmd });
    }

    /// Replays the recorded commands against the driver in group-major order.
    /// The sort is stable and keyed on the masked state word, so records of
    /// one group keep submission order unless their depth/blend/target
    /// buckets differ, and groups themselves execute in ascending id order.
    ///
    /// Driver failures are logged and the drain continues; a single bad call
    /// must not take the render thread down.
    pub(crate) fn drain(&mut self, device: &mut dyn Device, registry: &ResourceRegistry) -> usize {
        self.records.sort_by_key(|record| record.state.sort_key());

        let executed = self.records.len();
        for i in 0..self.records.len() {
            let record = self.records[i].clone();
            if let Err(err) = unsafe { dispatch(&record, &self.bufs, device) } {
                warn!("render command {:?} failed: {}", record.cmd.kind(), err);
            }
            settle(&record.cmd, registry);
        }

        self.records.clear();
        executed
    }
}

unsafe fn dispatch(
    record: &CommandRecord,
    bufs: &CommandArena,
    device: &mut dyn Device,
) -> crate::video::errors::Result<()> {
    match record.cmd {
        RenderCommand::CreateVertexArray(rid) => device.create_vertex_array(rid),
        RenderCommand::DeleteVertexArray(rid) => device.delete_vertex_array(rid),
        RenderCommand::BindVertexArray(rid) => device.bind_vertex_array(rid),
        RenderCommand::UnbindVertexArray => device.unbind_vertex_array(),
        RenderCommand::AddVertexBuffer(ref v) => device.attach_vertex_buffer(v.0, v.1, &v.2),
        RenderCommand::SetIndexBuffer(vao, ibo) => device.attach_index_buffer(vao, ibo),

        RenderCommand::CreateBuffer(rid, kind, usage) => device.create_buffer(rid, kind, usage),
        RenderCommand::DeleteBuffer(rid, kind) => device.delete_buffer(rid, kind),
        RenderCommand::BindBuffer(rid, kind) => device.bind_buffer(rid, kind),
        RenderCommand::UploadBuffer(rid, kind, ptr) => {
            device.upload_buffer(rid, kind, bufs.as_bytes(ptr))
        }

        RenderCommand::CreateProgram(ref v) => device.create_program(v.0, &v.1),
        RenderCommand::DeleteProgram(rid) => device.delete_program(rid),
        RenderCommand::BindProgram(rid) => device.bind_program(rid),
        RenderCommand::UploadUniforms(rid, ptr) => {
            device.upload_uniforms(rid, bufs.as_bytes(ptr))
        }

        RenderCommand::SetClearColor(color) => device.set_clear_color(color),
        RenderCommand::Clear => device.clear(),

        RenderCommand::Draw(call) => device.draw(call),
    }
}

/// Releases the pending registry references a command carried, after its
/// driver call completed. This is the delayed deregistration that makes
/// premature destruction of main-side wrappers safe.
fn settle(cmd: &RenderCommand, registry: &ResourceRegistry) {
    match *cmd {
        RenderCommand::CreateVertexArray(rid) => registry.release(rid),
        RenderCommand::CreateBuffer(rid, _, _) => registry.release(rid),
        RenderCommand::CreateProgram(ref v) => registry.release(v.0),
        RenderCommand::AddVertexBuffer(ref v) => {
            registry.release(v.0);
            registry.release(v.1);
        }
        RenderCommand::SetIndexBuffer(vao, ibo) => {
            registry.release(vao);
            registry.release(ibo);
        }
        _ => {}
    }
}

/// Convenience mirror of `settle` for the submit side: the registry
/// references a command will consume must exist before it is queued.
pub(crate) fn retain_for(cmd: &RenderCommand, registry: &ResourceRegistry) {
    match *cmd {
        RenderCommand::AddVertexBuffer(ref v) => {
            registry.retain(v.0);
            registry.retain(v.1);
        }
        RenderCommand::SetIndexBuffer(vao, ibo) => {
            registry.retain(vao);
            registry.retain(ibo);
        }
        _ => {}
    }
}

#[cfg(test)]
mod test {
    use super::super::backends::headless::HeadlessDevice;
    use super::super::command::{BufferKind, BufferUsage};
    use super::super::state::RenderState;
    use super::*;

    #[test]
    fn group_major_order() {
        let registry = ResourceRegistry::new();
        let (mut device, probe) = HeadlessDevice::new();
        let mut frame = Frame::with_capacity(256);

        let a = registry.register();
        let b = registry.register();

        // Submitted out of group order on purpose.
        frame.push(
            RenderState::command(),
            2,
            RenderCommand::CreateBuffer(b, BufferKind::Vertex, BufferUsage::Static),
        );
        frame.push(
            RenderState::command(),
            1,
            RenderCommand::CreateBuffer(a, BufferKind::Vertex, BufferUsage::Static),
        );

        frame.drain(&mut device, &registry);

        let log = probe.log();
        assert_eq!(log[0], ("create_buffer", a.raw()));
        assert_eq!(log[1], ("create_buffer", b.raw()));
    }

    #[test]
    fn submission_order_within_group() {
        let registry = ResourceRegistry::new();
        let (mut device, probe) = HeadlessDevice::new();
        let mut frame = Frame::with_capacity(256);

        let vao = registry.register();
        frame.push(
            RenderState::command(),
            5,
            RenderCommand::CreateVertexArray(vao),
        );
        frame.push(RenderState::command(), 5, RenderCommand::BindVertexArray(vao));
        frame.push(RenderState::command(), 5, RenderCommand::UnbindVertexArray);

        frame.drain(&mut device, &registry);

        let ops: Vec<&'static str> = probe.log().iter().map(|v| v.0).collect();
        assert_eq!(
            ops,
            vec!["create_vertex_array", "bind_vertex_array", "unbind_vertex_array"]
        );
    }

    #[test]
    fn creation_releases_pending_id() {
        let registry = ResourceRegistry::new();
        let (mut device, _probe) = HeadlessDevice::new();
        let mut frame = Frame::with_capacity(64);

        let rid = registry.register();
        frame.push(
            RenderState::command(),
            1,
            RenderCommand::CreateVertexArray(rid),
        );
        assert!(registry.is_pending(rid));

        frame.drain(&mut device, &registry);
        assert!(!registry.is_pending(rid));
    }
}
