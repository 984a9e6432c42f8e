//! The main-thread face of the pipeline. `RenderContext` records commands;
//! `Renderer` owns the render thread and drives the frame handshake.

use std::sync::{Arc, Mutex};

use crate::window::Window;

use super::arena::ArenaPtr;
use super::backends::gl::GlDevice;
use super::backends::headless::{DeviceProbe, HeadlessDevice};
use super::backends::{Device, DeviceFactory};
use super::command::RenderCommand;
use super::frame::{retain_for, Frame};
use super::group::Groups;
use super::registry::ResourceRegistry;
use super::state::RenderState;
use super::thread::RenderThread;
use crate::utils::DoubleBuf;

const FRAME_ARENA_CAPACITY: usize = 64 * 1024;

pub(crate) struct ContextState {
    pub frames: DoubleBuf<Frame>,
    pub groups: Mutex<Groups>,
    pub registry: ResourceRegistry,
}

/// A cheap, cloneable handle through which resource wrappers record commands.
/// Everything submitted between two `advance` calls lands in the same frame.
#[derive(Clone)]
pub struct RenderContext {
    state: Arc<ContextState>,
}

impl RenderContext {
    fn new() -> Self {
        RenderContext {
            state: Arc::new(ContextState {
                frames: DoubleBuf::new(
                    Frame::with_capacity(FRAME_ARENA_CAPACITY),
                    Frame::with_capacity(FRAME_ARENA_CAPACITY),
                ),
                groups: Mutex::new(Groups::default()),
                registry: ResourceRegistry::new(),
            }),
        }
    }

    /// Opens a command group: everything submitted until `end_group` replays
    /// in submission order as one unit.
    pub fn begin_group(&self) {
        self.state.groups.lock().unwrap().begin();
    }

    pub fn end_group(&self) {
        self.state.groups.lock().unwrap().end();
    }

    #[inline]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.state.registry
    }

    /// Records one command, stamped with the open (or an implicit singleton)
    /// group.
    pub fn submit(&self, state: RenderState, cmd: RenderCommand) {
        retain_for(&cmd, &self.state.registry);
        let group = self.state.groups.lock().unwrap().current();
        self.state.frames.write().push(state, group, cmd);
    }

    /// Records one command whose payload is copied into the frame arena.
    pub fn submit_with_data<F>(&self, state: RenderState, data: &[u8], cmd: F)
    where
        F: FnOnce(ArenaPtr<[u8]>) -> RenderCommand,
    {
        let group = self.state.groups.lock().unwrap().current();
        let mut frame = self.state.frames.write();
        let ptr = frame.bufs.extend_from_slice(data);
        let cmd = cmd(ptr);
        retain_for(&cmd, &self.state.registry);
        frame.push(state, group, cmd);
    }

    /// Number of commands recorded into the current producer frame.
    pub fn recorded_len(&self) -> usize {
        self.state.frames.write().len()
    }
}

pub struct Renderer {
    ctx: RenderContext,
    thread: RenderThread,
    window: Arc<dyn Window>,
}

impl Renderer {
    /// Spawns the render thread against the real driver and blocks until it
    /// reports ready.
    pub fn new(window: Arc<dyn Window>) -> crate::errors::Result<Renderer> {
        let loader = window.clone();
        let factory: DeviceFactory = Box::new(move || {
            let device = unsafe { GlDevice::new(|symbol| loader.proc_address(symbol))? };
            Ok(Box::new(device) as Box<dyn Device>)
        });

        Renderer::with_device(window, factory)
    }

    /// Spawns the render thread against the in-memory device and returns the
    /// probe observing it.
    pub fn headless(window: Arc<dyn Window>) -> crate::errors::Result<(Renderer, DeviceProbe)> {
        let (device, probe) = HeadlessDevice::new();
        let factory: DeviceFactory = Box::new(move || Ok(Box::new(device) as Box<dyn Device>));

        let renderer = Renderer::with_device(window, factory)?;
        Ok((renderer, probe))
    }

    pub fn with_device(
        window: Arc<dyn Window>,
        factory: DeviceFactory,
    ) -> crate::errors::Result<Renderer> {
        let ctx = RenderContext::new();
        let thread = RenderThread::spawn(ctx.state.clone(), window.clone(), factory)?;

        Ok(Renderer {
            ctx,
            thread,
            window,
        })
    }

    #[inline]
    pub fn context(&self) -> RenderContext {
        self.ctx.clone()
    }

    #[inline]
    pub fn window(&self) -> &Arc<dyn Window> {
        &self.window
    }

    #[inline]
    pub fn begin_group(&self) {
        self.ctx.begin_group();
    }

    #[inline]
    pub fn end_group(&self) {
        self.ctx.end_group();
    }

    pub fn set_clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.ctx
            .submit(RenderState::command(), RenderCommand::SetClearColor([r, g, b, a]));
    }

    pub fn clear(&self) {
        self.ctx.submit(RenderState::command(), RenderCommand::Clear);
    }

    /// The frame handshake: hold until the previous drain finished, swap the
    /// frame pair, reset the new producer frame and release the render
    /// thread. The main thread runs at most one frame ahead.
    pub fn advance(&self) -> crate::errors::Result<()> {
        self.thread.sync_and_hold();
        self.ctx.state.frames.swap();
        self.ctx.state.frames.write().clear();
        self.thread.release();
        Ok(())
    }
}

impl Drop for Renderer {
    /// Cooperative shutdown: hand over whatever was recorded since the last
    /// frame so queued deletions still run, then join.
    fn drop(&mut self) {
        self.thread.sync_and_hold();
        self.ctx.state.frames.swap();
        self.thread.release_and_exit();
        self.thread.join();
    }
}
