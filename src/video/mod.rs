//! The render-command pipeline: typed commands recorded on the main thread
//! into a double-buffered frame, drained and replayed by the render thread
//! that owns the GL context.
//!
//! Recording happens through a [`RenderContext`], which stamps every record
//! with the open command group and hands bulk payloads to the frame's byte
//! arena. [`Renderer`] owns the render thread and drives the once-per-frame
//! handshake: hold until the previous drain finished, swap the frame pair,
//! release.

pub mod arena;
pub mod assets;
pub mod backends;
pub mod command;
pub mod errors;
pub mod frame;
pub mod group;
pub mod registry;
pub mod renderer;
pub mod state;
pub mod thread;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::DeviceProbe;
    pub use super::command::{BufferKind, BufferUsage, DrawCall, Primitive, RenderCommand};
    pub use super::registry::{ResourceRegistry, Rid};
    pub use super::renderer::{RenderContext, Renderer};
    pub use super::state::{BlendMode, CommandKind, RenderState, StateType};
}

pub use self::registry::{ResourceRegistry, Rid};
pub use self::renderer::{RenderContext, Renderer};
pub use self::state::RenderState;
