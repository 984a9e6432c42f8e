//! # What is This?
//!
//! Charcoal is a small game framework written in Rust. Its core is a
//! render-command pipeline that decouples the game's main thread from a
//! dedicated render thread which owns the OpenGL context. The main thread
//! records typed render commands into a double-buffered frame; once per frame
//! the two threads handshake, the frames swap roles and the render thread
//! replays the recorded commands against the driver in group order.
//!
//! On top of the pipeline sit a layered message bus that routes window and
//! input events through a stack of cooperating layers, and a shader
//! reflection engine that parses a GLSL subset, lays uniforms out with the
//! std140 rules and binds client-side uniform buffers to GPU locations.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use charcoal::prelude::*;
//!
//! let mut settings = Settings::default();
//! settings.window.title = "triangle".to_owned();
//!
//! let mut app = Application::new(settings).unwrap();
//! app.run().unwrap();
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod errors;
pub mod utils;

pub mod application;
pub mod layer;
pub mod message;
pub mod shader;
pub mod video;
pub mod window;

pub mod prelude {
    pub use crate::application::{Application, Settings};
    pub use crate::application::context::AppContext;
    pub use crate::errors::Result;
    pub use crate::layer::{Layer, LayerId};
    pub use crate::message::{Message, MessageClass};
    pub use crate::shader::prelude::*;
    pub use crate::video::prelude::*;
    pub use crate::window::{Window, WindowParams};
}
