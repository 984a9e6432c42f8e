//! Layers and the layer stack. A layer is a cooperating component of the
//! application: it receives messages (topmost layer first, until one handles
//! the message), updates, participates in the UI pass and records render
//! commands.

pub mod console;
pub mod input_handler;
pub mod stack;
pub mod ui;
pub mod window_layer;

pub use self::console::ConsoleLayer;
pub use self::input_handler::InputHandlerLayer;
pub use self::stack::LayerStack;
pub use self::ui::UiLayer;
pub use self::window_layer::WindowLayer;

use crate::application::context::AppContext;
use crate::message::Message;

/// A stable tag identifying one layer in the stack.
pub type LayerId = u32;

pub trait Layer {
    /// Returns true to mark the message handled and stop its dispatch.
    fn handle_message(&mut self, _ctx: &AppContext, _msg: &Message) -> bool {
        false
    }

    fn update(&mut self, _ctx: &AppContext, _dt: f32) {}

    /// Start-of-frame hook for the UI pass; only the UI layer cares.
    fn new_frame(&mut self, _dt: f32) {}

    fn do_ui(&mut self, _ctx: &AppContext) {}

    fn render(&mut self, _ctx: &AppContext) {}
}
