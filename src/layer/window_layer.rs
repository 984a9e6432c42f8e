use std::sync::Arc;

use crate::application::context::AppContext;
use crate::message::Message;
use crate::window::Window;

use super::{Layer, LayerId};

/// Owns the window's view of the message stream: resize bookkeeping and the
/// quit request.
pub struct WindowLayer {
    window: Arc<dyn Window>,
}

impl WindowLayer {
    pub const ID: LayerId = 2;

    pub fn new(window: Arc<dyn Window>) -> Self {
        WindowLayer { window }
    }
}

impl Layer for WindowLayer {
    fn handle_message(&mut self, ctx: &AppContext, msg: &Message) -> bool {
        match *msg {
            Message::WindowResized { width, height } => {
                debug!(
                    "window resized to {}x{} (was {:?})",
                    width,
                    height,
                    self.window.dimensions()
                );
                false
            }
            Message::Quit => {
                ctx.request_quit();
                true
            }
            _ => false,
        }
    }
}
