use std::cell::Cell;
use std::sync::Arc;

use crate::message::MessageBus;
use crate::video::RenderContext;
use crate::window::Window;

/// Everything a layer may reach during a frame: the bus for posting
/// messages, the render context for recording commands and the window
/// adapter. Explicitly passed instead of living in ambient globals.
pub struct AppContext {
    pub bus: MessageBus,
    pub video: RenderContext,
    pub window: Arc<dyn Window>,
    quit: Cell<bool>,
}

impl AppContext {
    pub(crate) fn new(bus: MessageBus, video: RenderContext, window: Arc<dyn Window>) -> Self {
        AppContext {
            bus,
            video,
            window,
            quit: Cell::new(false),
        }
    }

    /// Ends the main loop at the end of the current frame.
    pub fn request_quit(&self) {
        self.quit.set(true);
    }

    #[inline]
    pub fn quit_requested(&self) -> bool {
        self.quit.get()
    }
}
