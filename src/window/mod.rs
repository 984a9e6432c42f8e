//! The window/context adapter: the one interface the pipeline uses to poll
//! events, resolve driver symbols and present.

pub mod events;

mod backends;

pub use self::backends::headless::HeadlessWindow;

use std::os::raw::c_void;
use std::sync::Arc;

use cgmath::Vector2;

use crate::errors::Result;

use self::events::RawEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
    pub fullscreen: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "Window".to_owned(),
            size: Vector2::new(1024, 768),
            multisample: 2,
            vsync: false,
            fullscreen: false,
        }
    }
}

/// The adapter contract. The object is shared between the two threads, but
/// the context itself is only ever current on the render thread:
/// `make_current` and `swap_buffers` are render-thread calls, everything else
/// belongs to the main thread.
pub trait Window: Send + Sync {
    fn dimensions(&self) -> Vector2<u32>;

    fn set_vsync(&self, on: bool);
    fn is_vsync(&self) -> bool;

    /// Drains pending backend events into `events`.
    fn poll_events(&self, events: &mut Vec<RawEvent>);

    /// Makes the GL context current on the calling thread.
    fn make_current(&self) -> Result<()>;

    /// Resolves a driver symbol; used while booting the device.
    fn proc_address(&self, symbol: &str) -> *const c_void;

    /// Presents the back buffer. Called only from the render thread during
    /// the swap phase.
    fn swap_buffers(&self) -> Result<()>;

    /// Tears the window down. Idempotent; also runs on drop.
    fn destroy(&self);
}

/// Opens a real window with a GL context.
pub fn new(params: WindowParams) -> Result<Arc<dyn Window>> {
    let window = backends::glutin::GlutinWindow::new(params)?;
    Ok(Arc::new(window))
}

/// A windowless adapter for tests and headless runs.
pub fn headless(params: WindowParams) -> Arc<HeadlessWindow> {
    Arc::new(HeadlessWindow::new(params))
}
