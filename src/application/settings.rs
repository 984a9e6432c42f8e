//! Startup configuration.

use crate::window::WindowParams;

/// A structure containing configuration data for the engine, used to set up
/// the window and the render pipeline. Serializable so hosts can load it
/// from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub window: WindowParams,
    /// Run without a real window or driver; used by tests and tools.
    pub headless: bool,
}
