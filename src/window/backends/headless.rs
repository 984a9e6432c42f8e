use std::collections::VecDeque;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use cgmath::Vector2;

use crate::errors::Result;

use super::super::events::RawEvent;
use super::super::{Window, WindowParams};

/// A windowless adapter. Events are injected by tests and drained by the
/// application loop like any backend's.
pub struct HeadlessWindow {
    dimensions: Mutex<Vector2<u32>>,
    vsync: AtomicBool,
    queue: Mutex<VecDeque<RawEvent>>,
    destroyed: AtomicBool,
}

impl HeadlessWindow {
    pub fn new(params: WindowParams) -> HeadlessWindow {
        HeadlessWindow {
            dimensions: Mutex::new(params.size),
            vsync: AtomicBool::new(params.vsync),
            queue: Mutex::new(VecDeque::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Queues a raw event for the next poll.
    pub fn inject(&self, event: RawEvent) {
        if let RawEvent::Resized(w, h) = event {
            *self.dimensions.lock().unwrap() = Vector2::new(w, h);
        }
        self.queue.lock().unwrap().push_back(event);
    }
}

impl Window for HeadlessWindow {
    fn dimensions(&self) -> Vector2<u32> {
        *self.dimensions.lock().unwrap()
    }

    fn set_vsync(&self, on: bool) {
        self.vsync.store(on, Ordering::Relaxed);
    }

    fn is_vsync(&self) -> bool {
        self.vsync.load(Ordering::Relaxed)
    }

    fn poll_events(&self, events: &mut Vec<RawEvent>) {
        events.extend(self.queue.lock().unwrap().drain(..));
    }

    fn make_current(&self) -> Result<()> {
        Ok(())
    }

    fn proc_address(&self, _: &str) -> *const c_void {
        ptr::null()
    }

    fn swap_buffers(&self) -> Result<()> {
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Relaxed);
    }
}
