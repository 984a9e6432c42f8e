use std::os::raw::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use glutin;
use glutin::GlContext;

use cgmath::Vector2;

use crate::errors::Result;

use super::super::events::{Key, MouseButton, RawEvent};
use super::super::{Window, WindowParams};

pub struct GlutinWindow {
    window: glutin::GlWindow,
    events_loop: Mutex<glutin::EventsLoop>,
    vsync: AtomicBool,
    destroyed: AtomicBool,
}

// The adapter is shared across the two threads, but the context is only ever
// made current on the render thread and the events loop is polled only from
// the main thread.
unsafe impl Send for GlutinWindow {}
unsafe impl Sync for GlutinWindow {}

impl GlutinWindow {
    pub fn new(params: WindowParams) -> Result<GlutinWindow> {
        let events_loop = glutin::EventsLoop::new();

        let mut builder = glutin::WindowBuilder::new()
            .with_title(params.title.clone())
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ));

        if params.fullscreen {
            builder = builder.with_fullscreen(Some(events_loop.get_primary_monitor()));
        }

        let context = glutin::ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_gl_profile(glutin::GlProfile::Core)
            .with_gl(glutin::GlRequest::Latest)
            .with_vsync(params.vsync);

        let window = glutin::GlWindow::new(builder, context, &events_loop)
            .map_err(|err| format_err!("failed to open window: {}", err))?;

        Ok(GlutinWindow {
            window,
            events_loop: Mutex::new(events_loop),
            vsync: AtomicBool::new(params.vsync),
            destroyed: AtomicBool::new(false),
        })
    }
}

impl Window for GlutinWindow {
    fn dimensions(&self) -> Vector2<u32> {
        match self.window.get_inner_size() {
            Some(size) => Vector2::new(size.width as u32, size.height as u32),
            None => Vector2::new(0, 0),
        }
    }

    fn set_vsync(&self, on: bool) {
        if self.vsync.swap(on, Ordering::Relaxed) != on {
            // The swap interval is baked into the context at creation.
            warn!("vsync change takes effect after the window is recreated");
        }
    }

    fn is_vsync(&self) -> bool {
        self.vsync.load(Ordering::Relaxed)
    }

    fn poll_events(&self, events: &mut Vec<RawEvent>) {
        let dimensions = self.dimensions();
        let mut events_loop = self.events_loop.lock().unwrap();
        events_loop.poll_events(|v| {
            if let Some(e) = from_event(v, dimensions) {
                events.push(e);
            }
        });
    }

    fn make_current(&self) -> Result<()> {
        unsafe {
            self.window.make_current()?;
        }
        Ok(())
    }

    fn proc_address(&self, symbol: &str) -> *const c_void {
        self.window.get_proc_address(symbol) as *const c_void
    }

    fn swap_buffers(&self) -> Result<()> {
        self.window.swap_buffers()?;
        Ok(())
    }

    fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::Relaxed) {
            self.window.hide();
        }
    }
}

impl Drop for GlutinWindow {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn from_event(source: glutin::Event, dimensions: Vector2<u32>) -> Option<RawEvent> {
    match source {
        glutin::Event::WindowEvent { event, .. } => from_window_event(&event, dimensions),
        _ => None,
    }
}

fn from_window_event(
    source: &glutin::WindowEvent,
    dimensions: Vector2<u32>,
) -> Option<RawEvent> {
    match *source {
        glutin::WindowEvent::CloseRequested => Some(RawEvent::CloseRequested),

        glutin::WindowEvent::Focused(v) => Some(RawEvent::Focused(v)),

        glutin::WindowEvent::Resized(glutin::dpi::LogicalSize { width, height }) => {
            Some(RawEvent::Resized(width as u32, height as u32))
        }

        glutin::WindowEvent::CursorMoved { position, .. } => Some(RawEvent::CursorMoved {
            x: position.x as f32,
            y: dimensions.y as f32 - position.y as f32,
        }),

        glutin::WindowEvent::MouseWheel { delta, .. } => match delta {
            glutin::MouseScrollDelta::LineDelta(_, y) => {
                Some(RawEvent::MouseWheel { delta: y as f32 })
            }
            glutin::MouseScrollDelta::PixelDelta(pos) => {
                Some(RawEvent::MouseWheel { delta: pos.y as f32 })
            }
        },

        glutin::WindowEvent::MouseInput { state, button, .. } => Some(RawEvent::MouseInput {
            button: from_mouse_button(button),
            pressed: state == glutin::ElementState::Pressed,
        }),

        glutin::WindowEvent::KeyboardInput {
            input:
                glutin::KeyboardInput {
                    state,
                    virtual_keycode: Some(key),
                    ..
                },
            ..
        } => from_virtual_key_code(key).map(|key| RawEvent::KeyboardInput {
            key,
            pressed: state == glutin::ElementState::Pressed,
        }),

        glutin::WindowEvent::ReceivedCharacter(character) => {
            Some(RawEvent::ReceivedCharacter(character))
        }

        _ => None,
    }
}

fn from_mouse_button(button: glutin::MouseButton) -> MouseButton {
    match button {
        glutin::MouseButton::Left => MouseButton::Left,
        glutin::MouseButton::Right => MouseButton::Right,
        glutin::MouseButton::Middle => MouseButton::Middle,
        glutin::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

fn from_virtual_key_code(key: glutin::VirtualKeyCode) -> Option<Key> {
    match key {
        glutin::VirtualKeyCode::A => Some(Key::A),
        glutin::VirtualKeyCode::B => Some(Key::B),
        glutin::VirtualKeyCode::C => Some(Key::C),
        glutin::VirtualKeyCode::D => Some(Key::D),
        glutin::VirtualKeyCode::E => Some(Key::E),
        glutin::VirtualKeyCode::F => Some(Key::F),
        glutin::VirtualKeyCode::G => Some(Key::G),
        glutin::VirtualKeyCode::H => Some(Key::H),
        glutin::VirtualKeyCode::I => Some(Key::I),
        glutin::VirtualKeyCode::J => Some(Key::J),
        glutin::VirtualKeyCode::K => Some(Key::K),
        glutin::VirtualKeyCode::L => Some(Key::L),
        glutin::VirtualKeyCode::M => Some(Key::M),
        glutin::VirtualKeyCode::N => Some(Key::N),
        glutin::VirtualKeyCode::O => Some(Key::O),
        glutin::VirtualKeyCode::P => Some(Key::P),
        glutin::VirtualKeyCode::Q => Some(Key::Q),
        glutin::VirtualKeyCode::R => Some(Key::R),
        glutin::VirtualKeyCode::S => Some(Key::S),
        glutin::VirtualKeyCode::T => Some(Key::T),
        glutin::VirtualKeyCode::U => Some(Key::U),
        glutin::VirtualKeyCode::V => Some(Key::V),
        glutin::VirtualKeyCode::W => Some(Key::W),
        glutin::VirtualKeyCode::X => Some(Key::X),
        glutin::VirtualKeyCode::Y => Some(Key::Y),
        glutin::VirtualKeyCode::Z => Some(Key::Z),
        glutin::VirtualKeyCode::Key0 => Some(Key::Key0),
        glutin::VirtualKeyCode::Key1 => Some(Key::Key1),
        glutin::VirtualKeyCode::Key2 => Some(Key::Key2),
        glutin::VirtualKeyCode::Key3 => Some(Key::Key3),
        glutin::VirtualKeyCode::Key4 => Some(Key::Key4),
        glutin::VirtualKeyCode::Key5 => Some(Key::Key5),
        glutin::VirtualKeyCode::Key6 => Some(Key::Key6),
        glutin::VirtualKeyCode::Key7 => Some(Key::Key7),
        glutin::VirtualKeyCode::Key8 => Some(Key::Key8),
        glutin::VirtualKeyCode::Key9 => Some(Key::Key9),
        glutin::VirtualKeyCode::Escape => Some(Key::Escape),
        glutin::VirtualKeyCode::Return => Some(Key::Return),
        glutin::VirtualKeyCode::Tab => Some(Key::Tab),
        glutin::VirtualKeyCode::Space => Some(Key::Space),
        glutin::VirtualKeyCode::Back => Some(Key::Back),
        glutin::VirtualKeyCode::Delete => Some(Key::Delete),
        glutin::VirtualKeyCode::Left => Some(Key::Left),
        glutin::VirtualKeyCode::Right => Some(Key::Right),
        glutin::VirtualKeyCode::Up => Some(Key::Up),
        glutin::VirtualKeyCode::Down => Some(Key::Down),
        glutin::VirtualKeyCode::Home => Some(Key::Home),
        glutin::VirtualKeyCode::End => Some(Key::End),
        glutin::VirtualKeyCode::PageUp => Some(Key::PageUp),
        glutin::VirtualKeyCode::PageDown => Some(Key::PageDown),
        glutin::VirtualKeyCode::LShift => Some(Key::LShift),
        glutin::VirtualKeyCode::RShift => Some(Key::RShift),
        glutin::VirtualKeyCode::LControl => Some(Key::LControl),
        glutin::VirtualKeyCode::RControl => Some(Key::RControl),
        glutin::VirtualKeyCode::LAlt => Some(Key::LAlt),
        glutin::VirtualKeyCode::RAlt => Some(Key::RAlt),
        glutin::VirtualKeyCode::Minus => Some(Key::Minus),
        glutin::VirtualKeyCode::Equals => Some(Key::Equals),
        glutin::VirtualKeyCode::Grave => Some(Key::Grave),
        _ => None,
    }
}
