use crate::application::context::AppContext;
use crate::message::Message;
use crate::window::events::MouseButton;

use super::{Layer, LayerId};

/// Input state snapshotted for one UI frame. Wheel movement and text input
/// are transient and reset by `new_frame`; the rest persists.
#[derive(Debug, Clone, Default)]
pub struct UiFrame {
    pub dt: f32,
    pub mouse: [f32; 2],
    pub buttons: [bool; 3],
    pub wheel: f32,
    pub text: String,
    pub display_size: [f32; 2],
}

/// The immediate-mode UI layer. It is not responsible for any actual widget
/// rendering; it tracks the input state the UI pass consumes and runs the
/// per-frame `new_frame`/`do_ui` protocol. Sits on top of the stack so it
/// can observe input before the game layers.
pub struct UiLayer {
    frame: UiFrame,
}

impl UiLayer {
    pub const ID: LayerId = 4;

    pub fn new() -> Self {
        UiLayer {
            frame: UiFrame::default(),
        }
    }

    #[inline]
    pub fn frame(&self) -> &UiFrame {
        &self.frame
    }

    fn button_slot(&mut self, button: MouseButton) -> Option<&mut bool> {
        match button {
            MouseButton::Left => Some(&mut self.frame.buttons[0]),
            MouseButton::Right => Some(&mut self.frame.buttons[1]),
            MouseButton::Middle => Some(&mut self.frame.buttons[2]),
            MouseButton::Other(_) => None,
        }
    }
}

impl Default for UiLayer {
    fn default() -> Self {
        UiLayer::new()
    }
}

impl Layer for UiLayer {
    fn handle_message(&mut self, _: &AppContext, msg: &Message) -> bool {
        match *msg {
            Message::MouseMoved { x, y } => {
                self.frame.mouse = [x, y];
            }
            Message::MouseButtonPressed { button } => {
                if let Some(slot) = self.button_slot(button) {
                    *slot = true;
                }
            }
            Message::MouseButtonReleased { button } => {
                if let Some(slot) = self.button_slot(button) {
                    *slot = false;
                }
            }
            Message::MouseWheel { delta } => {
                self.frame.wheel += delta;
            }
            Message::TextInput { character } => {
                if !character.is_control() {
                    self.frame.text.push(character);
                }
            }
            Message::WindowResized { width, height } => {
                self.frame.display_size = [width as f32, height as f32];
            }
            _ => {}
        }

        // Observed, never consumed; the layers below still see everything.
        false
    }

    fn new_frame(&mut self, dt: f32) {
        self.frame.dt = dt;
        self.frame.wheel = 0.0;
        self.frame.text.clear();
    }
}
