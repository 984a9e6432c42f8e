use crate::application::context::AppContext;
use crate::message::{Message, MessageFlags};
use crate::window::events::Key;

use super::{Layer, LayerId};

/// A drop-down console. Closed it only watches for its toggle key; open it
/// consumes text input into a line buffer and executes the line on return.
pub struct ConsoleLayer {
    open: bool,
    line: String,
    history: Vec<String>,
}

impl ConsoleLayer {
    pub const ID: LayerId = 3;

    pub fn new() -> Self {
        ConsoleLayer {
            open: false,
            line: String::new(),
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn line(&self) -> &str {
        &self.line
    }

    #[inline]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn execute(&mut self, ctx: &AppContext) {
        let line = ::std::mem::replace(&mut self.line, String::new());
        let trimmed = line.trim().to_owned();
        if trimmed.is_empty() {
            return;
        }

        info!("console: {}", trimmed);
        match trimmed.as_str() {
            "quit" | "exit" => ctx.bus.post(Message::Quit),
            _ => ctx.bus.post_with_flags(
                Message::ConsoleLine {
                    text: trimmed.clone(),
                },
                MessageFlags::SHOW,
            ),
        }

        self.history.push(trimmed);
    }
}

impl Default for ConsoleLayer {
    fn default() -> Self {
        ConsoleLayer::new()
    }
}

impl Layer for ConsoleLayer {
    fn handle_message(&mut self, ctx: &AppContext, msg: &Message) -> bool {
        match *msg {
            Message::KeyPressed { key: Key::Grave, .. } => {
                self.open = !self.open;
                true
            }
            Message::KeyPressed { key: Key::Return, .. } if self.open => {
                self.execute(ctx);
                true
            }
            Message::KeyPressed { key: Key::Back, .. } if self.open => {
                self.line.pop();
                true
            }
            Message::TextInput { character } if self.open => {
                if character != '`' && !character.is_control() {
                    self.line.push(character);
                }
                true
            }
            _ => false,
        }
    }
}
