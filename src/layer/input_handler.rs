use crate::application::context::AppContext;
use crate::message::Message;
use crate::utils::FastHashMap;
use crate::window::events::Key;

use super::{Layer, LayerId};

/// Maps keys to posted messages. Sits near the bottom of the stack so layers
/// above get the first look at raw key presses.
pub struct InputHandlerLayer {
    bindings: FastHashMap<Key, Message>,
}

impl InputHandlerLayer {
    pub const ID: LayerId = 1;

    pub fn new() -> Self {
        let mut layer = InputHandlerLayer {
            bindings: FastHashMap::default(),
        };
        layer.bind(Key::Escape, Message::Quit);
        layer
    }

    pub fn bind(&mut self, key: Key, msg: Message) {
        self.bindings.insert(key, msg);
    }

    pub fn unbind(&mut self, key: Key) {
        self.bindings.remove(&key);
    }
}

impl Default for InputHandlerLayer {
    fn default() -> Self {
        InputHandlerLayer::new()
    }
}

impl Layer for InputHandlerLayer {
    fn handle_message(&mut self, ctx: &AppContext, msg: &Message) -> bool {
        if let Message::KeyPressed { key, .. } = *msg {
            if let Some(bound) = self.bindings.get(&key) {
                ctx.bus.post(bound.clone());
                return true;
            }
        }
        false
    }
}
