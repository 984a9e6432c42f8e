use crate::window::events::RawEvent;

use super::Message;

/// Converts one backend event into a canonical message. Returning `None`
/// drops the event.
pub type Translator = fn(&RawEvent) -> Option<Message>;

/// The translator chain, installed once at startup. Translators run in
/// registration order; the first one that produces a message wins, so hosts
/// can front-run the defaults.
#[derive(Default)]
pub struct TranslatorRegistry {
    translators: Vec<Translator>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        TranslatorRegistry::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = TranslatorRegistry::new();
        registry.add(default_translator);
        registry
    }

    pub fn add(&mut self, translator: Translator) {
        self.translators.push(translator);
    }

    pub fn translate(&self, event: &RawEvent) -> Option<Message> {
        for translator in &self.translators {
            if let Some(msg) = translator(event) {
                return Some(msg);
            }
        }
        None
    }
}

fn default_translator(event: &RawEvent) -> Option<Message> {
    match *event {
        RawEvent::CloseRequested => Some(Message::Quit),
        RawEvent::Resized(width, height) => Some(Message::WindowResized { width, height }),
        RawEvent::Focused(gained) => Some(Message::WindowFocus { gained }),
        RawEvent::KeyboardInput { key, pressed: true } => {
            Some(Message::KeyPressed { key, repeat: false })
        }
        RawEvent::KeyboardInput { key, pressed: false } => Some(Message::KeyReleased { key }),
        RawEvent::ReceivedCharacter(character) => Some(Message::TextInput { character }),
        RawEvent::CursorMoved { x, y } => Some(Message::MouseMoved { x, y }),
        RawEvent::MouseInput { button, pressed: true } => {
            Some(Message::MouseButtonPressed { button })
        }
        RawEvent::MouseInput { button, pressed: false } => {
            Some(Message::MouseButtonReleased { button })
        }
        RawEvent::MouseWheel { delta } => Some(Message::MouseWheel { delta }),
    }
}
