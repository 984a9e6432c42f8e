extern crate charcoal;
extern crate env_logger;

use std::cell::Cell;
use std::rc::Rc;

use charcoal::application::{Application, Settings};
use charcoal::layer::Layer;
use charcoal::message::Message;
use charcoal::prelude::AppContext;
use charcoal::window::events::{Key, RawEvent};

fn headless_app() -> Application {
    env_logger::try_init().ok();
    let mut settings = Settings::default();
    settings.headless = true;
    Application::new(settings).unwrap()
}

/// Counts how often it sees one message class; optionally consumes it.
struct Counter {
    class: charcoal::message::MessageClass,
    hits: Rc<Cell<u32>>,
    consume: bool,
}

impl Layer for Counter {
    fn handle_message(&mut self, _: &AppContext, msg: &Message) -> bool {
        if msg.class() == self.class {
            self.hits.set(self.hits.get() + 1);
            return self.consume;
        }
        false
    }
}

#[test]
fn handled_messages_short_circuit() {
    let mut app = headless_app();

    let class = charcoal::message::MessageClass::KeyPressed;
    let (a, b, c) = (
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    );

    // Pushed bottom-up: C, then B, then A on top. A consumes key presses.
    app.push_layer(100, Box::new(Counter { class, hits: c.clone(), consume: false }))
        .unwrap();
    app.push_layer(101, Box::new(Counter { class, hits: b.clone(), consume: false }))
        .unwrap();
    app.push_layer(102, Box::new(Counter { class, hits: a.clone(), consume: true }))
        .unwrap();

    app.context().bus.post(Message::KeyPressed {
        key: Key::K,
        repeat: false,
    });
    app.step().unwrap();

    assert_eq!(a.get(), 1);
    assert_eq!(b.get(), 0);
    assert_eq!(c.get(), 0);
}

#[test]
fn unhandled_messages_reach_every_layer() {
    let mut app = headless_app();

    let class = charcoal::message::MessageClass::MouseWheel;
    let (a, b) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));

    app.push_layer(100, Box::new(Counter { class, hits: b.clone(), consume: false }))
        .unwrap();
    app.push_layer(101, Box::new(Counter { class, hits: a.clone(), consume: false }))
        .unwrap();

    app.context().bus.post(Message::MouseWheel { delta: 1.0 });
    app.step().unwrap();

    assert_eq!(a.get(), 1);
    assert_eq!(b.get(), 1);
}

/// Posts a reply while handling; the reply must not dispatch in the same
/// frame.
struct Replier {
    replies_seen: Rc<Cell<u32>>,
}

impl Layer for Replier {
    fn handle_message(&mut self, ctx: &AppContext, msg: &Message) -> bool {
        match *msg {
            Message::KeyPressed { .. } => {
                ctx.bus.post(Message::ConsoleLine {
                    text: "reply".to_owned(),
                });
                true
            }
            Message::ConsoleLine { .. } => {
                self.replies_seen.set(self.replies_seen.get() + 1);
                true
            }
            _ => false,
        }
    }
}

#[test]
fn posts_during_dispatch_defer_to_next_frame() {
    let mut app = headless_app();

    let replies = Rc::new(Cell::new(0));
    app.push_layer(100, Box::new(Replier { replies_seen: replies.clone() }))
        .unwrap();

    app.context().bus.post(Message::KeyPressed {
        key: Key::K,
        repeat: false,
    });

    app.step().unwrap();
    assert_eq!(replies.get(), 0);

    app.step().unwrap();
    assert_eq!(replies.get(), 1);
}

#[test]
fn quit_exits_within_one_frame() {
    let mut app = headless_app();

    // A marker that must still drain during shutdown.
    app.context().video.submit(
        charcoal::video::state::RenderState::command(),
        charcoal::video::command::RenderCommand::SetClearColor([0.1, 0.2, 0.3, 1.0]),
    );

    let window = app.headless_window().unwrap().clone();
    let probe = app.probe().unwrap().clone();

    window.inject(RawEvent::CloseRequested);
    assert_eq!(app.step().unwrap(), false);

    // The render thread drains its pending arena before the process moves
    // on.
    drop(app);
    assert_eq!(probe.clear_color(), [0.1, 0.2, 0.3, 1.0]);
}

#[test]
fn escape_is_bound_to_quit() {
    let mut app = headless_app();

    let window = app.headless_window().unwrap().clone();
    window.inject(RawEvent::KeyboardInput {
        key: Key::Escape,
        pressed: true,
    });

    // Frame one translates and dispatches the key press; the input handler
    // posts Quit during dispatch, which surfaces next frame.
    assert_eq!(app.step().unwrap(), true);
    assert_eq!(app.step().unwrap(), false);
}

#[test]
fn console_collects_text_and_quits() {
    let mut app = headless_app();
    let window = app.headless_window().unwrap().clone();

    // Open the console, type "quit", hit return.
    window.inject(RawEvent::KeyboardInput { key: Key::Grave, pressed: true });
    for character in "quit".chars() {
        window.inject(RawEvent::ReceivedCharacter(character));
    }
    window.inject(RawEvent::KeyboardInput { key: Key::Return, pressed: true });

    // Frame one runs the console; Quit defers; frame two honors it.
    assert_eq!(app.step().unwrap(), true);
    assert_eq!(app.step().unwrap(), false);
}
