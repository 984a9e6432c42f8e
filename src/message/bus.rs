use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::application::context::AppContext;
use crate::layer::stack::LayerStack;

use super::{Message, MessageFlags};

#[derive(Debug)]
struct Envelope {
    msg: Message,
    flags: MessageFlags,
}

/// The message ring. Posting is allowed from anywhere on the main thread,
/// including from inside a handler: the bus never recurses, posts made during
/// a dispatch surface next frame.
#[derive(Default)]
pub struct MessageBus {
    queue: RefCell<VecDeque<Envelope>>,
    deferred: RefCell<VecDeque<Envelope>>,
    dispatching: Cell<bool>,
}

impl MessageBus {
    pub fn new() -> Self {
        MessageBus::default()
    }

    pub fn post(&self, msg: Message) {
        self.post_with_flags(msg, MessageFlags::NONE);
    }

    pub fn post_with_flags(&self, msg: Message, flags: MessageFlags) {
        let envelope = Envelope { msg, flags };
        if self.dispatching.get() {
            self.deferred.borrow_mut().push_back(envelope);
        } else {
            self.queue.borrow_mut().push_back(envelope);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Drains the ring; each message walks the stack from the topmost layer
    /// downward until some layer reports it handled.
    pub fn dispatch(&self, ctx: &AppContext, stack: &mut LayerStack) {
        debug_assert!(!self.dispatching.get(), "message dispatch re-entered");
        self.dispatching.set(true);

        loop {
            let envelope = self.queue.borrow_mut().pop_front();
            let mut envelope = match envelope {
                Some(v) => v,
                None => break,
            };

            if envelope.flags.contains(MessageFlags::SHOW) {
                debug!("dispatching {:?}", envelope.msg);
            }

            for entry in stack.entries_mut().iter_mut().rev() {
                if entry.1.handle_message(ctx, &envelope.msg) {
                    envelope.flags.insert(MessageFlags::HANDLED);
                    break;
                }
            }
        }

        self.dispatching.set(false);

        let mut queue = self.queue.borrow_mut();
        queue.extend(self.deferred.borrow_mut().drain(..));
    }
}
