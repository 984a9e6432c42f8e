//! The application loop: dispatch, update, UI, render, then the frame
//! handoff to the render thread.

pub mod context;
pub mod settings;

pub use self::context::AppContext;
pub use self::settings::Settings;

use std::sync::Arc;

use crate::errors::Result;
use crate::layer::{
    ConsoleLayer, InputHandlerLayer, Layer, LayerId, LayerStack, UiLayer, WindowLayer,
};
use crate::message::{MessageBus, TranslatorRegistry};
use crate::video::prelude::DeviceProbe;
use crate::video::Renderer;
use crate::window::events::RawEvent;
use crate::window::{HeadlessWindow, Window};

/// The fixed timestep handed to every update.
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// The frame driver. Construction brings the subsystems up in order: window,
/// renderer (which spawns the render thread and waits for it to report
/// ready), translators, then the built-in layer stack. Teardown reverses it.
pub struct Application {
    stack: LayerStack,
    translators: TranslatorRegistry,
    events: Vec<RawEvent>,
    ctx: AppContext,
    renderer: Option<Renderer>,
    probe: Option<DeviceProbe>,
    headless_window: Option<Arc<HeadlessWindow>>,
}

impl Application {
    pub fn new(settings: Settings) -> Result<Application> {
        let mut headless_window = None;
        let window: Arc<dyn Window> = if settings.headless {
            let w = crate::window::headless(settings.window.clone());
            headless_window = Some(w.clone());
            w
        } else {
            crate::window::new(settings.window.clone())?
        };

        let (renderer, probe) = if settings.headless {
            let (renderer, probe) = Renderer::headless(window.clone())?;
            (renderer, Some(probe))
        } else {
            (Renderer::new(window.clone())?, None)
        };

        let ctx = AppContext::new(MessageBus::new(), renderer.context(), window.clone());

        let mut stack = LayerStack::new();
        stack.push(InputHandlerLayer::ID, Box::new(InputHandlerLayer::new()))?;
        stack.push(WindowLayer::ID, Box::new(WindowLayer::new(window)))?;
        stack.push(ConsoleLayer::ID, Box::new(ConsoleLayer::new()))?;
        stack.push(UiLayer::ID, Box::new(UiLayer::new()))?;

        info!("application initialised");
        Ok(Application {
            stack,
            translators: TranslatorRegistry::with_defaults(),
            events: Vec::new(),
            ctx,
            renderer: Some(renderer),
            probe,
            headless_window,
        })
    }

    #[inline]
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn renderer(&self) -> &Renderer {
        self.renderer.as_ref().expect("renderer already torn down")
    }

    /// The device probe, present in headless runs.
    #[inline]
    pub fn probe(&self) -> Option<&DeviceProbe> {
        self.probe.as_ref()
    }

    /// The injectable window, present in headless runs.
    #[inline]
    pub fn headless_window(&self) -> Option<&Arc<HeadlessWindow>> {
        self.headless_window.as_ref()
    }

    /// Pushes a game layer on top of the built-in stack.
    pub fn push_layer(&mut self, id: LayerId, layer: Box<dyn Layer>) -> Result<()> {
        self.stack.push(id, layer)
    }

    pub fn translators_mut(&mut self) -> &mut TranslatorRegistry {
        &mut self.translators
    }

    /// Runs one frame; returns false once quit was requested.
    pub fn step(&mut self) -> Result<bool> {
        // Raw events in, canonical messages out.
        self.events.clear();
        self.ctx.window.poll_events(&mut self.events);
        for event in &self.events {
            if let Some(msg) = self.translators.translate(event) {
                self.ctx.bus.post(msg);
            }
        }

        self.ctx.bus.dispatch(&self.ctx, &mut self.stack);

        for entry in self.stack.entries_mut() {
            entry.1.update(&self.ctx, FRAME_DT);
        }

        // The UI pass runs between update and render.
        for entry in self.stack.entries_mut() {
            entry.1.new_frame(FRAME_DT);
        }
        for entry in self.stack.entries_mut() {
            entry.1.do_ui(&self.ctx);
        }

        // Background layers first; the most recently pushed layer draws
        // last, on top.
        for entry in self.stack.entries_mut() {
            entry.1.render(&self.ctx);
        }

        self.renderer().advance()?;

        Ok(!self.ctx.quit_requested())
    }

    /// Runs until a layer requests quit.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}
        info!("main loop finished");
        Ok(())
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        // The renderer joins the render thread (draining what is left in the
        // queue) before the window goes away.
        self.renderer.take();
        self.ctx.window.destroy();
        info!("shutdown complete");
    }
}
