//! The render-thread driver. The thread boots the context and the device,
//! reports readiness through an atomic return code, then cycles between
//! waiting for work and draining the back frame. The main thread interacts
//! with it only at frame boundaries: hold until the previous drain finished,
//! swap the frame pair, release.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::window::Window;

use super::backends::DeviceFactory;
use super::errors::Error;
use super::renderer::ContextState;

const BOOT_PENDING: u8 = 0;
const BOOT_READY: u8 = 1;
const BOOT_FAILED: u8 = 2;

/// The frame-boundary handshake. The exit flag lives under the same lock as
/// the work flag so the render thread can never observe an exit request
/// without also observing the final frame that rides along with it.
#[derive(Default)]
struct Handshake {
    work_ready: bool,
    render_done: bool,
    should_exit: bool,
}

struct RenderShared {
    handshake: Mutex<Handshake>,
    cv: Condvar,
    boot: AtomicU8,
}

pub(crate) struct RenderThread {
    shared: Arc<RenderShared>,
    join: Option<thread::JoinHandle<()>>,
}

impl RenderThread {
    /// Spawns the render thread and blocks until it reports `Ready` or
    /// `Failed`.
    pub fn spawn(
        state: Arc<ContextState>,
        window: Arc<dyn Window>,
        factory: DeviceFactory,
    ) -> crate::errors::Result<RenderThread> {
        let shared = Arc::new(RenderShared {
            handshake: Mutex::new(Handshake {
                work_ready: false,
                // Nothing to wait on before the first frame.
                render_done: true,
                should_exit: false,
            }),
            cv: Condvar::new(),
            boot: AtomicU8::new(BOOT_PENDING),
        });

        let thread_shared = shared.clone();
        let join = thread::Builder::new()
            .name("render".to_owned())
            .spawn(move || run(&thread_shared, &state, &window, factory))?;

        {
            let mut guard = shared.handshake.lock().unwrap();
            while shared.boot.load(Ordering::Acquire) == BOOT_PENDING {
                guard = shared.cv.wait(guard).unwrap();
            }
            drop(guard);
        }

        if shared.boot.load(Ordering::Acquire) == BOOT_FAILED {
            let _ = join.join();
            return Err(Error::BootFailed.into());
        }

        Ok(RenderThread {
            shared,
            join: Some(join),
        })
    }

    /// Blocks until the render thread finished draining the back frame. On
    /// the first frame this returns immediately.
    pub fn sync_and_hold(&self) {
        let mut guard = self.shared.handshake.lock().unwrap();
        while !guard.render_done {
            guard = self.shared.cv.wait(guard).unwrap();
        }
    }

    /// Hands the freshly swapped back frame over for draining. Only valid
    /// while the render thread is held.
    pub fn release(&self) {
        let mut guard = self.shared.handshake.lock().unwrap();
        guard.render_done = false;
        guard.work_ready = true;
        self.shared.cv.notify_all();
    }

    /// Hands the final frame over together with the exit request; the render
    /// thread drains it before returning.
    pub fn release_and_exit(&self) {
        let mut guard = self.shared.handshake.lock().unwrap();
        guard.render_done = false;
        guard.work_ready = true;
        guard.should_exit = true;
        self.shared.cv.notify_all();
    }

    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("render thread panicked");
            }
        }
    }
}

fn run(
    shared: &RenderShared,
    state: &ContextState,
    window: &Arc<dyn Window>,
    factory: DeviceFactory,
) {
    if let Err(err) = window.make_current() {
        error!("render thread failed to acquire the context: {}", err);
        report_boot(shared, BOOT_FAILED);
        return;
    }

    let mut device = match factory() {
        Ok(device) => device,
        Err(err) => {
            error!("render thread failed to boot: {}", err);
            report_boot(shared, BOOT_FAILED);
            return;
        }
    };

    info!("render thread ready");
    report_boot(shared, BOOT_READY);

    loop {
        let (work, exit) = {
            let mut guard = shared.handshake.lock().unwrap();
            while !guard.work_ready && !guard.should_exit {
                guard = shared.cv.wait(guard).unwrap();
            }

            let work = guard.work_ready;
            guard.work_ready = false;
            (work, guard.should_exit)
        };

        if work {
            let executed = state.frames.back_mut().drain(device.as_mut(), &state.registry);
            trace!("drained {} render commands", executed);

            if let Err(err) = window.swap_buffers() {
                warn!("swap buffers failed: {}", err);
            }

            let mut guard = shared.handshake.lock().unwrap();
            guard.render_done = true;
            shared.cv.notify_all();
        }

        if exit {
            break;
        }
    }

    info!("render thread shut down");
}

fn report_boot(shared: &RenderShared, code: u8) {
    let _guard = shared.handshake.lock().unwrap();
    shared.boot.store(code, Ordering::Release);
    shared.cv.notify_all();
}
