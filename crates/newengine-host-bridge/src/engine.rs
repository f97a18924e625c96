use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::bridge::HostBridge;
use crate::config::EngineLoopConfig;
use crate::dispatch::CommandHandler;
use crate::error::{BridgeError, BridgeResult};

/// Stop flag shared by the engine loop and whoever may end it
/// (ctrl-c handler, host window close, the app itself).
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    #[inline]
    pub fn new() -> Self {
        Self { flag: Arc::new(AtomicBool::new(false)) }
    }

    #[inline]
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Frame timing snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub index: u64,
    /// Clamped delta (sec).
    pub dt: f32,
    /// Seconds since the loop started.
    pub elapsed: f64,
    /// Commands dispatched at the start of this frame.
    pub commands: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickControl {
    Continue,
    Exit,
}

/// Engine-side application driven by [`EngineThread`].
pub trait EngineApp: CommandHandler + Send {
    fn tick(&mut self, _frame: &Frame) -> TickControl {
        TickControl::Continue
    }

    /// Last call on the engine thread, after the final drain.
    fn shutdown(&mut self) {}
}

/// Engine tick loop on its own thread.
pub struct EngineThread<A: EngineApp + 'static> {
    handle: JoinHandle<A>,
    shutdown: ShutdownToken,
}

impl<A: EngineApp + 'static> EngineThread<A> {
    pub fn spawn(
        bridge: Arc<HostBridge>,
        app: A,
        cfg: &EngineLoopConfig,
        shutdown: ShutdownToken,
    ) -> BridgeResult<Self> {
        let cfg = cfg.clone();
        let token = shutdown.clone();

        let handle = thread::Builder::new()
            .name("engine".into())
            .spawn(move || run_loop(&bridge, app, &cfg, &token))
            .map_err(BridgeError::Spawn)?;

        Ok(Self { handle, shutdown })
    }

    #[inline]
    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request shutdown and wait for the loop to finish. Returns the app.
    pub fn stop(self) -> BridgeResult<A> {
        self.shutdown.request();
        self.join()
    }

    pub fn join(self) -> BridgeResult<A> {
        self.handle.join().map_err(|e| {
            let msg = e
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| e.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            BridgeError::EngineThreadPanicked(msg)
        })
    }
}

/// The engine loop body. Public so embedders that own their thread can run it.
///
/// The bridge's engine side is shut down on every exit path, including a
/// panicking app, so the host never waits on a thread that is gone.
pub fn run_loop<A: EngineApp>(
    bridge: &HostBridge,
    mut app: A,
    cfg: &EngineLoopConfig,
    shutdown: &ShutdownToken,
) -> A {
    struct EngineSideGuard<'a>(&'a HostBridge);
    impl Drop for EngineSideGuard<'_> {
        fn drop(&mut self) {
            self.0.shutdown_engine();
        }
    }
    let _guard = EngineSideGuard(bridge);

    let tick = cfg.tick_interval();
    let max_dt = cfg.max_dt_sec.max(0.001);
    let start = Instant::now();
    let mut last = start;
    let mut index = 0u64;

    log::info!(target: "engine", "engine loop start, tick={:.2}ms", tick.as_secs_f32() * 1000.0);

    while !shutdown.is_requested() {
        let frame_start = Instant::now();
        let commands = bridge.drain_and_dispatch(&mut app);

        let dt = frame_start.duration_since(last).as_secs_f32().min(max_dt);
        last = frame_start;

        let frame = Frame {
            index,
            dt,
            elapsed: frame_start.duration_since(start).as_secs_f64(),
            commands,
        };
        index = index.wrapping_add(1);

        if app.tick(&frame) == TickControl::Exit {
            log::info!(target: "engine", "engine app requested exit at frame {}", frame.index);
            shutdown.request();
            break;
        }

        let spent = frame_start.elapsed();
        if spent < tick {
            thread::sleep(tick - spent);
        }
    }

    // Commands enqueued before shutdown still get dispatched exactly once.
    let tail = bridge.drain_and_dispatch(&mut app);
    if tail > 0 {
        log::debug!(target: "engine", "final drain dispatched {tail} commands");
    }
    app.shutdown();

    log::info!(target: "engine", "engine loop stopped after {index} frames");
    app
}
