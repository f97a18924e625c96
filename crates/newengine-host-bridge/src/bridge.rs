use std::sync::{Arc, OnceLock};

use crate::command::{CommandKind, Payload, SurfaceHandle};
use crate::config::BridgeConfig;
use crate::dialog::{AlertPresenter, DialogGate};
use crate::dispatch::{dispatch, CommandHandler};
use crate::gamepad::{AxisCodec, GamepadStick};
use crate::queue::{CommandQueue, QueueStats};
use crate::rendezvous::WaitOutcome;
use crate::surface::{SurfaceCoordinator, SurfaceState};

static GLOBAL_BRIDGE: OnceLock<Arc<HostBridge>> = OnceLock::new();

/// Process-wide glue between the host thread and the engine thread.
///
/// Lives for the whole process and outlives host windows: the engine may
/// still be mid-frame when the host recreates its window container.
///
/// Host side: `on_*` callbacks, all non-blocking except [`HostBridge::on_surface_destroyed`].
/// Engine side: [`HostBridge::drain_and_dispatch`] once per tick.
pub struct HostBridge {
    queue: CommandQueue,
    surface: SurfaceCoordinator,
    dialog: DialogGate,
    axes: AxisCodec,
    trace_commands: bool,
}

impl HostBridge {
    pub fn new(cfg: &BridgeConfig) -> Self {
        Self {
            queue: CommandQueue::new(&cfg.pool),
            surface: SurfaceCoordinator::new(),
            dialog: DialogGate::new(),
            axes: AxisCodec::from_config(&cfg.gamepad),
            trace_commands: cfg.log.trace_commands,
        }
    }

    /// Install the process-wide bridge. Later calls return the existing one.
    pub fn install(cfg: &BridgeConfig) -> Arc<HostBridge> {
        GLOBAL_BRIDGE
            .get_or_init(|| {
                log::info!(target: "bridge", "host bridge installed");
                Arc::new(HostBridge::new(cfg))
            })
            .clone()
    }

    /// The installed bridge, if any.
    #[inline]
    pub fn global() -> Option<Arc<HostBridge>> {
        GLOBAL_BRIDGE.get().cloned()
    }

    // ---------------------------------------------------------------------
    // host thread
    // ---------------------------------------------------------------------

    #[inline]
    pub fn enqueue(&self, kind: CommandKind, payload: Payload) {
        self.queue.enqueue(kind.code(), payload);
    }

    /// Raw code path for hosts that forward integer command ids.
    #[inline]
    pub fn enqueue_code(&self, code: u16, payload: Payload) {
        self.queue.enqueue(code, payload);
    }

    /// Key press; a non-zero `unicode` also produces a `KeyChar` right after.
    pub fn on_key_down(&self, code: i32, unicode: u32) {
        self.enqueue(CommandKind::KeyDown, Payload::int(code));
        if unicode != 0 {
            self.enqueue(CommandKind::KeyChar, Payload::int(unicode as i32));
        }
    }

    #[inline]
    pub fn on_key_up(&self, code: i32) {
        self.enqueue(CommandKind::KeyUp, Payload::int(code));
    }

    #[inline]
    pub fn on_key_char(&self, unicode: u32) {
        self.enqueue(CommandKind::KeyChar, Payload::int(unicode as i32));
    }

    /// Full text of the editable field after an edit.
    #[inline]
    pub fn on_text_changed(&self, text: impl Into<String>) {
        self.enqueue(CommandKind::TextChanged, Payload::text(text));
    }

    #[inline]
    pub fn on_pointer_down(&self, id: i32, x: i32, y: i32, is_mouse: bool) {
        self.enqueue(CommandKind::PointerDown, Payload::int4(id, x, y, is_mouse as i32));
    }

    #[inline]
    pub fn on_pointer_up(&self, id: i32, x: i32, y: i32, is_mouse: bool) {
        self.enqueue(CommandKind::PointerUp, Payload::int4(id, x, y, is_mouse as i32));
    }

    #[inline]
    pub fn on_pointer_move(&self, id: i32, x: i32, y: i32, is_mouse: bool) {
        self.enqueue(CommandKind::PointerMove, Payload::int4(id, x, y, is_mouse as i32));
    }

    /// Dead-zone filter and fixed-point encode each component, then enqueue.
    pub fn on_gamepad_axis(&self, stick: GamepadStick, x: f32, y: f32) {
        let payload = Payload::int2(self.axes.encode(x), self.axes.encode(y));
        self.enqueue(stick.command(), payload);
    }

    #[inline]
    pub fn on_start(&self) {
        self.enqueue(CommandKind::AppStart, Payload::empty());
    }

    /// App stopped. Also releases an engine blocked on an alert, since the
    /// alert can't be answered while stopped.
    pub fn on_stop(&self) {
        self.enqueue(CommandKind::AppStop, Payload::empty());
        self.dialog.release();
    }

    #[inline]
    pub fn on_resume(&self) {
        self.enqueue(CommandKind::AppResume, Payload::empty());
    }

    #[inline]
    pub fn on_pause(&self) {
        self.enqueue(CommandKind::AppPause, Payload::empty());
    }

    #[inline]
    pub fn on_destroy(&self) {
        log::info!(target: "bridge", "host destroyed");
        self.enqueue(CommandKind::AppDestroy, Payload::empty());
    }

    #[inline]
    pub fn on_focus_changed(&self, focused: bool) {
        let kind = if focused { CommandKind::FocusGained } else { CommandKind::FocusLost };
        self.enqueue(kind, Payload::empty());
    }

    #[inline]
    pub fn on_low_memory(&self) {
        self.enqueue(CommandKind::LowMemory, Payload::empty());
    }

    pub fn on_surface_created(&self, surface: SurfaceHandle, width: u32, height: u32) {
        self.surface.on_created(surface.id());
        self.enqueue(CommandKind::SurfaceCreated, Payload::surface(surface, width, height));
    }

    #[inline]
    pub fn on_surface_resized(&self, width: u32, height: u32) {
        self.enqueue(CommandKind::SurfaceResized, Payload::size(width, height));
    }

    #[inline]
    pub fn on_surface_redraw_needed(&self) {
        self.enqueue(CommandKind::SurfaceRedrawNeeded, Payload::empty());
    }

    /// Surface is about to be destroyed. Blocks the host thread until the
    /// engine has stopped using it (or the engine thread is gone).
    ///
    /// An engine blocked on an alert is released first, otherwise it could
    /// never reach the destroy command.
    ///
    /// The command carries the teardown generation in arg 0, so a destroy
    /// left over from an interrupted teardown can't release a later one.
    pub fn on_surface_destroyed(&self) -> WaitOutcome {
        let generation = self.surface.begin_teardown();
        self.enqueue(CommandKind::SurfaceDestroyed, Payload::int(generation as i32));
        self.dialog.release();
        self.surface.wait_teardown()
    }

    #[inline]
    pub fn on_open_dialog_result(&self, path: impl Into<String>) {
        self.enqueue(CommandKind::OpenDialogResult, Payload::text(path));
    }

    #[inline]
    pub fn on_save_dialog_result(&self, path: impl Into<String>) {
        self.enqueue(CommandKind::SaveDialogResult, Payload::text(path));
    }

    #[inline]
    pub fn on_ui_created(&self) {
        self.enqueue(CommandKind::UiCreated, Payload::empty());
    }

    #[inline]
    pub fn on_ui_clicked(&self, widget: i32) {
        self.enqueue(CommandKind::UiClicked, Payload::int(widget));
    }

    #[inline]
    pub fn on_ui_changed(&self, widget: i32, value: i32) {
        self.enqueue(CommandKind::UiChanged, Payload::int2(widget, value));
    }

    #[inline]
    pub fn on_ui_string(&self, widget: i32, text: impl Into<String>) {
        self.enqueue(CommandKind::UiString, Payload::int_text(widget, text));
    }

    /// The user dismissed the alert.
    #[inline]
    pub fn alert_closed(&self) -> bool {
        self.dialog.release()
    }

    /// Wake a host blocked in surface teardown without an engine signal.
    #[inline]
    pub fn interrupt_surface_wait(&self) -> bool {
        self.surface.interrupt()
    }

    /// Host event loop is gone: no alert can be answered any more, so release
    /// a waiting engine and refuse later alerts.
    pub fn host_exited(&self) {
        log::info!(target: "bridge", "host side shut down");
        self.dialog.close();
    }

    // ---------------------------------------------------------------------
    // engine thread
    // ---------------------------------------------------------------------

    /// Dispatch every pending command in arrival order, then return.
    ///
    /// After a `SurfaceDestroyed` command the handler has returned, so the
    /// teardown-complete signal is the last step for that command.
    pub fn drain_and_dispatch(&self, handler: &mut dyn CommandHandler) -> usize {
        let axes = self.axes;
        let trace = self.trace_commands;

        self.queue.drain(|rec| {
            let kind = dispatch(rec, handler, &axes);

            if trace {
                if let Some(kind) = kind {
                    log::trace!(target: "bridge", "dispatched {kind} {:?}", rec.args());
                }
            }

            if kind == Some(CommandKind::SurfaceDestroyed) {
                self.signal_surface_teardown_complete(rec.arg(0) as u32);
            }
        })
    }

    /// Engine has stopped referencing the surface of teardown `generation`.
    ///
    /// Delivered only if the host is waiting on that same teardown.
    pub fn signal_surface_teardown_complete(&self, generation: u32) -> bool {
        let delivered = self.surface.signal_teardown_complete(generation);
        if !delivered {
            log::debug!(target: "bridge", "teardown signal {generation} not delivered, no matching host wait");
        }
        delivered
    }

    /// Show a modal alert and block the engine thread until it is closed.
    ///
    /// Skipped (`Interrupted`) while the host is blocked in surface teardown:
    /// it could never answer, and it is itself waiting on this thread.
    pub fn show_alert(&self, presenter: &dyn AlertPresenter, title: &str, message: &str) -> WaitOutcome {
        self.dialog.show_blocking_unless(presenter, title, message, || {
            matches!(self.surface.state(), SurfaceState::TearingDown { .. })
        })
    }

    /// Engine thread is exiting: nothing will acknowledge a teardown any more.
    pub fn shutdown_engine(&self) {
        log::info!(target: "bridge", "engine side shut down");
        self.surface.shutdown();
        self.dialog.close();
    }

    // ---------------------------------------------------------------------
    // inspection
    // ---------------------------------------------------------------------

    #[inline]
    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    #[inline]
    pub fn is_host_waiting_on_surface(&self) -> bool {
        self.surface.is_waiting()
    }

    #[inline]
    pub fn is_engine_waiting_on_alert(&self) -> bool {
        self.dialog.is_waiting()
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.queue.pending_len()
    }

    #[inline]
    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    #[inline]
    pub fn axis_codec(&self) -> AxisCodec {
        self.axes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Keys {
        seen: Vec<(&'static str, i32)>,
    }

    impl CommandHandler for Keys {
        fn key_down(&mut self, code: i32) {
            self.seen.push(("down", code));
        }
        fn key_char(&mut self, unicode: i32) {
            self.seen.push(("char", unicode));
        }
        fn focus_gained(&mut self) {
            self.seen.push(("focus", 1));
        }
        fn focus_lost(&mut self) {
            self.seen.push(("focus", 0));
        }
    }

    #[test]
    fn key_down_with_unicode_also_sends_char() {
        let b = HostBridge::new(&BridgeConfig::default());
        b.on_key_down(29, 'a' as u32);
        b.on_key_down(59, 0);
        b.on_focus_changed(false);
        b.on_focus_changed(true);

        let mut h = Keys::default();
        assert_eq!(b.drain_and_dispatch(&mut h), 5);
        assert_eq!(
            h.seen,
            vec![("down", 29), ("char", 'a' as i32), ("down", 59), ("focus", 0), ("focus", 1)]
        );
    }

    #[test]
    fn stop_releases_only_a_pending_alert() {
        let b = Arc::new(HostBridge::new(&BridgeConfig::default()));
        b.on_stop();
        assert!(!b.is_engine_waiting_on_alert());
        assert!(!b.alert_closed());

        // The no-op release above must not let the next alert return early.
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let engine = {
            let b = b.clone();
            std::thread::spawn(move || {
                let presenter = Counting(Default::default());
                done_tx.send(b.show_alert(&presenter, "t", "m")).unwrap();
            })
        };
        while !b.is_engine_waiting_on_alert() {
            std::thread::yield_now();
        }
        assert!(done_rx.recv_timeout(std::time::Duration::from_millis(100)).is_err());

        b.on_stop();
        assert_eq!(
            done_rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap(),
            WaitOutcome::Signaled
        );
        engine.join().unwrap();
    }

    struct Counting(std::sync::atomic::AtomicUsize);

    impl AlertPresenter for Counting {
        fn present(&self, _title: &str, _message: &str) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn interrupted_teardown_unblocks_host_and_clears_surface() {
        let b = Arc::new(HostBridge::new(&BridgeConfig::default()));
        b.on_surface_created(SurfaceHandle::new(3, ()), 8, 8);
        assert!(!b.interrupt_surface_wait());

        let host = {
            let b = b.clone();
            std::thread::spawn(move || b.on_surface_destroyed())
        };
        while !b.interrupt_surface_wait() {
            std::thread::yield_now();
        }
        assert_eq!(host.join().unwrap(), WaitOutcome::Interrupted);
        assert_eq!(b.surface_state(), SurfaceState::Absent);

        // The destroy command itself is still delivered exactly once.
        assert_eq!(b.pending_len(), 2);
    }

    #[test]
    fn alert_during_surface_teardown_is_skipped() {
        let b = HostBridge::new(&BridgeConfig::default());
        let presenter = Counting(Default::default());

        b.surface.begin_teardown();
        assert_eq!(b.show_alert(&presenter, "t", "m"), WaitOutcome::Interrupted);
        assert_eq!(presenter.0.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!b.is_engine_waiting_on_alert());
    }

    #[test]
    fn alert_after_host_exit_returns_closed() {
        let b = HostBridge::new(&BridgeConfig::default());
        let presenter = Counting(Default::default());

        b.host_exited();
        assert_eq!(b.show_alert(&presenter, "t", "m"), WaitOutcome::Closed);
        assert_eq!(presenter.0.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn global_install_is_idempotent() {
        let a = HostBridge::install(&BridgeConfig::default());
        let b = HostBridge::install(&BridgeConfig::default());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(HostBridge::global().is_some());
    }
}
