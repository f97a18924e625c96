use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use newengine_host_bridge::{
    AlertPresenter, BridgeConfig, BridgeError, CommandHandler, EngineApp, EngineLoopConfig, EngineThread,
    Frame, HostBridge, ShutdownToken, SurfaceHandle, TickControl, WaitOutcome,
};

fn fast_loop() -> EngineLoopConfig {
    EngineLoopConfig { tick_ms: 1.0, max_dt_sec: 0.25 }
}

fn wait_until(what: &str, mut f: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !f() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[derive(Default)]
struct Journal {
    events: Vec<String>,
    drawing: Option<u64>,
    frames: u64,
}

impl CommandHandler for Journal {
    fn surface_created(&mut self, surface: &SurfaceHandle, width: i32, height: i32) {
        self.drawing = Some(surface.id());
        self.events.push(format!("created {} {width}x{height}", surface.id()));
    }
    fn surface_destroyed(&mut self) {
        self.drawing = None;
        self.events.push("destroyed".into());
    }
    fn app_destroy(&mut self) {
        self.events.push("app-destroy".into());
    }
}

impl EngineApp for Journal {
    fn tick(&mut self, _frame: &Frame) -> TickControl {
        self.frames += 1;
        TickControl::Continue
    }
}

#[test_log::test]
fn engine_thread_completes_surface_handshake() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let engine = EngineThread::spawn(bridge.clone(), Journal::default(), &fast_loop(), ShutdownToken::new()).unwrap();

    bridge.on_surface_created(SurfaceHandle::new(11, ()), 320, 240);
    assert_eq!(bridge.on_surface_destroyed(), WaitOutcome::Signaled);
    bridge.on_destroy();

    let app = engine.stop().unwrap();
    assert_eq!(app.events, vec!["created 11 320x240", "destroyed", "app-destroy"]);
    assert_eq!(app.drawing, None);
    assert!(app.frames > 0);
}

#[test_log::test]
fn stopped_engine_never_leaves_host_hanging() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let engine = EngineThread::spawn(bridge.clone(), Journal::default(), &fast_loop(), ShutdownToken::new()).unwrap();
    engine.stop().unwrap();

    bridge.on_surface_created(SurfaceHandle::new(3, ()), 1, 1);
    assert_eq!(bridge.on_surface_destroyed(), WaitOutcome::Closed);
}

struct ExitAfter(u64);

impl CommandHandler for ExitAfter {}

impl EngineApp for ExitAfter {
    fn tick(&mut self, frame: &Frame) -> TickControl {
        if frame.index + 1 >= self.0 {
            TickControl::Exit
        } else {
            TickControl::Continue
        }
    }
}

#[test_log::test]
fn app_exit_request_stops_loop_and_raises_token() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let token = ShutdownToken::new();
    let engine = EngineThread::spawn(bridge, ExitAfter(3), &fast_loop(), token.clone()).unwrap();

    let app = engine.join().unwrap();
    assert_eq!(app.0, 3);
    assert!(token.is_requested());
}

#[derive(Default)]
struct HostAlerts {
    shown: Mutex<Vec<String>>,
}

impl AlertPresenter for HostAlerts {
    fn present(&self, title: &str, _message: &str) {
        self.shown.lock().push(title.to_string());
    }
}

/// Shows an alert on the first key press; records whether it got the destroy.
struct AlertingApp {
    bridge: Arc<HostBridge>,
    alerts: Arc<HostAlerts>,
    outcome: Option<WaitOutcome>,
    destroyed: bool,
}

impl CommandHandler for AlertingApp {
    fn key_down(&mut self, _code: i32) {
        let out = self.bridge.show_alert(self.alerts.as_ref(), "Disconnected", "server closed");
        self.outcome = Some(out);
    }
    fn surface_destroyed(&mut self) {
        self.destroyed = true;
    }
}

impl EngineApp for AlertingApp {}

#[test_log::test]
fn teardown_releases_engine_blocked_on_alert() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let alerts = Arc::new(HostAlerts::default());
    let app = AlertingApp {
        bridge: bridge.clone(),
        alerts: alerts.clone(),
        outcome: None,
        destroyed: false,
    };
    let engine = EngineThread::spawn(bridge.clone(), app, &fast_loop(), ShutdownToken::new()).unwrap();

    bridge.on_surface_created(SurfaceHandle::new(8, ()), 10, 10);
    bridge.on_key_down(1, 0);
    wait_until("engine blocked on alert", || bridge.is_engine_waiting_on_alert());

    // Without the dialog release this would deadlock.
    assert_eq!(bridge.on_surface_destroyed(), WaitOutcome::Signaled);

    let app = engine.stop().unwrap();
    assert_eq!(app.outcome, Some(WaitOutcome::Signaled));
    assert!(app.destroyed);
    assert_eq!(alerts.shown.lock().as_slice(), &["Disconnected".to_string()]);
}

#[test_log::test]
fn host_closing_alert_resumes_engine() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let alerts = Arc::new(HostAlerts::default());
    let app = AlertingApp {
        bridge: bridge.clone(),
        alerts,
        outcome: None,
        destroyed: false,
    };
    let engine = EngineThread::spawn(bridge.clone(), app, &fast_loop(), ShutdownToken::new()).unwrap();

    bridge.on_key_down(1, 0);
    wait_until("engine blocked on alert", || bridge.is_engine_waiting_on_alert());
    assert!(bridge.alert_closed());
    // Second close has nobody to release.
    wait_until("alert released", || !bridge.is_engine_waiting_on_alert());
    assert!(!bridge.alert_closed());

    let app = engine.stop().unwrap();
    assert_eq!(app.outcome, Some(WaitOutcome::Signaled));
}

struct Panics;

impl CommandHandler for Panics {
    fn low_memory(&mut self) {
        panic!("out of memory handler failed");
    }
}

impl EngineApp for Panics {}

#[test_log::test]
fn panicking_engine_is_reported_and_releases_bridge() {
    let bridge = Arc::new(HostBridge::new(&BridgeConfig::default()));
    let engine = EngineThread::spawn(bridge.clone(), Panics, &fast_loop(), ShutdownToken::new()).unwrap();

    bridge.on_low_memory();
    wait_until("engine thread exit", || engine.is_finished());

    match engine.join() {
        Err(BridgeError::EngineThreadPanicked(msg)) => assert!(msg.contains("out of memory")),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("engine should have panicked"),
    }

    assert_eq!(bridge.on_surface_destroyed(), WaitOutcome::Closed);
}
