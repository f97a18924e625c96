use newengine_host_bridge::{
    CommandHandler, EngineApp, Frame, GamepadStick, HostBridge, SurfaceHandle, TickControl,
};
use newengine_platform_winit::{keys, WinitAlertPresenter};
use std::sync::Arc;

/// Engine side of the demo: tracks the surface, logs input, and shows an
/// alert on F1. Escape ends the engine loop.
pub struct DemoEngine {
    bridge: Arc<HostBridge>,
    alerts: WinitAlertPresenter,

    surface: Option<SurfaceHandle>,
    size: (i32, i32),
    paused: bool,
    redraws: u64,
    alert_requested: bool,
    exit_requested: bool,
}

impl DemoEngine {
    pub fn new(bridge: Arc<HostBridge>, alerts: WinitAlertPresenter) -> Self {
        Self {
            bridge,
            alerts,
            surface: None,
            size: (0, 0),
            paused: false,
            redraws: 0,
            alert_requested: false,
            exit_requested: false,
        }
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl CommandHandler for DemoEngine {
    fn key_down(&mut self, code: i32) {
        log::debug!(target: "demo", "key down {code}");
        match code {
            keys::F1 => self.alert_requested = true,
            keys::ESCAPE => self.exit_requested = true,
            _ => {}
        }
    }

    fn key_char(&mut self, unicode: i32) {
        if let Some(c) = u32::try_from(unicode).ok().and_then(char::from_u32) {
            log::debug!(target: "demo", "char {c:?}");
        }
    }

    fn text_changed(&mut self, text: &str) {
        log::info!(target: "demo", "text: {text}");
    }

    fn pointer_down(&mut self, id: i32, x: i32, y: i32, is_mouse: bool) {
        log::debug!(target: "demo", "pointer {id} down at ({x}, {y}) mouse={is_mouse}");
    }

    fn gamepad_axis(&mut self, stick: GamepadStick, x: f32, y: f32) {
        log::debug!(target: "demo", "{stick:?} stick ({x:.3}, {y:.3})");
    }

    fn surface_created(&mut self, surface: &SurfaceHandle, width: i32, height: i32) {
        log::info!(target: "demo", "surface {} {width}x{height}", surface.id());
        self.surface = Some(surface.clone());
        self.size = (width, height);
    }

    fn surface_destroyed(&mut self) {
        if let Some(s) = self.surface.take() {
            log::info!(target: "demo", "surface {} released", s.id());
        }
    }

    fn surface_resized(&mut self, width: i32, height: i32) {
        self.size = (width, height);
    }

    fn surface_redraw_needed(&mut self) {
        self.redraws += 1;
    }

    fn app_pause(&mut self) {
        self.paused = true;
    }

    fn app_resume(&mut self) {
        self.paused = false;
    }

    fn low_memory(&mut self) {
        log::warn!(target: "demo", "host reports low memory");
    }
}

impl EngineApp for DemoEngine {
    fn tick(&mut self, frame: &Frame) -> TickControl {
        if self.exit_requested {
            return TickControl::Exit;
        }

        if self.alert_requested {
            self.alert_requested = false;
            let outcome = self.bridge.show_alert(
                &self.alerts,
                "NewEngine",
                &format!("frame {} surface {}x{}", frame.index, self.size.0, self.size.1),
            );
            log::info!(target: "demo", "alert finished: {outcome:?}");
        }

        if !self.paused && frame.index % 600 == 0 {
            log::debug!(target: "demo", "frame {} dt={:.4} surface={}", frame.index, frame.dt, self.surface.is_some());
        }
        TickControl::Continue
    }

    fn shutdown(&mut self) {
        self.surface = None;
        log::info!(target: "demo", "demo engine shut down after {} redraw requests", self.redraws);
    }
}
