use std::sync::Arc;
use std::time::{Duration, Instant};

use newengine_host_bridge::{HostBridge, ShutdownToken, SurfaceHandle};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, Ime, KeyEvent, MouseButton, StartCause, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::alert::{HostRequest, WinitAlertPresenter};
use crate::config::HostWindowConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::gamepad::GamepadPoller;
use crate::keys;
use crate::text::TextBuffer;

const IDLE_WAKE: Duration = Duration::from_millis(50);

/// Host thread built on winit.
///
/// Every winit callback becomes a bridge command; the surface is torn down
/// through the blocking handshake before the window is dropped.
pub struct WinitHost {
    event_loop: EventLoop<HostRequest>,
    app: HostApp,
}

impl WinitHost {
    pub fn new(bridge: Arc<HostBridge>, cfg: HostWindowConfig, shutdown: ShutdownToken) -> PlatformResult<Self> {
        let event_loop = EventLoop::<HostRequest>::with_user_event().build()?;
        Ok(Self {
            event_loop,
            app: HostApp::new(bridge, cfg, shutdown),
        })
    }

    /// Presenter for the engine thread's modal alerts.
    pub fn alert_presenter(&self) -> WinitAlertPresenter {
        WinitAlertPresenter::new(self.event_loop.create_proxy())
    }

    /// Run on the main thread until the window closes or shutdown is requested.
    pub fn run(self) -> PlatformResult<()> {
        let Self { event_loop, mut app } = self;
        let result = event_loop.run_app(&mut app);

        // Whatever happened, nobody can answer an alert now.
        app.bridge.host_exited();
        result?;
        match app.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct HostApp {
    bridge: Arc<HostBridge>,
    cfg: HostWindowConfig,
    shutdown: ShutdownToken,

    window: Option<Arc<Window>>,
    cursor: (i32, i32),
    text: TextBuffer,
    gamepads: Option<GamepadPoller>,
    alert_open: bool,
    stopped: bool,
    fatal: Option<PlatformError>,
}

impl HostApp {
    fn new(bridge: Arc<HostBridge>, cfg: HostWindowConfig, shutdown: ShutdownToken) -> Self {
        Self {
            bridge,
            cfg,
            shutdown,
            window: None,
            cursor: (0, 0),
            text: TextBuffer::default(),
            gamepads: None,
            alert_open: false,
            stopped: false,
            fatal: None,
        }
    }

    fn create_surface(&mut self, el: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.cfg.title.clone())
            .with_inner_size(LogicalSize::new(self.cfg.width, self.cfg.height));

        let window = match el.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!(target: "host", "failed to create window: {e}");
                self.fatal = Some(e.into());
                self.shutdown.request();
                el.exit();
                return;
            }
        };
        window.set_ime_allowed(true);

        let size = window.inner_size();
        let id = u64::from(window.id());
        log::info!(target: "host", "window {id} created {}x{}", size.width, size.height);

        self.bridge
            .on_surface_created(SurfaceHandle::from_arc(id, window.clone()), size.width, size.height);
        self.window = Some(window);
    }

    /// Blocks until the engine has let go of the surface, then drops the window.
    fn destroy_surface(&mut self) {
        let Some(window) = self.window.take() else {
            return;
        };
        log::info!(target: "host", "window {} destroying", u64::from(window.id()));

        let outcome = self.bridge.on_surface_destroyed();
        log::debug!(target: "host", "surface handshake: {outcome:?}");
        drop(window);
    }

    fn stop_once(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.bridge.on_stop();
    }

    fn close(&mut self, el: &ActiveEventLoop) {
        self.destroy_surface();
        self.stop_once();
        el.exit();
    }

    fn on_key(&mut self, event: KeyEvent) {
        let code = keys::map_physical_key(event.physical_key);

        if self.alert_open && event.state == ElementState::Pressed {
            if matches!(code, Some(keys::ENTER) | Some(keys::ESCAPE)) {
                self.alert_open = false;
                if let Some(w) = &self.window {
                    w.set_title(&self.cfg.title);
                }
                self.bridge.alert_closed();
            }
            return;
        }

        match event.state {
            ElementState::Pressed => {
                let typed = event.text.as_deref().unwrap_or("");
                let edited = if code == Some(keys::BACKSPACE) {
                    self.text.backspace()
                } else {
                    self.text.key_text(typed)
                };

                // Composed input reaches the engine through the IME commit instead.
                let unicode = if edited {
                    typed.chars().find(|c| !c.is_control()).map_or(0, |c| c as u32)
                } else {
                    0
                };

                match code {
                    Some(code) => self.bridge.on_key_down(code, unicode),
                    None if unicode != 0 => self.bridge.on_key_char(unicode),
                    None => log::trace!(target: "host", "unmapped key {:?}", event.physical_key),
                }
                if edited {
                    self.bridge.on_text_changed(self.text.as_str());
                }
            }
            ElementState::Released => {
                if let Some(code) = code {
                    self.bridge.on_key_up(code);
                }
            }
        }
    }

    fn on_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(n) => 5 + i32::from(n),
        };
        let (x, y) = self.cursor;
        match state {
            ElementState::Pressed => self.bridge.on_pointer_down(id, x, y, true),
            ElementState::Released => self.bridge.on_pointer_up(id, x, y, true),
        }
    }

    fn on_touch(&mut self, touch: Touch) {
        // Touch ids are opaque u64s; the engine only needs them stable per contact.
        let id = (touch.id & 0x7fff_ffff) as i32;
        let x = touch.location.x as i32;
        let y = touch.location.y as i32;
        match touch.phase {
            TouchPhase::Started => self.bridge.on_pointer_down(id, x, y, false),
            TouchPhase::Moved => self.bridge.on_pointer_move(id, x, y, false),
            TouchPhase::Ended | TouchPhase::Cancelled => self.bridge.on_pointer_up(id, x, y, false),
        }
    }
}

impl ApplicationHandler<HostRequest> for HostApp {
    fn new_events(&mut self, el: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::Init = cause {
            self.bridge.on_start();
            if self.cfg.gamepads {
                self.gamepads = GamepadPoller::new();
            }
        }
        if self.shutdown.is_requested() {
            self.close(el);
        }
    }

    fn resumed(&mut self, el: &ActiveEventLoop) {
        self.bridge.on_resume();
        self.create_surface(el);
    }

    fn suspended(&mut self, _el: &ActiveEventLoop) {
        self.bridge.on_pause();
        self.destroy_surface();
    }

    fn user_event(&mut self, el: &ActiveEventLoop, req: HostRequest) {
        match req {
            HostRequest::ShowAlert { title, message } => {
                log::warn!(target: "host", "ALERT {title}: {message} (Enter/Esc to close)");
                match &self.window {
                    Some(w) => {
                        self.alert_open = true;
                        w.set_title(&format!("{title}: {message}"));
                    }
                    // Nowhere to show it.
                    None => {
                        self.bridge.alert_closed();
                    }
                }
            }
            HostRequest::Exit => self.close(el),
        }
    }

    fn window_event(&mut self, el: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(el),
            WindowEvent::Resized(size) => self.bridge.on_surface_resized(size.width, size.height),
            WindowEvent::RedrawRequested => self.bridge.on_surface_redraw_needed(),
            WindowEvent::Focused(focused) => self.bridge.on_focus_changed(focused),
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event),
            WindowEvent::Ime(Ime::Preedit(preedit, _)) => self.text.preedit(&preedit),
            WindowEvent::Ime(Ime::Commit(text)) => {
                if self.text.commit(&text) {
                    self.bridge.on_text_changed(self.text.as_str());
                }
            }
            WindowEvent::Ime(Ime::Disabled) => self.text.ime_disabled(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as i32, position.y as i32);
                self.bridge.on_pointer_move(0, self.cursor.0, self.cursor.1, true);
            }
            WindowEvent::MouseInput { state, button, .. } => self.on_mouse_button(state, button),
            WindowEvent::Touch(touch) => self.on_touch(touch),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        if self.shutdown.is_requested() {
            self.close(el);
            return;
        }

        if let Some(pads) = self.gamepads.as_mut() {
            pads.poll(&self.bridge);
            el.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.cfg.gamepad_poll_interval()));
        } else {
            // Wake now and then to notice a shutdown requested off-thread.
            el.set_control_flow(ControlFlow::WaitUntil(Instant::now() + IDLE_WAKE));
        }
    }

    fn exiting(&mut self, _el: &ActiveEventLoop) {
        self.destroy_surface();
        self.stop_once();
        self.bridge.on_destroy();
    }

    fn memory_warning(&mut self, _el: &ActiveEventLoop) {
        self.bridge.on_low_memory();
    }
}
