use newengine_host_bridge::AlertPresenter;
use winit::event_loop::EventLoopProxy;

/// Requests the engine thread sends to the host event loop.
#[derive(Debug, Clone)]
pub enum HostRequest {
    ShowAlert { title: String, message: String },
    Exit,
}

/// Presents alerts by waking the winit loop with a user event.
///
/// The host shows the alert in the window title and logs it; Enter or Escape
/// dismisses it.
#[derive(Clone)]
pub struct WinitAlertPresenter {
    proxy: EventLoopProxy<HostRequest>,
}

impl WinitAlertPresenter {
    #[inline]
    pub fn new(proxy: EventLoopProxy<HostRequest>) -> Self {
        Self { proxy }
    }
}

impl AlertPresenter for WinitAlertPresenter {
    fn present(&self, title: &str, message: &str) {
        let req = HostRequest::ShowAlert {
            title: title.to_string(),
            message: message.to_string(),
        };
        if self.proxy.send_event(req).is_err() {
            log::warn!(target: "host", "alert '{title}' not shown: event loop closed");
        }
    }
}
