use crate::rendezvous::{Rendezvous, WaitOutcome};

/// Host-side alert UI. Must not block: it schedules the alert on the host
/// thread and returns. The host reports the close via `HostBridge::alert_closed`.
pub trait AlertPresenter {
    fn present(&self, title: &str, message: &str);
}

/// Blocks the engine thread while a modal alert is on screen.
pub struct DialogGate {
    token: Rendezvous,
}

impl Default for DialogGate {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogGate {
    pub fn new() -> Self {
        Self { token: Rendezvous::new("alert-dialog") }
    }

    /// Engine thread: show the alert and wait for it to be dismissed or released.
    pub fn show_blocking(&self, presenter: &dyn AlertPresenter, title: &str, message: &str) -> WaitOutcome {
        self.show_blocking_unless(presenter, title, message, || false)
    }

    /// As [`DialogGate::show_blocking`], but returns `Interrupted` without
    /// presenting when `host_busy()` is true. The check runs after arming, so
    /// a release issued by the busy host can't slip in between.
    pub fn show_blocking_unless(
        &self,
        presenter: &dyn AlertPresenter,
        title: &str,
        message: &str,
        host_busy: impl FnOnce() -> bool,
    ) -> WaitOutcome {
        if self.token.arm().is_none() {
            log::warn!(target: "bridge", "alert '{title}' dropped: dialog gate closed");
            return WaitOutcome::Closed;
        }

        if host_busy() {
            self.token.interrupt();
            let outcome = self.token.wait();
            log::debug!(target: "bridge", "alert '{title}' skipped, host busy: {outcome:?}");
            return outcome;
        }

        presenter.present(title, message);
        log::debug!(target: "bridge", "engine waiting on alert '{title}'");

        let outcome = self.token.wait();
        log::debug!(target: "bridge", "alert '{title}' released: {outcome:?}");
        outcome
    }

    /// Release a waiting engine thread. Does nothing when no alert is pending,
    /// so it can't make a future alert return immediately.
    #[inline]
    pub fn release(&self) -> bool {
        let released = self.token.signal();
        if released {
            log::debug!(target: "bridge", "alert wait released");
        }
        released
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.token.is_armed()
    }

    #[inline]
    pub fn close(&self) {
        self.token.close();
    }
}
