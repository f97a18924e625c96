use parking_lot::Mutex;

use crate::rendezvous::{Rendezvous, WaitOutcome};

/// Host-side view of the rendering surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceState {
    Absent,
    Active { id: u64 },
    TearingDown { id: Option<u64> },
}

/// Surface teardown handshake.
///
/// The host thread may not return from its "surface destroyed" callback while
/// the engine thread still draws into the surface. The host arms the token,
/// enqueues the destroy command and blocks; the engine signals after it has
/// dropped the surface.
pub struct SurfaceCoordinator {
    state: Mutex<SurfaceState>,
    token: Rendezvous,
}

impl Default for SurfaceCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SurfaceState::Absent),
            token: Rendezvous::new("surface-teardown"),
        }
    }

    #[inline]
    pub fn state(&self) -> SurfaceState {
        *self.state.lock()
    }

    /// Host thread: a surface became available.
    pub fn on_created(&self, id: u64) {
        let mut state = self.state.lock();
        if let SurfaceState::Active { id: old } = *state {
            log::warn!(target: "bridge", "surface {id} created while surface {old} still active");
        }
        *state = SurfaceState::Active { id };
        log::info!(target: "bridge", "surface {id} active");
    }

    /// Host thread: start teardown. Arms the token, so this must run before the
    /// destroy command becomes visible to the engine.
    ///
    /// Returns the teardown generation the destroy command must carry back;
    /// 0 when the engine thread is already gone.
    pub fn begin_teardown(&self) -> u32 {
        let mut state = self.state.lock();
        let id = match *state {
            SurfaceState::Active { id } => Some(id),
            SurfaceState::Absent => {
                log::warn!(target: "bridge", "surface destroyed with no active surface, running handshake anyway");
                None
            }
            SurfaceState::TearingDown { id } => {
                log::warn!(target: "bridge", "surface teardown already in progress");
                id
            }
        };
        *state = SurfaceState::TearingDown { id };
        drop(state);

        match self.token.arm() {
            Some(generation) => generation,
            None => {
                log::debug!(target: "bridge", "teardown token closed, engine thread is gone");
                0
            }
        }
    }

    /// Host thread: block until the engine releases the surface, then mark it absent.
    ///
    /// No timeout: returning early would let the host free a surface the engine
    /// may still touch.
    pub fn wait_teardown(&self) -> WaitOutcome {
        let outcome = self.token.wait();
        match outcome {
            WaitOutcome::Signaled => {}
            WaitOutcome::Interrupted => {
                log::warn!(target: "bridge", "surface teardown wait interrupted, proceeding")
            }
            WaitOutcome::Closed => {
                log::info!(target: "bridge", "surface teardown: engine thread already stopped")
            }
        }

        *self.state.lock() = SurfaceState::Absent;
        log::info!(target: "bridge", "surface absent");
        outcome
    }

    /// Engine thread: the surface of teardown `generation` is no longer
    /// referenced. Ignored unless that teardown is the one the host waits on.
    #[inline]
    pub fn signal_teardown_complete(&self, generation: u32) -> bool {
        self.token.signal_generation(generation)
    }

    /// Wake a blocked host without a signal (process shutdown).
    #[inline]
    pub fn interrupt(&self) -> bool {
        self.token.interrupt()
    }

    /// Engine thread exiting: no further teardown can be acknowledged.
    #[inline]
    pub fn shutdown(&self) {
        self.token.close();
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.token.is_armed()
    }
}
