use parking_lot::{Condvar, Mutex};

/// How a [`Rendezvous::wait`] ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitOutcome {
    /// The peer signaled.
    Signaled,
    /// Woken by [`Rendezvous::interrupt`]; callers proceed as if signaled.
    Interrupted,
    /// The rendezvous was closed (peer thread gone).
    Closed,
}

#[derive(Debug, Default)]
struct Slot {
    /// Bumped on every arm; identifies the wait a signal belongs to.
    generation: u32,
    armed: bool,
    signaled: bool,
    interrupted: bool,
    closed: bool,
}

impl Slot {
    #[inline]
    fn arm(&mut self) -> u32 {
        // 0 is never handed out, so a zeroed payload can't match.
        self.generation = self.generation.wrapping_add(1).max(1);
        self.armed = true;
        self.signaled = false;
        self.interrupted = false;
        self.generation
    }

    #[inline]
    fn disarm(&mut self) {
        self.armed = false;
        self.signaled = false;
        self.interrupted = false;
    }
}

/// Single-slot rendezvous between one waiter and one signaler.
///
/// A signal is only delivered while the slot is armed, so signaling with no
/// waiter never leaves a banked permit behind for a later wait.
pub struct Rendezvous {
    name: &'static str,
    slot: Mutex<Slot>,
    cv: Condvar,
}

impl Rendezvous {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(Slot::default()),
            cv: Condvar::new(),
        }
    }

    /// Arm the slot for the upcoming wait and return its generation.
    ///
    /// Must happen before the peer can see the request, otherwise its signal
    /// is dropped. `None` if the rendezvous is closed.
    pub fn arm(&self) -> Option<u32> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return None;
        }
        if slot.armed {
            log::warn!(target: "bridge", "{}: armed twice, second waiter shares the slot", self.name);
        }
        Some(slot.arm())
    }

    /// Block until signaled, interrupted or closed. Disarms on return.
    ///
    /// An unarmed slot is armed here, which is only correct when the peer
    /// can't signal before this call.
    pub fn wait(&self) -> WaitOutcome {
        let mut slot = self.slot.lock();
        if slot.closed {
            return WaitOutcome::Closed;
        }
        if !slot.armed {
            slot.arm();
        }

        let outcome = loop {
            if slot.signaled {
                break WaitOutcome::Signaled;
            }
            if slot.interrupted {
                break WaitOutcome::Interrupted;
            }
            if slot.closed {
                break WaitOutcome::Closed;
            }
            self.cv.wait(&mut slot);
        };

        slot.disarm();
        outcome
    }

    /// Release the armed waiter. No-op (returns `false`) when nothing is armed
    /// or the waiter was already released.
    pub fn signal(&self) -> bool {
        let mut slot = self.slot.lock();
        if !slot.armed || slot.signaled || slot.closed {
            return false;
        }
        slot.signaled = true;
        self.cv.notify_all();
        true
    }

    /// Like [`Rendezvous::signal`], but only for the wait armed as `generation`.
    /// A late signal for an earlier, abandoned wait is dropped.
    pub fn signal_generation(&self, generation: u32) -> bool {
        let mut slot = self.slot.lock();
        if !slot.armed || slot.signaled || slot.closed {
            return false;
        }
        if slot.generation != generation {
            log::debug!(
                target: "bridge",
                "{}: stale signal for generation {generation}, armed is {}",
                self.name,
                slot.generation
            );
            return false;
        }
        slot.signaled = true;
        self.cv.notify_all();
        true
    }

    /// Wake the armed waiter without a signal. No-op when nothing is armed.
    pub fn interrupt(&self) -> bool {
        let mut slot = self.slot.lock();
        if !slot.armed || slot.closed {
            return false;
        }
        slot.interrupted = true;
        self.cv.notify_all();
        true
    }

    /// Permanently close: wakes any waiter and makes later waits return at once.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        if slot.closed {
            return;
        }
        slot.closed = true;
        self.cv.notify_all();
        log::debug!(target: "bridge", "{}: closed", self.name);
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.slot.lock().armed
    }
}
