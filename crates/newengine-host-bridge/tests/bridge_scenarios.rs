use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded};
use newengine_host_bridge::{
    BridgeConfig, CommandHandler, GamepadStick, HostBridge, PoolConfig, SurfaceHandle, SurfaceState,
    WaitOutcome,
};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Created { id: u64, width: i32, height: i32 },
    Resized { width: i32, height: i32 },
    Destroyed,
    Text(String),
    Paused,
    Move { site: i32, seq: i32 },
    Axis { stick: GamepadStick, x: f32, y: f32 },
}

#[derive(Default)]
struct Recorder {
    seen: Vec<Seen>,
}

impl CommandHandler for Recorder {
    fn surface_created(&mut self, surface: &SurfaceHandle, width: i32, height: i32) {
        self.seen.push(Seen::Created { id: surface.id(), width, height });
    }
    fn surface_resized(&mut self, width: i32, height: i32) {
        self.seen.push(Seen::Resized { width, height });
    }
    fn surface_destroyed(&mut self) {
        self.seen.push(Seen::Destroyed);
    }
    fn text_changed(&mut self, text: &str) {
        self.seen.push(Seen::Text(text.to_string()));
    }
    fn app_pause(&mut self) {
        self.seen.push(Seen::Paused);
    }
    fn pointer_move(&mut self, id: i32, x: i32, _y: i32, _is_mouse: bool) {
        self.seen.push(Seen::Move { site: id, seq: x });
    }
    fn gamepad_axis(&mut self, stick: GamepadStick, x: f32, y: f32) {
        self.seen.push(Seen::Axis { stick, x, y });
    }
}

struct HostWindow;

fn bridge() -> Arc<HostBridge> {
    Arc::new(HostBridge::new(&BridgeConfig::default()))
}

#[test_log::test]
fn created_then_resized_dispatch_in_order() {
    let b = bridge();
    b.on_surface_created(SurfaceHandle::new(42, HostWindow), 100, 200);
    b.on_surface_resized(150, 200);

    let mut r = Recorder::default();
    assert_eq!(b.drain_and_dispatch(&mut r), 2);
    assert_eq!(
        r.seen,
        vec![
            Seen::Created { id: 42, width: 100, height: 200 },
            Seen::Resized { width: 150, height: 200 },
        ]
    );
    assert_eq!(b.surface_state(), SurfaceState::Active { id: 42 });
}

#[test_log::test]
fn host_teardown_returns_only_after_engine_dispatch() {
    let b = bridge();
    b.on_surface_created(SurfaceHandle::new(1, HostWindow), 64, 64);

    let (done_tx, done_rx) = bounded(1);
    let host = {
        let b = b.clone();
        thread::spawn(move || {
            let out = b.on_surface_destroyed();
            done_tx.send(out).unwrap();
        })
    };

    while !b.is_host_waiting_on_surface() || b.pending_len() == 0 {
        thread::yield_now();
    }
    assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

    struct Engine<'a> {
        done: &'a crossbeam_channel::Receiver<WaitOutcome>,
        saw_destroy: bool,
    }
    impl CommandHandler for Engine<'_> {
        fn surface_destroyed(&mut self) {
            // Host must still be blocked while the engine handles the destroy.
            assert!(self.done.try_recv().is_err());
            self.saw_destroy = true;
        }
    }

    let mut engine = Engine { done: &done_rx, saw_destroy: false };
    b.drain_and_dispatch(&mut engine);
    assert!(engine.saw_destroy);

    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), WaitOutcome::Signaled);
    host.join().unwrap();
    assert_eq!(b.surface_state(), SurfaceState::Absent);
}

#[test_log::test]
fn interleaved_call_sites_keep_global_order() {
    const N: i32 = 1000;
    let b = bridge();

    // Two host call sites take strict turns, so the global order is known.
    let (to_a, from_a) = bounded::<i32>(1);
    let (to_b, from_b) = bounded::<i32>(1);

    let site = |site_id: i32,
                inbox: crossbeam_channel::Receiver<i32>,
                other: crossbeam_channel::Sender<i32>,
                b: Arc<HostBridge>| {
        thread::spawn(move || {
            for seq in inbox.iter() {
                if seq >= N {
                    let _ = other.send(seq);
                    break;
                }
                b.on_pointer_move(site_id, seq, 0, false);
                if other.send(seq + 1).is_err() {
                    break;
                }
            }
        })
    };

    let a = site(1, from_a, to_b.clone(), b.clone());
    let c = site(2, from_b, to_a.clone(), b.clone());
    to_a.send(0).unwrap();

    // Drain concurrently with production.
    let mut r = Recorder::default();
    while r.seen.len() < N as usize {
        b.drain_and_dispatch(&mut r);
        thread::yield_now();
    }
    a.join().unwrap();
    c.join().unwrap();
    b.drain_and_dispatch(&mut r);

    assert_eq!(r.seen.len(), N as usize);
    for (i, seen) in r.seen.iter().enumerate() {
        let i = i as i32;
        let site = if i % 2 == 0 { 1 } else { 2 };
        assert_eq!(*seen, Seen::Move { site, seq: i });
    }
}

#[test_log::test]
fn recycled_record_has_no_stale_text() {
    let cfg = BridgeConfig {
        pool: PoolConfig { preallocate: 1, max_retained: 1 },
        ..BridgeConfig::default()
    };
    let b = HostBridge::new(&cfg);

    let mut r = Recorder::default();
    b.on_text_changed("/say hello");
    b.drain_and_dispatch(&mut r);
    b.on_pause();
    b.drain_and_dispatch(&mut r);

    assert_eq!(r.seen, vec![Seen::Text("/say hello".into()), Seen::Paused]);
    assert_eq!(b.stats().fresh_allocations, 0);
}

#[test_log::test]
fn gamepad_dead_zone_applied_before_enqueue() {
    let b = bridge();
    b.on_gamepad_axis(GamepadStick::Left, 0.2, 0.4);

    let mut r = Recorder::default();
    b.drain_and_dispatch(&mut r);

    let expected_y = 1638.0 / 4096.0;
    assert_eq!(b.axis_codec().encode(0.4), 1638);
    assert_eq!(b.axis_codec().decode(1638), expected_y);
    assert_eq!(
        r.seen,
        vec![Seen::Axis { stick: GamepadStick::Left, x: 0.0, y: expected_y }]
    );
}

#[test_log::test]
fn unknown_codes_are_dropped_without_disturbing_order() {
    let b = bridge();
    b.on_text_changed("a");
    b.enqueue_code(17, Default::default());
    b.enqueue_code(500, Default::default());
    b.on_text_changed("ab");

    let mut r = Recorder::default();
    assert_eq!(b.drain_and_dispatch(&mut r), 4);
    assert_eq!(r.seen, vec![Seen::Text("a".into()), Seen::Text("ab".into())]);
}

#[test_log::test]
fn commands_from_many_threads_are_dispatched_exactly_once() {
    let b = bridge();
    let (tx, rx) = unbounded();

    let producers: Vec<_> = (0..4)
        .map(|site| {
            let b = b.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for seq in 0..250 {
                    b.on_pointer_move(site, seq, 0, true);
                }
                tx.send(()).unwrap();
            })
        })
        .collect();
    drop(tx);

    let mut r = Recorder::default();
    while rx.recv_timeout(Duration::from_millis(1)).is_ok() || r.seen.len() < 1000 {
        b.drain_and_dispatch(&mut r);
    }
    for p in producers {
        p.join().unwrap();
    }
    b.drain_and_dispatch(&mut r);

    assert_eq!(r.seen.len(), 1000);
    // Per-site order survives global interleaving.
    for site in 0..4 {
        let seqs: Vec<i32> = r
            .seen
            .iter()
            .filter_map(|s| match s {
                Seen::Move { site: id, seq } if *id == site => Some(*seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs, (0..250).collect::<Vec<_>>());
    }
}

#[test_log::test]
fn stray_teardown_signal_does_not_skip_next_handshake() {
    let b = bridge();
    assert!(!b.signal_surface_teardown_complete(1));

    b.on_surface_created(SurfaceHandle::new(5, HostWindow), 10, 10);
    let (done_tx, done_rx) = bounded(1);
    let host = {
        let b = b.clone();
        thread::spawn(move || done_tx.send(b.on_surface_destroyed()).unwrap())
    };

    while !b.is_host_waiting_on_surface() {
        thread::yield_now();
    }
    assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

    b.drain_and_dispatch(&mut Recorder::default());
    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), WaitOutcome::Signaled);
    host.join().unwrap();
}

#[test_log::test]
fn late_destroy_from_interrupted_teardown_does_not_release_next_one() {
    let b = bridge();
    b.on_surface_created(SurfaceHandle::new(1, HostWindow), 10, 10);

    // Teardown 1 is interrupted before the engine gets to its destroy.
    let first = {
        let b = b.clone();
        thread::spawn(move || b.on_surface_destroyed())
    };
    while !b.interrupt_surface_wait() {
        thread::yield_now();
    }
    assert_eq!(first.join().unwrap(), WaitOutcome::Interrupted);

    b.on_surface_created(SurfaceHandle::new(2, HostWindow), 20, 20);
    let (done_tx, done_rx) = bounded(1);
    let second = {
        let b = b.clone();
        thread::spawn(move || done_tx.send(b.on_surface_destroyed()).unwrap())
    };
    while b.pending_len() < 4 {
        thread::yield_now();
    }

    struct Engine<'a> {
        done: &'a crossbeam_channel::Receiver<WaitOutcome>,
        released_before_created: Option<bool>,
        destroys: usize,
    }
    impl CommandHandler for Engine<'_> {
        fn surface_created(&mut self, surface: &SurfaceHandle, _width: i32, _height: i32) {
            if surface.id() == 2 {
                self.released_before_created = Some(!self.done.is_empty());
            }
        }
        fn surface_destroyed(&mut self) {
            self.destroys += 1;
        }
    }

    let mut engine = Engine { done: &done_rx, released_before_created: None, destroys: 0 };
    assert_eq!(b.drain_and_dispatch(&mut engine), 4);

    assert_eq!(engine.released_before_created, Some(false));
    assert_eq!(engine.destroys, 2);
    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap(), WaitOutcome::Signaled);
    second.join().unwrap();
    assert_eq!(b.surface_state(), SurfaceState::Absent);
}
