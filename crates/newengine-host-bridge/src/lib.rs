#![forbid(unsafe_op_in_unsafe_fn)]

//! Host <-> engine glue for hosts that own the window lifecycle.
//!
//! The host thread pushes lifecycle/input notifications with `HostBridge::on_*`;
//! the engine thread drains them once per tick with
//! `HostBridge::drain_and_dispatch`. Surface teardown is a blocking handshake:
//! the host waits until the engine has dispatched `SurfaceDestroyed`.

pub mod bridge;
pub mod command;
pub mod config;
pub mod dialog;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gamepad;
pub mod queue;
pub mod rendezvous;
pub mod surface;

pub use crate::bridge::HostBridge;
pub use crate::command::{CommandKind, CommandRecord, Payload, SurfaceHandle};
pub use crate::config::{BridgeConfig, EngineLoopConfig, GamepadConfig, LogConfig, PoolConfig};
pub use crate::dialog::AlertPresenter;
pub use crate::dispatch::CommandHandler;
pub use crate::engine::{EngineApp, EngineThread, Frame, ShutdownToken, TickControl};
pub use crate::error::{BridgeError, BridgeResult};
pub use crate::gamepad::{AxisCodec, GamepadStick};
pub use crate::queue::QueueStats;
pub use crate::rendezvous::WaitOutcome;
pub use crate::surface::SurfaceState;
