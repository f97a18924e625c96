//! winit/gilrs host for the engine bridge.
//!
//! Runs on the main thread, turns window, input and lifecycle callbacks into
//! bridge commands and performs the blocking surface teardown handshake.

mod alert;
mod config;
mod error;
mod gamepad;
mod host;
pub mod keys;
mod text;

pub use alert::{HostRequest, WinitAlertPresenter};
pub use config::HostWindowConfig;
pub use error::{PlatformError, PlatformResult};
pub use gamepad::GamepadPoller;
pub use host::WinitHost;
pub use text::TextBuffer;
