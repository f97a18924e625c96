use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostWindowConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Gamepad poll period while the loop is otherwise idle.
    #[serde(default = "default_gamepad_poll_ms")]
    pub gamepad_poll_ms: u64,

    #[serde(default = "default_gamepads")]
    pub gamepads: bool,
}

fn default_title() -> String {
    "NewEngine".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_gamepad_poll_ms() -> u64 {
    8
}
fn default_gamepads() -> bool {
    true
}

impl Default for HostWindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            gamepad_poll_ms: default_gamepad_poll_ms(),
            gamepads: default_gamepads(),
        }
    }
}

impl HostWindowConfig {
    #[inline]
    pub fn gamepad_poll_interval(&self) -> Duration {
        Duration::from_millis(self.gamepad_poll_ms.max(1))
    }
}
