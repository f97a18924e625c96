use gilrs::{Axis, EventType, Gilrs};
use newengine_host_bridge::{GamepadStick, HostBridge};

use crate::keys;

/// Polls gilrs on the host thread and forwards sticks/buttons to the bridge.
///
/// Stick components arrive one axis at a time; both components are sent
/// together so the engine always sees a full (x, y) pair.
pub struct GamepadPoller {
    gilrs: Gilrs,
    left: (f32, f32),
    right: (f32, f32),
}

impl GamepadPoller {
    pub fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => {
                for (_id, pad) in gilrs.gamepads() {
                    log::info!(target: "host", "gamepad connected: {}", pad.name());
                }
                Some(Self {
                    gilrs,
                    left: (0.0, 0.0),
                    right: (0.0, 0.0),
                })
            }
            Err(e) => {
                log::warn!(target: "host", "gamepad support unavailable: {e}");
                None
            }
        }
    }

    /// Drain pending gamepad events. Returns how many were seen.
    pub fn poll(&mut self, bridge: &HostBridge) -> usize {
        let mut n = 0usize;
        let mut left_dirty = false;
        let mut right_dirty = false;

        while let Some(ev) = self.gilrs.next_event() {
            n += 1;
            match ev.event {
                EventType::AxisChanged(axis, value, _) => match axis {
                    Axis::LeftStickX => {
                        self.left.0 = value;
                        left_dirty = true;
                    }
                    Axis::LeftStickY => {
                        self.left.1 = value;
                        left_dirty = true;
                    }
                    Axis::RightStickX => {
                        self.right.0 = value;
                        right_dirty = true;
                    }
                    Axis::RightStickY => {
                        self.right.1 = value;
                        right_dirty = true;
                    }
                    _ => {}
                },
                EventType::ButtonPressed(button, _) => {
                    if let Some(code) = keys::map_pad_button(button) {
                        bridge.on_key_down(code, 0);
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(code) = keys::map_pad_button(button) {
                        bridge.on_key_up(code);
                    }
                }
                EventType::Connected => {
                    log::info!(target: "host", "gamepad connected: {}", self.gilrs.gamepad(ev.id).name());
                }
                EventType::Disconnected => {
                    log::info!(target: "host", "gamepad disconnected");
                    self.left = (0.0, 0.0);
                    self.right = (0.0, 0.0);
                    left_dirty = true;
                    right_dirty = true;
                }
                _ => {}
            }
        }

        if left_dirty {
            bridge.on_gamepad_axis(GamepadStick::Left, self.left.0, self.left.1);
        }
        if right_dirty {
            bridge.on_gamepad_axis(GamepadStick::Right, self.right.0, self.right.1);
        }
        n
    }
}
