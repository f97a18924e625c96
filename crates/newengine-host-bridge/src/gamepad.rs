use crate::command::CommandKind;
use crate::config::GamepadConfig;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GamepadStick {
    Left,
    Right,
}

impl GamepadStick {
    #[inline]
    pub const fn command(self) -> CommandKind {
        match self {
            GamepadStick::Left => CommandKind::GamepadAxisLeft,
            GamepadStick::Right => CommandKind::GamepadAxisRight,
        }
    }
}

/// Dead-zone filter + fixed-point codec for analog axes.
///
/// Axes travel through the queue as integers (`value * scale`); the host
/// filters before enqueue, the engine decodes after dequeue.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisCodec {
    dead_zone: f32,
    scale: f32,
}

impl Default for AxisCodec {
    fn default() -> Self {
        Self::from_config(&GamepadConfig::default())
    }
}

impl AxisCodec {
    #[inline]
    pub fn new(dead_zone: f32, scale: f32) -> Self {
        Self {
            dead_zone: dead_zone.abs(),
            scale: scale.max(1.0),
        }
    }

    #[inline]
    pub fn from_config(cfg: &GamepadConfig) -> Self {
        Self::new(cfg.dead_zone, cfg.axis_scale)
    }

    #[inline]
    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Filter one axis component and convert it to fixed point.
    #[inline]
    pub fn encode(&self, value: f32) -> i32 {
        if !value.is_finite() || value.abs() <= self.dead_zone {
            return 0;
        }
        (value.clamp(-1.0, 1.0) * self.scale) as i32
    }

    #[inline]
    pub fn decode(&self, value: i32) -> f32 {
        value as f32 / self.scale
    }
}
