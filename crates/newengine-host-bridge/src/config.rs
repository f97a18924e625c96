use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};

/// Bridge configuration (usually `bridge.toml` next to the executable).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub gamepad: GamepadConfig,

    #[serde(default)]
    pub engine: EngineLoopConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Records created up front so early host callbacks don't allocate.
    #[serde(default = "default_preallocate")]
    pub preallocate: usize,

    /// Retired records beyond this are dropped instead of pooled.
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadConfig {
    /// Axis components with `|v| <= dead_zone` are sent as zero.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,

    /// Fixed-point scale used to carry axis values as integers.
    #[serde(default = "default_axis_scale")]
    pub axis_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineLoopConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: f32,

    /// dt clamp (sec) so a long stall doesn't produce a huge frame.
    #[serde(default = "default_max_dt_sec")]
    pub max_dt_sec: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log every dispatched command at trace level.
    #[serde(default)]
    pub trace_commands: bool,
}

fn default_preallocate() -> usize {
    64
}
fn default_max_retained() -> usize {
    1024
}
fn default_dead_zone() -> f32 {
    0.25
}
fn default_axis_scale() -> f32 {
    4096.0
}
fn default_tick_ms() -> f32 {
    16.6667
}
fn default_max_dt_sec() -> f32 {
    0.25
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            preallocate: default_preallocate(),
            max_retained: default_max_retained(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
            axis_scale: default_axis_scale(),
        }
    }
}

impl Default for EngineLoopConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            max_dt_sec: default_max_dt_sec(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            trace_commands: false,
        }
    }
}

/// Longest accepted engine tick.
pub const MAX_TICK_MS: f32 = 10_000.0;

/// Largest axis scale whose encoded values stay exact in `f32` and fit `i32`.
pub const MAX_AXIS_SCALE: f32 = 16_777_216.0;

impl EngineLoopConfig {
    /// Tick period, clamped to [1 ms, `MAX_TICK_MS`]. Never panics, even on
    /// a config that skipped `validate`.
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        let secs = (self.tick_ms / 1000.0).clamp(0.001, MAX_TICK_MS / 1000.0);
        Duration::try_from_secs_f32(secs).unwrap_or(Duration::from_millis(1))
    }
}

impl BridgeConfig {
    pub fn from_toml_str(s: &str) -> BridgeResult<Self> {
        let cfg: BridgeConfig = toml::from_str(s).map_err(|e| BridgeError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Missing file -> defaults; unreadable or malformed file -> error.
    pub fn load_or_default(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| BridgeError::Config(format!("parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(target: "bridge", "no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(BridgeError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Range checks; run by `from_toml_str`, and by embedders that nest this
    /// config inside their own file.
    pub fn validate(&self) -> BridgeResult<()> {
        let g = &self.gamepad;
        if !(0.0..1.0).contains(&g.dead_zone) {
            return Err(BridgeError::Config(format!(
                "gamepad.dead_zone must be in [0, 1), got {}",
                g.dead_zone
            )));
        }
        if !(1.0..=MAX_AXIS_SCALE).contains(&g.axis_scale) {
            return Err(BridgeError::Config(format!(
                "gamepad.axis_scale must be in [1, {MAX_AXIS_SCALE}], got {}",
                g.axis_scale
            )));
        }

        let e = &self.engine;
        if !(e.tick_ms > 0.0 && e.tick_ms <= MAX_TICK_MS) {
            return Err(BridgeError::Config(format!(
                "engine.tick_ms must be in (0, {MAX_TICK_MS}], got {}",
                e.tick_ms
            )));
        }
        if !(e.max_dt_sec > 0.0 && e.max_dt_sec.is_finite()) {
            return Err(BridgeError::Config(format!(
                "engine.max_dt_sec must be positive and finite, got {}",
                e.max_dt_sec
            )));
        }
        Ok(())
    }
}
