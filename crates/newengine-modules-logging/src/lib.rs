use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::LevelFilter;
use newengine_host_bridge::LogConfig;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the process logger.
///
/// Line format: `[unix_ms] [LEVEL] [target] message`. `RUST_LOG`, when set,
/// overrides the configured level. Calling twice is a no-op.
pub fn init(cfg: &LogConfig) {
    if INSTALLED.swap(true, Ordering::AcqRel) {
        return;
    }

    let level = parse_level(&cfg.level);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if cfg.trace_commands {
        builder.filter_module("bridge", LevelFilter::Trace);
    }
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format(|buf, record| {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        writeln!(buf, "[{}] [{}] [{}] {}", ms, record.level(), record.target(), record.args())
    });

    if builder.try_init().is_err() {
        // Someone else (tests, embedder) already owns the logger.
        return;
    }

    log::debug!(target: "logging", "logger installed, level={level}");
}

/// Unknown names fall back to `info`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or_else(|_| {
        eprintln!("unknown log level '{name}', using info");
        LevelFilter::Info
    })
}
