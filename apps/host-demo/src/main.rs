mod config;
mod demo;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use newengine_host_bridge::{EngineThread, HostBridge, ShutdownToken};
use newengine_platform_winit::WinitHost;

use crate::config::AppConfig;
use crate::demo::DemoEngine;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("host-demo.toml"));
    let cfg = AppConfig::load_or_default(&path)?;

    newengine_modules_logging::init(&cfg.bridge.log);
    log::info!(target: "demo", "config: {}", path.display());

    let bridge = HostBridge::install(&cfg.bridge);
    let shutdown = ShutdownToken::new();
    {
        // First Ctrl+C asks for an orderly stop. A second one also frees a
        // host stuck in surface teardown behind an engine that never drains.
        let shutdown = shutdown.clone();
        let bridge = bridge.clone();
        let presses = AtomicUsize::new(0);
        ctrlc::set_handler(move || {
            shutdown.request();
            if presses.fetch_add(1, Ordering::Relaxed) > 0 && bridge.interrupt_surface_wait() {
                log::warn!(target: "demo", "surface teardown wait interrupted");
            }
        })
        .context("install ctrl-c handler")?;
    }

    let host = WinitHost::new(bridge.clone(), cfg.window.clone(), shutdown.clone())?;
    let app = DemoEngine::new(bridge.clone(), host.alert_presenter());
    let engine = EngineThread::spawn(bridge.clone(), app, &cfg.bridge.engine, shutdown)?;

    let hosted = host.run();

    if engine.shutdown_token().is_requested() {
        log::info!(target: "demo", "shutdown was requested before the host closed");
    }
    let app = engine.stop()?;
    let stats = bridge.stats();
    log::info!(
        target: "demo",
        "done: {} commands dispatched, {} fresh records, {} redraw requests",
        stats.dispatched,
        stats.fresh_allocations,
        app.redraws()
    );

    hosted?;
    Ok(())
}
