use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use newengine_host_bridge::BridgeConfig;
use newengine_platform_winit::HostWindowConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub window: HostWindowConfig,
}

impl AppConfig {
    /// Missing file means defaults. The logger isn't up yet, so nothing is logged here.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };

        let cfg: AppConfig = toml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        cfg.bridge.validate()?;
        Ok(cfg)
    }
}
