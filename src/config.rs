// read once on startup; nothing is ever written back
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pipeline::EffectParams;

pub const DEFAULT_CONFIG_FILE: &str = "tuneboard.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assets_dir: PathBuf,
    // bundled asset whose sample rate fixes the output format
    pub representative_asset: String,
    pub import_dir: Option<PathBuf>,
    pub hardware_volume_ceiling: f32,
    // simulated board reshuffles its cards this often, 0 = never
    pub shuffle_interval_secs: u64,
    pub effects: EffectParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            representative_asset: String::from("01_Groove"),
            import_dir: None,
            hardware_volume_ceiling: 0.395,
            shuffle_interval_secs: 0,
            effects: EffectParams::default(),
        }
    }
}

impl Config {
    /// Missing file means defaults; a file that exists but doesn't parse is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        let config: Config =
            serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if !(self.hardware_volume_ceiling.is_finite() && self.hardware_volume_ceiling >= 0.0) {
            log::warn!("hardware_volume_ceiling {} ignored", self.hardware_volume_ceiling);
            self.hardware_volume_ceiling = Config::default().hardware_volume_ceiling;
        }
        self.hardware_volume_ceiling = self.hardware_volume_ceiling.min(1.0);
        self
    }

    pub fn shuffle_interval(&self) -> Option<std::time::Duration> {
        (self.shuffle_interval_secs > 0).then(|| std::time::Duration::from_secs(self.shuffle_interval_secs))
    }
}
