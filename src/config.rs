use anyhow::{Context, Result};
use glam::Vec4;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Inspector settings, fixed at construction: the rescan cadence and the
/// two overlay colors.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorConfig {
    #[serde(default = "InspectorConfig::default_rescan_hz")]
    pub rescan_hz: f32,
    #[serde(default = "InspectorConfig::default_active_color")]
    pub active_color: [f32; 4],
    #[serde(default = "InspectorConfig::default_dimmed_color")]
    pub dimmed_color: [f32; 4],
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            rescan_hz: Self::default_rescan_hz(),
            active_color: Self::default_active_color(),
            dimmed_color: Self::default_dimmed_color(),
        }
    }
}

impl InspectorConfig {
    const fn default_rescan_hz() -> f32 {
        10.0
    }

    const fn default_active_color() -> [f32; 4] {
        [0.0, 1.0, 0.0, 1.0]
    }

    const fn default_dimmed_color() -> [f32; 4] {
        [0.0, 0.5, 0.75, 1.0]
    }

    pub fn active_color_vec(&self) -> Vec4 {
        Vec4::from_array(self.active_color)
    }

    pub fn dimmed_color_vec(&self) -> Vec4 {
        Vec4::from_array(self.dimmed_color)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}
