use anyhow::Context;
use pgb_core::ColorScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub color_scheme: ColorScheme,

    pub boot_rom_path: Option<String>,

    #[serde(default = "default_frames")]
    pub frames: u32,

    #[serde(default = "default_persist_save_data")]
    pub persist_save_data: bool,
}

fn default_frames() -> u32 {
    60
}

fn default_persist_save_data() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::default(),
            boot_rom_path: Option::default(),
            frames: default_frames(),
            persist_save_data: default_persist_save_data(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_file<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("error reading TOML config file from '{path:?}'"))?;
        let config: Self = toml::from_str(&config_str)
            .with_context(|| format!("error parsing app config from TOML file at '{path:?}'"))?;

        Ok(config)
    }
}
