use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use soundbank_core::RecordingPolicy;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub bank: BankConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BankConfig {
    #[serde(default = "default_slots")]
    pub slots: usize,
    /// What happens when a second slot asks for the recorder
    #[serde(default)]
    pub recording_policy: RecordingPolicy,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            recording_policy: RecordingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AudioConfig {
    /// Input device name, or "default"
    #[serde(default = "default_input_device")]
    pub input_device: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: default_input_device(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ExportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: None,
            stagger_ms: default_stagger_ms(),
        }
    }
}

impl ExportConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

fn default_slots() -> usize {
    6
}

fn default_input_device() -> String {
    "default".to_string()
}

fn default_stagger_ms() -> u64 {
    soundbank_core::DEFAULT_STAGGER.as_millis() as u64
}

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("soundbank")
        .join("config.toml")
}

/// Read the config, writing the defaults out when there is none yet
pub(crate) fn load_config() -> AppConfig {
    let path = config_path();
    let Ok(text) = std::fs::read_to_string(&path) else {
        let config = AppConfig::default();
        save_config(&config);
        info!(path = %path.display(), "Wrote default config");
        return config;
    };

    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "Ignoring unreadable config: {}", e);
            AppConfig::default()
        }
    }
}

pub(crate) fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(s) = toml::to_string_pretty(config) else { return };
    let _ = std::fs::write(&path, s);
}
