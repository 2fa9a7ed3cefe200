//! Stored desktop configuration (`~/.goggles/config.json`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GogglesConfig {
    pub updated_at: u64,
    /// Wallet address sent along with generation requests.
    pub address: String,
    /// Directory watched for new screenshots. Defaults to the desktop dir.
    #[serde(default)]
    pub watch_dir: Option<PathBuf>,
    /// Gateway base URL.
    #[serde(default)]
    pub gateway_url: Option<String>,
}

impl Default for GogglesConfig {
    fn default() -> Self {
        Self {
            updated_at: now_secs(),
            address: String::new(),
            watch_dir: None,
            gateway_url: None,
        }
    }
}

impl GogglesConfig {
    pub fn config_path() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".goggles");
            if !config_dir.exists() {
                let _ = std::fs::create_dir_all(&config_dir);
            }
            config_dir.join("config.json")
        } else {
            PathBuf::from("config.json")
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config at {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn update_address(&mut self, new_address: String) -> Result<()> {
        self.address = new_address;
        self.updated_at = now_secs();
        self.save()
    }

    /// Watched directory, falling back to the platform desktop dir.
    pub fn effective_watch_dir(&self) -> PathBuf {
        self.watch_dir
            .clone()
            .or_else(dirs::desktop_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn effective_gateway_url(&self) -> String {
        self.gateway_url
            .clone()
            .unwrap_or_else(|| "http://localhost:3000".to_string())
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
