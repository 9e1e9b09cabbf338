use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}
fn default_fallback_days() -> u32 {
    7
}
fn default_blocked_categories() -> Vec<String> {
    vec!["игры".to_string(), "техника".to_string(), "шопинг".to_string()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Talk to the REST backend at `api.base_url`.
    #[default]
    Remote,
    /// Keep everything in the local SQLite file.
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Signed-in user; set by `wishcooler login`.
    #[serde(default)]
    pub nick: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            base_url: default_base_url(),
            nick: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Used when no configured price bracket matches.
    #[serde(default = "default_fallback_days")]
    pub fallback_days: u32,
    /// Always blocked, on top of the profile's own list.
    #[serde(default = "default_blocked_categories")]
    pub blocked_categories: Vec<String>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            fallback_days: default_fallback_days(),
            blocked_categories: default_blocked_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "wishcooler")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("wishcooler.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// The signed-in nick, or an error telling the user how to sign in.
    pub fn require_nick(&self) -> Result<&str> {
        self.api
            .nick
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .context("Not signed in. Run `wishcooler login <nick>` first.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            backend = "local"
            nick = "meow"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.backend, Backend::Local);
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.cooldown.fallback_days, 7);
        assert_eq!(config.cooldown.blocked_categories.len(), 3);
        assert_eq!(config.require_nick().unwrap(), "meow");
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let missing = AppConfig::load_from(&path).unwrap();
        assert!(missing.api.nick.is_none());

        let mut config = AppConfig::default();
        config.api.nick = Some("testmeowmeow".into());
        config.cooldown.fallback_days = 10;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api.nick.as_deref(), Some("testmeowmeow"));
        assert_eq!(loaded.cooldown.fallback_days, 10);
    }

    #[test]
    fn blank_nick_is_not_signed_in() {
        let mut config = AppConfig::default();
        assert!(config.require_nick().is_err());
        config.api.nick = Some("  ".into());
        assert!(config.require_nick().is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbackend = 3").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
