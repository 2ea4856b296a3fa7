use std::path::{Path, PathBuf};

use anyhow::Context;
use directories_next::ProjectDirs;
use serde::Deserialize;

const ENV_PREFIX: &str = "SAFEPASTE_";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub port: u16,
    /// Recorded as the owner of new pastes; authentication is external.
    #[serde(default = "default_owner")]
    pub default_owner: String,
    pub database: Database,
    pub storage: Storage,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub kind: StorageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Database,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    pub max_upload_size: usize,
    /// Run the expired-paste purge this often while serving.
    pub purge_interval_secs: Option<u64>,
}

fn default_owner() -> String {
    "anonymous".into()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load from `path`, or from `config.toml` in the platform config
    /// directory when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => default_path().context("no config path given and no home directory")?,
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let mut config = Config::parse(&text)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.apply_env(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())?;
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(base_url) = var("BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(port) = var("PORT") {
            self.port = port.parse().context("SAFEPASTE_PORT is not a port number")?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = url;
        }
        Ok(())
    }
}

pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "safepaste").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        base_url = "https://paste.example.com"
        port = 8080

        [database]
        url = "sqlite://paste.db?mode=rwc"

        [storage]
        kind = "database"

        [limits]
        max_upload_size = 1048576
        purge_interval_secs = 600
    "#;

    #[test]
    fn parses_nested_sections() {
        let config = Config::parse(EXAMPLE).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_owner, "anonymous");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.storage.kind, StorageKind::Database);
        assert_eq!(config.limits.purge_interval_secs, Some(600));
    }

    #[test]
    fn env_overrides_selected_fields() {
        let mut config = Config::parse(EXAMPLE).unwrap();
        config
            .apply_env(|name| match name {
                "PORT" => Some("9000".into()),
                "DATABASE_URL" => Some("sqlite::memory:".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.base_url, "https://paste.example.com");

        assert!(config
            .apply_env(|name| (name == "PORT").then(|| "not-a-port".into()))
            .is_err());
    }

    #[test]
    fn example_config_file_parses() {
        let text = include_str!("../config.example.toml");
        assert!(Config::parse(text).is_ok());
    }
}
