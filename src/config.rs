//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salesboard.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::session::Role;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".salesboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Calendar range offered when picking months.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Known teams and their display names.
    #[serde(default = "default_teams")]
    pub teams: Vec<TeamConfig>,

    /// Accounts allowed to sign in.
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
            calendar: CalendarConfig::default(),
            teams: default_teams(),
            accounts: default_accounts(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Team name given to a period created from scratch.
    #[serde(default = "default_team_name")]
    pub default_team_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_team_name: default_team_name(),
        }
    }
}

fn default_team_name() -> String {
    "Sales Team".to_string()
}

/// Which record store to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON documents in a local directory.
    #[default]
    File,
    /// The remote targets API.
    Http,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory holding one JSON file per team and month.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the targets API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("salesboard-data")
}

fn default_api_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Range of years offered by `months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    #[serde(default = "default_end_year")]
    pub end_year: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
        }
    }
}

fn default_start_year() -> i32 {
    2024
}

fn default_end_year() -> i32 {
    2030
}

/// A team id and the name shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
}

fn default_teams() -> Vec<TeamConfig> {
    vec![
        TeamConfig {
            id: "team-alpha".to_string(),
            name: "Mavericks".to_string(),
        },
        TeamConfig {
            id: "team-beta".to_string(),
            name: "Little ATMs".to_string(),
        },
    ]
}

/// A sign-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Team the account manages, or `all` for supervisors.
    pub team_id: String,
}

fn default_accounts() -> Vec<AccountConfig> {
    vec![
        AccountConfig {
            username: "adminA".to_string(),
            password: "teamA123".to_string(),
            role: Role::Admin,
            team_id: "team-alpha".to_string(),
        },
        AccountConfig {
            username: "adminB".to_string(),
            password: "teamB123".to_string(),
            role: Role::Admin,
            team_id: "team-beta".to_string(),
        },
        AccountConfig {
            username: "super".to_string(),
            password: "super123".to_string(),
            role: Role::Supervisor,
            team_id: "all".to_string(),
        },
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(backend) = args.backend {
            self.store.backend = backend.into();
        }
        if let Some(ref data_dir) = args.data_dir {
            self.store.data_dir = data_dir.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.store.api_url = api_url.clone();
        }
    }

    /// Display name for a team id, `Sales Team` when unknown.
    pub fn team_name(&self, team_id: &str) -> String {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| self.general.default_team_name.clone())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
