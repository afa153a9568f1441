//! Record store adapters.
//!
//! A store keeps one `TeamTargets` document per (year, month, team). A
//! missing document is not an error: callers start from an empty period.

mod file;
mod http;

pub use file::FileStore;
pub use http::HttpStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::{Period, TeamTargets};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0} is not supported by this store")]
    Unsupported(&'static str),
}

/// Load and save period documents.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// The document for a period, or `None` if it was never saved.
    async fn load(&self, period: &Period) -> Result<Option<TeamTargets>, StoreError>;

    /// Write a document, replacing any previous version.
    async fn save(&self, team: &TeamTargets) -> Result<(), StoreError>;

    /// Every team's document for a month (0-based).
    async fn load_all(&self, year: i32, month: u32) -> Result<Vec<TeamTargets>, StoreError>;

    /// Drop every stored document.
    async fn reset(&self) -> Result<(), StoreError>;
}

/// Load a period, creating an empty one if nothing is stored yet.
pub async fn load_or_init<S: RecordStore>(
    store: &S,
    period: &Period,
    team_name: &str,
    now: DateTime<Utc>,
) -> Result<TeamTargets, StoreError> {
    match store.load(period).await? {
        Some(team) => Ok(team),
        None => {
            info!("No data for {}; starting an empty period", period);
            Ok(TeamTargets::new(period, team_name, now))
        }
    }
}

/// The store selected in configuration.
pub enum Backend {
    File(FileStore),
    Http(HttpStore),
}

impl Backend {
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend {
            StoreBackend::File => {
                debug!("Using file store at {}", config.data_dir.display());
                Ok(Backend::File(FileStore::new(config.data_dir.clone())))
            }
            StoreBackend::Http => {
                debug!("Using HTTP store at {}", config.api_url);
                Ok(Backend::Http(HttpStore::new(
                    &config.api_url,
                    config.timeout_seconds,
                )?))
            }
        }
    }
}

impl RecordStore for Backend {
    async fn load(&self, period: &Period) -> Result<Option<TeamTargets>, StoreError> {
        match self {
            Backend::File(store) => store.load(period).await,
            Backend::Http(store) => store.load(period).await,
        }
    }

    async fn save(&self, team: &TeamTargets) -> Result<(), StoreError> {
        match self {
            Backend::File(store) => store.save(team).await,
            Backend::Http(store) => store.save(team).await,
        }
    }

    async fn load_all(&self, year: i32, month: u32) -> Result<Vec<TeamTargets>, StoreError> {
        match self {
            Backend::File(store) => store.load_all(year, month).await,
            Backend::Http(store) => store.load_all(year, month).await,
        }
    }

    async fn reset(&self) -> Result<(), StoreError> {
        match self {
            Backend::File(store) => store.reset().await,
            Backend::Http(store) => store.reset().await,
        }
    }
}
