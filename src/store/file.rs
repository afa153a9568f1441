//! JSON documents on disk.
//!
//! Layout: `<root>/<YYYY>-<MM>/<team-id>.json`, with a 1-based month in the
//! directory name.

use super::{RecordStore, StoreError};
use crate::models::{Period, TeamTargets};
use futures::future::join_all;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn month_dir(&self, year: i32, month: u32) -> PathBuf {
        self.root.join(format!("{:04}-{:02}", year, month + 1))
    }

    /// Path of the document for a period.
    pub fn path_for(&self, period: &Period) -> PathBuf {
        self.month_dir(period.year, period.month)
            .join(format!("{}.json", file_stem(&period.team_id)))
    }
}

/// Team ids are user-supplied; keep them to a safe file name.
fn file_stem(team_id: &str) -> String {
    team_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn read_document(path: &Path) -> Result<Option<TeamTargets>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

impl RecordStore for FileStore {
    async fn load(&self, period: &Period) -> Result<Option<TeamTargets>, StoreError> {
        let path = self.path_for(period);
        debug!("Loading {}", path.display());
        read_document(&path).await
    }

    async fn save(&self, team: &TeamTargets) -> Result<(), StoreError> {
        let path = self.path_for(&team.period());
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(team).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&path, content).await.map_err(io_err)?;

        debug!("Saved {}", path.display());
        Ok(())
    }

    async fn load_all(&self, year: i32, month: u32) -> Result<Vec<TeamTargets>, StoreError> {
        let dir = self.month_dir(year, month);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let paths: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();

        let loaded = join_all(paths.iter().map(|path| read_document(path))).await;

        let mut teams = Vec::with_capacity(paths.len());
        for (path, result) in paths.iter().zip(loaded) {
            match result {
                Ok(Some(team)) => teams.push(team),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(teams)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.root.clone(),
            source,
        };

        if self.root.exists() {
            tokio::fs::remove_dir_all(&self.root).await.map_err(io_err)?;
        }
        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;

        warn!("Removed every stored period under {}", self.root.display());
        Ok(())
    }
}
