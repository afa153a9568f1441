//! Client for the remote targets API.

use super::{RecordStore, StoreError};
use crate::models::{Period, TeamTargets};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

pub struct HttpStore {
    base_url: String,
    client: Client,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

impl RecordStore for HttpStore {
    async fn load(&self, period: &Period) -> Result<Option<TeamTargets>, StoreError> {
        debug!("GET target for {}", period);

        let response = self
            .client
            .get(self.url("target"))
            .query(&[
                ("year", period.year.to_string()),
                ("month", period.month.to_string()),
                ("teamId", period.team_id.clone()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        // The API answers `null` for a period it has never seen.
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn save(&self, team: &TeamTargets) -> Result<(), StoreError> {
        debug!("POST target for {}", team.period());

        let response = self
            .client
            .post(self.url("target"))
            .json(team)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn load_all(&self, year: i32, month: u32) -> Result<Vec<TeamTargets>, StoreError> {
        let response = self
            .client
            .get(self.url("supervisor/all-targets"))
            .query(&[("year", year.to_string()), ("month", month.to_string())])
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("reset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = HttpStore::new("https://api.example.com/api/", 5).unwrap();
        assert_eq!(store.url("target"), "https://api.example.com/api/target");
        assert_eq!(
            store.url("supervisor/all-targets"),
            "https://api.example.com/api/supervisor/all-targets"
        );
    }

    #[tokio::test]
    async fn test_reset_is_unsupported() {
        let store = HttpStore::new("http://localhost:3001/api", 5).unwrap();
        assert!(matches!(
            store.reset().await,
            Err(StoreError::Unsupported("reset"))
        ));
    }
}
