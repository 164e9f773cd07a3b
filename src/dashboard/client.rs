use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::api::job::models::{ActiveJob, Crew};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// HTTP client for the read endpoints of a tracker server
pub struct TrackerClient {
    http: Client,
    base_url: String,
}

impl TrackerClient {
    /// `timeout` bounds each request, so a stuck server cannot stall the poll loop
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DashboardError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn active_jobs(&self) -> Result<Vec<ActiveJob>, DashboardError> {
        self.get_json("/api/active-jobs").await
    }

    pub async fn scoreboard(&self) -> Result<Vec<Crew>, DashboardError> {
        self.get_json("/api/scoreboard").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| DashboardError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status { url, status });
        }

        response
            .json()
            .await
            .map_err(|source| DashboardError::Request { url, source })
    }
}
