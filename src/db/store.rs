use async_trait::async_trait;
use thiserror::Error;

use crate::api::job::models::{ActiveJob, CompletionStatus, Crew, JobStart, NewCrew};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// What a completion webhook actually changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Crew counter incremented and job removed
    Recorded {
        crew_id: String,
        status: CompletionStatus,
    },
    /// Job removed, but its crew does not exist so no counter moved
    CrewMissing { crew_id: String },
    /// No active job with that id; nothing changed
    JobMissing,
}

/// Persistence for jobs and crews.
///
/// `complete_job` must apply the find/increment/delete sequence atomically:
/// either every step is visible afterwards or none is.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    async fn insert_job(&self, job: &JobStart) -> Result<ActiveJob, StoreError>;

    async fn complete_job(
        &self,
        job_id: &str,
        status: CompletionStatus,
    ) -> Result<CompletionOutcome, StoreError>;

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, StoreError>;

    async fn crews(&self) -> Result<Vec<Crew>, StoreError>;

    /// Insert a crew, or rename it if it exists. Counters are preserved.
    async fn upsert_crew(&self, crew: &NewCrew) -> Result<Crew, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);
}
