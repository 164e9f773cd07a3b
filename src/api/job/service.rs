use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, info, warn};
use validator::Validate;

use crate::api::validation::{ErrorResponse, validation_messages};
use crate::db::store::{CompletionOutcome, StoreError, TrackerStore};
use super::models::{ActiveJob, Crew, JobComplete, JobStart, NewCrew};

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Validation failed
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Store(e) => {
                error!("Storage error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                })
            }
            ServiceError::Validation(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
        }
    }
}

/// Job lifecycle and scoreboard logic over a [`TrackerStore`]
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn TrackerStore>,
}

impl JobService {
    pub fn new(store: Arc<dyn TrackerStore>) -> Self {
        Self { store }
    }

    /// Record that a crew started a job
    pub async fn start_job(&self, start: &JobStart) -> Result<ActiveJob, ServiceError> {
        info!(
            "Service: Starting job job_id={} crew_id={} at ({}, {})",
            start.job_id, start.crew_id, start.location.lat, start.location.lng
        );

        let job = self.store.insert_job(start).await?;

        info!("Service: Job {} is active", job.job_id);
        Ok(job)
    }

    /// Record a job completion
    ///
    /// # Business Logic
    /// - Unknown job: nothing changes
    /// - Known job, unknown crew: job is removed, no counter moves
    /// - Otherwise the crew's completed or failed counter grows by one and the job is removed
    ///
    /// Lookup misses are not errors; the outcome says what happened.
    pub async fn complete_job(&self, complete: &JobComplete) -> Result<CompletionOutcome, ServiceError> {
        let outcome = self
            .store
            .complete_job(&complete.job_id, complete.status)
            .await?;

        match &outcome {
            CompletionOutcome::Recorded { crew_id, status } => info!(
                "Service: Job {} finished as {:?} for crew {}",
                complete.job_id, status, crew_id
            ),
            CompletionOutcome::CrewMissing { crew_id } => warn!(
                "Service: Job {} removed but crew {} does not exist; scoreboard unchanged",
                complete.job_id, crew_id
            ),
            CompletionOutcome::JobMissing => warn!(
                "Service: Completion for unknown job {} ignored",
                complete.job_id
            ),
        }

        Ok(outcome)
    }

    pub async fn active_jobs(&self) -> Result<Vec<ActiveJob>, ServiceError> {
        Ok(self.store.active_jobs().await?)
    }

    pub async fn scoreboard(&self) -> Result<Vec<Crew>, ServiceError> {
        Ok(self.store.crews().await?)
    }

    /// Register a crew, or rename an existing one
    pub async fn register_crew(&self, crew: &NewCrew) -> Result<Crew, ServiceError> {
        if let Err(errors) = crew.validate() {
            return Err(ServiceError::Validation(validation_messages(&errors).join("; ")));
        }

        let crew = self.store.upsert_crew(crew).await?;
        info!("Service: Crew {} registered as {:?}", crew.crew_id, crew.name);
        Ok(crew)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
