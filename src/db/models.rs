use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::job::models::{ActiveJob, Crew, JobStatus, Location};

/// Database representation of an active job
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub job_id: String,
    pub crew_id: String,
    pub lat: f64,
    pub lng: f64,
    pub started_at: DateTime<Utc>,
}

impl From<JobRow> for ActiveJob {
    fn from(row: JobRow) -> Self {
        ActiveJob {
            job_id: row.job_id,
            crew_id: row.crew_id,
            status: JobStatus::Active,
            location: Location {
                lat: row.lat,
                lng: row.lng,
            },
            started_at: row.started_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct CrewRow {
    pub crew_id: String,
    pub name: String,
    pub completed_jobs: i64,
    pub failed_jobs: i64,
}

impl From<CrewRow> for Crew {
    fn from(row: CrewRow) -> Self {
        Crew {
            crew_id: row.crew_id,
            name: row.name,
            completed_jobs: row.completed_jobs,
            failed_jobs: row.failed_jobs,
        }
    }
}
