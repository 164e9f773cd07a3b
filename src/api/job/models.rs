use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status of a persisted job. A job row only exists while it is active.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
        }
    }
}

/// Outcome reported by a crew when a job finishes
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Failed,
}

impl CompletionStatus {
    /// Increments applied to `(completed_jobs, failed_jobs)`
    pub fn counter_increments(self) -> (i64, i64) {
        match self {
            CompletionStatus::Completed => (1, 0),
            CompletionStatus::Failed => (0, 1),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "lng must be between -180 and 180"))]
    pub lng: f64,
}

/// Body of `POST /webhook/job-start`
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobStart {
    #[validate(length(min = 1, max = 128, message = "jobId must be between 1 and 128 characters"))]
    pub job_id: String,
    #[validate(length(min = 1, max = 128, message = "crewId must be between 1 and 128 characters"))]
    pub crew_id: String,
    #[validate(nested)]
    pub location: Location,
}

/// Body of `POST /webhook/job-complete`
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobComplete {
    #[validate(length(min = 1, max = 128, message = "jobId must be between 1 and 128 characters"))]
    pub job_id: String,
    pub status: CompletionStatus,
}

/// A job currently in progress, as served by `GET /api/active-jobs`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJob {
    pub job_id: String,
    pub crew_id: String,
    pub status: JobStatus,
    pub location: Location,
    pub started_at: DateTime<Utc>,
}

/// Scoreboard entry, as served by `GET /api/scoreboard`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub crew_id: String,
    pub name: String,
    pub completed_jobs: i64,
    pub failed_jobs: i64,
}

/// Crew registration, used by the `crew add` command
#[derive(Debug, Clone, Validate)]
pub struct NewCrew {
    #[validate(length(min = 1, max = 128, message = "crew id must be between 1 and 128 characters"))]
    pub crew_id: String,
    #[validate(length(min = 1, max = 256, message = "name must be between 1 and 256 characters"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_start_reads_camel_case_body() {
        let body = json!({"jobId": "J1", "crewId": "C1", "location": {"lat": 1.0, "lng": 2.0}});
        let start: JobStart = serde_json::from_value(body).unwrap();
        assert_eq!(start.job_id, "J1");
        assert_eq!(start.crew_id, "C1");
        assert_eq!(start.location, Location { lat: 1.0, lng: 2.0 });
        assert!(start.validate().is_ok());
    }

    #[test]
    fn out_of_range_location_fails_validation() {
        let start = JobStart {
            job_id: "J1".into(),
            crew_id: "C1".into(),
            location: Location { lat: 91.0, lng: 0.0 },
        };
        assert!(start.validate().is_err());
    }

    #[test]
    fn unknown_completion_status_is_rejected() {
        let body = json!({"jobId": "J1", "status": "complete"});
        let err = serde_json::from_value::<JobComplete>(body).unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn completion_status_maps_to_one_counter() {
        assert_eq!(CompletionStatus::Completed.counter_increments(), (1, 0));
        assert_eq!(CompletionStatus::Failed.counter_increments(), (0, 1));
    }

    #[test]
    fn crew_serializes_with_scoreboard_field_names() {
        let crew = Crew {
            crew_id: "C1".into(),
            name: "North".into(),
            completed_jobs: 3,
            failed_jobs: 1,
        };
        assert_eq!(
            serde_json::to_value(&crew).unwrap(),
            json!({"crewId": "C1", "name": "North", "completedJobs": 3, "failedJobs": 1})
        );
    }
}
