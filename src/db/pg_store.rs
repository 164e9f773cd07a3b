use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::job::models::{ActiveJob, CompletionStatus, Crew, JobStart, JobStatus, NewCrew};
use crate::db::models::{CrewRow, JobRow};
use crate::db::store::{CompletionOutcome, StoreError, TrackerStore};

/// PostgreSQL-backed store
pub struct PgTrackerStore {
    pool: Pool<Postgres>,
}

impl PgTrackerStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackerStore for PgTrackerStore {
    async fn insert_job(&self, job: &JobStart) -> Result<ActiveJob, StoreError> {
        debug!("Inserting job: job_id={}, crew_id={}", job.job_id, job.crew_id);

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (job_id, crew_id, status, lat, lng)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, job_id, crew_id, lat, lng, started_at
            "#,
        )
        .bind(&job.job_id)
        .bind(&job.crew_id)
        .bind(JobStatus::Active.as_str())
        .bind(job.location.lat)
        .bind(job.location.lng)
        .fetch_one(&self.pool)
        .await?;

        debug!("Job inserted with row id={}", row.id);
        Ok(row.into())
    }

    async fn complete_job(
        &self,
        job_id: &str,
        status: CompletionStatus,
    ) -> Result<CompletionOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, job_id, crew_id, lat, lng, started_at
            FROM jobs
            WHERE job_id = $1 AND status = $2
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(job_id)
        .bind(JobStatus::Active.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            tx.rollback().await?;
            debug!("No active job found for job_id={}", job_id);
            return Ok(CompletionOutcome::JobMissing);
        };

        let (completed, failed) = status.counter_increments();
        let crews_updated = sqlx::query(
            r#"
            UPDATE crews
            SET completed_jobs = completed_jobs + $2,
                failed_jobs = failed_jobs + $3,
                updated_at = NOW()
            WHERE crew_id = $1
            "#,
        )
        .bind(&job.crew_id)
        .bind(completed)
        .bind(failed)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Job row id={} deleted, crews updated={}", job.id, crews_updated);

        if crews_updated == 0 {
            Ok(CompletionOutcome::CrewMissing {
                crew_id: job.crew_id,
            })
        } else {
            Ok(CompletionOutcome::Recorded {
                crew_id: job.crew_id,
                status,
            })
        }
    }

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, job_id, crew_id, lat, lng, started_at
            FROM jobs
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(JobStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ActiveJob::from).collect())
    }

    async fn crews(&self) -> Result<Vec<Crew>, StoreError> {
        let rows = sqlx::query_as::<_, CrewRow>(
            r#"
            SELECT crew_id, name, completed_jobs, failed_jobs
            FROM crews
            ORDER BY crew_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Crew::from).collect())
    }

    async fn upsert_crew(&self, crew: &NewCrew) -> Result<Crew, StoreError> {
        let row = sqlx::query_as::<_, CrewRow>(
            r#"
            INSERT INTO crews (crew_id, name)
            VALUES ($1, $2)
            ON CONFLICT (crew_id) DO UPDATE
            SET name = EXCLUDED.name, updated_at = NOW()
            RETURNING crew_id, name, completed_jobs, failed_jobs
            "#,
        )
        .bind(&crew.crew_id)
        .bind(&crew.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
