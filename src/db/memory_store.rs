use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::api::job::models::{ActiveJob, CompletionStatus, Crew, JobStart, JobStatus, NewCrew};
use crate::db::store::{CompletionOutcome, StoreError, TrackerStore};

#[derive(Default)]
struct State {
    jobs: Vec<ActiveJob>,
    crews: Vec<Crew>,
    unavailable: bool,
}

/// In-process store with the same semantics as the PostgreSQL one.
/// The whole state sits behind one lock, so every operation is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, simulating a lost database
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }
}

impl State {
    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn insert_job(&self, job: &JobStart) -> Result<ActiveJob, StoreError> {
        let mut state = self.state.lock().await;
        state.check()?;
        let active = ActiveJob {
            job_id: job.job_id.clone(),
            crew_id: job.crew_id.clone(),
            status: JobStatus::Active,
            location: job.location,
            started_at: Utc::now(),
        };
        state.jobs.push(active.clone());
        Ok(active)
    }

    async fn complete_job(
        &self,
        job_id: &str,
        status: CompletionStatus,
    ) -> Result<CompletionOutcome, StoreError> {
        let mut state = self.state.lock().await;
        state.check()?;

        let Some(index) = state.jobs.iter().position(|j| j.job_id == job_id) else {
            return Ok(CompletionOutcome::JobMissing);
        };
        let job = state.jobs.remove(index);

        let (completed, failed) = status.counter_increments();
        match state.crews.iter_mut().find(|c| c.crew_id == job.crew_id) {
            Some(crew) => {
                crew.completed_jobs += completed;
                crew.failed_jobs += failed;
                Ok(CompletionOutcome::Recorded {
                    crew_id: job.crew_id,
                    status,
                })
            }
            None => Ok(CompletionOutcome::CrewMissing {
                crew_id: job.crew_id,
            }),
        }
    }

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, StoreError> {
        let state = self.state.lock().await;
        state.check()?;
        Ok(state.jobs.clone())
    }

    async fn crews(&self) -> Result<Vec<Crew>, StoreError> {
        let state = self.state.lock().await;
        state.check()?;
        let mut crews = state.crews.clone();
        crews.sort_by(|a, b| a.crew_id.cmp(&b.crew_id));
        Ok(crews)
    }

    async fn upsert_crew(&self, crew: &NewCrew) -> Result<Crew, StoreError> {
        let mut state = self.state.lock().await;
        state.check()?;
        if let Some(existing) = state.crews.iter_mut().find(|c| c.crew_id == crew.crew_id) {
            existing.name = crew.name.clone();
            return Ok(existing.clone());
        }
        let created = Crew {
            crew_id: crew.crew_id.clone(),
            name: crew.name.clone(),
            completed_jobs: 0,
            failed_jobs: 0,
        };
        state.crews.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.state.lock().await.check()
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::Location;

    fn start(job_id: &str, crew_id: &str) -> JobStart {
        JobStart {
            job_id: job_id.into(),
            crew_id: crew_id.into(),
            location: Location { lat: 0.0, lng: 0.0 },
        }
    }

    #[tokio::test]
    async fn duplicate_job_ids_complete_oldest_first() {
        let store = MemoryStore::new();
        store.insert_job(&start("J1", "A")).await.unwrap();
        store.insert_job(&start("J1", "B")).await.unwrap();

        let outcome = store
            .complete_job("J1", CompletionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(outcome, CompletionOutcome::CrewMissing { crew_id: "A".into() });

        let remaining = store.active_jobs().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].crew_id, "B");
    }

    #[tokio::test]
    async fn rename_keeps_counters() {
        let store = MemoryStore::new();
        let crew = NewCrew {
            crew_id: "C1".into(),
            name: "Old".into(),
        };
        store.upsert_crew(&crew).await.unwrap();
        store.insert_job(&start("J1", "C1")).await.unwrap();
        store
            .complete_job("J1", CompletionStatus::Failed)
            .await
            .unwrap();

        let renamed = store
            .upsert_crew(&NewCrew {
                name: "New".into(),
                ..crew
            })
            .await
            .unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.failed_jobs, 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;
        assert!(store.ping().await.is_err());
        assert!(store.active_jobs().await.is_err());
        assert!(store.insert_job(&start("J1", "C1")).await.is_err());
    }
}
