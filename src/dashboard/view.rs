use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::api::job::models::{ActiveJob, Crew};

/// Latest data for one dashboard panel, stamped with the refresh that produced it
#[derive(Debug)]
struct Panel<T> {
    items: Vec<T>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
            refreshed_at: None,
        }
    }
}

impl<T> Panel<T> {
    /// Replace the panel wholesale unless a newer refresh already landed
    fn apply(&mut self, generation: u64, items: Vec<T>) -> bool {
        if generation <= self.generation {
            return false;
        }
        self.items = items;
        self.generation = generation;
        self.refreshed_at = Some(Utc::now());
        true
    }
}

/// Render state of the dashboard
#[derive(Debug, Default)]
pub struct DashboardView {
    jobs: Panel<ActiveJob>,
    crews: Panel<Crew>,
}

impl DashboardView {
    pub fn apply_jobs(&mut self, generation: u64, jobs: Vec<ActiveJob>) -> bool {
        self.jobs.apply(generation, jobs)
    }

    pub fn apply_scoreboard(&mut self, generation: u64, crews: Vec<Crew>) -> bool {
        self.crews.apply(generation, crews)
    }

    pub fn jobs(&self) -> &[ActiveJob] {
        &self.jobs.items
    }

    pub fn crews(&self) -> &[Crew] {
        &self.crews.items
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Active jobs ({}){}",
            self.jobs().len(),
            refreshed_suffix(self.jobs.refreshed_at)
        );
        if self.jobs().is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for job in self.jobs() {
            let _ = writeln!(
                out,
                "  * ({:>10.5}, {:>11.5})  Job ID: {}  Crew ID: {}",
                job.location.lat, job.location.lng, job.job_id, job.crew_id
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Scoreboard{}", refreshed_suffix(self.crews.refreshed_at));

        let name_width = self
            .crews()
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Crew Name".len());
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>14}  {:>11}",
            "Crew Name", "Completed Jobs", "Failed Jobs"
        );
        for crew in self.crews() {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:>14}  {:>11}",
                crew.name, crew.completed_jobs, crew.failed_jobs
            );
        }

        out
    }
}

fn refreshed_suffix(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!("  [updated {}]", at.format("%H:%M:%S UTC")),
        None => "  [waiting for data]".to_string(),
    }
}
