use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::client::TrackerClient;
use super::view::DashboardView;

/// Fixed refresh period of the dashboard
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically refreshes a [`DashboardView`] from a tracker server
///
/// # Concurrency Model
/// - One loop owns the view and awaits each refresh before taking the next tick,
///   so refreshes never overlap
/// - Ticks missed while a refresh runs are skipped, not queued
/// - Every refresh gets a new generation; the view ignores older generations
/// - The shutdown channel cancels both the wait and an in-flight refresh
pub struct Poller {
    client: TrackerClient,
    view: DashboardView,
    generation: u64,
}

impl Poller {
    pub fn new(client: TrackerClient) -> Self {
        Self {
            client,
            view: DashboardView::default(),
            generation: 0,
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Fetch active jobs, then the scoreboard.
    /// A failed fetch keeps that panel's previous contents.
    pub async fn refresh(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        match self.client.active_jobs().await {
            Ok(jobs) => {
                debug!("Refresh {}: {} active jobs", generation, jobs.len());
                self.view.apply_jobs(generation, jobs);
            }
            Err(e) => warn!("Refresh {}: active jobs unavailable: {}", generation, e),
        }

        match self.client.scoreboard().await {
            Ok(crews) => {
                debug!("Refresh {}: {} crews", generation, crews.len());
                self.view.apply_scoreboard(generation, crews);
            }
            Err(e) => warn!("Refresh {}: scoreboard unavailable: {}", generation, e),
        }

        generation
    }

    /// Refresh immediately, then every [`POLL_INTERVAL`], writing each render to `out`
    /// until `shutdown` flips to true or its sender is dropped.
    pub async fn run<W: Write>(mut self, mut shutdown: watch::Receiver<bool>, mut out: W) {
        info!("Dashboard polling every {}s", POLL_INTERVAL.as_secs());

        let mut ticker = time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = self.refresh() => {}
                _ = shutdown.changed() => break,
            }

            // Clear screen and home the cursor before each frame
            if let Err(e) = write!(out, "\x1b[2J\x1b[H{}", self.view().render()).and_then(|_| out.flush()) {
                warn!("Failed to draw dashboard: {}", e);
            }
        }

        info!("Dashboard stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scoreboard_body() -> String {
        json!([{"crewId": "C1", "name": "North", "completedJobs": 1, "failedJobs": 0}]).to_string()
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_panel() {
        let mut server = mockito::Server::new_async().await;
        let jobs_ok = server
            .mock("GET", "/api/active-jobs")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let board_ok = server
            .mock("GET", "/api/scoreboard")
            .with_status(200)
            .with_body(scoreboard_body())
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let mut poller = Poller::new(client);
        assert_eq!(poller.refresh().await, 1);
        assert_eq!(poller.view().crews().len(), 1);

        jobs_ok.remove_async().await;
        board_ok.remove_async().await;
        server
            .mock("GET", "/api/active-jobs")
            .with_status(200)
            .with_body(
                json!([{
                    "jobId": "J7",
                    "crewId": "C1",
                    "status": "active",
                    "location": {"lat": 0.0, "lng": 0.0},
                    "startedAt": "2024-05-01T10:00:00Z"
                }])
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/scoreboard")
            .with_status(503)
            .create_async()
            .await;

        assert_eq!(poller.refresh().await, 2);
        assert_eq!(poller.view().jobs()[0].job_id, "J7");
        assert_eq!(poller.view().crews()[0].name, "North");
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let mut server = mockito::Server::new_async().await;
        let jobs = server
            .mock("GET", "/api/active-jobs")
            .with_status(200)
            .with_body("[]")
            .expect_at_least(1)
            .create_async()
            .await;
        server
            .mock("GET", "/api/scoreboard")
            .with_status(200)
            .with_body(scoreboard_body())
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(Poller::new(client).run(rx, std::io::sink()));

        // First refresh happens right away
        for _ in 0..100 {
            if jobs.matched_async().await {
                break;
            }
            time::sleep(Duration::from_millis(20)).await;
        }
        jobs.assert_async().await;

        tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
