//! Terminal dashboard: polls the query endpoints and renders active jobs and the scoreboard.

pub mod client;
pub mod poller;
pub mod view;

pub use client::TrackerClient;
pub use poller::Poller;
