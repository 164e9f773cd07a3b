use clap::{Args, Parser, Subcommand};

/// Crew job tracker: webhook server, crew admin and polling dashboard
#[derive(Debug, Parser)]
#[command(name = "crew-tracker", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Manage crews
    #[command(subcommand)]
    Crew(CrewCommand),

    /// Poll a running server and render active jobs and the scoreboard
    Dashboard(DashboardArgs),
}

#[derive(Debug, Subcommand)]
pub enum CrewCommand {
    /// Register a crew, or rename an existing one (counters are kept)
    Add {
        #[arg(long)]
        crew_id: String,

        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Base URL of the tracker server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}
