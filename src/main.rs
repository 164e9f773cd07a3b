use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod dashboard;
mod db;
mod logging;
mod shutdown;

use crate::api::{
    health::health_config,
    job::{
        JobService,
        handlers::{query_config, webhook_config},
        models::NewCrew,
    },
    validation,
};
use crate::cli::{Cli, Command, CrewCommand, DashboardArgs};
use crate::db::pg_store::PgTrackerStore;
use crate::shutdown::ShutdownCoordinator;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Dashboard(args) => run_dashboard(args).await,
        command => run_with_database(command).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("crew-tracker: {}", e);
        std::process::exit(1);
    }
}

async fn run_with_database(command: Command) -> Result<(), BoxError> {
    // Load configuration from environment
    let config = config::Config::from_env()?;

    logging::init_server(&config.log_dir)?;

    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections).await?;
    info!("Database connection pool established");

    db::migrations::run_migrations(&pool).await?;

    let service = JobService::new(Arc::new(PgTrackerStore::new(pool)));

    match command {
        Command::Migrate => {
            service.close().await;
            Ok(())
        }
        Command::Crew(CrewCommand::Add { crew_id, name }) => {
            let result = service.register_crew(&NewCrew { crew_id, name }).await;
            service.close().await;
            let crew = result?;
            println!(
                "{}\t{}\tcompleted={}\tfailed={}",
                crew.crew_id, crew.name, crew.completed_jobs, crew.failed_jobs
            );
            Ok(())
        }
        _ => serve(config, service).await,
    }
}

async fn serve(config: config::Config, service: JobService) -> Result<(), BoxError> {
    info!("Starting crew-tracker server");
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);

    let max_payload_size = config.max_payload_size;
    let server_service = service.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_service.clone()))
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .configure(health_config)
            .configure(webhook_config)
            .configure(query_config)
    });

    info!("Server running on http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))?
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, service)
        .wait_for_shutdown()
        .await?;
    Ok(())
}

async fn run_dashboard(args: DashboardArgs) -> Result<(), BoxError> {
    logging::init_dashboard();

    let client = dashboard::TrackerClient::new(&args.server, Duration::from_secs(args.timeout))?;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let poller = tokio::spawn(dashboard::Poller::new(client).run(shutdown_rx, std::io::stdout()));

    shutdown::wait_for_signal().await;
    // The poller may already be gone; nothing to signal then
    let _ = shutdown_tx.send(true);
    poller.await?;
    Ok(())
}
