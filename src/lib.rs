pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;

use chrono::Local;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;
use db::Store;
use services::Scheduler;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => run_daemon(config).await,

        "sweep" => run_single_sweep(config).await,

        "desks" | "ls" => cmd_list_desks(&config).await,

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Deskarr - Desk Booking Engine");
    println!("Conflict detection, check-in, and no-show enforcement for shared desks");
    println!();
    println!("USAGE:");
    println!("  deskarr <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("  daemon            Run the API server with the no-show scheduler");
    println!("  sweep             Run a single no-show sweep and exit");
    println!("  desks, ls         List desks in the fleet");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the database, server, and grace period.");
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Deskarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let api_state = api::create_app_state(config.clone()).await?;

    let scheduler = Scheduler::new(api_state.sweeper.clone(), config.scheduler.clone());

    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {}", e);
        }
    });

    let server_handle: Option<tokio::task::JoinHandle<()>> = if config.server.enabled {
        let port = config.server.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api_state).await;
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("🌐 Web Server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    scheduler_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}

async fn run_single_sweep(config: Config) -> anyhow::Result<()> {
    info!("Running single no-show sweep...");

    let api_state = api::create_app_state(config).await?;
    let transitioned = api_state.sweeper.sweep(Local::now().naive_local()).await?;

    println!("Sweep complete. {} booking(s) marked as no-show.", transitioned);
    Ok(())
}

async fn cmd_list_desks(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let desks = store.list_all_desks().await?;

    if desks.is_empty() {
        println!("No desks configured.");
        return Ok(());
    }

    println!("Desks ({} total)", desks.len());
    println!("{:-<60}", "");

    for desk in desks {
        let status = if desk.is_active { "✓" } else { "⏸" };
        let admin = if desk.admin_only { " [ADMIN ONLY]" } else { "" };
        let location = desk.location.as_deref().unwrap_or("-");

        println!("{} {} @ {}{}", status, desk.name, location, admin);
        println!("  ID: {}", desk.id);
    }

    println!();
    println!("Legend: ✓ Active | ⏸ Retired");

    Ok(())
}
