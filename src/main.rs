mod app;
mod dashboard;
mod device;
mod telemetry;
mod watch;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

use crate::web::config::{Config, ConfigError};

#[derive(Parser)]
#[command(name = "geotrack")]
#[command(about = "GPS tracker dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tracker API and the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Follow a tracker from the terminal
    Watch {
        #[arg(short, long)]
        config: Option<String>,
        /// Telemetry base URL, overrides the config file
        #[arg(long)]
        url: Option<String>,
        /// Poll interval such as "5s", overrides the config file
        #[arg(long, value_parser = humantime::parse_duration)]
        interval: Option<Duration>,
    },
    /// Validate a configuration file
    Validate { config: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Watch {
            config,
            url,
            interval,
        } => watch(config.as_deref(), url, interval).await,
        Commands::Validate { config } => validate(&config),
    }
}

fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

async fn serve(path: Option<&str>) -> ExitCode {
    let config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn watch(path: Option<&str>, url: Option<String>, interval: Option<Duration>) -> ExitCode {
    let mut config = match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = url {
        config.dashboard.source_url = url;
    }
    if let Some(interval) = interval {
        if interval.is_zero() {
            eprintln!("Poll interval must be greater than zero");
            return ExitCode::FAILURE;
        }
        config.dashboard.poll_interval = interval;
    }

    match watch::run_watch(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Config is valid");
    println!(
        "  device: {} ({}) starting at {}",
        config.device.name, config.device.id, config.device.coordinates
    );
    println!("  web: {}", config.web.bind);
    println!(
        "  dashboard: polling {} every {} (timeout {}), trail of {} points",
        config.dashboard.source_url,
        humantime::format_duration(config.dashboard.poll_interval),
        humantime::format_duration(config.dashboard.fetch_timeout),
        config.dashboard.trail_capacity
    );
    ExitCode::SUCCESS
}
