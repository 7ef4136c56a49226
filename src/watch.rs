use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppError, DashboardApp};
use crate::dashboard::{Dashboard, ViewStateController};
use crate::web::config::Config;

const HELP: &str =
    "Commands: c = auto-center, s = tile source, r = refresh, m = center on tracker, q = quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchCommand {
    ToggleAutoCenter,
    ToggleTileSource,
    Refresh,
    CenterOnTracker,
    Quit,
}

impl WatchCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "c" => Some(WatchCommand::ToggleAutoCenter),
            "s" => Some(WatchCommand::ToggleTileSource),
            "r" => Some(WatchCommand::Refresh),
            "m" => Some(WatchCommand::CenterOnTracker),
            "q" | "quit" | "exit" => Some(WatchCommand::Quit),
            _ => None,
        }
    }
}

/// Runs the dashboard against a remote tracker and prints it to the terminal.
pub async fn run_watch(config: Config) -> Result<(), AppError> {
    let mut app = DashboardApp::from_config(&config)?;
    app.start().await?;
    println!("{}", HELP);

    let mut ticker = tokio::time::interval(config.dashboard.poll_interval);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let dashboard = app.dashboard.lock().await;
                println!("{}", summary(&dashboard));
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match WatchCommand::parse(&line) {
                    Some(WatchCommand::Quit) => break,
                    Some(command) => apply(&app.controller, command).await,
                    None => println!("{}", HELP),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    log::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    app.stop().await;
    Ok(())
}

async fn apply(controller: &ViewStateController, command: WatchCommand) {
    match command {
        WatchCommand::ToggleAutoCenter => {
            let enabled = controller.toggle_auto_center().await;
            println!("auto-center {}", if enabled { "on" } else { "off" });
        }
        WatchCommand::ToggleTileSource => {
            let source = controller.toggle_tile_source().await;
            println!("tiles: {:?}", source);
        }
        WatchCommand::Refresh => {
            let control = controller.request_manual_refresh().await;
            println!("{}", control.label);
        }
        WatchCommand::CenterOnTracker => match controller.center_on_tracker().await {
            Some(c) => println!("centered on {:.6}, {:.6}", c.latitude, c.longitude),
            None => println!("no tracker position yet"),
        },
        WatchCommand::Quit => {}
    }
}

fn summary(dashboard: &Dashboard) -> String {
    let panel = dashboard.panel();
    let status = match &panel.status {
        Some(s) => format!(
            "{} | battery {} ({:?}) | signal {} | updated {}",
            s.badge_label,
            s.battery_text,
            s.battery_tier,
            s.signal_text,
            s.last_update
        ),
        None => "status unknown".to_string(),
    };
    format!(
        "{}, {} | {} km/h | {} m | {} | {} | trail {} pts, {} km, max {} km/h, {}",
        panel.current_lat,
        panel.current_lon,
        panel.current_speed,
        panel.current_altitude,
        panel.current_location,
        status,
        panel.stats.points,
        panel.stats.distance,
        panel.stats.max_speed,
        panel.stats.duration,
    )
}
