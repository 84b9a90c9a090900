// File: manager/src/main.rs
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use power_manager::app::{App, RunMode};
use power_manager::config::ConfigManager;

/// Starts the office server on working days and stops it after hours
#[derive(Parser, Debug)]
#[command(name = "power-manager", version, about)]
struct Args {
    /// Run the morning start check and exit
    #[arg(long, conflicts_with = "check_stop")]
    check_start: bool,

    /// Run the evening stop check and exit
    #[arg(long)]
    check_stop: bool,

    /// Directory holding main.toml and secrets.toml
    #[arg(long, default_value = "config")]
    config: String,
}

impl Args {
    fn mode(&self) -> RunMode {
        if self.check_start {
            RunMode::CheckStart
        } else if self.check_stop {
            RunMode::CheckStop
        } else {
            RunMode::Listener
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("power_manager=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let mode = args.mode();
    info!("Starting power manager ({:?})", mode);

    let config_manager = ConfigManager::new(args.config.clone()).await?;
    let config = config_manager.get_current_config();

    let app = App::build(config, &args.config, mode).await?;
    app.run(mode).await
}
