use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use marquee_config::logging::init_logging;
use marquee_config::{config_to_json, load_config, StoreBackend};

#[derive(Parser)]
#[command(
    name = "marquee-registry",
    version,
    about = "Visitor presence registry for the Marquee site"
)]
struct Args {
    /// Config file path override.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database URL. Selects the sqlite backend.
    #[arg(long)]
    database_url: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_filter = init_logging("marquee_registry", args.log_level.as_deref());

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    log_filter.apply_config(&config.logging);

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.store.backend = StoreBackend::Sqlite;
        config.store.database_url = url;
    }
    if let Err(e) = marquee_config::validation::validate(&config) {
        tracing::error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    if args.print_config {
        println!("{}", config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    tracing::info!("marquee-registry v{} starting...", env!("CARGO_PKG_VERSION"));

    match marquee_registry::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Registry failed: {e}");
            ExitCode::FAILURE
        }
    }
}
