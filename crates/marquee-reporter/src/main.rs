use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use marquee_config::logging::init_logging;
use marquee_config::{load_config, toml_loader::default_cookie_jar_path, MarqueeConfig};
use marquee_reporter::{CookieJar, PingClient, PresenceReporter, VisitorIdentity};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "marquee-reporter",
    version,
    about = "Report this visitor's presence to a Marquee registry"
)]
struct Args {
    /// Config file path override.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registry base URL.
    #[arg(long)]
    url: Option<String>,

    /// Seconds between reports.
    #[arg(long)]
    interval: Option<u64>,

    /// Cookie jar file.
    #[arg(long)]
    cookie_jar: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Send a single report, print the count and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_filter = init_logging("marquee_reporter", args.log_level.as_deref());

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Config load failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    log_filter.apply_config(&config.logging);

    if let Some(url) = args.url {
        config.reporter.server_url = url;
    }
    if let Some(interval) = args.interval {
        config.reporter.interval_secs = interval;
    }
    if let Some(path) = args.cookie_jar {
        config.reporter.cookie_jar = Some(path);
    }
    if let Err(e) = marquee_config::validation::validate(&config) {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    match run(config, args.once).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Reporter failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: MarqueeConfig, once: bool) -> marquee_common::Result<()> {
    let settings = config.reporter;

    let jar_path = match settings.cookie_jar {
        Some(path) => path,
        None => default_cookie_jar_path()?,
    };
    let mut jar = CookieJar::open(jar_path)?;
    let identity = VisitorIdentity::load_or_create(
        &mut jar,
        &settings.cookie_name,
        chrono::Duration::hours(settings.cookie_ttl_hours as i64),
        Utc::now(),
    )?;

    let timeout = (settings.request_timeout_secs > 0)
        .then(|| Duration::from_secs(settings.request_timeout_secs));
    let client = PingClient::new(&settings.server_url, timeout)?;

    if once {
        let count = client.ping(&identity).await?;
        println!("{count}");
        return Ok(());
    }

    let mut handle = PresenceReporter::start(
        client,
        identity,
        Duration::from_secs(settings.interval_secs),
    );
    let mut counts = handle.subscribe();

    loop {
        tokio::select! {
            changed = counts.changed() => {
                if changed.is_err() {
                    warn!("Presence reporter exited unexpectedly");
                    break;
                }
                if let Some(count) = *counts.borrow_and_update() {
                    info!(count, "Active visitors");
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                }
                info!("Shutting down reporter");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}
