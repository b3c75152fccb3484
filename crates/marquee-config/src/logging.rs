//! Subscriber start-up shared by the Marquee binaries.
//!
//! Logging starts before the config file is read so the loader's own
//! messages are kept. The file's `[logging] level` is applied afterwards,
//! unless `RUST_LOG` or a `--log-level` flag already chose a filter.

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use crate::schema::LoggingConfig;

/// Handle on the installed filter.
pub struct LogFilter {
    target: &'static str,
    /// `None` when the filter is pinned by the environment or the CLI.
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogFilter {
    /// Swap in the config file's level. Returns whether the filter changed.
    pub fn apply_config(&self, logging: &LoggingConfig) -> bool {
        let Some(handle) = &self.handle else {
            return false;
        };
        match handle.reload(target_filter(self.target, logging.level.as_str())) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to apply configured log level: {e}");
                false
            }
        }
    }
}

fn target_filter(target: &str, level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{target}={level}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("{target}=info")))
}

/// Build the reloadable filter layer for `target` (e.g. `marquee_registry`).
fn build(
    target: &'static str,
    env: Option<EnvFilter>,
    flag: Option<&str>,
) -> (reload::Layer<EnvFilter, Registry>, LogFilter) {
    let pinned = env.is_some() || flag.is_some();
    let filter = env.unwrap_or_else(|| target_filter(target, flag.unwrap_or("info")));
    let (layer, handle) = reload::Layer::new(filter);
    let log_filter = LogFilter {
        target,
        handle: (!pinned).then_some(handle),
    };
    (layer, log_filter)
}

/// Install the global subscriber. Filter precedence: `RUST_LOG`, then
/// `flag`, then `info` until [`LogFilter::apply_config`] runs.
pub fn init_logging(target: &'static str, flag: Option<&str>) -> LogFilter {
    let (layer, log_filter) = build(target, EnvFilter::try_from_default_env().ok(), flag);
    tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer())
        .init();
    log_filter
}
