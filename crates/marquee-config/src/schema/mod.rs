//! Configuration schema types for Marquee.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod registry;
mod reporter;
mod server;
mod store;

pub use logging::*;
pub use registry::*;
pub use reporter::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration shared by the registry server and the reporter.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub registry: RegistryConfig,
    pub reporter: ReporterConfig,
    pub logging: LoggingConfig,
}
