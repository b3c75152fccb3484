pub mod errors;
pub mod id;
pub mod wire;

pub use errors::{ConfigError, MarqueeError, ReporterError, StoreError};
pub use id::{new_correlation_id, ParseVisitorIdError, VisitorId};
pub use wire::{ErrorBody, PingResponse, PING_PATH};

pub type Result<T> = std::result::Result<T, MarqueeError>;
