use std::path::PathBuf;

use crate::id::VisitorId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures raised by a presence store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    /// An entry with this id already exists. Raised by `insert` when two
    /// first-time reports for the same visitor race each other.
    #[error("duplicate presence entry for visitor {0}")]
    Duplicate(VisitorId),

    #[error("store is closed")]
    Closed,
}

/// Failures of a single presence report, as seen by the reporter.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("cookie jar error: {0}")]
    Cookie(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reporter(#[from] ReporterError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.port = 0".into());
        assert_eq!(err.to_string(), "config validation error: server.port = 0");
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Duplicate(VisitorId::new(5));
        assert_eq!(err.to_string(), "duplicate presence entry for visitor 5");

        let err = StoreError::Database("disk I/O error".into());
        assert_eq!(err.to_string(), "database error: disk I/O error");

        assert_eq!(StoreError::Closed.to_string(), "store is closed");
    }

    #[test]
    fn reporter_error_display() {
        assert_eq!(ReporterError::Status(503).to_string(), "unexpected status: 503");
        assert_eq!(
            ReporterError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
    }

    #[test]
    fn marquee_error_from_store() {
        let err: MarqueeError = StoreError::Closed.into();
        assert!(matches!(err, MarqueeError::Store(_)));
        assert_eq!(err.to_string(), "store is closed");
    }

    #[test]
    fn marquee_error_from_config() {
        let err: MarqueeError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, MarqueeError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn marquee_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: MarqueeError = io_err.into();
        assert!(matches!(err, MarqueeError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
