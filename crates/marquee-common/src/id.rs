use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short hex id attached to log spans so one request can be followed
/// through the registry's logs.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Client-assigned visitor identifier.
///
/// Reporters generate non-negative 31-bit values, but the registry accepts
/// any value that fits the storage column. The id is advisory analytics
/// data: it is replayable and must never be used for access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(i32);

impl VisitorId {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseVisitorIdError {
    #[error("visitor id is empty")]
    Empty,

    #[error("visitor id is not an integer: {0}")]
    Invalid(String),
}

impl FromStr for VisitorId {
    type Err = ParseVisitorIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseVisitorIdError::Empty);
        }
        trimmed
            .parse::<i32>()
            .map(Self)
            .map_err(|_| ParseVisitorIdError::Invalid(trimmed.to_string()))
    }
}

impl From<i32> for VisitorId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
