//! File-backed cookie jar holding the visitor cookie between runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use marquee_common::ReporterError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl VisitorCookie {
    /// Site-wide cookie (`path=/`) that expires `ttl` after `now`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `name=value`, as sent in a `Cookie` request header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Cookies keyed by name, persisted as a JSON object.
#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    cookies: HashMap<String, VisitorCookie>,
}

impl CookieJar {
    /// Open the jar at `path`. A missing file is an empty jar; an unreadable
    /// or corrupt file is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReporterError> {
        let path = path.into();
        let cookies = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(cookies) => cookies,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding corrupt cookie jar");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(ReporterError::Cookie(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), cookies = cookies.len(), "Cookie jar opened");
        Ok(Self { path, cookies })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a cookie by name. Expired cookies are treated as absent.
    pub fn get(&self, name: &str, now: DateTime<Utc>) -> Option<&VisitorCookie> {
        self.cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired(now))
    }

    /// Store `cookie`, dropping any expired ones, and write the jar to disk.
    pub fn set(&mut self, cookie: VisitorCookie, now: DateTime<Utc>) -> Result<(), ReporterError> {
        self.cookies.retain(|_, existing| !existing.is_expired(now));
        self.cookies.insert(cookie.name.clone(), cookie);
        self.save()
    }

    fn save(&self) -> Result<(), ReporterError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReporterError::Cookie(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.cookies)
            .map_err(|e| ReporterError::Cookie(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| {
            ReporterError::Cookie(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}
