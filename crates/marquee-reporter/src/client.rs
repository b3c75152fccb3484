//! One presence report over HTTP.

use std::time::Duration;

use marquee_common::{PingResponse, ReporterError, PING_PATH};
use reqwest::header::COOKIE;

use crate::identity::VisitorIdentity;

#[derive(Debug, Clone)]
pub struct PingClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PingClient {
    /// Client for the registry at `server_url`. `timeout` bounds each
    /// request; `None` keeps the transport defaults.
    pub fn new(server_url: &str, timeout: Option<Duration>) -> Result<Self, ReporterError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ReporterError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), PING_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Report `identity` as present and return the registry's active count.
    pub async fn ping(&self, identity: &VisitorIdentity) -> Result<u64, ReporterError> {
        let url = format!("{}?id={}", self.endpoint, identity.id);
        let response = self
            .http
            .get(&url)
            .header(COOKIE, identity.cookie.header_value())
            .send()
            .await
            .map_err(|e| ReporterError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReporterError::Status(status.as_u16()));
        }

        let body: PingResponse = response
            .json()
            .await
            .map_err(|e| ReporterError::Parse(e.to_string()))?;
        if body.status != "ok" {
            return Err(ReporterError::Parse(format!(
                "unexpected status field {:?}",
                body.status
            )));
        }

        Ok(body.count)
    }
}
