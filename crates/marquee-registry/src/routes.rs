use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName},
    Json,
};
use marquee_common::{new_correlation_id, PingResponse};
use tracing::Instrument;

use crate::error::RegistryError;
use crate::server::AppState;
use crate::service::parse_visitor_id;

/// Address recorded when the proxy header is absent or unreadable.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// `GET /api/ping?id=<visitor>`
pub async fn ping_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<PingResponse>, RegistryError> {
    let id = parse_visitor_id(params.get("id").map(String::as_str)).inspect_err(|e| {
        tracing::debug!(error = %e, "Rejected ping");
    })?;
    let ip = client_address(&headers, &state.client_ip_header);

    let span = tracing::info_span!("ping", request = %new_correlation_id(), visitor = %id);
    let count = state.service.report(id, &ip).instrument(span).await?;

    Ok(Json(PingResponse::ok(count)))
}

/// Read the client address from the trusted proxy header.
///
/// Forwarded-for style lists keep only the first (originating) hop.
pub fn client_address(headers: &HeaderMap, header: &HeaderName) -> String {
    headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_ADDRESS)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn real_ip() -> HeaderName {
        HeaderName::from_static("x-real-ip")
    }

    #[test]
    fn address_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_address(&headers, &real_ip()), "198.51.100.4");
    }

    #[test]
    fn missing_header_is_unknown() {
        assert_eq!(client_address(&HeaderMap::new(), &real_ip()), "unknown");
    }

    #[test]
    fn blank_header_is_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("   "));
        assert_eq!(client_address(&headers, &real_ip()), "unknown");
    }

    #[test]
    fn forwarded_list_keeps_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let header = HeaderName::from_static("x-forwarded-for");
        assert_eq!(client_address(&headers, &header), "203.0.113.9");
    }

    #[test]
    fn other_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        assert_eq!(client_address(&headers, &real_ip()), "unknown");
    }
}
