use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_common::{ErrorBody, StoreError};
use thiserror::Error;

pub const MISSING_ID: &str = "Missing 'id' in query parameters";
pub const INVALID_ID: &str = "Invalid 'id' in query parameters";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum RegistryError {
    /// Rejected before the store is touched.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("store failure: {0}")]
    Internal(#[from] StoreError),
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        match self {
            RegistryError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
            }
            RegistryError::Internal(e) => {
                // The cause stays in the server log.
                tracing::error!(error = %e, "Error processing ping");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(INTERNAL_ERROR)),
                )
                    .into_response()
            }
        }
    }
}
