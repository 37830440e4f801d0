//! Response shaping for callers.
//!
//! # Responsibilities
//! - Turn a relayed upstream answer into an HTTP response
//! - Map relay errors to status codes with a JSON `detail` body
//!
//! # Design Decisions
//! - Only the exposed upstream headers are set; hop-by-hop never leak back
//! - Upstream timeouts result in 504, other transport failures in 502

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::relay::{RelayError, RelayResponse};

/// Error body returned for failures raised by the proxy itself.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status: StatusCode = self.status();
        let body = ErrorDetail {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
