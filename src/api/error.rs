// API error mapping
// Turns request and ledger failures into status codes and JSON bodies

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::json_response;
use crate::ledger::LedgerError;

/// Request-level failures
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required input missing; no ledger call was made
    #[error("{0}")]
    Validation(String),

    /// The ledger call, or acquiring its session, failed
    #[error("{context}: {source}")]
    Ledger {
        context: &'static str,
        #[source]
        source: LedgerError,
    },

    /// The ledger answered with a payload that is not JSON
    #[error("{context}: {message}")]
    Payload {
        context: &'static str,
        message: String,
    },

    /// Unreadable, oversized or malformed request input
    #[error("{0}")]
    Malformed(String),

    #[error("Endpoint not found")]
    EndpointNotFound,
}

impl ApiError {
    pub const fn ledger(context: &'static str, source: LedgerError) -> Self {
        Self::Ledger { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Ledger {
                source: LedgerError::NotFound(_),
                ..
            }
            | Self::EndpointNotFound => StatusCode::NOT_FOUND,
            Self::Ledger {
                source: LedgerError::AccessDenied(_),
                ..
            } => StatusCode::FORBIDDEN,
            Self::Ledger { .. } | Self::Payload { .. } | Self::Malformed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body sent to the client. Generic failures echo the underlying
    /// message in `details`.
    pub fn body(&self) -> Value {
        match self {
            Self::Validation(message) => json!({ "error": message }),
            Self::Ledger { context, source } => match source {
                LedgerError::NotFound(_) => json!({ "error": "Asset not found" }),
                LedgerError::AccessDenied(_) => json!({ "error": "Access denied" }),
                other => json!({ "error": context, "details": other.to_string() }),
            },
            Self::Payload { context, message } => json!({ "error": context, "details": message }),
            Self::Malformed(message) => {
                json!({ "error": "Something went wrong!", "details": message })
            }
            Self::EndpointNotFound => json!({ "error": "Endpoint not found" }),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        json_response(self.status(), &self.body())
    }
}
