//! Error types for route planning and GPX handling.

use thiserror::Error;

/// Failures surfaced by the route planner and routing clients.
///
/// Callers branch on these to pick user-facing messaging; status mapping
/// (401, 429) happens in the client, everything else passes through.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("address not found: {address}")]
    AddressNotFound { address: String },

    #[error("routing service returned no route")]
    NoRouteFound,

    #[error("unrecognized route geometry format")]
    UnknownGeometryFormat,

    #[error("routing service error (status {status:?}): {message}")]
    RoutingService { status: Option<u16>, message: String },

    #[error("routing service rejected the API key")]
    InvalidCredentials,

    #[error("routing service rate limit exceeded")]
    RateLimited,

    #[error("route planning cancelled")]
    Cancelled,
}

impl RouteError {
    /// Map a non-success HTTP status to its semantic error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => RouteError::InvalidCredentials,
            429 => RouteError::RateLimited,
            _ => RouteError::RoutingService {
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// Upstream HTTP status, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            RouteError::InvalidCredentials => Some(401),
            RouteError::RateLimited => Some(429),
            RouteError::RoutingService { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RouteError::from_status(status.as_u16(), err.to_string()),
            None => RouteError::RoutingService {
                status: None,
                message: err.to_string(),
            },
        }
    }
}

/// Failures reading or writing GPX documents.
#[derive(Debug, Error)]
pub enum GpxError {
    #[error("GPX parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("GPX write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("GPX output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
