//! API error taxonomy
//!
//! Every fallible client operation returns one of these variants so callers
//! can tell a missing resource from a bad token from a broken network.

use reqwest::StatusCode;

/// Errors returned by [`CoolifyClient`](super::client::CoolifyClient) operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Token missing or rejected (401)
    #[error("unauthenticated: invalid or missing token (401)")]
    Unauthorized,

    /// Request rejected as malformed (400)
    #[error("bad request (400): {body}")]
    BadRequest { body: String },

    /// Route or resource does not exist under the requested API version (404)
    #[error("resource not found (404): {body}")]
    NotFound { body: String },

    /// Network, DNS, TLS or timeout failure before a status was received
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-2xx response
    #[error("unexpected response: {status} ({body})")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// Body did not match any known response shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client was built with unusable settings
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Whether this error should trigger a probe of the next API version
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status associated with this error, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            ApiError::Decode(_) | ApiError::InvalidConfig(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Format an API error for display
/// Security: never echoes raw response bodies, which may contain secrets
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized => "Authentication failed. Check API_TOKEN.".to_string(),
        ApiError::BadRequest { .. } => {
            "Invalid request. The API rejected the token or parameters.".to_string()
        }
        ApiError::NotFound { .. } => "Resource not found.".to_string(),
        ApiError::Transport(err) if err.is_timeout() => {
            "Request timed out. Check that the Coolify instance is reachable.".to_string()
        }
        ApiError::Transport(_) => {
            "Request failed. Check your network connection and API_URL.".to_string()
        }
        ApiError::UnexpectedStatus { status, .. } => match status.as_u16() {
            403 => "Permission denied for this token.".to_string(),
            409 => "Resource conflict. It may be busy with another operation.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "Coolify is temporarily unavailable. Please try again.".to_string(),
            _ => format!("Unexpected response from Coolify ({}).", status.as_u16()),
        },
        ApiError::Decode(_) => "Received a response in an unknown format.".to_string(),
        ApiError::InvalidConfig(reason) => {
            let sanitized = reason
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();
            format!("Invalid configuration: {}", sanitized)
        }
    }
}
