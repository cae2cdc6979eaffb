//! HTTP utilities for Coolify REST API calls

use super::error::{ApiError, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A fully resolved request: absolute URL, query and optional JSON body
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: Method,
    pub url: String,
    pub query: &'a [(&'a str, String)],
    pub body: Option<&'a Value>,
}

/// HTTP client wrapper that attaches the bearer token and classifies responses
#[derive(Clone)]
pub struct CoolifyHttpClient {
    client: Client,
    debug: bool,
}

impl CoolifyHttpClient {
    /// Create a new HTTP client with the given request timeout
    pub fn new(timeout: Duration, debug: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("coolify-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, debug })
    }

    /// Wrap an existing reqwest client (its own timeout applies)
    pub fn from_client(client: Client, debug: bool) -> Self {
        Self { client, debug }
    }

    /// Send one request and return the raw body of a 2xx response
    pub async fn send(&self, request: &ApiRequest<'_>, token: &str) -> Result<String> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(request.query);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!("{} {} -> {}", request.method, request.url, status);
            return Ok(body);
        }

        if self.debug {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::warn!(
                "{} {} -> {}: {}",
                request.method,
                request.url,
                status,
                sanitize_for_log(&body)
            );
        } else {
            tracing::warn!("{} {} -> {}", request.method, request.url, status);
        }

        Err(classify_status(status, body))
    }
}

/// Map a non-2xx status to its error kind
pub(crate) fn classify_status(status: StatusCode, body: String) -> ApiError {
    let body = body.trim().to_string();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::BAD_REQUEST => ApiError::BadRequest { body },
        StatusCode::NOT_FOUND => ApiError::NotFound { body },
        _ => ApiError::UnexpectedStatus { status, body },
    }
}
