//! Live path failure taxonomy and the fallback policy table
//!
//! Every way a live upstream call can fail is a [`LiveFailure`] variant, and
//! [`policy_for`] maps each variant to exactly one [`FailurePolicy`]. Adapters
//! never inspect failures any other way.

use thiserror::Error;

/// Maximum number of body characters kept in an error message.
const MESSAGE_EXCERPT_CHARS: usize = 200;

/// Body fragments that mark a failure as a credential problem.
const AUTH_SIGNATURES: &[&str] = &[
    "invalid_api_key",
    "invalid api key",
    "incorrect api key",
    "invalid_authentication",
    "unauthorized",
];

/// Body fragments that mark a failure as a quota or billing problem.
const QUOTA_SIGNATURES: &[&str] = &[
    "insufficient_quota",
    "quota",
    "billing",
    "rate_limit_exceeded",
];

/// Ways a live upstream call can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiveFailure {
    /// The upstream rejected the credential.
    #[error("upstream rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The upstream throttled the request.
    #[error("upstream rate limited the request (HTTP 429)")]
    RateLimited,

    /// The account behind the credential has no quota left.
    #[error("upstream quota exhausted (HTTP {status})")]
    QuotaExceeded { status: u16 },

    /// The per-call timeout elapsed.
    #[error("upstream call timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("network failure: {0}")]
    Network(String),

    /// The response could not be parsed into the expected schema.
    #[error("malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// Gateway-style failure that may succeed on a later attempt.
    #[error("upstream temporarily unavailable (HTTP {status}): {message}")]
    Transient { status: u16, message: String },

    /// Any other non-success status.
    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transient failures persisted through every retry.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LiveFailure> },
}

/// What an adapter does with a failed live call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Try the same call again after a backoff.
    Retry,
    /// Substitute the deterministic mock record.
    FallBackToMock,
    /// Return an "unavailable" record carrying the failure message.
    Surface,
}

/// The fallback policy table.
pub fn policy_for(failure: &LiveFailure) -> FailurePolicy {
    match failure {
        LiveFailure::Unauthorized { .. } => FailurePolicy::FallBackToMock,
        LiveFailure::RateLimited => FailurePolicy::FallBackToMock,
        LiveFailure::QuotaExceeded { .. } => FailurePolicy::FallBackToMock,
        LiveFailure::Timeout => FailurePolicy::FallBackToMock,
        LiveFailure::Network(_) => FailurePolicy::FallBackToMock,
        LiveFailure::MalformedPayload(_) => FailurePolicy::FallBackToMock,
        LiveFailure::Transient { .. } => FailurePolicy::Retry,
        LiveFailure::Upstream { .. } => FailurePolicy::Surface,
        LiveFailure::RetriesExhausted { .. } => FailurePolicy::Surface,
    }
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl LiveFailure {
    /// Classify a non-success HTTP response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let lower = body.to_ascii_lowercase();
        let has_auth_signature = AUTH_SIGNATURES.iter().any(|s| lower.contains(s))
            || (lower.contains("invalid_request_error") && lower.contains("api key"));
        let has_quota_signature = QUOTA_SIGNATURES.iter().any(|s| lower.contains(s));

        match status {
            401 | 403 => LiveFailure::Unauthorized { status },
            402 => LiveFailure::QuotaExceeded { status },
            429 if lower.contains("insufficient_quota") => LiveFailure::QuotaExceeded { status },
            429 => LiveFailure::RateLimited,
            _ if has_auth_signature => LiveFailure::Unauthorized { status },
            _ if has_quota_signature => LiveFailure::QuotaExceeded { status },
            502..=504 => LiveFailure::Transient {
                status,
                message: error_message(body),
            },
            _ => LiveFailure::Upstream {
                status,
                message: error_message(body),
            },
        }
    }

    /// Classify a transport-level error from the HTTP client.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            LiveFailure::Timeout
        } else if err.is_decode() || err.is_body() {
            LiveFailure::MalformedPayload(err.to_string())
        } else {
            LiveFailure::Network(err.to_string())
        }
    }

    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            LiveFailure::Unauthorized { .. } => "unauthorized",
            LiveFailure::RateLimited => "rate_limited",
            LiveFailure::QuotaExceeded { .. } => "quota_exceeded",
            LiveFailure::Timeout => "timeout",
            LiveFailure::Network(_) => "network",
            LiveFailure::MalformedPayload(_) => "malformed_payload",
            LiveFailure::Transient { .. } => "transient",
            LiveFailure::Upstream { .. } => "upstream_error",
            LiveFailure::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

/// Prefer the vendor's `error.message`, else a bounded excerpt of the body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        if let Some(message) = envelope.error.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MESSAGE_EXCERPT_CHARS).collect()
}
