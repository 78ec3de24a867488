/// Error code the service reports when a prompt or result is blocked by content policy.
pub const CONTENT_POLICY_VIOLATION: &str = "CONTENT_POLICY_VIOLATION";

/// Error code used when a non-2xx response body is not JSON.
pub const PARSE_ERROR_CODE: &str = "PARSE_ERROR";

/// Error code used when neither the body nor the headers name one.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// Represents the possible errors that can occur when using the Reve SDK.
#[derive(Debug, thiserror::Error)]
pub enum ReveError {
    #[error("API key is missing. Please provide it or set the REVE_API_KEY environment variable.")]
    MissingApiKey,
    #[error("API key cannot be used as an HTTP header value")]
    InvalidApiKey,
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse API response: {0}")]
    ResponseParseFailed(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl ReveError {
    /// Returns the structured vendor error if the service rejected the request.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            ReveError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// `true` when the failure happened before any network I/O because no usable
    /// credential was configured.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ReveError::MissingApiKey | ReveError::InvalidApiKey)
    }
}

/// A non-2xx response from the Reve API.
///
/// Built only by the client's request path. The condition checks below are derived
/// from `status_code` and `error_code` on every call, so an `ApiError` assembled from
/// a decoded payload answers them correctly without any extra bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Reve API error {status_code} ({error_code}): {message}")]
pub struct ApiError {
    /// Human-readable message, either from the error body or synthesized from the status line.
    pub message: String,
    /// The HTTP status code of the response.
    pub status_code: u16,
    /// The vendor error code, `"PARSE_ERROR"` for non-JSON bodies, or `"UNKNOWN"`.
    pub error_code: String,
    /// The `x-reve-request-id` header, for correlation with vendor-side logs.
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(
        message: impl Into<String>,
        status_code: u16,
        error_code: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: error_code.into(),
            request_id,
        }
    }

    /// The request was rejected by rate limiting (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    /// The account does not have enough credits (HTTP 402).
    pub fn is_insufficient_credits(&self) -> bool {
        self.status_code == 402
    }

    /// The prompt or the generated image was blocked by content policy.
    pub fn is_content_violation(&self) -> bool {
        self.error_code == CONTENT_POLICY_VIOLATION
    }
}
