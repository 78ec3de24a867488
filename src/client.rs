use crate::error::{ApiError, ReveError, PARSE_ERROR_CODE, UNKNOWN_ERROR_CODE};
use crate::types::{
    CreateImageRequest, EditImageRequest, ErrorDetail, ImageRequest, ImageResponse,
    RemixImageRequest, ResponseFormat, ResponseHeaders, CREATE_PATH, DEFAULT_EDIT_VERSION,
    EDIT_PATH, REMIX_PATH,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;
use std::env;
use tracing::{debug, error};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.reve.com/v1/";

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "REVE_API_KEY";

/// The main client for interacting with the Reve image API.
///
/// It holds the shared `reqwest::Client`, with the bearer token baked into its default
/// headers, and the base URL for all API requests. Nothing changes per request, so one
/// instance can be cloned and shared across tasks freely.
#[derive(Clone, Debug)]
pub struct ReveClient {
    client: reqwest::Client,
    base_url: Url,
}

/// Per-call settings for the request primitive.
#[derive(Debug, Clone, Copy)]
struct RequestParams<'a> {
    response_format: ResponseFormat,
    breadcrumb: Option<&'a str>,
}

impl ReveClient {
    /// Creates a new `ReveClient`.
    ///
    /// Uses `api_key` when given, otherwise the `REVE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// - `ReveError::MissingApiKey` if the API key is not provided in either way.
    /// - `ReveError::InvalidApiKey` if the key cannot be sent as a header value.
    /// - `ReveError::RequestFailed` if the internal HTTP client fails to build.
    pub fn new(api_key: Option<String>) -> Result<Self, ReveError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()));
        let Some(key) = api_key else {
            return Err(ReveError::MissingApiKey);
        };
        Self::new_with_url(key, DEFAULT_API_URL)
    }

    /// Creates a new `ReveClient` with a custom base URL.
    ///
    /// This is useful for testing or for routing through a proxy. Endpoint paths are
    /// resolved relative to `base_url`.
    ///
    /// # Errors
    ///
    /// - `ReveError::InvalidApiKey` if the key cannot be sent as a header value.
    /// - `ReveError::RequestFailed` if the internal HTTP client fails to build.
    /// - `ReveError::UrlParseFailed` if the provided `base_url` is invalid.
    pub fn new_with_url(api_key: String, base_url: &str) -> Result<Self, ReveError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ReveError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        // Url::join replaces the last path segment unless the base ends with a slash.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Generates images from a text description.
    ///
    /// # Arguments
    ///
    /// * `request` - The prompt and shared options.
    /// * `response_format` - Wire format to negotiate; `None` means JSON.
    ///
    /// # Returns
    ///
    /// An [`ImageResponse`] with the base64 image and its metadata.
    pub async fn create(
        &self,
        request: &CreateImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<ImageResponse, ReveError> {
        let params = RequestParams {
            response_format: response_format.unwrap_or_default(),
            breadcrumb: request.options.breadcrumb.as_deref(),
        };
        self.request(CREATE_PATH, request, params).await
    }

    /// Modifies an existing image using a text instruction.
    ///
    /// The request is sent with `version: "latest"` unless the caller picked a version.
    pub async fn edit(
        &self,
        request: &EditImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<ImageResponse, ReveError> {
        let mut body = request.clone();
        if body.options.version.as_deref().map_or(true, str::is_empty) {
            body.options.version = Some(DEFAULT_EDIT_VERSION.to_string());
        }
        debug!(
            endpoint = EDIT_PATH,
            version = body.options.version.as_deref().unwrap_or(DEFAULT_EDIT_VERSION),
            edit_instruction = %body.edit_instruction,
            reference_image_len = body.reference_image.len(),
            "edit request"
        );

        let params = RequestParams {
            response_format: response_format.unwrap_or_default(),
            breadcrumb: request.options.common.breadcrumb.as_deref(),
        };
        self.request(EDIT_PATH, &body, params).await
    }

    /// Combines a text prompt with reference images to create a new variation.
    pub async fn remix(
        &self,
        request: &RemixImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<ImageResponse, ReveError> {
        let params = RequestParams {
            response_format: response_format.unwrap_or_default(),
            breadcrumb: request.options.breadcrumb.as_deref(),
        };
        self.request(REMIX_PATH, request, params).await
    }

    /// Dispatches any [`ImageRequest`] to its endpoint.
    pub async fn generate(
        &self,
        request: &ImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Result<ImageResponse, ReveError> {
        match request {
            ImageRequest::Create(req) => self.create(req, response_format).await,
            ImageRequest::Edit(req) => self.edit(req, response_format).await,
            ImageRequest::Remix(req) => self.remix(req, response_format).await,
        }
    }

    /// Sends one POST and normalizes whatever comes back into an [`ImageResponse`].
    async fn request<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        params: RequestParams<'_>,
    ) -> Result<ImageResponse, ReveError> {
        let mut url = self.base_url.join(endpoint)?;
        if let Some(breadcrumb) = params.breadcrumb.filter(|b| !b.is_empty()) {
            url.query_pairs_mut().append_pair("breadcrumb", breadcrumb);
        }

        debug!(
            endpoint,
            accept = params.response_format.mime_type(),
            breadcrumb = params.breadcrumb.is_some(),
            "sending request"
        );

        let response = self
            .client
            .post(url)
            .header(ACCEPT, params.response_format.mime_type())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let headers = ResponseHeaders::from_header_map(response.headers());

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let err = decode_error(status, &raw, headers);
            error!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or(""),
                raw_body = %raw,
                error_code = %err.error_code,
                request_id = ?err.request_id,
                "Reve API error"
            );
            return Err(err.into());
        }

        match params.response_format {
            ResponseFormat::Json => {
                let bytes = response.bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            image_format => {
                let bytes = response.bytes().await?;
                Ok(ImageResponse {
                    image: STANDARD.encode(&bytes),
                    format: Some(image_format.subtype().to_string()),
                    metadata: headers.to_metadata(),
                    ..Default::default()
                })
            }
        }
    }
}

/// Builds the [`ApiError`] for a non-2xx response.
///
/// A body that is not JSON at all yields `HTTP <status>: <reason>` with code
/// `PARSE_ERROR`. A JSON body without a usable `error` object falls back to the raw
/// body for the message and to the `x-reve-error-code` header, then `UNKNOWN`, for the code.
fn decode_error(status: StatusCode, raw: &str, headers: ResponseHeaders) -> ApiError {
    let status_text = status.canonical_reason().unwrap_or("");
    let (message, error_code) = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(body) => {
            let detail: ErrorDetail = body
                .get("error")
                .and_then(|error| serde_json::from_value(error.clone()).ok())
                .unwrap_or_default();
            let message = detail.message.filter(|m| !m.is_empty()).unwrap_or_else(|| {
                let detail = if raw.is_empty() { status_text } else { raw };
                format!("HTTP {}: {}", status.as_u16(), detail)
            });
            let error_code = detail
                .code
                .filter(|c| !c.is_empty())
                .or(headers.error_code)
                .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string());
            (message, error_code)
        }
        Err(_) => (
            format!("HTTP {}: {}", status.as_u16(), status_text),
            PARSE_ERROR_CODE.to_string(),
        ),
    };
    ApiError::new(message, status.as_u16(), error_code, headers.request_id)
}
