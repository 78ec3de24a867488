use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const HEADER_CONTENT_VIOLATION: &str = "x-reve-content-violation";
pub const HEADER_REQUEST_ID: &str = "x-reve-request-id";
pub const HEADER_VERSION: &str = "x-reve-version";
pub const HEADER_CREDITS_USED: &str = "x-reve-credits-used";
pub const HEADER_CREDITS_REMAINING: &str = "x-reve-credits-remaining";
pub const HEADER_ERROR_CODE: &str = "x-reve-error-code";

pub(crate) const CREATE_PATH: &str = "image/create";
pub(crate) const EDIT_PATH: &str = "image/edit";
pub(crate) const REMIX_PATH: &str = "image/remix";

/// Model version sent with edit requests that do not name one.
pub const DEFAULT_EDIT_VERSION: &str = "latest";

/// The wire format negotiated through the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// A JSON body carrying a base64 image and its metadata.
    #[default]
    Json,
    /// Raw PNG bytes, metadata in response headers.
    Png,
    /// Raw JPEG bytes, metadata in response headers.
    Jpeg,
    /// Raw WebP bytes, metadata in response headers.
    Webp,
}

impl ResponseFormat {
    /// The MIME type sent as the `Accept` header.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Png => "image/png",
            ResponseFormat::Jpeg => "image/jpeg",
            ResponseFormat::Webp => "image/webp",
        }
    }

    /// The MIME subtype, e.g. `"png"` for `image/png`.
    pub fn subtype(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Png => "png",
            ResponseFormat::Jpeg => "jpeg",
            ResponseFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Upscale multiplier accepted by the `upscale` postprocessing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum UpscaleFactor {
    X1,
    X2,
    X3,
    X4,
}

impl From<UpscaleFactor> for u8 {
    fn from(factor: UpscaleFactor) -> u8 {
        match factor {
            UpscaleFactor::X1 => 1,
            UpscaleFactor::X2 => 2,
            UpscaleFactor::X3 => 3,
            UpscaleFactor::X4 => 4,
        }
    }
}

impl TryFrom<u8> for UpscaleFactor {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(UpscaleFactor::X1),
            2 => Ok(UpscaleFactor::X2),
            3 => Ok(UpscaleFactor::X3),
            4 => Ok(UpscaleFactor::X4),
            other => Err(format!("upscale factor must be 1-4, got {}", other)),
        }
    }
}

/// A vendor-side transformation applied to the generated image.
///
/// Steps run in the order they are listed in the request. The client sends them
/// exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "process", rename_all = "snake_case")]
pub enum Postprocessing {
    Upscale {
        upscale_factor: UpscaleFactor,
    },
    RemoveBackground,
    FitImage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_dim: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_height: Option<u32>,
    },
    Effect {
        effect_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        effect_parameters: Option<HashMap<String, serde_json::Map<String, serde_json::Value>>>,
    },
}

/// Options shared by every endpoint.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Number of candidates the service evaluates (1-15, service default 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_time_scaling: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocessing: Option<Vec<Postprocessing>>,
    /// Tracing token. Sent as the `breadcrumb` query parameter, never in the body.
    #[serde(skip)]
    pub breadcrumb: Option<String>,
}

/// A request to generate an image from a text prompt.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateImageRequest {
    pub prompt: String,
    #[serde(flatten)]
    pub options: RequestOptions,
}

impl CreateImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_breadcrumb(mut self, breadcrumb: impl Into<String>) -> Self {
        self.options.breadcrumb = Some(breadcrumb.into());
        self
    }
}

/// Edit-specific optional fields.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct EditOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    /// e.g. `latest`, `latest-fast`, `reve-edit@20250915`. Defaults to `latest` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub common: RequestOptions,
}

/// A request to modify an existing image with a text instruction.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EditImageRequest {
    pub edit_instruction: String,
    /// The image to edit, base64 encoded.
    pub reference_image: String,
    #[serde(flatten)]
    pub options: EditOptions,
}

impl EditImageRequest {
    pub fn new(edit_instruction: impl Into<String>, reference_image: impl Into<String>) -> Self {
        Self {
            edit_instruction: edit_instruction.into(),
            reference_image: reference_image.into(),
            options: EditOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EditOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.options.version = Some(version.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.options.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_breadcrumb(mut self, breadcrumb: impl Into<String>) -> Self {
        self.options.common.breadcrumb = Some(breadcrumb.into());
        self
    }
}

/// A request to blend reference images under a text prompt.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RemixImageRequest {
    pub prompt: String,
    /// Reference images, base64 encoded.
    pub images: Vec<String>,
    #[serde(flatten)]
    pub options: RequestOptions,
}

impl RemixImageRequest {
    pub fn new(prompt: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_breadcrumb(mut self, breadcrumb: impl Into<String>) -> Self {
        self.options.breadcrumb = Some(breadcrumb.into());
        self
    }
}

/// Any of the three generation requests.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRequest {
    Create(CreateImageRequest),
    Edit(EditImageRequest),
    Remix(RemixImageRequest),
}

impl ImageRequest {
    /// The endpoint path, relative to the API base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ImageRequest::Create(_) => CREATE_PATH,
            ImageRequest::Edit(_) => EDIT_PATH,
            ImageRequest::Remix(_) => REMIX_PATH,
        }
    }

    pub fn breadcrumb(&self) -> Option<&str> {
        match self {
            ImageRequest::Create(req) => req.options.breadcrumb.as_deref(),
            ImageRequest::Edit(req) => req.options.common.breadcrumb.as_deref(),
            ImageRequest::Remix(req) => req.options.breadcrumb.as_deref(),
        }
    }
}

impl From<CreateImageRequest> for ImageRequest {
    fn from(req: CreateImageRequest) -> Self {
        ImageRequest::Create(req)
    }
}

impl From<EditImageRequest> for ImageRequest {
    fn from(req: EditImageRequest) -> Self {
        ImageRequest::Edit(req)
    }
}

impl From<RemixImageRequest> for ImageRequest {
    fn from(req: RemixImageRequest) -> Self {
        ImageRequest::Remix(req)
    }
}

/// Reads `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generation metadata reported by the service.
///
/// For image response formats these values come from `x-reve-*` headers, any of
/// which may be missing. Fields this crate does not model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub credits_used: Option<i64>,
    #[serde(default)]
    pub credits_remaining: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_violation: bool,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A generated image, identical in shape for every negotiated response format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    /// The image, base64 encoded.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    /// Image subtype (`png`, `jpeg`, `webp`) when the image was returned as raw bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ImageMetadata,
    /// Top-level body fields this crate does not model, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ImageResponse {
    /// The MIME type of `image`, assuming PNG when the service did not say.
    pub fn mime_type(&self) -> String {
        match self.format.as_deref() {
            Some(subtype) if !subtype.is_empty() => format!("image/{}", subtype),
            _ => "image/png".to_string(),
        }
    }
}

/// (Internal) The `error` object of a non-2xx response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

/// The `x-reve-*` headers of a response, captured on both success and failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_violation: Option<String>,
    pub request_id: Option<String>,
    pub version: Option<String>,
    pub credits_used: Option<String>,
    pub credits_remaining: Option<String>,
    pub error_code: Option<String>,
}

impl ResponseHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            content_violation: get(HEADER_CONTENT_VIOLATION),
            request_id: get(HEADER_REQUEST_ID),
            version: get(HEADER_VERSION),
            credits_used: get(HEADER_CREDITS_USED),
            credits_remaining: get(HEADER_CREDITS_REMAINING),
            error_code: get(HEADER_ERROR_CODE),
        }
    }

    /// Metadata equivalent to the JSON body's, for image response formats.
    pub fn to_metadata(&self) -> ImageMetadata {
        let parse_credits = |value: &Option<String>| {
            value.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
        };
        ImageMetadata {
            version: self.version.clone(),
            credits_used: parse_credits(&self.credits_used),
            credits_remaining: parse_credits(&self.credits_remaining),
            content_violation: self.content_violation.as_deref() == Some("true"),
            request_id: self.request_id.clone(),
            extra: Default::default(),
        }
    }
}
