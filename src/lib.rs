//! An unofficial Rust SDK for the Reve image generation API.
//!
//! This SDK provides a convenient, asynchronous interface for generating images from
//! text prompts, editing existing images with instructions, and remixing several
//! reference images into a new one.
//!
//! ## Features
//! - Create, edit and remix endpoints with typed requests and postprocessing steps.
//! - Response format negotiation (JSON or raw PNG/JPEG/WebP) normalized to one
//!   [`ImageResponse`] shape.
//! - Structured API errors with rate-limit, credit and content-policy checks.
//! - Base64, blob and data-URL helpers for moving images in and out of requests.
//! - [`ImageSession`], a stateful adapter that keeps the latest result for a UI.
//!
//! ## Example
//!
//! ```no_run
//! # use reve::{CreateImageRequest, ReveClient};
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let client = ReveClient::new(None)?;
//! let response = client
//!     .create(&CreateImageRequest::new("a red door in a white wall"), None)
//!     .await?;
//! println!("credits remaining: {:?}", response.metadata.credits_remaining);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ReveClient, API_KEY_ENV};
pub use codec::{
    base64_to_blob, base64_to_data_url, blob_to_base64, download_base64_image, file_to_base64,
    file_to_blob, strip_data_url_prefix, Blob, DEFAULT_MIME_TYPE,
};
pub use error::{
    ApiError, ReveError, CONTENT_POLICY_VIOLATION, PARSE_ERROR_CODE, UNKNOWN_ERROR_CODE,
};
pub use session::{ImageSession, SessionState};
pub use types::{
    CreateImageRequest, EditImageRequest, EditOptions, ImageMetadata, ImageRequest,
    ImageResponse, Postprocessing, RemixImageRequest, RequestOptions, ResponseFormat,
    ResponseHeaders, UpscaleFactor, DEFAULT_EDIT_VERSION,
};
