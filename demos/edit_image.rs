//! Edits a local image with a text instruction.
//!
//! Usage:
//! `cargo run --example edit_image <IMAGE_PATH> "<INSTRUCTION>"`

use reve::{download_base64_image, file_to_base64, EditImageRequest, ResponseFormat, ReveClient};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = ReveClient::new(None)?;

    let image_path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide an image path as the first argument."))?;
    let instruction = env::args()
        .nth(2)
        .unwrap_or_else(|| "make the sky light blue".to_string());

    let reference_image = file_to_base64(&image_path).await?;
    let request = EditImageRequest::new(instruction, reference_image).with_breadcrumb("demo-edit");

    // Ask for raw PNG bytes; the response still arrives as an ImageResponse.
    let response = client.edit(&request, Some(ResponseFormat::Png)).await?;
    let path = download_base64_image(&response.image, "edited.png", &response.mime_type())?;
    println!("Saved {} (version {:?})", path.display(), response.metadata.version);

    Ok(())
}
