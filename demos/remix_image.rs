//! Blends two or more local images under a prompt.
//!
//! Usage:
//! `cargo run --example remix_image "<PROMPT>" <IMAGE_PATH> <IMAGE_PATH> [...]`

use futures_util::future::try_join_all;
use reve::{
    download_base64_image, file_to_base64, Postprocessing, RemixImageRequest, RequestOptions,
    ReveClient, UpscaleFactor,
};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = ReveClient::new(None)?;

    let mut args = env::args().skip(1);
    let prompt = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("Please provide a prompt as the first argument."))?;
    let paths: Vec<String> = args.collect();
    if paths.is_empty() {
        anyhow::bail!("Please provide at least one reference image.");
    }

    let images = try_join_all(paths.iter().map(file_to_base64)).await?;
    let request = RemixImageRequest::new(prompt, images).with_options(RequestOptions {
        test_time_scaling: Some(3),
        postprocessing: Some(vec![Postprocessing::Upscale {
            upscale_factor: UpscaleFactor::X2,
        }]),
        breadcrumb: None,
    });

    match client.remix(&request, None).await {
        Ok(response) => {
            let path = download_base64_image(&response.image, "remix.png", &response.mime_type())?;
            println!("Saved {}", path.display());
        }
        Err(reve::ReveError::Api(api)) if api.is_content_violation() => {
            eprintln!("Blocked by content policy (request {:?})", api.request_id);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}
