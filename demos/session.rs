//! Drives an ImageSession the way a chat panel would: generate, then refine.

use reve::{CreateImageRequest, EditImageRequest, ImageSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let session = ImageSession::from_env()?;

    let first = session
        .create_image(&CreateImageRequest::new("a red door in a white wall"), None)
        .await;

    let Some(first) = first else {
        let state = session.state();
        if let Some(err) = state.error {
            match err.as_api_error() {
                Some(api) if api.is_rate_limited() => eprintln!("Rate limited, try again later."),
                Some(api) if api.is_insufficient_credits() => eprintln!("Out of credits."),
                _ => eprintln!("Error: {}", err),
            }
        }
        return Ok(());
    };
    println!("First image: {} base64 chars", first.image.len());

    let refined = session
        .edit_image(&EditImageRequest::new("paint the door blue", first.image), None)
        .await;
    if refined.is_none() {
        eprintln!("Edit failed: {:?}", session.state().error);
    }

    if let Some(url) = session.image_url() {
        println!("Current image url prefix: {}", &url[..url.len().min(40)]);
    }

    session.reset();
    Ok(())
}
