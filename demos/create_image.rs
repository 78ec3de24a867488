use reve::{download_base64_image, CreateImageRequest, ReveClient};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    // Initialize the client from environment variable
    let client = ReveClient::new(None)?;

    let prompt = env::args()
        .nth(1)
        .unwrap_or_else(|| "a modern house with large windows in a lush valley".to_string());
    println!("Generating image for prompt: '{}'", prompt);

    match client.create(&CreateImageRequest::new(prompt), None).await {
        Ok(response) => {
            let path = download_base64_image(&response.image, "create.png", &response.mime_type())?;
            println!("Saved {}", path.display());
            println!(
                "Credits used: {:?}, remaining: {:?}",
                response.metadata.credits_used, response.metadata.credits_remaining
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}
