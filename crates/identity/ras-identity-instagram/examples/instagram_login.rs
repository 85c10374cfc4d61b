//! Example showing a complete Instagram login from the command line
//!
//! This example demonstrates:
//! 1. Loading provider configuration from the environment (or a `.env` file)
//! 2. Starting the flow and persisting the session as the host would
//! 3. Exchanging the callback code for an access token
//! 4. Fetching the user's profile
//!
//! Required variables: INSTAGRAM_KEY, INSTAGRAM_SECRET, INSTAGRAM_CALLBACK_URL

use ras_identity_instagram::{InstagramConfig, InstagramProvider, Provider, Session};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = InstagramConfig::from_env()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let provider = InstagramProvider::from_config(config)?.with_http_client(http_client);

    println!("Instagram OAuth2 Example");
    println!("========================");

    // Step 1: Start the flow
    let state = Uuid::new_v4().to_string();
    let session = provider.begin_auth(&state).await?;
    println!("\n1. Open this URL in your browser:\n\n   {}\n", session.get_auth_url()?);

    // The host would store this in a cookie until the callback arrives
    let stored = session.marshal();

    // Step 2: Read the code from the callback
    print!("2. Paste the `code` parameter from the callback URL: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;

    let mut params = HashMap::new();
    params.insert("code".to_string(), code.trim().trim_end_matches("#_").to_string());
    params.insert("state".to_string(), state);

    // Step 3: Exchange the code
    let mut session = provider.unmarshal_session(&stored)?;
    session.authorize(&provider, &params).await?;
    println!("\n3. Authorized, session is now: {}", session);

    // Step 4: Fetch the user
    let user = provider.fetch_user(&session).await?;
    println!("\n4. Logged in as {} (id {})", user.nick_name, user.user_id);

    Ok(())
}
