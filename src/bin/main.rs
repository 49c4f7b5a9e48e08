use std::sync::Arc;
use support_agent::{
    api::{start_server, ApiState},
    config::Settings,
    AnalyticsTracker, ConversationStore, GroqClient, ProfileGenerator, SupportAgent,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Missing credentials are fatal at startup, not recoverable later.
    let settings = Settings::from_env()?;

    info!("Customer Support Agent - API Server");
    info!("Port: {}", settings.port);
    info!("Model: {}", settings.groq_model);

    // Create components
    let provider = Arc::new(GroqClient::new(
        settings.groq_api_key.clone(),
        settings.groq_model.clone(),
    ));
    let store = Arc::new(ConversationStore::new());
    let analytics = Arc::new(AnalyticsTracker::new());

    let agent = Arc::new(SupportAgent::new(store.clone(), provider.clone()));
    let profiles = Arc::new(ProfileGenerator::new(store, provider));

    let state = ApiState {
        agent,
        profiles,
        analytics,
    };

    info!("Agent initialized");
    info!("Starting API server...");

    start_server(state, settings.port).await?;

    Ok(())
}
