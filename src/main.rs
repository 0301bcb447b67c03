use anyhow::Result;
use tripflow::{TripflowConfig, VERSION, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripflowConfig::load()?;
    logging::init(&config.logging)?;

    tracing::info!(
        version = VERSION,
        weather_key = config.weather.api_key().is_some(),
        llm_key = config.llm.api_key().is_some(),
        "Starting TripFlow backend"
    );
    if config.llm.api_key().is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; planner endpoints will answer 500");
    }

    web::run(config).await
}
