use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use web_summarizer::{
    config::Config,
    api::routes::create_router,
    pipeline::Pipeline,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("web_summarizer=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(model = %config.model.model, "configuration loaded");

    // The model credential goes into the pipeline once and is never mutated
    let app_state = AppState {
        pipeline: Pipeline::from_config(&config)?,
    };

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
