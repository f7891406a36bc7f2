//! services/site/src/bin/site.rs

use site_lib::{
    adapters::{message_llm::OpenAiMessageAdapter, rsvp_intake::HttpRsvpIntakeAdapter},
    config::Config,
    error::SiteError,
    web::{event_details_handler, rest::ApiDoc, state::AppState, ws_handler},
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;
use axum::http::{Method, HeaderValue, header::{ACCEPT, CONTENT_TYPE}};
use wedding_site_core::ports::MessageGenerationService;

#[tokio::main]
async fn main() -> Result<(), SiteError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting site...");
    info!("Counting down to {} for {}", config.event_date, config.couple_names);

    // --- 2. Initialize Service Adapters ---
    let rsvp_client = reqwest::Client::builder()
        .timeout(config.rsvp_timeout)
        .build()?;
    let rsvp_intake = Arc::new(HttpRsvpIntakeAdapter::new(
        rsvp_client,
        config.rsvp_endpoint_url.clone(),
    ));

    let message_generator: Option<Arc<dyn MessageGenerationService>> =
        match config.gemini_api_key.as_deref() {
            Some(api_key) => Some(Arc::new(OpenAiMessageAdapter::from_credential(
                api_key,
                &config.generation_api_base,
                config.generation_model.clone(),
                config.generation_timeout,
            ))),
            None => {
                warn!("GEMINI_API_KEY is not set; guestbook suggestions will use fallback text.");
                None
            }
        };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        rsvp_intake,
        message_generator,
    });

    let allowed_origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        SiteError::Internal(format!("Invalid ALLOWED_ORIGIN '{}': {}", config.allowed_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/event", get(event_details_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
