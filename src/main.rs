use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geoshare::room::generators::SequentialRoomIdGenerator;
use geoshare::room::repository::InMemoryRoomRepository;
use geoshare::websockets::{websocket_handler, InMemoryConnectionManager};
use geoshare::{
    routes, AppState, BrokerConfig, LocationRelay, PresenceBroadcaster, RoomService,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoshare=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting geoshare session broker");

    let config = BrokerConfig::from_env();

    // Wire up shared state: one store, one registry, one relay
    let repository = Arc::new(InMemoryRoomRepository::new());
    let connection_manager = Arc::new(InMemoryConnectionManager::new());
    let broadcaster = Arc::new(PresenceBroadcaster::new(connection_manager.clone()));
    let id_generator = Arc::new(SequentialRoomIdGenerator::new());

    let room_service = Arc::new(RoomService::new(
        repository.clone(),
        connection_manager.clone(),
        broadcaster.clone(),
        id_generator,
    ));
    let location_relay = Arc::new(LocationRelay::new(
        broadcaster,
        repository,
        config.relay_scope,
    ));

    let app_state = AppState::new(room_service, location_relay, connection_manager);

    let app = Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/ws", get(websocket_handler))
        .fallback(routes::not_found)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server port");
    info!(port = config.port, "Server running");
    axum::serve(listener, app).await.expect("Server terminated");
}

fn build_cors_layer(config: &BrokerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_whitelist
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
