use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::presence::PresenceBroadcaster;
use crate::shared::AppState;

use super::dispatcher::EventDispatcher;
use super::socket::Connection;

/// WebSocket endpoint: `GET /ws`. No authentication - anyone may connect,
/// a fresh connection id is assigned on upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    let connection_id = Uuid::new_v4().to_string();
    info!(user_id = %connection_id, "WebSocket connection requested");

    ws.on_upgrade(move |socket| handle_websocket_connection(socket, connection_id, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    connection_id: String,
    app_state: AppState,
) {
    info!(user_id = %connection_id, "WebSocket connection established");

    // Outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let broadcaster = Arc::new(PresenceBroadcaster::new(
        app_state.connection_manager.clone(),
    ));
    let dispatcher = Arc::new(EventDispatcher::new(
        app_state.room_service.clone(),
        app_state.location_relay.clone(),
        broadcaster,
    ));

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        dispatcher,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(user_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                user_id = %connection_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup order matters: drop the connection handle first so host
    // liveness checks during teardown see it dead, then run the room
    // lifecycle disconnect branches.
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;

    if let Err(e) = app_state.room_service.handle_disconnect(&connection_id).await {
        warn!(
            user_id = %connection_id,
            error = %e,
            "Disconnect cleanup failed"
        );
    }

    info!(user_id = %connection_id, "WebSocket disconnect handled");
}
