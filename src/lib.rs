// Library crate for the geoshare session broker
// This file exposes the public API for integration tests

pub mod config;
pub mod presence;
pub mod relay;
pub mod room;
pub mod routes;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{BrokerConfig, RelayScope};
pub use presence::PresenceBroadcaster;
pub use relay::LocationRelay;
pub use room::{models::Room, repository::RoomRepository, RoomService};
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, EventDispatcher, MessageHandler, MessageType, WebSocketMessage,
};
