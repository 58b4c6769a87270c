// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use dispatcher::EventDispatcher;
pub use handler::websocket_handler;
pub use messages::{MessageType, Status, WebSocketMessage};
pub use socket::MessageHandler;

// Internal modules
pub mod connection_manager;
mod dispatcher;
mod handler;
pub mod messages;
mod socket;
