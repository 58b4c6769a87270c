pub mod generators;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use generators::{RandomRoomIdGenerator, RoomIdGenerator, SequentialRoomIdGenerator};
pub use models::{GeoPosition, Member, Room};
pub use repository::{InMemoryRoomRepository, RoomRepository};
pub use service::RoomService;
