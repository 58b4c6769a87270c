use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Trait for generating unique room ids
#[async_trait]
pub trait RoomIdGenerator: Send + Sync {
    async fn next_id(&self) -> String;
}

/// Monotonic counter-based generator. Ids are small decimal strings,
/// matching the sequential ids handed out by the original service.
pub struct SequentialRoomIdGenerator {
    counter: AtomicU64,
}

impl SequentialRoomIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialRoomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomIdGenerator for SequentialRoomIdGenerator {
    async fn next_id(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

/// Random short-code generator for deployments where sequential ids are
/// too predictable to hand out as invitations.
pub struct RandomRoomIdGenerator {
    length: usize,
}

impl RandomRoomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomRoomIdGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl RoomIdGenerator for RandomRoomIdGenerator {
    async fn next_id(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
