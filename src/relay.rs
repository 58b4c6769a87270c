use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::RelayScope;
use crate::presence::PresenceBroadcaster;
use crate::room::repository::RoomRepository;
use crate::shared::AppError;
use crate::websockets::messages::WebSocketMessage;

/// Relays `updateLocation` payloads verbatim as `updateLocationResponse`.
///
/// The payload is never validated or touched. Room scope confines the
/// relay to the sender's own room(s); global scope reproduces the
/// original process-wide broadcast for deployments that depend on it.
pub struct LocationRelay {
    broadcaster: Arc<PresenceBroadcaster>,
    repository: Arc<dyn RoomRepository + Send + Sync>,
    scope: RelayScope,
}

impl LocationRelay {
    pub fn new(
        broadcaster: Arc<PresenceBroadcaster>,
        repository: Arc<dyn RoomRepository + Send + Sync>,
        scope: RelayScope,
    ) -> Self {
        Self {
            broadcaster,
            repository,
            scope,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn relay(
        &self,
        sender_connection_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), AppError> {
        let message = WebSocketMessage::update_location_response(payload);

        match self.scope {
            RelayScope::Global => {
                self.broadcaster.to_all(&message).await;
            }
            RelayScope::Room => {
                let mut room_ids = Vec::new();
                if let Some(room) = self.repository.find_by_host(sender_connection_id).await? {
                    room_ids.push(room.room_id);
                }
                for room in self
                    .repository
                    .find_rooms_with_member(sender_connection_id)
                    .await?
                {
                    room_ids.push(room.room_id);
                }

                if room_ids.is_empty() {
                    // A sender in no room only hears itself
                    debug!(user_id = %sender_connection_id, "Relay from roomless sender");
                    self.broadcaster
                        .to_connection(sender_connection_id, &message)
                        .await;
                } else {
                    for room_id in room_ids {
                        self.broadcaster.to_group(&room_id, &message).await;
                    }
                }
            }
        }

        Ok(())
    }
}
