//! Test doubles shared by handler unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::chat::ChatNotification;
use crate::domain::foundation::ConnectionId;
use crate::ports::{PushError, RealtimePusher};

/// Records pushes per connection. Pushes to connections that were never
/// opened fail with `ConnectionGone`.
pub struct RecordingPusher {
    inbox: Mutex<HashMap<ConnectionId, Vec<ChatNotification>>>,
}

impl RecordingPusher {
    pub fn new() -> Self {
        Self {
            inbox: Mutex::new(HashMap::new()),
        }
    }

    pub fn open(&self, connection_id: &ConnectionId) {
        self.inbox
            .lock()
            .unwrap()
            .entry(connection_id.clone())
            .or_default();
    }

    pub fn received(&self, connection_id: &ConnectionId) -> Vec<ChatNotification> {
        self.inbox
            .lock()
            .unwrap()
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn kinds_for(&self, connection_id: &ConnectionId) -> Vec<&'static str> {
        self.received(connection_id)
            .iter()
            .map(|n| n.kind())
            .collect()
    }

    pub fn last_for(&self, connection_id: &ConnectionId) -> Option<ChatNotification> {
        self.received(connection_id).pop()
    }

    pub fn total(&self) -> usize {
        self.inbox.lock().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl RealtimePusher for RecordingPusher {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        notification: ChatNotification,
    ) -> Result<(), PushError> {
        let mut inbox = self.inbox.lock().unwrap();
        match inbox.get_mut(connection_id) {
            Some(queue) => {
                queue.push(notification);
                Ok(())
            }
            None => Err(PushError::ConnectionGone(connection_id.clone())),
        }
    }
}
