//! Publisher backed by the co-processor link

use canary_core::traits::{PublishError, PublishId, Publisher};
use canary_protocol::LinkCommand;

use crate::channels::LINK_OUTBOX;

/// Queues `PUB` lines for the link TX task
///
/// Completion arrives later as a `PUBACK` line on the RX side, carrying
/// the id handed out here.
pub struct LinkPublisher {
    qos: u8,
    next_id: PublishId,
}

impl LinkPublisher {
    pub fn new(qos: u8) -> Self {
        Self { qos, next_id: 0 }
    }
}

impl Publisher for LinkPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<PublishId, PublishError> {
        let payload = core::str::from_utf8(payload).map_err(|_| PublishError::Invalid)?;
        let id = self.next_id;
        let line = LinkCommand::Publish {
            id,
            qos: self.qos,
            topic,
            payload,
        }
        .encode()
        .map_err(|_| PublishError::Invalid)?;

        LINK_OUTBOX.try_send(line).map_err(|_| PublishError::Busy)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }
}
