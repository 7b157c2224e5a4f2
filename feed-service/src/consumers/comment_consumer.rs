/// Comment consumer
///
/// Receives queued comments from the channel and persists them durably,
/// acknowledging only after the insert succeeds. Undecodable payloads are
/// dead-lettered — they will never parse, so redelivery is pointless.
/// Transient persistence failures abandon the message for redelivery;
/// inserts are idempotent on id, so at-least-once delivery cannot
/// duplicate rows.
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::DurableStore;
use crate::queue::{MessageChannel, MessageDelivery, QueueMessage, QueuePayload};

pub struct CommentConsumer<C: MessageChannel> {
    channel: Arc<C>,
    store: Arc<dyn DurableStore>,
}

impl<C: MessageChannel> CommentConsumer<C> {
    pub fn new(channel: Arc<C>, store: Arc<dyn DurableStore>) -> Self {
        Self { channel, store }
    }

    /// Consume until the channel closes.
    pub async fn run(&self) {
        info!("comment consumer started");
        while let Some(delivery) = self.channel.receive().await {
            self.handle(delivery).await;
        }
        info!("comment consumer stopped");
    }

    /// Process a single delivery through to its acknowledgement.
    pub async fn handle(&self, delivery: C::Delivery) {
        let message = match QueueMessage::decode(delivery.payload()) {
            Ok(message) => message,
            Err(e) => {
                warn!("dead-lettering undecodable message: {}", e);
                if let Err(e) = delivery.dead_letter().await {
                    warn!("dead-letter acknowledgement failed: {}", e);
                }
                return;
            }
        };

        match message.payload {
            QueuePayload::Comment(comment) => {
                match self.store.insert_comment(&comment).await {
                    Ok(()) => {
                        debug!(
                            comment_id = %comment.id,
                            post_id = %comment.post_id,
                            delivery_count = delivery.delivery_count(),
                            "comment persisted"
                        );
                        if let Err(e) = delivery.complete().await {
                            warn!(comment_id = %comment.id, "complete failed: {}", e);
                        }
                    }
                    Err(e) => {
                        warn!(
                            comment_id = %comment.id,
                            "comment persistence failed, abandoning for redelivery: {}",
                            e
                        );
                        if let Err(e) = delivery.abandon().await {
                            warn!(comment_id = %comment.id, "abandon failed: {}", e);
                        }
                    }
                }
            }
            QueuePayload::Post(post) => {
                warn!(post_id = %post.id, "unexpected post payload on comment channel");
                if let Err(e) = delivery.dead_letter().await {
                    warn!("dead-letter acknowledgement failed: {}", e);
                }
            }
        }
    }
}
