/// Asynchronous comment channel
///
/// Comment creation is decoupled from durable persistence: the write path
/// enqueues, a consumer persists. The channel contract is at-least-once
/// delivery with `complete` / `abandon` / `dead_letter` acknowledgement, so
/// any broker with those semantics can sit behind these traits. The crate
/// ships an in-process implementation used by tests and single-node runs.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::error::{AppError, Result};
use crate::models::{Comment, Post};

/// Current wire version of [`QueueMessage`].
pub const QUEUE_MESSAGE_VERSION: u32 = 1;

/// Tagged payload of a queued message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueuePayload {
    Post(Post),
    Comment(Comment),
}

/// Versioned envelope for everything crossing the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub version: u32,
    pub payload: QueuePayload,
}

impl QueueMessage {
    pub fn comment(comment: Comment) -> Self {
        Self {
            version: QUEUE_MESSAGE_VERSION,
            payload: QueuePayload::Comment(comment),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate an incoming message.
    ///
    /// Failures are validation errors: a malformed payload will never parse
    /// on redelivery either, so the consumer dead-letters instead of retrying.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let message: QueueMessage = serde_json::from_slice(bytes)
            .map_err(|e| AppError::Validation(format!("malformed queue message: {}", e)))?;
        if message.version != QUEUE_MESSAGE_VERSION {
            return Err(AppError::Validation(format!(
                "unsupported queue message version {}",
                message.version
            )));
        }
        Ok(message)
    }
}

/// Producer half of the channel.
#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(&self, payload: Vec<u8>) -> Result<()>;
}

/// A single received message with its acknowledgement actions.
#[async_trait]
pub trait MessageDelivery: Send {
    fn payload(&self) -> &[u8];

    /// How many times this message has been delivered (1 on first delivery).
    fn delivery_count(&self) -> u32;

    /// Acknowledge successful processing; the message will not return.
    async fn complete(self) -> Result<()>;

    /// Return the message to the queue for redelivery.
    async fn abandon(self) -> Result<()>;

    /// Park the message as unprocessable; it will not be redelivered.
    async fn dead_letter(self) -> Result<()>;
}

/// Consumer half of the channel.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    type Delivery: MessageDelivery;

    /// Next delivery, or `None` once the channel is closed and drained.
    async fn receive(&self) -> Option<Self::Delivery>;
}

#[derive(Debug, Clone)]
struct QueuedMessage {
    payload: Vec<u8>,
    delivery_count: u32,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<VecDeque<QueuedMessage>>,
    dead: Mutex<Vec<Vec<u8>>>,
    notify: Notify,
    closed: AtomicBool,
}

/// In-process channel with at-least-once redelivery and a dead-letter side
/// queue.
#[derive(Clone, Default)]
pub struct InMemoryCommentQueue {
    shared: Arc<Shared>,
}

impl InMemoryCommentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the channel; `receive` returns `None` once drained.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    /// Messages currently waiting for delivery.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().unwrap().len()
    }

    /// Payloads that have been dead-lettered.
    pub fn dead_letters(&self) -> Vec<Vec<u8>> {
        self.shared.dead.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueSender for InMemoryCommentQueue {
    async fn send(&self, payload: Vec<u8>) -> Result<()> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(AppError::Queue("channel is closed".to_string()));
        }
        self.shared.queue.lock().unwrap().push_back(QueuedMessage {
            payload,
            delivery_count: 0,
        });
        self.shared.notify.notify_one();
        Ok(())
    }
}

#[async_trait]
impl MessageChannel for InMemoryCommentQueue {
    type Delivery = InMemoryDelivery;

    async fn receive(&self) -> Option<InMemoryDelivery> {
        loop {
            {
                let mut queue = self.shared.queue.lock().unwrap();
                if let Some(mut message) = queue.pop_front() {
                    message.delivery_count += 1;
                    return Some(InMemoryDelivery {
                        message,
                        shared: self.shared.clone(),
                    });
                }
            }
            if self.shared.closed.load(Ordering::SeqCst) {
                return None;
            }
            self.shared.notify.notified().await;
        }
    }
}

/// Delivery handle for the in-process channel.
pub struct InMemoryDelivery {
    message: QueuedMessage,
    shared: Arc<Shared>,
}

#[async_trait]
impl MessageDelivery for InMemoryDelivery {
    fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    fn delivery_count(&self) -> u32 {
        self.message.delivery_count
    }

    async fn complete(self) -> Result<()> {
        Ok(())
    }

    async fn abandon(self) -> Result<()> {
        self.shared.queue.lock().unwrap().push_back(self.message);
        self.shared.notify.notify_one();
        Ok(())
    }

    async fn dead_letter(self) -> Result<()> {
        self.shared.dead.lock().unwrap().push(self.message.payload);
        Ok(())
    }
}
