//! Bus abstraction for request/reply messaging.
//!
//! The service consumes messages through [`Bus::subscribe`] and answers with
//! [`Bus::respond`]. Implementations may use NATS or any other broker.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::messages::BusMessage;

/// A stream of messages delivered on one subject.
///
/// Dropping the subscription unsubscribes.
pub type Subscription = BoxStream<'static, BusMessage>;

/// Bus trait for subscribing and replying.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Bus: Send + Sync {
    /// Start receiving messages published on `subject`.
    async fn subscribe(&self, subject: &str) -> Result<Subscription>;

    /// Publish a response on a reply subject.
    async fn respond(&self, reply: &str, payload: Bytes) -> Result<()>;

    /// Wait until everything published so far has left the process.
    async fn flush(&self) -> Result<()>;
}

#[async_trait]
impl<B: Bus + ?Sized> Bus for std::sync::Arc<B> {
    async fn subscribe(&self, subject: &str) -> Result<Subscription> {
        (**self).subscribe(subject).await
    }

    async fn respond(&self, reply: &str, payload: Bytes) -> Result<()> {
        (**self).respond(reply, payload).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }
}

/// A simple in-memory bus for testing.
///
/// Uses channels to route messages between subscribers and requesters inside
/// one process.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::sync::{mpsc, oneshot, RwLock};

    use crate::error::BusError;

    /// Prefix for reply subjects created by [`MemoryBus::request`].
    pub const INBOX_PREFIX: &str = "_INBOX.";

    /// In-memory bus implementation.
    #[derive(Default)]
    pub struct MemoryBus {
        /// Subscriber channels per subject.
        subscribers: RwLock<HashMap<String, Vec<mpsc::UnboundedSender<BusMessage>>>>,
        /// Outstanding requests waiting on their inbox.
        pending: RwLock<HashMap<String, oneshot::Sender<Bytes>>>,
        next_inbox: AtomicU64,
        responses: AtomicUsize,
        closed: AtomicBool,
    }

    impl MemoryBus {
        /// Create a new, empty bus.
        pub fn new() -> Self {
            Self::default()
        }

        /// Publish without expecting a reply.
        pub async fn publish(&self, subject: &str, payload: Bytes) -> Result<()> {
            self.deliver(BusMessage::new(subject, payload)).await.map(|_| ())
        }

        /// Publish and wait up to `timeout` for a single reply.
        pub async fn request(&self, subject: &str, payload: Bytes, timeout: Duration) -> Result<Bytes> {
            let inbox = format!(
                "{INBOX_PREFIX}{}",
                self.next_inbox.fetch_add(1, Ordering::Relaxed)
            );
            let (tx, rx) = oneshot::channel();
            self.pending.write().await.insert(inbox.clone(), tx);

            let message = BusMessage::new(subject, payload).with_reply(inbox.clone());
            let delivered = match self.deliver(message).await {
                Ok(delivered) => delivered,
                Err(err) => {
                    self.pending.write().await.remove(&inbox);
                    return Err(err);
                }
            };
            if delivered == 0 {
                self.pending.write().await.remove(&inbox);
                return Err(BusError::NoResponders(subject.to_string()));
            }

            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(payload)) => Ok(payload),
                Ok(Err(_)) => Err(BusError::Closed),
                Err(_) => {
                    self.pending.write().await.remove(&inbox);
                    Err(BusError::Timeout(timeout))
                }
            }
        }

        /// Number of responses published so far.
        pub fn response_count(&self) -> usize {
            self.responses.load(Ordering::Acquire)
        }

        /// Close the bus. All subscriptions end and later calls fail.
        pub async fn close(&self) {
            self.closed.store(true, Ordering::Release);
            self.subscribers.write().await.clear();
            self.pending.write().await.clear();
        }

        fn ensure_open(&self) -> Result<()> {
            if self.closed.load(Ordering::Acquire) {
                return Err(BusError::Closed);
            }
            Ok(())
        }

        /// Hand `message` to every live subscriber of its subject.
        ///
        /// Returns how many subscribers received it.
        async fn deliver(&self, message: BusMessage) -> Result<usize> {
            self.ensure_open()?;
            let mut subscribers = self.subscribers.write().await;
            let Some(senders) = subscribers.get_mut(&message.subject) else {
                return Ok(0);
            };
            senders.retain(|tx| tx.send(message.clone()).is_ok());
            Ok(senders.len())
        }
    }

    #[async_trait]
    impl Bus for MemoryBus {
        async fn subscribe(&self, subject: &str) -> Result<Subscription> {
            self.ensure_open()?;
            let (tx, rx) = mpsc::unbounded_channel();
            self.subscribers
                .write()
                .await
                .entry(subject.to_string())
                .or_default()
                .push(tx);

            Ok(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|message| (message, rx))
            })
            .boxed())
        }

        async fn respond(&self, reply: &str, payload: Bytes) -> Result<()> {
            self.ensure_open()?;
            self.responses.fetch_add(1, Ordering::AcqRel);

            let waiter = self.pending.write().await.remove(reply);
            match waiter {
                // The requester may have given up already.
                Some(tx) => {
                    let _ = tx.send(payload);
                }
                None => {
                    self.deliver(BusMessage::new(reply, payload)).await?;
                }
            }
            Ok(())
        }

        async fn flush(&self) -> Result<()> {
            self.ensure_open()
        }
    }
}
