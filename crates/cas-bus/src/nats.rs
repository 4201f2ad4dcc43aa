//! NATS implementation of the Bus trait.

use std::time::Duration;

use async_nats::client::RequestErrorKind;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::error::{BusError, Result};
use crate::messages::BusMessage;
use crate::transport::{Bus, Subscription};

/// NATS-backed bus.
///
/// The client multiplexes every subscription and publish over one
/// connection; cloning it is cheap.
#[derive(Debug, Clone)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to the NATS server at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::Connect(format!("{url}: {e}")))?;
        tracing::info!(url, "connected to nats");
        Ok(Self::from_client(client))
    }

    /// Wrap an existing client.
    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    /// Publish on `subject` and wait up to `timeout` for one reply.
    pub async fn request(&self, subject: &str, payload: Bytes, timeout: Duration) -> Result<Bytes> {
        let request = self.client.request(subject.to_string(), payload);
        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(message)) => Ok(message.payload),
            Ok(Err(err)) => match err.kind() {
                RequestErrorKind::NoResponders => {
                    Err(BusError::NoResponders(subject.to_string()))
                }
                RequestErrorKind::TimedOut => Err(BusError::Timeout(timeout)),
                _ => Err(BusError::Transport(err.to_string())),
            },
            Err(_) => Err(BusError::Timeout(timeout)),
        }
    }
}

#[async_trait]
impl Bus for NatsBus {
    async fn subscribe(&self, subject: &str) -> Result<Subscription> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::Subscribe {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(subject, "subscribed");

        Ok(subscriber
            .map(|message| BusMessage {
                subject: message.subject.to_string(),
                reply: message.reply.map(|reply| reply.to_string()),
                payload: message.payload,
            })
            .boxed())
    }

    async fn respond(&self, reply: &str, payload: Bytes) -> Result<()> {
        self.client
            .publish(reply.to_string(), payload)
            .await
            .map_err(|e| BusError::Publish {
                subject: reply.to_string(),
                reason: e.to_string(),
            })
    }

    async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .map_err(|e| BusError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = NatsBus::connect("nats://[::1").await.unwrap_err();
        assert!(matches!(err, BusError::Connect(_)));
    }
}
