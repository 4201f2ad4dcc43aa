//! The service orchestrator.
//!
//! Startup connects the bus and opens the storage backend; `run` subscribes
//! to both request subjects and serves each message as its own task. On
//! shutdown the service stops reading, lets in-flight requests finish,
//! flushes outstanding responses and finally closes the backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cas_bus::{Bus, BusMessage, NatsBus, GET_SUBJECT, STORE_SUBJECT};
use cas_store::{open_backend, Backend, Storage};
use futures::StreamExt;
use tokio::task::JoinSet;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::handler::RequestHandler;

/// Summary of one `run`, returned after shutdown completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeReport {
    /// Messages taken off the bus.
    pub received: u64,
    /// Request tasks that panicked.
    pub failed_tasks: u64,
}

/// Serves store and get requests from a bus against one storage backend.
pub struct CasService<B: Bus + ?Sized, S: Storage + ?Sized> {
    bus: Arc<B>,
    handler: RequestHandler<S>,
}

impl CasService<NatsBus, Backend> {
    /// Connect to NATS and open the configured backend.
    ///
    /// Any failure here is fatal to startup.
    pub async fn connect(config: &ServiceConfig) -> Result<Self> {
        let bus = NatsBus::connect(&config.nats_url).await?;
        let backend = open_backend(&config.store).await?;
        Ok(Self::new(
            Arc::new(bus),
            Arc::new(backend),
            config.request_timeout,
        ))
    }
}

impl<B, S> CasService<B, S>
where
    B: Bus + ?Sized + 'static,
    S: Storage + ?Sized + 'static,
{
    /// Create a service over an already-connected bus and open backend.
    pub fn new(bus: Arc<B>, storage: Arc<S>, timeout: Duration) -> Self {
        Self {
            bus,
            handler: RequestHandler::new(storage, timeout),
        }
    }

    pub fn handler(&self) -> &RequestHandler<S> {
        &self.handler
    }

    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// Serve requests until `shutdown` resolves or the subscriptions end.
    ///
    /// Subscription failures are returned immediately. Once serving stops the
    /// service drains: in-flight tasks are awaited (each is bounded by the
    /// request deadline), the bus is flushed and the backend is closed.
    pub async fn run<F>(self, shutdown: F) -> Result<ServeReport>
    where
        F: Future<Output = ()> + Send,
    {
        let store_requests = self.bus.subscribe(STORE_SUBJECT).await?;
        let get_requests = self.bus.subscribe(GET_SUBJECT).await?;
        tracing::info!(
            backend = self.handler.storage().name(),
            timeout = ?self.handler.timeout(),
            "serving {STORE_SUBJECT} and {GET_SUBJECT}"
        );

        let mut requests = futures::stream::select(store_requests, get_requests);
        let mut tasks = JoinSet::new();
        let mut report = ServeReport::default();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                next = requests.next() => match next {
                    Some(message) => {
                        report.received += 1;
                        let handler = self.handler.clone();
                        let bus = Arc::clone(&self.bus);
                        tasks.spawn(async move { serve_one(&handler, bus.as_ref(), message).await });
                    }
                    None => {
                        tracing::warn!("request subscriptions ended");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(err) = joined {
                        report.failed_tasks += 1;
                        tracing::error!(error = %err, "request task failed");
                    }
                }
            }
        }

        // Dropping the merged stream unsubscribes both subjects.
        drop(requests);
        self.drain(tasks, &mut report).await
    }

    async fn drain(&self, mut tasks: JoinSet<()>, report: &mut ServeReport) -> Result<ServeReport> {
        let in_flight = tasks.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "waiting for in-flight requests");
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                report.failed_tasks += 1;
                tracing::error!(error = %err, "request task failed");
            }
        }

        if let Err(err) = self.bus.flush().await {
            tracing::warn!(error = %err, "flushing responses failed");
        }

        self.handler.storage().close().await?;
        tracing::info!(
            received = report.received,
            failed_tasks = report.failed_tasks,
            "service stopped"
        );
        Ok(*report)
    }
}

/// Handle one message and publish its response, if it asked for one.
async fn serve_one<B, S>(handler: &RequestHandler<S>, bus: &B, message: BusMessage)
where
    B: Bus + ?Sized,
    S: Storage + ?Sized,
{
    let Some(response) = handler.handle(&message).await else {
        return;
    };
    let Some(reply) = message.reply.as_deref() else {
        tracing::debug!(subject = %message.subject, "no reply subject, response dropped");
        return;
    };
    if let Err(err) = bus.respond(reply, response).await {
        tracing::warn!(subject = %message.subject, error = %err, "failed to publish response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cas_bus::MemoryBus;
    use cas_store::MemoryStore;
    use tokio::sync::oneshot;

    async fn wait_for_subscribers(bus: &MemoryBus) {
        // Requests fail with NoResponders until `run` has subscribed.
        for _ in 0..100 {
            match bus
                .request(GET_SUBJECT, Bytes::new(), Duration::from_secs(1))
                .await
            {
                Ok(_) => return,
                Err(_) => tokio::task::yield_now().await,
            }
        }
        panic!("service never subscribed");
    }

    #[tokio::test]
    async fn test_run_serves_and_drains() {
        let bus = Arc::new(MemoryBus::new());
        let store = Arc::new(MemoryStore::new());
        let service = CasService::new(Arc::clone(&bus), Arc::clone(&store), Duration::from_secs(1));

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let running = tokio::spawn(service.run(async move {
            let _ = stop_rx.await;
        }));
        wait_for_subscribers(&bus).await;

        let pointer = bus
            .request(STORE_SUBJECT, Bytes::from_static(b"hello"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(pointer.len(), 8);

        stop_tx.send(()).unwrap();
        let report = running.await.unwrap().unwrap();
        assert!(report.received >= 2);
        assert_eq!(report.failed_tasks, 0);
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_run_stops_when_bus_closes() {
        let bus = Arc::new(MemoryBus::new());
        let store = Arc::new(MemoryStore::new());
        let service = CasService::new(Arc::clone(&bus), Arc::clone(&store), Duration::from_secs(1));

        let running = tokio::spawn(service.run(std::future::pending()));
        wait_for_subscribers(&bus).await;

        bus.close().await;
        let result = running.await.unwrap();
        assert!(result.is_ok());
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_run_fails_when_subscribe_fails() {
        let bus = Arc::new(MemoryBus::new());
        bus.close().await;
        let store = Arc::new(MemoryStore::new());
        let service = CasService::new(bus, Arc::clone(&store), Duration::from_secs(1));

        let err = service.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, crate::ServiceError::Bus(cas_bus::BusError::Closed)));
        assert!(!store.is_closed());
    }
}
