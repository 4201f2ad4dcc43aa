//! End-to-end tests: the full service over the in-memory bus.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cas_bus::{BusError, MemoryBus, GET_SUBJECT, STORE_SUBJECT};
use cas_core::{canonicalize, digest, Pointer};
use cas_service::{CasService, ServeReport};
use cas_store::{MemoryStore, Storage};
use cas_testkit::{FailingStore, RecordingStore, SlowStore, UnreachableStore};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const DEADLINE: Duration = Duration::from_secs(5);

/// A running service and the handles needed to talk to it and stop it.
struct Harness {
    bus: Arc<MemoryBus>,
    stop: oneshot::Sender<()>,
    running: JoinHandle<cas_service::Result<ServeReport>>,
}

impl Harness {
    async fn start<S: Storage + 'static>(storage: Arc<S>, timeout: Duration) -> Self {
        let bus = Arc::new(MemoryBus::new());
        let service = CasService::new(Arc::clone(&bus), storage, timeout);
        let (stop, stop_rx) = oneshot::channel::<()>();
        let running = tokio::spawn(service.run(async move {
            let _ = stop_rx.await;
        }));

        let harness = Self { bus, stop, running };
        harness.wait_until_subscribed().await;
        harness
    }

    /// Probe with an oversized get: it is answered without touching storage.
    async fn wait_until_subscribed(&self) {
        for _ in 0..100 {
            let probe = Bytes::from_static(&[0u8; 9]);
            match self.bus.request(GET_SUBJECT, probe, DEADLINE).await {
                Err(BusError::NoResponders(_)) => tokio::task::yield_now().await,
                Ok(response) => {
                    assert!(response.is_empty());
                    return;
                }
                Err(err) => panic!("probe failed: {err}"),
            }
        }
        panic!("service never subscribed");
    }

    async fn store(&self, data: &'static [u8]) -> Bytes {
        self.bus
            .request(STORE_SUBJECT, Bytes::from_static(data), DEADLINE)
            .await
            .unwrap()
    }

    async fn get(&self, pointer: &[u8]) -> Bytes {
        self.bus
            .request(GET_SUBJECT, Bytes::copy_from_slice(pointer), DEADLINE)
            .await
            .unwrap()
    }

    async fn shutdown(self) -> ServeReport {
        self.stop.send(()).unwrap();
        self.running.await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn test_store_then_get_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let h = Harness::start(Arc::clone(&store), Duration::from_secs(1)).await;

    let pointer = h.store(br#"{"x": 1}"#).await;
    assert_eq!(hex::encode(&pointer), "b27329cf642a3070");

    let data = h.get(&pointer).await;
    assert_eq!(&data[..], br#"{"x":1}"#);

    // A second store of the same document yields the same pointer and the
    // stored bytes are identical to its canonical form.
    let again = h.store(br#"{ "x" : 1 }"#).await;
    assert_eq!(again, pointer);
    assert_eq!(data, canonicalize(Bytes::from_static(br#"{"x": 1}"#)));

    h.shutdown().await;
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_equivalent_documents_share_pointer() {
    let h = Harness::start(Arc::new(MemoryStore::new()), Duration::from_secs(1)).await;

    let a = h.store(br#"{"a":1,"b":2}"#).await;
    let b = h.store(br#"{"b": 2, "a": 1}"#).await;
    assert_eq!(a, b);
    assert_eq!(hex::encode(&a), "ed824b0b85e70bb8");

    h.shutdown().await;
}

#[tokio::test]
async fn test_not_json_stored_verbatim() {
    let h = Harness::start(Arc::new(MemoryStore::new()), Duration::from_secs(1)).await;

    let pointer = h.store(b"not json").await;
    assert_eq!(&pointer[..], digest(b"not json").as_bytes());
    assert_eq!(&h.get(&pointer).await[..], b"not json");

    let binary = h.store(&[0xde, 0xad, 0xbe, 0xef]).await;
    assert_eq!(hex::encode(&binary), "637619342d4cb764");
    assert_eq!(&h.get(&binary).await[..], &[0xde, 0xad, 0xbe, 0xef]);

    h.shutdown().await;
}

#[tokio::test]
async fn test_get_absent_is_empty() {
    let h = Harness::start(Arc::new(MemoryStore::new()), Duration::from_secs(1)).await;
    assert!(h.get(Pointer::from_bytes([9; 8]).as_bytes()).await.is_empty());
    h.shutdown().await;
}

#[tokio::test]
async fn test_oversized_pointer_never_reaches_backend() {
    let recording = Arc::new(RecordingStore::new(MemoryStore::new()));
    let h = Harness::start(Arc::clone(&recording), Duration::from_secs(1)).await;

    assert!(h.get(&[0u8; 9]).await.is_empty());
    assert!(h.get(&[0u8; 32]).await.is_empty());
    assert_eq!(recording.get_calls(), 0);

    // A short pointer is a legitimate lookup that simply misses.
    assert!(h.get(b"abc").await.is_empty());
    assert_eq!(recording.get_calls(), 1);

    h.shutdown().await;
}

#[tokio::test]
async fn test_oversized_pointer_with_forbidden_backend() {
    let h = Harness::start(Arc::new(UnreachableStore), Duration::from_secs(1)).await;

    assert!(h.get(&[0u8; 9]).await.is_empty());
    let report = h.shutdown().await;
    assert_eq!(report.failed_tasks, 0);
}

#[tokio::test]
async fn test_backend_errors_respond_empty() {
    let h = Harness::start(Arc::new(FailingStore::new()), Duration::from_secs(1)).await;

    assert!(h.store(b"anything").await.is_empty());
    assert!(h.get(&[1u8; 8]).await.is_empty());

    let report = h.shutdown().await;
    assert_eq!(report.failed_tasks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_times_out_to_empty() {
    let slow = Arc::new(SlowStore::new(MemoryStore::new(), Duration::from_secs(30)));
    let h = Harness::start(slow, Duration::from_millis(200)).await;

    assert!(h.store(b"late").await.is_empty());
    assert!(h.get(&[1u8; 8]).await.is_empty());

    h.shutdown().await;
}

#[tokio::test]
async fn test_message_without_reply_is_processed_silently() {
    let store = Arc::new(MemoryStore::new());
    let h = Harness::start(Arc::clone(&store), Duration::from_secs(1)).await;
    let responses_before = h.bus.response_count();

    h.bus
        .publish(STORE_SUBJECT, Bytes::from_static(b"fire and forget"))
        .await
        .unwrap();

    // Nothing comes back, so poll until the write lands.
    let pointer = digest(b"fire and forget");
    for _ in 0..100 {
        if store.contains(&pointer).await {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(store.contains(&pointer).await);
    assert_eq!(h.bus.response_count(), responses_before);

    h.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_requests() {
    let store = Arc::new(MemoryStore::new());
    let h = Harness::start(Arc::clone(&store), Duration::from_secs(1)).await;
    let bus = Arc::clone(&h.bus);

    let mut requests = Vec::new();
    for i in 0..50u32 {
        let bus = Arc::clone(&bus);
        requests.push(tokio::spawn(async move {
            let body = Bytes::from(format!(r#"{{"n": {}}}"#, i % 10));
            bus.request(STORE_SUBJECT, body, DEADLINE).await.unwrap()
        }));
    }

    let mut pointers = Vec::new();
    for request in requests {
        pointers.push(request.await.unwrap());
    }
    assert!(pointers.iter().all(|p| p.len() == 8));

    assert_eq!(store.len().await, 10);
    for pointer in &pointers {
        let data = h.get(pointer).await;
        assert!(data.starts_with(br#"{"n":"#));
    }

    let report = h.shutdown().await;
    assert_eq!(report.failed_tasks, 0);
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_requests() {
    let slow = Arc::new(SlowStore::new(MemoryStore::new(), Duration::from_millis(100)));
    let h = Harness::start(Arc::clone(&slow), Duration::from_secs(1)).await;
    let bus = Arc::clone(&h.bus);

    let pending = tokio::spawn(async move {
        bus.request(STORE_SUBJECT, Bytes::from_static(b"in flight"), DEADLINE)
            .await
    });
    // Let the request reach the service before stopping it.
    tokio::time::sleep(Duration::from_millis(20)).await;

    h.shutdown().await;
    let pointer = pending.await.unwrap().unwrap();
    assert_eq!(&pointer[..], digest(b"in flight").as_bytes());
    assert!(slow.inner().is_closed());
}
