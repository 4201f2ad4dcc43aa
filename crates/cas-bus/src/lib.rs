//! # CAS Bus
//!
//! Message bus abstraction for the content-addressable store. Provides a
//! trait-based request/reply interface with NATS and in-memory transports.
//!
//! ## Overview
//!
//! Requests arrive on two subjects:
//!
//! - [`STORE_SUBJECT`] (`conthesis.cas.store`): body is a blob, the reply is
//!   its 8-byte pointer
//! - [`GET_SUBJECT`] (`conthesis.cas.get`): body is a pointer, the reply is
//!   the stored bytes
//!
//! Each delivered [`BusMessage`] carries an optional reply subject. Messages
//! without one are still processed, but nothing is sent back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cas_bus::{Bus, NatsBus, GET_SUBJECT};
//! use futures::StreamExt;
//!
//! async fn example() {
//!     let bus = NatsBus::connect("nats://localhost:4222").await.unwrap();
//!     let mut requests = bus.subscribe(GET_SUBJECT).await.unwrap();
//!
//!     while let Some(msg) = requests.next().await {
//!         if let Some(reply) = msg.reply {
//!             bus.respond(&reply, msg.payload).await.unwrap();
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod messages;
pub mod nats;
pub mod transport;

pub use error::{BusError, Result};
pub use messages::{BusMessage, GET_SUBJECT, STORE_SUBJECT};
pub use nats::NatsBus;
pub use transport::{memory::MemoryBus, Bus, Subscription};
