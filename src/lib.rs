//! # door-bridge
//!
//! Minimal bridge between an MQTT publish/subscribe broker and a durable
//! local SQLite record store. The service subscribes to a single topic and
//! appends every received payload as one timestamped row in the
//! `door_status` table.
//!
//! ## Architecture
//!
//! ```text
//! MQTT Broker
//!     │
//!     ├── ConnectionManager (broker/)
//!     │       one sequential receive loop, subscribe on CONNACK
//!     │
//!     ├── StatusSink (persistence/)
//!     │       handler seam between network and storage
//!     │
//!     └── SqlitePersister → door_status table (SQLite file)
//! ```
//!
//! There is exactly one writer and no concurrency between messages: the
//! storage round trip for message N completes before message N+1 is polled
//! off the event loop.

pub mod broker;
pub mod config;
pub mod error;
pub mod persistence;
