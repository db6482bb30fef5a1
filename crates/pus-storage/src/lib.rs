// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # PUS Storage - ECSS ST[15] Storage and Retrieval engine
//!
//! Buffers already-filtered telemetry reports in named, fixed-capacity
//! packet stores and serves the operator commands that manage them:
//! enabling/disabling storage, open retrieval, by-time-range retrieval,
//! content deletion, inter-store copy and the status/configuration/content
//! summary reports.
//!
//! ## Design Constraints
//!
//! - **Bounded**: store count, routing table and identifiers use
//!   fixed-capacity containers; every store has a hard byte ceiling
//! - **Synchronous**: each command runs to completion; retrievals are state
//!   flags consumed by an external downlink task
//! - **Per-item failures**: batch commands report one error per rejected
//!   store id and keep going
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------+
//! |  StorageAndRetrievalService (command facade)  |
//! +-----------------------------------------------+
//!      |              |                 |
//!      v              v                 v
//! +-----------+  +-----------+  +-----------------+
//! |  guard    |  | retrieval |  |  ServiceRouter  |
//! +-----------+  +-----------+  +-----------------+
//!      |              |                 |
//!      v              v                 v
//! +-----------------------------------------------+
//! |  StoreRegistry -> PacketStore (circular/bnd)  |
//! +-----------------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```
//! use pus_storage::{
//!     ManualClock, PacketStoreDefinition, PacketStoreId, PacketStoreType, PlatformConfig,
//!     RecordingSink, Request, ServiceRoute, StorageAndRetrievalService,
//! };
//!
//! let hk = PacketStoreId::new("hk").unwrap();
//! let config = PlatformConfig::builder()
//!     .route(ServiceRoute::new(3, hk.clone()))
//!     .build();
//! let mut service = StorageAndRetrievalService::with_clock(config, ManualClock::new(100)).unwrap();
//! let mut sink = RecordingSink::new();
//!
//! service.execute(
//!     &Request::CreatePacketStores {
//!         stores: vec![PacketStoreDefinition::new(hk.clone(), 512, PacketStoreType::Circular, 1)],
//!     },
//!     &mut sink,
//! );
//! service.execute(&Request::EnableStorage { stores: vec![hk.clone()] }, &mut sink);
//! service.store_report(3, &[0x0a, 0x0b]).unwrap();
//!
//! assert_eq!(service.registry().get(&hk).map(|s| s.len()), Some(1));
//! assert!(sink.failures.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Platform limits and capabilities (TOML-loadable)
pub mod config;

/// Error types for every failure channel
pub mod error;

/// Lifecycle guard: which mutations are legal during retrievals
pub mod guard;

/// Store registry (fixed-capacity map of packet stores)
pub mod registry;

/// Outbound reports and the sink they are emitted to
pub mod report;

/// Inbound, already-decoded command values
pub mod request;

/// Time-window copy, time-limited deletion, content summary
pub mod retrieval;

/// Service-type to packet-store routing table
pub mod routing;

/// Command facade
pub mod service;

/// Serialised registry layout for non-volatile backing
pub mod snapshot;

/// Packet store entity, insertion and eviction
pub mod store;

/// Time tags and clocks
pub mod time;

pub use crate::config::{Capabilities, ConfigError, PlatformConfig, ServiceRoute, VirtualChannelRange};
pub use crate::error::{
    ErrorCategory, ExecutionError, InternalError, RoutingError, SnapshotError, StorageError,
};
pub use crate::guard::Mutation;
pub use crate::registry::StoreRegistry;
pub use crate::report::{
    ContentSummary, PacketStoreConfiguration, PacketStoreStatus, RecordingSink, Report,
    RequestFailure, ServiceSink,
};
pub use crate::request::{
    MessageType, PacketStoreDefinition, PacketStoreResize, Request, TimeRangeRetrievalRequest,
};
pub use crate::retrieval::{CopyOutcome, TimeWindow, TimeWindowType};
pub use crate::routing::ServiceRouter;
pub use crate::service::StorageAndRetrievalService;
pub use crate::snapshot::{RegistrySnapshot, StoreSnapshot};
pub use crate::store::{
    ByTimeRangeRetrieval, InsertOutcome, OpenRetrievalStatus, PacketStore, PacketStoreId,
    PacketStoreType, StoredPacket,
};
pub use crate::time::{Clock, ManualClock, SystemClock, TimeTag};

/// ECSS service type of Storage and Retrieval
pub const SERVICE_TYPE: u8 = 15;

/// Maximum length of a packet store identifier, in bytes
pub const MAX_PACKET_STORE_ID_LEN: usize = 16;

/// Compile-time ceiling on the number of packet stores
pub const MAX_PACKET_STORES: usize = 16;

/// Compile-time ceiling on service-type routes
pub const MAX_SERVICE_ROUTES: usize = 32;

/// Maximum size of a single stored telemetry message (MTU)
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Version of PUS Storage
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
