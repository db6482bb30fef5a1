// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for PUS Storage
//!
//! Three channels are kept apart:
//!
//! - [`ExecutionError`] -- one per rejected request item, reported to the
//!   operator through [`crate::ServiceSink::request_failed`]
//! - [`InternalError`] -- programming-invariant violations, reported through
//!   [`crate::ServiceSink::internal_error`]
//! - [`StorageError`] -- the telemetry insertion path, returned to the
//!   producer (non-fatal)

use serde::Serialize;
use thiserror::Error;

use crate::time::TimeTag;

/// Coarse error taxonomy used by ground tooling to group failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Referenced packet store id is unknown
    NotFound,
    /// Create collides with an existing id
    AlreadyExists,
    /// Registry full, size too large, channel out of range
    Capacity,
    /// A retrieval or the storage function blocks the mutation
    Busy,
    /// Malformed or unsatisfiable time window
    Window,
}

/// Execution-start failure for a single request item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionError {
    /// Packet store does not exist
    #[error("packet store does not exist")]
    NonExistingPacketStore,

    /// Packet store id already in use
    #[error("packet store already exists")]
    AlreadyExistingPacketStore,

    /// Registry holds the platform maximum of stores
    #[error("maximum number of packet stores reached")]
    MaxNumberOfPacketStoresReached,

    /// Requested size is zero or above the platform maximum
    #[error("packet store size cannot be handled by the platform")]
    UnableToHandlePacketStoreSize,

    /// Virtual channel outside the platform range
    #[error("virtual channel out of range")]
    InvalidVirtualChannel,

    /// Storage function still enabled (blocks deletion)
    #[error("storage function is enabled on the packet store")]
    StorageStatusEnabled,

    /// Open retrieval in progress
    #[error("open retrieval is in progress on the packet store")]
    OpenRetrievalInProgress,

    /// By-time-range retrieval outstanding
    #[error("by-time-range retrieval is in progress on the packet store")]
    ByTimeRangeRetrievalInProgress,

    /// A by-time-range retrieval is already enabled
    #[error("by-time-range retrieval already enabled")]
    ByTimeRangeRetrievalAlreadyEnabled,

    /// Start tag not strictly before end tag
    #[error("invalid time window")]
    InvalidTimeWindow,

    /// Window lies entirely outside the stored packets
    #[error("time window does not overlap the stored packets")]
    NoTimeWindowOverlap,

    /// Copy destination holds packets
    #[error("destination packet store is not empty")]
    DestinationPacketStoreNotEmpty,

    /// Copy source holds no packets
    #[error("copy of packets failed")]
    CopyOfPacketsFailed,

    /// A service still routes its reports into the store
    #[error("packet store is the routing target of a service")]
    PacketStoreStillRouted,
}

impl ExecutionError {
    /// Taxonomy bucket of this error.
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::NonExistingPacketStore => ErrorCategory::NotFound,
            Self::AlreadyExistingPacketStore => ErrorCategory::AlreadyExists,
            Self::MaxNumberOfPacketStoresReached
            | Self::UnableToHandlePacketStoreSize
            | Self::InvalidVirtualChannel => ErrorCategory::Capacity,
            Self::StorageStatusEnabled
            | Self::OpenRetrievalInProgress
            | Self::ByTimeRangeRetrievalInProgress
            | Self::ByTimeRangeRetrievalAlreadyEnabled
            | Self::PacketStoreStillRouted => ErrorCategory::Busy,
            Self::InvalidTimeWindow
            | Self::NoTimeWindowOverlap
            | Self::DestinationPacketStoreNotEmpty
            | Self::CopyOfPacketsFailed => ErrorCategory::Window,
        }
    }
}

/// Internal failure, not caused by a malformed request item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalError {
    /// Window-type discriminator outside the known codes
    #[error("invalid time window type code {0}")]
    InvalidTimeWindowType(u8),
}

/// Telemetry insertion failure (the message is not retained).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Bounded store has no room left
    #[error("packet store is full")]
    PacketStoreFull,

    /// Message alone is larger than the store
    #[error("message of {size} bytes exceeds packet store capacity of {capacity} bytes")]
    MessageExceedsCapacity {
        /// Message size in bytes
        size: usize,
        /// Store capacity in bytes
        capacity: usize,
    },

    /// Message larger than the platform maximum
    #[error("message of {size} bytes exceeds platform maximum of {max} bytes")]
    MessageTooLarge {
        /// Message size in bytes
        size: usize,
        /// Platform maximum in bytes
        max: usize,
    },

    /// Time tag older than the newest stored packet
    #[error("time tag {tag} precedes newest stored packet at {newest}")]
    OutOfOrder {
        /// Rejected time tag
        tag: TimeTag,
        /// Newest time tag already stored
        newest: TimeTag,
    },

    /// Zero-length message
    #[error("empty message")]
    EmptyMessage,

    /// Route points at a store that does not exist
    #[error("routed packet store does not exist")]
    UnknownPacketStore,
}

/// Routing table errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No free slot for another service route
    #[error("routing table full ({} routes)", crate::MAX_SERVICE_ROUTES)]
    TableFull,
}

/// Snapshot (non-volatile backing) errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is not valid JSON for the expected layout
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot content violates a registry or store invariant
    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}
