// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet store - a named, time-ordered, byte-bounded telemetry buffer
//!
//! Enforces the store capacity on every insertion via FIFO eviction for
//! circular stores, or insert rejection for bounded stores.

mod buffer;
mod id;

pub use id::{PacketStoreId, PacketStoreIdError};

use serde::{Deserialize, Serialize};

use self::buffer::PacketBuffer;
use crate::error::StorageError;
use crate::time::TimeTag;

/// Eviction policy of a packet store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStoreType {
    /// Oldest packets are evicted to admit new ones
    Circular,
    /// New packets are refused once full
    Bounded,
}

impl PacketStoreType {
    /// Wire code (0 circular, 1 bounded).
    pub const fn code(self) -> u8 {
        match self {
            Self::Circular => 0,
            Self::Bounded => 1,
        }
    }

    /// Decode a wire code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Circular),
            1 => Some(Self::Bounded),
            _ => None,
        }
    }
}

/// State of the open-retrieval streaming job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenRetrievalStatus {
    /// Downlink task streams packets from the start tag onwards
    InProgress,
    /// Streaming halted
    Suspended,
}

/// Outstanding by-time-range retrieval window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByTimeRangeRetrieval {
    /// First time tag to retrieve
    pub start: TimeTag,
    /// Last time tag to retrieve
    pub end: TimeTag,
}

/// A stamped telemetry message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPacket {
    /// Time tag assigned on insertion
    pub time_tag: TimeTag,
    /// Encoded telemetry message
    pub data: Vec<u8>,
}

impl StoredPacket {
    /// Size accounted against the store capacity.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Result of a telemetry insertion that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    /// Packet appended, after evicting `evicted` older packets
    Stored {
        /// Packets evicted from the front to make room
        evicted: usize,
    },
    /// Storage function disabled, message dropped silently
    StorageDisabled,
    /// No store routed for the originating service
    NotRouted,
}

/// Packet store.
///
/// # Invariants
///
/// - packets are ordered by non-decreasing time tag
/// - the summed packet size never exceeds `capacity_bytes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketStore {
    pub(crate) capacity_bytes: u32,
    pub(crate) store_type: PacketStoreType,
    pub(crate) virtual_channel: u8,
    pub(crate) storage_status: bool,
    pub(crate) open_retrieval_status: OpenRetrievalStatus,
    pub(crate) open_retrieval_start_tag: TimeTag,
    pub(crate) by_time_range_retrieval: Option<ByTimeRangeRetrieval>,
    pub(crate) retrieval_priority: u16,
    pub(crate) packets: PacketBuffer,
}

impl PacketStore {
    /// Create an empty store with storage disabled and open retrieval suspended.
    pub fn new(capacity_bytes: u32, store_type: PacketStoreType, virtual_channel: u8) -> Self {
        Self {
            capacity_bytes,
            store_type,
            virtual_channel,
            storage_status: false,
            open_retrieval_status: OpenRetrievalStatus::Suspended,
            open_retrieval_start_tag: 0,
            by_time_range_retrieval: None,
            retrieval_priority: 0,
            packets: PacketBuffer::new(),
        }
    }

    /// Configured capacity in bytes.
    pub const fn capacity_bytes(&self) -> u32 {
        self.capacity_bytes
    }

    /// Eviction policy.
    pub const fn store_type(&self) -> PacketStoreType {
        self.store_type
    }

    /// Downlink virtual channel.
    pub const fn virtual_channel(&self) -> u8 {
        self.virtual_channel
    }

    /// Whether incoming reports are stored.
    pub const fn storage_status(&self) -> bool {
        self.storage_status
    }

    /// Open-retrieval job state.
    pub const fn open_retrieval_status(&self) -> OpenRetrievalStatus {
        self.open_retrieval_status
    }

    /// Where open retrieval resumes streaming.
    pub const fn open_retrieval_start_tag(&self) -> TimeTag {
        self.open_retrieval_start_tag
    }

    /// Outstanding by-time-range retrieval, if any.
    pub const fn by_time_range_retrieval(&self) -> Option<ByTimeRangeRetrieval> {
        self.by_time_range_retrieval
    }

    /// Whether a by-time-range retrieval is outstanding.
    pub const fn by_time_range_retrieval_status(&self) -> bool {
        self.by_time_range_retrieval.is_some()
    }

    /// Priority of the last retrieval request that carried one.
    pub const fn retrieval_priority(&self) -> u16 {
        self.retrieval_priority
    }

    /// Stored packets, oldest first.
    pub fn packets(&self) -> impl DoubleEndedIterator<Item = &StoredPacket> + '_ {
        self.packets.iter()
    }

    /// Number of stored packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Whether the store holds no packets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Time tag of the oldest packet.
    pub fn oldest_time_tag(&self) -> Option<TimeTag> {
        self.packets.front().map(|p| p.time_tag)
    }

    /// Time tag of the newest packet.
    pub fn newest_time_tag(&self) -> Option<TimeTag> {
        self.packets.back().map(|p| p.time_tag)
    }

    /// Bytes currently stored (counted, not cached).
    pub fn stored_bytes(&self) -> usize {
        self.packets.iter().map(StoredPacket::size).sum()
    }

    /// Insert a telemetry message stamped with `time_tag`.
    ///
    /// Dropped without error while storage is disabled. Empty messages are
    /// refused. A full bounded store rejects the message; a full circular
    /// store evicts from the front until it fits. Rejections leave the store
    /// unchanged.
    pub fn insert(&mut self, time_tag: TimeTag, data: &[u8]) -> Result<InsertOutcome, StorageError> {
        if !self.storage_status {
            return Ok(InsertOutcome::StorageDisabled);
        }
        self.admit(time_tag, data)
            .map(|evicted| InsertOutcome::Stored { evicted })
    }

    /// Apply the capacity rule regardless of the storage status.
    ///
    /// Returns the number of evicted packets.
    pub(crate) fn admit(&mut self, time_tag: TimeTag, data: &[u8]) -> Result<usize, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyMessage);
        }
        if let Some(newest) = self.newest_time_tag() {
            if time_tag < newest {
                return Err(StorageError::OutOfOrder {
                    tag: time_tag,
                    newest,
                });
            }
        }

        let size = data.len();
        let capacity = self.capacity_bytes as usize;
        if size > capacity {
            return Err(StorageError::MessageExceedsCapacity { size, capacity });
        }

        let mut evicted = 0;
        if self.packets.quota_bytes() + size > capacity {
            match self.store_type {
                PacketStoreType::Bounded => return Err(StorageError::PacketStoreFull),
                PacketStoreType::Circular => {
                    while self.packets.quota_bytes() + size > capacity {
                        if self.packets.pop_front().is_none() {
                            break;
                        }
                        evicted += 1;
                    }
                }
            }
        }

        self.packets.push_back(StoredPacket {
            time_tag,
            data: data.to_vec(),
        });
        Ok(evicted)
    }

    /// Change the capacity, evicting the oldest packets that no longer fit.
    ///
    /// Returns the number of evicted packets.
    pub(crate) fn resize(&mut self, capacity_bytes: u32) -> usize {
        self.capacity_bytes = capacity_bytes;
        let capacity = capacity_bytes as usize;
        let mut evicted = 0;
        while self.packets.quota_bytes() > capacity {
            if self.packets.pop_front().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }
}
