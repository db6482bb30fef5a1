// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound requests
//!
//! Requests arrive already decoded: identifiers have been length-checked and
//! numeric fields are plain integers. An empty store list on a command that
//! accepts one means "every store".

use serde::{Deserialize, Serialize};

use crate::retrieval::TimeWindowType;
use crate::store::{PacketStoreId, PacketStoreType};
use crate::time::TimeTag;

/// ST[15] message subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MessageType {
    /// TC[15,1]
    EnableStorageInPacketStores = 1,
    /// TC[15,2]
    DisableStorageInPacketStores = 2,
    /// TC[15,9]
    StartByTimeRangeRetrieval = 9,
    /// TC[15,11]
    DeletePacketStoreContent = 11,
    /// TC[15,12]
    ReportContentSummaryOfPacketStores = 12,
    /// TM[15,13]
    PacketStoreContentSummaryReport = 13,
    /// TC[15,14]
    ChangeOpenRetrievalStartingTime = 14,
    /// TC[15,15]
    ResumeOpenRetrievalOfPacketStores = 15,
    /// TC[15,16]
    SuspendOpenRetrievalOfPacketStores = 16,
    /// TC[15,17]
    AbortByTimeRangeRetrieval = 17,
    /// TC[15,18]
    ReportStatusOfPacketStores = 18,
    /// TM[15,19]
    PacketStoresStatusReport = 19,
    /// TC[15,20]
    CreatePacketStores = 20,
    /// TC[15,21]
    DeletePacketStores = 21,
    /// TC[15,22]
    ReportConfigurationOfPacketStores = 22,
    /// TM[15,23]
    PacketStoreConfigurationReport = 23,
    /// TC[15,24]
    CopyPacketsInTimeWindow = 24,
    /// TC[15,25]
    ResizePacketStores = 25,
    /// TC[15,26]
    ChangeTypeToCircular = 26,
    /// TC[15,27]
    ChangeTypeToBounded = 27,
    /// TC[15,28]
    ChangeVirtualChannel = 28,
}

impl MessageType {
    /// Subtype number.
    pub const fn subtype(self) -> u8 {
        self as u8
    }
}

/// One store of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketStoreDefinition {
    /// New store identifier
    pub id: PacketStoreId,
    /// Capacity in bytes
    pub size_bytes: u32,
    /// Eviction policy
    pub store_type: PacketStoreType,
    /// Downlink virtual channel
    pub virtual_channel: u8,
}

impl PacketStoreDefinition {
    /// Create a store definition.
    pub fn new(
        id: PacketStoreId,
        size_bytes: u32,
        store_type: PacketStoreType,
        virtual_channel: u8,
    ) -> Self {
        Self {
            id,
            size_bytes,
            store_type,
            virtual_channel,
        }
    }
}

/// One store of a resize request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketStoreResize {
    /// Store to resize
    pub id: PacketStoreId,
    /// New capacity in bytes
    pub size_bytes: u32,
}

/// One store of a start-by-time-range-retrieval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeRetrievalRequest {
    /// Store to retrieve from
    pub store: PacketStoreId,
    /// First tag to retrieve
    pub start: TimeTag,
    /// Last tag to retrieve
    pub end: TimeTag,
    /// Retrieval priority (honoured when the platform prioritises)
    #[serde(default)]
    pub priority: Option<u16>,
}

/// Storage and Retrieval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Enable the storage function
    EnableStorage {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Disable the storage function
    DisableStorage {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Start by-time-range retrievals
    StartByTimeRangeRetrieval {
        /// One window per store
        retrievals: Vec<TimeRangeRetrievalRequest>,
    },
    /// Delete packets up to a time limit
    DeletePacketStoreContent {
        /// Last tag to delete
        time_limit: TimeTag,
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Report content summaries
    ReportContentSummary {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Move the open-retrieval start tag
    ChangeOpenRetrievalStartTag {
        /// New start tag
        start_tag: TimeTag,
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Resume open retrieval
    ResumeOpenRetrieval {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
        /// Retrieval priority (honoured when the platform prioritises)
        #[serde(default)]
        priority: Option<u16>,
    },
    /// Suspend open retrieval
    SuspendOpenRetrieval {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Abort by-time-range retrievals
    AbortByTimeRangeRetrieval {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Report the status of every store
    ReportStatus,
    /// Report the configuration of every store
    ReportConfiguration,
    /// Create packet stores
    CreatePacketStores {
        /// Stores to create
        stores: Vec<PacketStoreDefinition>,
    },
    /// Delete packet stores
    DeletePacketStores {
        /// Target stores (empty: all)
        #[serde(default)]
        stores: Vec<PacketStoreId>,
    },
    /// Copy the packets of a time window into an empty store
    CopyPacketsInTimeWindow {
        /// Window type code (0 from-to, 1 after, 2 before)
        time_window_type: u8,
        /// Start tag (from-to, after)
        #[serde(default)]
        time_tag1: TimeTag,
        /// End tag (from-to, before)
        #[serde(default)]
        time_tag2: TimeTag,
        /// Source store
        from: PacketStoreId,
        /// Destination store
        to: PacketStoreId,
    },
    /// Resize packet stores
    ResizePacketStores {
        /// New sizes
        stores: Vec<PacketStoreResize>,
    },
    /// Make a store circular
    ChangeTypeToCircular {
        /// Target store
        store: PacketStoreId,
    },
    /// Make a store bounded
    ChangeTypeToBounded {
        /// Target store
        store: PacketStoreId,
    },
    /// Move a store to another virtual channel
    ChangeVirtualChannel {
        /// Target store
        store: PacketStoreId,
        /// New virtual channel
        virtual_channel: u8,
    },
}

impl Request {
    /// Build a copy request from a typed window kind.
    pub fn copy(
        kind: TimeWindowType,
        time_tag1: TimeTag,
        time_tag2: TimeTag,
        from: PacketStoreId,
        to: PacketStoreId,
    ) -> Self {
        Self::CopyPacketsInTimeWindow {
            time_window_type: kind.code(),
            time_tag1,
            time_tag2,
            from,
            to,
        }
    }

    /// Telecommand message type of this request.
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::EnableStorage { .. } => MessageType::EnableStorageInPacketStores,
            Self::DisableStorage { .. } => MessageType::DisableStorageInPacketStores,
            Self::StartByTimeRangeRetrieval { .. } => MessageType::StartByTimeRangeRetrieval,
            Self::DeletePacketStoreContent { .. } => MessageType::DeletePacketStoreContent,
            Self::ReportContentSummary { .. } => MessageType::ReportContentSummaryOfPacketStores,
            Self::ChangeOpenRetrievalStartTag { .. } => {
                MessageType::ChangeOpenRetrievalStartingTime
            }
            Self::ResumeOpenRetrieval { .. } => MessageType::ResumeOpenRetrievalOfPacketStores,
            Self::SuspendOpenRetrieval { .. } => MessageType::SuspendOpenRetrievalOfPacketStores,
            Self::AbortByTimeRangeRetrieval { .. } => MessageType::AbortByTimeRangeRetrieval,
            Self::ReportStatus => MessageType::ReportStatusOfPacketStores,
            Self::ReportConfiguration => MessageType::ReportConfigurationOfPacketStores,
            Self::CreatePacketStores { .. } => MessageType::CreatePacketStores,
            Self::DeletePacketStores { .. } => MessageType::DeletePacketStores,
            Self::CopyPacketsInTimeWindow { .. } => MessageType::CopyPacketsInTimeWindow,
            Self::ResizePacketStores { .. } => MessageType::ResizePacketStores,
            Self::ChangeTypeToCircular { .. } => MessageType::ChangeTypeToCircular,
            Self::ChangeTypeToBounded { .. } => MessageType::ChangeTypeToBounded,
            Self::ChangeVirtualChannel { .. } => MessageType::ChangeVirtualChannel,
        }
    }
}
