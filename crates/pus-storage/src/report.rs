// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound reports and the sink they are emitted to.

use serde::Serialize;

use crate::error::{ExecutionError, InternalError};
use crate::request::MessageType;
use crate::store::{OpenRetrievalStatus, PacketStoreId, PacketStoreType};
use crate::time::TimeTag;

/// Status of one packet store (TM[15,19] entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketStoreStatus {
    /// Store identifier
    pub packet_store_id: PacketStoreId,
    /// Storage function enabled
    pub storage_status: bool,
    /// Open-retrieval job state
    pub open_retrieval_status: OpenRetrievalStatus,
    /// By-time-range retrieval outstanding
    pub by_time_range_retrieval_status: bool,
}

/// Configuration of one packet store (TM[15,23] entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketStoreConfiguration {
    /// Store identifier
    pub packet_store_id: PacketStoreId,
    /// Capacity in bytes
    pub size_bytes: u32,
    /// Eviction policy
    pub store_type: PacketStoreType,
    /// Downlink virtual channel
    pub virtual_channel: u8,
}

/// Content summary of one packet store (TM[15,13] entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    /// Store identifier
    pub packet_store_id: PacketStoreId,
    /// Tag of the oldest packet (`None` when empty)
    pub oldest_time_tag: Option<TimeTag>,
    /// Tag of the newest packet (`None` when empty)
    pub newest_time_tag: Option<TimeTag>,
    /// Where open retrieval resumes
    pub open_retrieval_start_tag: TimeTag,
    /// Stored bytes relative to capacity, in percent
    pub filled_percentage: u16,
    /// Bytes at or after the open-retrieval start tag, in percent of capacity
    pub open_retrieval_filled_percentage: u16,
}

/// Report emitted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    /// Packet store status report
    Status {
        /// One entry per store, ordered by identifier
        stores: Vec<PacketStoreStatus>,
    },
    /// Packet store configuration report
    Configuration {
        /// One entry per store, ordered by identifier
        stores: Vec<PacketStoreConfiguration>,
    },
    /// Packet store content summary report
    ContentSummary {
        /// One entry per summarised store
        stores: Vec<ContentSummary>,
    },
}

impl Report {
    /// Telemetry message type of this report.
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Status { .. } => MessageType::PacketStoresStatusReport,
            Self::Configuration { .. } => MessageType::PacketStoreConfigurationReport,
            Self::ContentSummary { .. } => MessageType::PacketStoreContentSummaryReport,
        }
    }
}

/// A rejected request item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestFailure {
    /// Command the item belonged to
    pub message_type: MessageType,
    /// Store the item named, when it names one
    pub store_id: Option<PacketStoreId>,
    /// Why it was rejected
    pub error: ExecutionError,
}

/// Destination of everything the service produces.
pub trait ServiceSink {
    /// Emit a report.
    fn emit(&mut self, report: Report);

    /// Signal a rejected request item.
    fn request_failed(&mut self, failure: RequestFailure);

    /// Signal an internal failure.
    fn internal_error(&mut self, error: InternalError);
}

/// Sink that records everything, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Emitted reports
    pub reports: Vec<Report>,
    /// Rejected request items
    pub failures: Vec<RequestFailure>,
    /// Internal failures
    pub internal_errors: Vec<InternalError>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures carrying `error`.
    pub fn count_errors(&self, error: ExecutionError) -> usize {
        self.failures.iter().filter(|f| f.error == error).count()
    }

    /// Errors of the recorded failures, in order.
    pub fn errors(&self) -> Vec<ExecutionError> {
        self.failures.iter().map(|f| f.error).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.reports.clear();
        self.failures.clear();
        self.internal_errors.clear();
    }
}

impl ServiceSink for RecordingSink {
    fn emit(&mut self, report: Report) {
        self.reports.push(report);
    }

    fn request_failed(&mut self, failure: RequestFailure) {
        self.failures.push(failure);
    }

    fn internal_error(&mut self, error: InternalError) {
        self.internal_errors.push(error);
    }
}
