// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Retrieval and copy algorithms
//!
//! Stateless operations over one or two packet stores:
//!
//! - [`copy_window`] -- copy the packets of a time window into an empty store
//! - [`delete_until`] -- prefix trim up to a time limit
//! - [`content_summary`] -- oldest/newest tags and fill percentages
//!
//! All of them rely on packets being ordered by time tag, so scans stop as
//! soon as they leave the window.

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, InternalError, StorageError};
use crate::report::ContentSummary;
use crate::store::{PacketStore, PacketStoreId};
use crate::time::TimeTag;

/// Shape of a time-bounded query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindowType {
    /// `[tag1, tag2]`
    FromTagToTag,
    /// `tag >= tag1`
    AfterTimeTag,
    /// `tag <= tag2`
    BeforeTimeTag,
}

impl TimeWindowType {
    /// Wire code of the window type.
    pub const fn code(self) -> u8 {
        match self {
            Self::FromTagToTag => 0,
            Self::AfterTimeTag => 1,
            Self::BeforeTimeTag => 2,
        }
    }
}

impl TryFrom<u8> for TimeWindowType {
    type Error = InternalError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::FromTagToTag),
            1 => Ok(Self::AfterTimeTag),
            2 => Ok(Self::BeforeTimeTag),
            other => Err(InternalError::InvalidTimeWindowType(other)),
        }
    }
}

/// Time window with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Packets tagged within `[start, end]`
    FromTagToTag {
        /// First included tag
        start: TimeTag,
        /// Last included tag
        end: TimeTag,
    },
    /// Packets tagged at or after `start`
    AfterTimeTag {
        /// First included tag
        start: TimeTag,
    },
    /// Packets tagged at or before `end`
    BeforeTimeTag {
        /// Last included tag
        end: TimeTag,
    },
}

impl TimeWindow {
    /// Build a window of `kind` from the two request tags.
    ///
    /// `AfterTimeTag` only uses `tag1`, `BeforeTimeTag` only uses `tag2`.
    pub fn new(kind: TimeWindowType, tag1: TimeTag, tag2: TimeTag) -> Self {
        match kind {
            TimeWindowType::FromTagToTag => Self::FromTagToTag {
                start: tag1,
                end: tag2,
            },
            TimeWindowType::AfterTimeTag => Self::AfterTimeTag { start: tag1 },
            TimeWindowType::BeforeTimeTag => Self::BeforeTimeTag { end: tag2 },
        }
    }

    /// Window type of this window.
    pub const fn kind(&self) -> TimeWindowType {
        match self {
            Self::FromTagToTag { .. } => TimeWindowType::FromTagToTag,
            Self::AfterTimeTag { .. } => TimeWindowType::AfterTimeTag,
            Self::BeforeTimeTag { .. } => TimeWindowType::BeforeTimeTag,
        }
    }

    /// Reject malformed windows (`start >= end`).
    pub fn validate(&self) -> Result<(), ExecutionError> {
        match *self {
            Self::FromTagToTag { start, end } if start >= end => {
                Err(ExecutionError::InvalidTimeWindow)
            }
            _ => Ok(()),
        }
    }

    /// Whether `tag` lies inside the window.
    pub fn contains(&self, tag: TimeTag) -> bool {
        match *self {
            Self::FromTagToTag { start, end } => (start..=end).contains(&tag),
            Self::AfterTimeTag { start } => tag >= start,
            Self::BeforeTimeTag { end } => tag <= end,
        }
    }

    /// Whether `tag` lies after the window (no later tag can match).
    pub fn is_past(&self, tag: TimeTag) -> bool {
        match *self {
            Self::FromTagToTag { end, .. } | Self::BeforeTimeTag { end } => tag > end,
            Self::AfterTimeTag { .. } => false,
        }
    }

    /// Whether the window intersects `[oldest, newest]`.
    pub fn overlaps(&self, oldest: TimeTag, newest: TimeTag) -> bool {
        match *self {
            Self::FromTagToTag { start, end } => end >= oldest && start <= newest,
            Self::AfterTimeTag { start } => start <= newest,
            Self::BeforeTimeTag { end } => end >= oldest,
        }
    }
}

/// Result of a successful copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    /// Copied packets still held by the destination
    pub copied: usize,
    /// Copied packets evicted again by the circular rule
    pub evicted: usize,
    /// Window packets refused by the destination capacity rule
    pub rejected: usize,
}

/// Copy the packets of `source` that fall inside `window` into `destination`.
///
/// The destination must be empty; packets keep their original time tags.
/// Each packet goes through the destination capacity rule, so a bounded
/// destination may end up with a truncated copy and a circular one may
/// evict. The storage-enable flag of the destination is not consulted.
pub fn copy_window(
    source: &PacketStore,
    destination: &mut PacketStore,
    window: TimeWindow,
) -> Result<CopyOutcome, ExecutionError> {
    if !destination.is_empty() {
        return Err(ExecutionError::DestinationPacketStoreNotEmpty);
    }

    let (Some(oldest), Some(newest)) = (source.oldest_time_tag(), source.newest_time_tag()) else {
        return Err(ExecutionError::CopyOfPacketsFailed);
    };

    window.validate()?;
    if !window.overlaps(oldest, newest) {
        return Err(ExecutionError::NoTimeWindowOverlap);
    }

    let mut outcome = CopyOutcome::default();
    for packet in source.packets() {
        if window.is_past(packet.time_tag) {
            break;
        }
        if !window.contains(packet.time_tag) {
            continue;
        }
        match destination.admit(packet.time_tag, &packet.data) {
            Ok(evicted) => {
                outcome.copied += 1;
                outcome.evicted += evicted;
            }
            Err(StorageError::PacketStoreFull | StorageError::MessageExceedsCapacity { .. }) => {
                outcome.rejected += 1;
            }
            Err(_) => return Err(ExecutionError::CopyOfPacketsFailed),
        }
    }
    // The destination started empty, so every eviction removed a copied packet
    outcome.copied -= outcome.evicted.min(outcome.copied);

    Ok(outcome)
}

/// Delete every packet tagged at or before `time_limit`.
///
/// Returns the number of deleted packets.
pub fn delete_until(store: &mut PacketStore, time_limit: TimeTag) -> usize {
    let mut deleted = 0;
    while store
        .packets
        .front()
        .is_some_and(|packet| packet.time_tag <= time_limit)
    {
        store.packets.pop_front();
        deleted += 1;
    }
    deleted
}

/// Summarise the content of a store.
pub fn content_summary(id: &PacketStoreId, store: &PacketStore) -> ContentSummary {
    let start_tag = store.open_retrieval_start_tag();
    let pending_bytes: usize = store
        .packets()
        .filter(|packet| packet.time_tag >= start_tag)
        .map(|packet| packet.size())
        .sum();

    ContentSummary {
        packet_store_id: id.clone(),
        oldest_time_tag: store.oldest_time_tag(),
        newest_time_tag: store.newest_time_tag(),
        open_retrieval_start_tag: start_tag,
        filled_percentage: percentage(store.stored_bytes(), store.capacity_bytes()),
        open_retrieval_filled_percentage: percentage(pending_bytes, store.capacity_bytes()),
    }
}

fn percentage(bytes: usize, capacity: u32) -> u16 {
    if capacity == 0 {
        return 0;
    }
    let pct = bytes as u64 * 100 / u64::from(capacity);
    u16::try_from(pct).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PacketStoreType;

    fn store_with(tags: &[TimeTag], capacity: u32, store_type: PacketStoreType) -> PacketStore {
        let mut store = PacketStore::new(capacity, store_type, 1);
        for &tag in tags {
            store.admit(tag, &[0; 10]).unwrap();
        }
        store
    }

    fn source() -> PacketStore {
        store_with(&[10, 20, 30, 40], 100, PacketStoreType::Circular)
    }

    fn empty() -> PacketStore {
        PacketStore::new(100, PacketStoreType::Circular, 1)
    }

    fn tags(store: &PacketStore) -> Vec<TimeTag> {
        store.packets().map(|p| p.time_tag).collect()
    }

    #[test]
    fn test_window_type_codes() {
        for kind in [
            TimeWindowType::FromTagToTag,
            TimeWindowType::AfterTimeTag,
            TimeWindowType::BeforeTimeTag,
        ] {
            assert_eq!(TimeWindowType::try_from(kind.code()), Ok(kind));
        }
        assert_eq!(
            TimeWindowType::try_from(3),
            Err(InternalError::InvalidTimeWindowType(3))
        );
    }

    #[test]
    fn test_window_predicates() {
        let window = TimeWindow::new(TimeWindowType::FromTagToTag, 15, 35);
        assert!(window.contains(15));
        assert!(window.contains(35));
        assert!(!window.contains(36));
        assert!(window.is_past(36));

        let after = TimeWindow::new(TimeWindowType::AfterTimeTag, 25, 0);
        assert_eq!(after, TimeWindow::AfterTimeTag { start: 25 });
        assert!(!after.is_past(u32::MAX));

        let before = TimeWindow::new(TimeWindowType::BeforeTimeTag, 0, 25);
        assert_eq!(before.kind(), TimeWindowType::BeforeTimeTag);
        assert!(before.contains(0));
        assert!(before.is_past(26));
    }

    #[test]
    fn test_copy_from_tag_to_tag() {
        let mut dst = empty();
        let outcome = copy_window(
            &source(),
            &mut dst,
            TimeWindow::FromTagToTag { start: 15, end: 35 },
        )
        .unwrap();
        assert_eq!(tags(&dst), vec![20, 30]);
        assert_eq!(outcome.copied, 2);
    }

    #[test]
    fn test_copy_after_and_before() {
        let mut dst = empty();
        copy_window(&source(), &mut dst, TimeWindow::AfterTimeTag { start: 25 }).unwrap();
        assert_eq!(tags(&dst), vec![30, 40]);

        let mut dst = empty();
        copy_window(&source(), &mut dst, TimeWindow::BeforeTimeTag { end: 25 }).unwrap();
        assert_eq!(tags(&dst), vec![10, 20]);
    }

    #[test]
    fn test_copy_large_window_into_circular() {
        let tags_in: Vec<TimeTag> = (0..20_000).collect();
        let src = store_with(&tags_in, 200_000, PacketStoreType::Circular);
        let mut dst = PacketStore::new(1000, PacketStoreType::Circular, 1);

        let outcome = copy_window(&src, &mut dst, TimeWindow::AfterTimeTag { start: 0 }).unwrap();
        assert_eq!(outcome.copied, 100);
        assert_eq!(outcome.evicted, 19_900);
        assert_eq!(dst.packets.quota_bytes(), dst.stored_bytes());
        assert_eq!(dst.oldest_time_tag(), Some(19_900));
    }

    #[test]
    fn test_copy_ignores_destination_storage_status() {
        let mut dst = empty();
        assert!(!dst.storage_status());
        copy_window(&source(), &mut dst, TimeWindow::AfterTimeTag { start: 0 }).unwrap();
        assert_eq!(dst.len(), 4);
    }

    #[test]
    fn test_copy_no_overlap() {
        let mut dst = empty();
        assert_eq!(
            copy_window(
                &source(),
                &mut dst,
                TimeWindow::FromTagToTag {
                    start: 100,
                    end: 200
                }
            ),
            Err(ExecutionError::NoTimeWindowOverlap)
        );
        assert!(dst.is_empty());

        assert_eq!(
            copy_window(&source(), &mut dst, TimeWindow::BeforeTimeTag { end: 5 }),
            Err(ExecutionError::NoTimeWindowOverlap)
        );
    }

    #[test]
    fn test_copy_precondition_order() {
        let mut full = store_with(&[1], 100, PacketStoreType::Circular);
        // Non-empty destination wins over a malformed window
        assert_eq!(
            copy_window(
                &source(),
                &mut full,
                TimeWindow::FromTagToTag { start: 9, end: 1 }
            ),
            Err(ExecutionError::DestinationPacketStoreNotEmpty)
        );
        assert_eq!(tags(&full), vec![1]);

        let mut dst = empty();
        assert_eq!(
            copy_window(&empty(), &mut dst, TimeWindow::AfterTimeTag { start: 0 }),
            Err(ExecutionError::CopyOfPacketsFailed)
        );
        assert_eq!(
            copy_window(
                &source(),
                &mut dst,
                TimeWindow::FromTagToTag { start: 20, end: 20 }
            ),
            Err(ExecutionError::InvalidTimeWindow)
        );
    }

    #[test]
    fn test_copy_into_small_bounded_truncates() {
        let mut dst = PacketStore::new(25, PacketStoreType::Bounded, 1);
        let outcome =
            copy_window(&source(), &mut dst, TimeWindow::AfterTimeTag { start: 0 }).unwrap();
        assert_eq!(tags(&dst), vec![10, 20]);
        assert_eq!(
            outcome,
            CopyOutcome {
                copied: 2,
                evicted: 0,
                rejected: 2
            }
        );
    }

    #[test]
    fn test_copy_into_small_circular_evicts() {
        let mut dst = PacketStore::new(25, PacketStoreType::Circular, 1);
        let outcome =
            copy_window(&source(), &mut dst, TimeWindow::AfterTimeTag { start: 0 }).unwrap();
        assert_eq!(tags(&dst), vec![30, 40]);
        assert_eq!(outcome.copied, 2);
        assert_eq!(outcome.evicted, 2);
        assert_eq!(outcome.rejected, 0);
    }

    #[test]
    fn test_delete_until_is_idempotent() {
        let mut store = source();
        assert_eq!(delete_until(&mut store, 20), 2);
        assert_eq!(tags(&store), vec![30, 40]);
        let once = store.clone();
        assert_eq!(delete_until(&mut store, 20), 0);
        assert_eq!(store, once);
    }

    #[test]
    fn test_delete_until_everything() {
        let mut store = source();
        assert_eq!(delete_until(&mut store, TimeTag::MAX), 4);
        assert!(store.is_empty());
    }

    #[test]
    fn test_content_summary() {
        let mut store = store_with(&[10, 20, 30, 40], 200, PacketStoreType::Bounded);
        store.open_retrieval_start_tag = 25;
        let id = PacketStoreId::new("hk").unwrap();

        let summary = content_summary(&id, &store);
        assert_eq!(summary.oldest_time_tag, Some(10));
        assert_eq!(summary.newest_time_tag, Some(40));
        assert_eq!(summary.open_retrieval_start_tag, 25);
        assert_eq!(summary.filled_percentage, 20);
        assert_eq!(summary.open_retrieval_filled_percentage, 10);

        let summary = content_summary(&id, &empty());
        assert_eq!(summary.oldest_time_tag, None);
        assert_eq!(summary.filled_percentage, 0);
    }
}
