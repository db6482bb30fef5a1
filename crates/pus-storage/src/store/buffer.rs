// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet ring with a running quota
//!
//! Serialized as a plain array of packets; the quota is rebuilt on load.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::StoredPacket;

/// Ordered packets plus the bytes they occupy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VecDeque<StoredPacket>", into = "VecDeque<StoredPacket>")]
pub(crate) struct PacketBuffer {
    ring: VecDeque<StoredPacket>,
    quota_bytes: usize,
}

impl PacketBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn iter(&self) -> std::collections::vec_deque::Iter<'_, StoredPacket> {
        self.ring.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.ring.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub(crate) fn front(&self) -> Option<&StoredPacket> {
        self.ring.front()
    }

    pub(crate) fn back(&self) -> Option<&StoredPacket> {
        self.ring.back()
    }

    /// Bytes held by the ring.
    pub(crate) fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    pub(crate) fn push_back(&mut self, packet: StoredPacket) {
        self.quota_bytes += packet.size();
        self.ring.push_back(packet);
    }

    pub(crate) fn pop_front(&mut self) -> Option<StoredPacket> {
        let packet = self.ring.pop_front()?;
        self.quota_bytes -= packet.size();
        Some(packet)
    }
}

impl From<VecDeque<StoredPacket>> for PacketBuffer {
    fn from(ring: VecDeque<StoredPacket>) -> Self {
        let quota_bytes = ring.iter().map(StoredPacket::size).sum();
        Self { ring, quota_bytes }
    }
}

impl From<PacketBuffer> for VecDeque<StoredPacket> {
    fn from(buffer: PacketBuffer) -> Self {
        buffer.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(time_tag: u32, len: usize) -> StoredPacket {
        StoredPacket {
            time_tag,
            data: vec![0; len],
        }
    }

    #[test]
    fn test_quota_follows_push_and_pop() {
        let mut buffer = PacketBuffer::new();
        buffer.push_back(packet(1, 10));
        buffer.push_back(packet(2, 5));
        assert_eq!(buffer.quota_bytes(), 15);

        assert_eq!(buffer.pop_front().map(|p| p.time_tag), Some(1));
        assert_eq!(buffer.quota_bytes(), 5);
        buffer.pop_front();
        assert_eq!(buffer.pop_front(), None);
        assert_eq!(buffer.quota_bytes(), 0);
    }

    #[test]
    fn test_quota_rebuilt_on_load() {
        let mut buffer = PacketBuffer::new();
        buffer.push_back(packet(1, 3));
        buffer.push_back(packet(2, 4));

        let json = serde_json::to_value(&buffer).unwrap();
        assert!(json.is_array());
        let loaded: PacketBuffer = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.quota_bytes(), 7);
        assert_eq!(loaded, buffer);
    }
}
