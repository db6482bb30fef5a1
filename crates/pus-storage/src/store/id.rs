// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet store identifier

use core::fmt;
use core::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::MAX_PACKET_STORE_ID_LEN;

/// Invalid packet store identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PacketStoreIdError {
    /// Identifier is empty
    #[error("packet store id is empty")]
    Empty,

    /// Identifier longer than the platform limit
    #[error("packet store id is {0} bytes long (limit {max})", max = MAX_PACKET_STORE_ID_LEN)]
    TooLong(usize),
}

/// Packet store identifier.
///
/// Bounded-length, stored inline (no heap), immutable once the store
/// exists. Ordering is byte-wise, which fixes the order of reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketStoreId(heapless::String<MAX_PACKET_STORE_ID_LEN>);

impl PacketStoreId {
    /// Create an identifier (1..=`MAX_PACKET_STORE_ID_LEN` bytes).
    pub fn new(id: &str) -> Result<Self, PacketStoreIdError> {
        if id.is_empty() {
            return Err(PacketStoreIdError::Empty);
        }
        heapless::String::try_from(id)
            .map(Self)
            .map_err(|_| PacketStoreIdError::TooLong(id.len()))
    }

    /// Identifier as text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PacketStoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacketStoreId {
    type Err = PacketStoreIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for PacketStoreId {
    type Error = PacketStoreIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for PacketStoreId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for PacketStoreId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PacketStoreId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bounds() {
        assert_eq!(PacketStoreId::new(""), Err(PacketStoreIdError::Empty));
        assert!(PacketStoreId::new("ps2").is_ok());

        let max = "x".repeat(MAX_PACKET_STORE_ID_LEN);
        assert_eq!(PacketStoreId::new(&max).map(|id| id.as_str().len()), Ok(16));

        let too_long = "x".repeat(MAX_PACKET_STORE_ID_LEN + 1);
        assert_eq!(
            PacketStoreId::new(&too_long),
            Err(PacketStoreIdError::TooLong(17))
        );
    }

    #[test]
    fn test_id_ordering() {
        let a: PacketStoreId = "ps2".parse().unwrap();
        let b: PacketStoreId = "ps25".parse().unwrap();
        let c: PacketStoreId = "ps5555".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_id_serde() {
        let id = PacketStoreId::new("hk").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"hk\"");
        let back: PacketStoreId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let err = serde_json::from_str::<PacketStoreId>("\"this-id-is-way-too-long\"");
        assert!(err.is_err());
    }
}
