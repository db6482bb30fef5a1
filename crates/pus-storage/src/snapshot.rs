// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry snapshot
//!
//! JSON layout used when a host backs the registry with non-volatile
//! storage. Stores are written in identifier order and keep their packets in
//! insertion order. Loading re-checks every invariant before a registry is
//! rebuilt from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PlatformConfig;
use crate::error::SnapshotError;
use crate::registry::StoreRegistry;
use crate::store::{PacketStore, PacketStoreId};

/// One store of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Store identifier
    pub id: PacketStoreId,
    /// Store fields and packets
    #[serde(flatten)]
    pub store: PacketStore,
}

/// Serialised form of a whole registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Stores, ordered by identifier
    pub stores: Vec<StoreSnapshot>,
}

impl RegistrySnapshot {
    /// Capture the current content of `registry`.
    pub fn capture(registry: &StoreRegistry) -> Self {
        let stores = registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let store = registry.get(&id)?.clone();
                Some(StoreSnapshot { id, store })
            })
            .collect();
        Self { stores }
    }

    /// Write as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot file (not yet validated).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate against `config` and rebuild a registry.
    pub fn into_registry(self, config: &PlatformConfig) -> Result<StoreRegistry, SnapshotError> {
        let mut registry = StoreRegistry::new(config.max_packet_stores);
        if self.stores.len() > registry.max_stores() {
            return Err(SnapshotError::Invalid(format!(
                "{} stores exceed the platform limit of {}",
                self.stores.len(),
                registry.max_stores()
            )));
        }

        for StoreSnapshot { id, store } in self.stores {
            validate_store(&id, &store, config)?;
            registry
                .create(id.clone(), store)
                .map_err(|e| SnapshotError::Invalid(format!("Store {}: {}", id, e)))?;
        }

        Ok(registry)
    }
}

fn validate_store(
    id: &PacketStoreId,
    store: &PacketStore,
    config: &PlatformConfig,
) -> Result<(), SnapshotError> {
    if !config.accepts_store_size(store.capacity_bytes()) {
        return Err(SnapshotError::Invalid(format!(
            "Store {} has unsupported size {}",
            id,
            store.capacity_bytes()
        )));
    }

    if !config.virtual_channels.contains(store.virtual_channel()) {
        return Err(SnapshotError::Invalid(format!(
            "Store {} uses invalid virtual channel {}",
            id,
            store.virtual_channel()
        )));
    }

    if let Some(window) = store.by_time_range_retrieval() {
        if window.start >= window.end {
            return Err(SnapshotError::Invalid(format!(
                "Store {} has an invalid retrieval window",
                id
            )));
        }
    }

    let mut previous = None;
    for packet in store.packets() {
        if previous.is_some_and(|tag| packet.time_tag < tag) {
            return Err(SnapshotError::Invalid(format!(
                "Store {} packets are not in time order",
                id
            )));
        }
        if packet.data.is_empty() {
            return Err(SnapshotError::Invalid(format!(
                "Store {} holds an empty message",
                id
            )));
        }
        if packet.size() > config.max_message_size_bytes {
            return Err(SnapshotError::Invalid(format!(
                "Store {} holds a {} byte message",
                id,
                packet.size()
            )));
        }
        previous = Some(packet.time_tag);
    }

    if store.stored_bytes() > store.capacity_bytes() as usize {
        return Err(SnapshotError::Invalid(format!(
            "Store {} content exceeds its capacity",
            id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PacketStoreType;

    fn id(s: &str) -> PacketStoreId {
        PacketStoreId::new(s).unwrap()
    }

    fn registry() -> StoreRegistry {
        let mut registry = StoreRegistry::new(4);
        let mut hk = PacketStore::new(100, PacketStoreType::Circular, 1);
        for tag in [10, 20, 30] {
            hk.admit(tag, &[tag as u8; 4]).unwrap();
        }
        hk.storage_status = true;
        registry.create(id("hk"), hk).unwrap();
        registry
            .create(id("events"), PacketStore::new(50, PacketStoreType::Bounded, 2))
            .unwrap();
        registry
    }

    #[test]
    fn test_capture_orders_stores() {
        let snapshot = RegistrySnapshot::capture(&registry());
        let ids: Vec<_> = snapshot.stores.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["events", "hk"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");

        let snapshot = RegistrySnapshot::capture(&registry());
        snapshot.save(&path).unwrap();
        let loaded = RegistrySnapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);

        let restored = loaded.into_registry(&PlatformConfig::default()).unwrap();
        let hk = restored.get(&id("hk")).unwrap();
        let tags: Vec<_> = hk.packets().map(|p| p.time_tag).collect();
        assert_eq!(tags, vec![10, 20, 30]);
        assert!(hk.storage_status());
    }

    #[test]
    fn test_restore_rejects_unordered_packets() {
        let mut json = serde_json::to_value(RegistrySnapshot::capture(&registry())).unwrap();
        let packets = json["stores"][1]["packets"].as_array_mut().unwrap();
        packets.swap(0, 2);
        let snapshot: RegistrySnapshot = serde_json::from_value(json).unwrap();
        assert!(matches!(
            snapshot.into_registry(&PlatformConfig::default()),
            Err(SnapshotError::Invalid(_))
        ));
    }

    #[test]
    fn test_restore_rejects_overfull_store() {
        let mut snapshot = RegistrySnapshot::capture(&registry());
        snapshot.stores[1].store.capacity_bytes = 8;
        assert!(snapshot.into_registry(&PlatformConfig::default()).is_err());
    }

    #[test]
    fn test_restore_rejects_duplicates_and_limits() {
        let mut snapshot = RegistrySnapshot::capture(&registry());
        snapshot.stores.push(snapshot.stores[0].clone());
        let err = snapshot
            .clone()
            .into_registry(&PlatformConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let config = PlatformConfig::builder().max_packet_stores(2).build();
        assert!(snapshot.into_registry(&config).is_err());
    }

    #[test]
    fn test_restore_rejects_empty_message() {
        let mut json = serde_json::to_value(RegistrySnapshot::capture(&registry())).unwrap();
        json["stores"][1]["packets"][0]["data"] = serde_json::json!([]);
        let snapshot: RegistrySnapshot = serde_json::from_value(json).unwrap();
        let err = snapshot
            .into_registry(&PlatformConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("empty message"));
    }

    #[test]
    fn test_load_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RegistrySnapshot::load(&path),
            Err(SnapshotError::Json(_))
        ));
        assert!(matches!(
            RegistrySnapshot::load(dir.path().join("missing.json")),
            Err(SnapshotError::Io(_))
        ));
    }
}
