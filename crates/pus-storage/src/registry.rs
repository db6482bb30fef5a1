// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Store registry
//!
//! Owns every packet store, keyed by identifier. Storage is a fixed-capacity
//! `heapless::LinearMap`; the platform limit may be lower than the
//! compile-time ceiling.

use heapless::LinearMap;

use crate::error::ExecutionError;
use crate::store::{PacketStore, PacketStoreId};
use crate::MAX_PACKET_STORES;

/// Collection of packet stores.
#[derive(Debug, Clone)]
pub struct StoreRegistry {
    stores: LinearMap<PacketStoreId, PacketStore, MAX_PACKET_STORES>,
    max_stores: usize,
}

impl StoreRegistry {
    /// Create an empty registry holding at most `max_stores` stores
    /// (clamped to `MAX_PACKET_STORES`).
    pub fn new(max_stores: usize) -> Self {
        Self {
            stores: LinearMap::new(),
            max_stores: max_stores.min(MAX_PACKET_STORES),
        }
    }

    /// Platform limit on the number of stores.
    pub const fn max_stores(&self) -> usize {
        self.max_stores
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Whether another store can be created.
    pub fn is_full(&self) -> bool {
        self.stores.len() >= self.max_stores
    }

    /// Whether `id` names an existing store.
    pub fn contains(&self, id: &PacketStoreId) -> bool {
        self.stores.contains_key(id)
    }

    /// Look up a store.
    pub fn get(&self, id: &PacketStoreId) -> Option<&PacketStore> {
        self.stores.get(id)
    }

    /// Look up a store for mutation.
    pub fn get_mut(&mut self, id: &PacketStoreId) -> Option<&mut PacketStore> {
        self.stores.get_mut(id)
    }

    /// Add a store under a fresh identifier.
    pub fn create(&mut self, id: PacketStoreId, store: PacketStore) -> Result<(), ExecutionError> {
        if self.contains(&id) {
            return Err(ExecutionError::AlreadyExistingPacketStore);
        }
        if self.is_full() {
            return Err(ExecutionError::MaxNumberOfPacketStoresReached);
        }
        self.stores
            .insert(id, store)
            .map(|_| ())
            .map_err(|_| ExecutionError::MaxNumberOfPacketStoresReached)
    }

    /// Remove a store, returning it.
    pub fn remove(&mut self, id: &PacketStoreId) -> Option<PacketStore> {
        self.stores.remove(id)
    }

    /// Drop every store.
    pub fn clear(&mut self) {
        self.stores.clear();
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> Vec<PacketStoreId> {
        let mut ids: Vec<PacketStoreId> = self.stores.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over the stores (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (&PacketStoreId, &PacketStore)> + '_ {
        self.stores.iter()
    }

    /// Borrow two distinct stores, one shared and one exclusive.
    ///
    /// Returns `None` when either is missing or both ids are equal.
    pub fn source_and_destination(
        &mut self,
        source: &PacketStoreId,
        destination: &PacketStoreId,
    ) -> Option<(&PacketStore, &mut PacketStore)> {
        if source == destination {
            return None;
        }

        let mut src = None;
        let mut dst = None;
        for (id, store) in self.stores.iter_mut() {
            if id == source {
                src = Some(&*store);
            } else if id == destination {
                dst = Some(store);
            }
        }

        match (src, dst) {
            (Some(src), Some(dst)) => Some((src, dst)),
            _ => None,
        }
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new(MAX_PACKET_STORES)
    }
}
