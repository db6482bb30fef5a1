// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service-type to packet-store routing table

use heapless::LinearMap;

use crate::config::ServiceRoute;
use crate::error::RoutingError;
use crate::store::PacketStoreId;
use crate::MAX_SERVICE_ROUTES;

/// Maps the originating service type of a report to its packet store.
#[derive(Debug, Clone, Default)]
pub struct ServiceRouter {
    routes: LinearMap<u8, PacketStoreId, MAX_SERVICE_ROUTES>,
}

impl ServiceRouter {
    /// Create an empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured routes (later rows win).
    pub fn from_routes<'a, I>(routes: I) -> Result<Self, RoutingError>
    where
        I: IntoIterator<Item = &'a ServiceRoute>,
    {
        let mut router = Self::new();
        for route in routes {
            router.route(route.service_type, route.packet_store.clone())?;
        }
        Ok(router)
    }

    /// Route `service_type` into `store`, replacing any previous route.
    ///
    /// Returns the previous destination.
    pub fn route(
        &mut self,
        service_type: u8,
        store: PacketStoreId,
    ) -> Result<Option<PacketStoreId>, RoutingError> {
        self.routes
            .insert(service_type, store)
            .map_err(|_| RoutingError::TableFull)
    }

    /// Remove the route for `service_type`.
    pub fn unroute(&mut self, service_type: u8) -> Option<PacketStoreId> {
        self.routes.remove(&service_type)
    }

    /// Destination store of `service_type`.
    pub fn destination(&self, service_type: u8) -> Option<&PacketStoreId> {
        self.routes.get(&service_type)
    }

    /// Whether any service routes into `store`.
    pub fn is_routed(&self, store: &PacketStoreId) -> bool {
        self.routes.values().any(|dst| dst == store)
    }

    /// Service types routed into `store`, ascending.
    pub fn services_for(&self, store: &PacketStoreId) -> Vec<u8> {
        let mut services: Vec<u8> = self
            .routes
            .iter()
            .filter(|(_, dst)| *dst == store)
            .map(|(service, _)| *service)
            .collect();
        services.sort_unstable();
        services
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Remove every route.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Iterate over `(service_type, store)` pairs (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (u8, &PacketStoreId)> + '_ {
        self.routes.iter().map(|(service, store)| (*service, store))
    }
}
