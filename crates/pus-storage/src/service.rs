// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storage and Retrieval command facade
//!
//! Owns the registry, the routing table and the clock. Every command runs
//! to completion; batch commands validate and apply each item on its own,
//! so a batch may partially succeed. Each rejected item produces exactly one
//! [`RequestFailure`] and leaves its store untouched.

use crate::config::{ConfigError, PlatformConfig};
use crate::error::{ExecutionError, SnapshotError, StorageError};
use crate::guard::{self, Mutation};
use crate::registry::StoreRegistry;
use crate::report::{
    PacketStoreConfiguration, PacketStoreStatus, Report, RequestFailure, ServiceSink,
};
use crate::request::{
    MessageType, PacketStoreDefinition, PacketStoreResize, Request, TimeRangeRetrievalRequest,
};
use crate::retrieval::{self, TimeWindow, TimeWindowType};
use crate::routing::ServiceRouter;
use crate::snapshot::RegistrySnapshot;
use crate::store::{
    ByTimeRangeRetrieval, InsertOutcome, OpenRetrievalStatus, PacketStore, PacketStoreId,
    PacketStoreType,
};
use crate::time::{Clock, SystemClock, TimeTag};

/// ST[15] Storage and Retrieval service.
#[derive(Debug)]
pub struct StorageAndRetrievalService<C: Clock = SystemClock> {
    config: PlatformConfig,
    registry: StoreRegistry,
    router: ServiceRouter,
    clock: C,
}

impl StorageAndRetrievalService<SystemClock> {
    /// Create a service stamping packets with the host clock.
    pub fn new(config: PlatformConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> StorageAndRetrievalService<C> {
    /// Create a service with an explicit clock.
    ///
    /// The configuration is validated and its routes populate the router.
    pub fn with_clock(config: PlatformConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let router = ServiceRouter::from_routes(&config.routes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        for (service_type, store) in router.iter() {
            tracing::debug!("Routing ST[{}] reports to {}", service_type, store);
        }

        Ok(Self {
            registry: StoreRegistry::new(config.max_packet_stores),
            router,
            clock,
            config,
        })
    }

    /// Platform configuration.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Packet stores.
    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Routing table.
    pub fn router(&self) -> &ServiceRouter {
        &self.router
    }

    /// Routing table, for host-side reconfiguration.
    pub fn router_mut(&mut self) -> &mut ServiceRouter {
        &mut self.router
    }

    /// Clock used to stamp packets.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drop every packet store. The routing table is kept.
    pub fn reset(&mut self) {
        tracing::info!("Dropping {} packet stores", self.registry.len());
        self.registry.clear();
    }

    /// Capture the registry for non-volatile backing.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::capture(&self.registry)
    }

    /// Replace the registry with a validated snapshot.
    ///
    /// On error the current registry is left untouched.
    pub fn restore(&mut self, snapshot: RegistrySnapshot) -> Result<(), SnapshotError> {
        self.registry = snapshot.into_registry(&self.config)?;
        tracing::info!("Restored {} packet stores", self.registry.len());
        Ok(())
    }

    /// File a telemetry report generated by `service_type`.
    ///
    /// The report is stamped with the current clock reading and inserted
    /// into the routed store. Unrouted reports, and reports for a store with
    /// storage disabled, are dropped without error.
    pub fn store_report(
        &mut self,
        service_type: u8,
        data: &[u8],
    ) -> Result<InsertOutcome, StorageError> {
        let Some(id) = self.router.destination(service_type) else {
            return Ok(InsertOutcome::NotRouted);
        };

        let store = self
            .registry
            .get_mut(id)
            .ok_or(StorageError::UnknownPacketStore)?;
        if !store.storage_status() {
            return Ok(InsertOutcome::StorageDisabled);
        }

        if data.len() > self.config.max_message_size_bytes {
            return Err(StorageError::MessageTooLarge {
                size: data.len(),
                max: self.config.max_message_size_bytes,
            });
        }

        let time_tag = self.clock.now();
        match store.insert(time_tag, data) {
            Ok(InsertOutcome::Stored { evicted }) if evicted > 0 => {
                tracing::warn!(
                    "Packet store {} evicted {} packets to admit a report of service {}",
                    id,
                    evicted,
                    service_type
                );
                Ok(InsertOutcome::Stored { evicted })
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(
                    "Report of service {} not stored in {}: {}",
                    service_type,
                    id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Execute a request, emitting reports and failures into `sink`.
    pub fn execute(&mut self, request: &Request, sink: &mut dyn ServiceSink) {
        tracing::debug!("Executing TC[15,{}]", request.message_type().subtype());

        match request {
            Request::EnableStorage { stores } => {
                self.set_storage_status(MessageType::EnableStorageInPacketStores, stores, true, sink)
            }
            Request::DisableStorage { stores } => self.set_storage_status(
                MessageType::DisableStorageInPacketStores,
                stores,
                false,
                sink,
            ),
            Request::StartByTimeRangeRetrieval { retrievals } => {
                self.start_by_time_range_retrieval(retrievals, sink)
            }
            Request::DeletePacketStoreContent { time_limit, stores } => {
                self.delete_packet_store_content(*time_limit, stores, sink)
            }
            Request::ReportContentSummary { stores } => self.report_content_summary(stores, sink),
            Request::ChangeOpenRetrievalStartTag { start_tag, stores } => {
                self.change_open_retrieval_start_tag(*start_tag, stores, sink)
            }
            Request::ResumeOpenRetrieval { stores, priority } => {
                self.resume_open_retrieval(stores, *priority, sink)
            }
            Request::SuspendOpenRetrieval { stores } => self.suspend_open_retrieval(stores, sink),
            Request::AbortByTimeRangeRetrieval { stores } => {
                self.abort_by_time_range_retrieval(stores, sink)
            }
            Request::ReportStatus => self.report_status(sink),
            Request::ReportConfiguration => self.report_configuration(sink),
            Request::CreatePacketStores { stores } => self.create_packet_stores(stores, sink),
            Request::DeletePacketStores { stores } => self.delete_packet_stores(stores, sink),
            Request::CopyPacketsInTimeWindow {
                time_window_type,
                time_tag1,
                time_tag2,
                from,
                to,
            } => self.copy_packets_in_time_window(
                *time_window_type,
                *time_tag1,
                *time_tag2,
                from,
                to,
                sink,
            ),
            Request::ResizePacketStores { stores } => self.resize_packet_stores(stores, sink),
            Request::ChangeTypeToCircular { store } => {
                self.change_type(MessageType::ChangeTypeToCircular, store, PacketStoreType::Circular, sink)
            }
            Request::ChangeTypeToBounded { store } => {
                self.change_type(MessageType::ChangeTypeToBounded, store, PacketStoreType::Bounded, sink)
            }
            Request::ChangeVirtualChannel {
                store,
                virtual_channel,
            } => self.change_virtual_channel(store, *virtual_channel, sink),
        }
    }

    /// Explicit targets, or every store (ascending) when none are named.
    fn targets(&self, stores: &[PacketStoreId]) -> Vec<PacketStoreId> {
        if stores.is_empty() {
            self.registry.ids()
        } else {
            stores.to_vec()
        }
    }

    /// Apply `apply` to each target store, reporting one failure per rejected id.
    fn for_each_store<F>(
        &mut self,
        message_type: MessageType,
        stores: &[PacketStoreId],
        sink: &mut dyn ServiceSink,
        mut apply: F,
    ) where
        F: FnMut(&mut PacketStore, &PlatformConfig) -> Result<(), ExecutionError>,
    {
        for id in self.targets(stores) {
            let result = match self.registry.get_mut(&id) {
                Some(store) => apply(store, &self.config),
                None => Err(ExecutionError::NonExistingPacketStore),
            };
            match result {
                Ok(()) => tracing::debug!("TC[15,{}] applied to {}", message_type.subtype(), id),
                Err(error) => reject(sink, message_type, Some(&id), error),
            }
        }
    }

    fn set_storage_status(
        &mut self,
        message_type: MessageType,
        stores: &[PacketStoreId],
        enabled: bool,
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(message_type, stores, sink, |store, _| {
            store.storage_status = enabled;
            Ok(())
        });
    }

    fn start_by_time_range_retrieval(
        &mut self,
        retrievals: &[TimeRangeRetrievalRequest],
        sink: &mut dyn ServiceSink,
    ) {
        let message_type = MessageType::StartByTimeRangeRetrieval;
        let capabilities = self.config.capabilities;

        for retrieval in retrievals {
            let Some(store) = self.registry.get_mut(&retrieval.store) else {
                reject(
                    sink,
                    message_type,
                    Some(&retrieval.store),
                    ExecutionError::NonExistingPacketStore,
                );
                continue;
            };

            let result = guard::check(store, Mutation::StartByTimeRangeRetrieval, &capabilities)
                .and_then(|()| {
                    TimeWindow::FromTagToTag {
                        start: retrieval.start,
                        end: retrieval.end,
                    }
                    .validate()
                });
            if let Err(error) = result {
                reject(sink, message_type, Some(&retrieval.store), error);
                continue;
            }

            store.by_time_range_retrieval = Some(ByTimeRangeRetrieval {
                start: retrieval.start,
                end: retrieval.end,
            });
            if capabilities.prioritizing_retrievals {
                if let Some(priority) = retrieval.priority {
                    store.retrieval_priority = priority;
                }
            }
            tracing::debug!(
                "By-time-range retrieval {}..={} started on {}",
                retrieval.start,
                retrieval.end,
                retrieval.store
            );
        }
    }

    fn delete_packet_store_content(
        &mut self,
        time_limit: TimeTag,
        stores: &[PacketStoreId],
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(
            MessageType::DeletePacketStoreContent,
            stores,
            sink,
            |store, config| {
                guard::check(store, Mutation::DeleteContent, &config.capabilities)?;
                let deleted = retrieval::delete_until(store, time_limit);
                tracing::debug!("Deleted {} packets up to {}", deleted, time_limit);
                Ok(())
            },
        );
    }

    fn report_content_summary(&mut self, stores: &[PacketStoreId], sink: &mut dyn ServiceSink) {
        let mut summaries = Vec::new();
        for id in self.targets(stores) {
            match self.registry.get(&id) {
                Some(store) => summaries.push(retrieval::content_summary(&id, store)),
                None => reject(
                    sink,
                    MessageType::ReportContentSummaryOfPacketStores,
                    Some(&id),
                    ExecutionError::NonExistingPacketStore,
                ),
            }
        }
        sink.emit(Report::ContentSummary { stores: summaries });
    }

    fn change_open_retrieval_start_tag(
        &mut self,
        start_tag: TimeTag,
        stores: &[PacketStoreId],
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(
            MessageType::ChangeOpenRetrievalStartingTime,
            stores,
            sink,
            |store, config| {
                guard::check(store, Mutation::ChangeOpenRetrievalStartTag, &config.capabilities)?;
                store.open_retrieval_start_tag = start_tag;
                Ok(())
            },
        );
    }

    fn resume_open_retrieval(
        &mut self,
        stores: &[PacketStoreId],
        priority: Option<u16>,
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(
            MessageType::ResumeOpenRetrievalOfPacketStores,
            stores,
            sink,
            |store, config| {
                guard::check(store, Mutation::ResumeOpenRetrieval, &config.capabilities)?;
                store.open_retrieval_status = OpenRetrievalStatus::InProgress;
                if config.capabilities.prioritizing_retrievals {
                    if let Some(priority) = priority {
                        store.retrieval_priority = priority;
                    }
                }
                Ok(())
            },
        );
    }

    fn suspend_open_retrieval(&mut self, stores: &[PacketStoreId], sink: &mut dyn ServiceSink) {
        self.for_each_store(
            MessageType::SuspendOpenRetrievalOfPacketStores,
            stores,
            sink,
            |store, _| {
                store.open_retrieval_status = OpenRetrievalStatus::Suspended;
                Ok(())
            },
        );
    }

    fn abort_by_time_range_retrieval(
        &mut self,
        stores: &[PacketStoreId],
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(
            MessageType::AbortByTimeRangeRetrieval,
            stores,
            sink,
            |store, _| {
                store.by_time_range_retrieval = None;
                Ok(())
            },
        );
    }

    fn report_status(&self, sink: &mut dyn ServiceSink) {
        let stores = self
            .registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let store = self.registry.get(&id)?;
                Some(PacketStoreStatus {
                    storage_status: store.storage_status(),
                    open_retrieval_status: store.open_retrieval_status(),
                    by_time_range_retrieval_status: store.by_time_range_retrieval_status(),
                    packet_store_id: id,
                })
            })
            .collect();
        sink.emit(Report::Status { stores });
    }

    fn report_configuration(&self, sink: &mut dyn ServiceSink) {
        let stores = self
            .registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let store = self.registry.get(&id)?;
                Some(PacketStoreConfiguration {
                    size_bytes: store.capacity_bytes(),
                    store_type: store.store_type(),
                    virtual_channel: store.virtual_channel(),
                    packet_store_id: id,
                })
            })
            .collect();
        sink.emit(Report::Configuration { stores });
    }

    fn create_packet_stores(
        &mut self,
        definitions: &[PacketStoreDefinition],
        sink: &mut dyn ServiceSink,
    ) {
        let message_type = MessageType::CreatePacketStores;

        for definition in definitions {
            let result = if self.registry.contains(&definition.id) {
                Err(ExecutionError::AlreadyExistingPacketStore)
            } else if self.registry.is_full() {
                Err(ExecutionError::MaxNumberOfPacketStoresReached)
            } else if !self.config.virtual_channels.contains(definition.virtual_channel) {
                Err(ExecutionError::InvalidVirtualChannel)
            } else if !self.config.accepts_store_size(definition.size_bytes) {
                Err(ExecutionError::UnableToHandlePacketStoreSize)
            } else {
                let store = PacketStore::new(
                    definition.size_bytes,
                    definition.store_type,
                    definition.virtual_channel,
                );
                self.registry.create(definition.id.clone(), store)
            };

            match result {
                Ok(()) => tracing::info!(
                    "Created {:?} packet store {} ({} bytes, VC {})",
                    definition.store_type,
                    definition.id,
                    definition.size_bytes,
                    definition.virtual_channel
                ),
                Err(error) => reject(sink, message_type, Some(&definition.id), error),
            }
        }
    }

    fn delete_packet_stores(&mut self, stores: &[PacketStoreId], sink: &mut dyn ServiceSink) {
        let message_type = MessageType::DeletePacketStores;

        for id in self.targets(stores) {
            let result = match self.registry.get(&id) {
                None => Err(ExecutionError::NonExistingPacketStore),
                Some(store) => guard::check(store, Mutation::Delete, &self.config.capabilities)
                    .and_then(|()| {
                        if self.router.is_routed(&id) {
                            tracing::warn!(
                                "Packet store {} still receives services {:?}",
                                id,
                                self.router.services_for(&id)
                            );
                            Err(ExecutionError::PacketStoreStillRouted)
                        } else {
                            Ok(())
                        }
                    }),
            };

            match result {
                Ok(()) => {
                    self.registry.remove(&id);
                    tracing::info!("Deleted packet store {}", id);
                }
                Err(error) => reject(sink, message_type, Some(&id), error),
            }
        }
    }

    fn copy_packets_in_time_window(
        &mut self,
        time_window_type: u8,
        time_tag1: TimeTag,
        time_tag2: TimeTag,
        from: &PacketStoreId,
        to: &PacketStoreId,
        sink: &mut dyn ServiceSink,
    ) {
        let message_type = MessageType::CopyPacketsInTimeWindow;

        if !self.registry.contains(from) || !self.registry.contains(to) {
            let missing = if self.registry.contains(from) { to } else { from };
            reject(
                sink,
                message_type,
                Some(missing),
                ExecutionError::NonExistingPacketStore,
            );
            return;
        }

        let kind = match TimeWindowType::try_from(time_window_type) {
            Ok(kind) => kind,
            Err(error) => {
                tracing::error!("Copy from {} to {} aborted: {}", from, to, error);
                sink.internal_error(error);
                return;
            }
        };
        let window = TimeWindow::new(kind, time_tag1, time_tag2);

        let result = match self.registry.source_and_destination(from, to) {
            Some((source, destination)) => retrieval::copy_window(source, destination, window),
            // Same store on both sides: it is the destination too
            None => match self.registry.get(to) {
                Some(store) if !store.is_empty() => {
                    Err(ExecutionError::DestinationPacketStoreNotEmpty)
                }
                _ => Err(ExecutionError::CopyOfPacketsFailed),
            },
        };

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    "Copied {} packets from {} to {} ({:?})",
                    outcome.copied,
                    from,
                    to,
                    window.kind()
                );
                if outcome.rejected > 0 || outcome.evicted > 0 {
                    tracing::warn!(
                        "Copy into {} truncated: {} rejected, {} evicted",
                        to,
                        outcome.rejected,
                        outcome.evicted
                    );
                }
            }
            Err(error) => reject(sink, message_type, Some(to), error),
        }
    }

    fn resize_packet_stores(&mut self, resizes: &[PacketStoreResize], sink: &mut dyn ServiceSink) {
        let message_type = MessageType::ResizePacketStores;

        for resize in resizes {
            let Some(store) = self.registry.get_mut(&resize.id) else {
                reject(
                    sink,
                    message_type,
                    Some(&resize.id),
                    ExecutionError::NonExistingPacketStore,
                );
                continue;
            };

            let result = if self.config.accepts_store_size(resize.size_bytes) {
                guard::check(store, Mutation::Resize, &self.config.capabilities)
            } else {
                Err(ExecutionError::UnableToHandlePacketStoreSize)
            };
            if let Err(error) = result {
                reject(sink, message_type, Some(&resize.id), error);
                continue;
            }

            let evicted = store.resize(resize.size_bytes);
            if evicted > 0 {
                tracing::warn!(
                    "Resizing {} to {} bytes evicted {} packets",
                    resize.id,
                    resize.size_bytes,
                    evicted
                );
            }
        }
    }

    fn change_type(
        &mut self,
        message_type: MessageType,
        id: &PacketStoreId,
        store_type: PacketStoreType,
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(message_type, std::slice::from_ref(id), sink, |store, config| {
            guard::check(store, Mutation::ChangeType, &config.capabilities)?;
            store.store_type = store_type;
            Ok(())
        });
    }

    fn change_virtual_channel(
        &mut self,
        id: &PacketStoreId,
        virtual_channel: u8,
        sink: &mut dyn ServiceSink,
    ) {
        self.for_each_store(
            MessageType::ChangeVirtualChannel,
            std::slice::from_ref(id),
            sink,
            |store, config| {
                if !config.virtual_channels.contains(virtual_channel) {
                    return Err(ExecutionError::InvalidVirtualChannel);
                }
                guard::check(store, Mutation::ChangeVirtualChannel, &config.capabilities)?;
                store.virtual_channel = virtual_channel;
                Ok(())
            },
        );
    }
}

fn reject(
    sink: &mut dyn ServiceSink,
    message_type: MessageType,
    store_id: Option<&PacketStoreId>,
    error: ExecutionError,
) {
    match store_id {
        Some(id) => tracing::warn!(
            "TC[15,{}] rejected for {}: {}",
            message_type.subtype(),
            id,
            error
        ),
        None => tracing::warn!("TC[15,{}] rejected: {}", message_type.subtype(), error),
    }
    sink.request_failed(RequestFailure {
        message_type,
        store_id: store_id.cloned(),
        error,
    });
}
