// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Platform configuration.
//!
//! Supports both programmatic (builder) and file-based (TOML) configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::store::PacketStoreId;
use crate::{MAX_MESSAGE_SIZE, MAX_PACKET_STORES, MAX_SERVICE_ROUTES};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the expected layout
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values violate a platform limit
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Platform limits, capabilities and the initial routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Maximum number of packet stores in the registry.
    #[serde(default = "default_max_packet_stores")]
    pub max_packet_stores: usize,

    /// Maximum size of a single packet store (bytes).
    #[serde(default = "default_max_packet_store_size_bytes")]
    pub max_packet_store_size_bytes: u32,

    /// Maximum size of a single stored telemetry message (bytes).
    #[serde(default = "default_max_message_size_bytes")]
    pub max_message_size_bytes: usize,

    /// Log level (consumed by host tooling).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Valid virtual channel range.
    #[serde(default)]
    pub virtual_channels: VirtualChannelRange,

    /// Optional service features.
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Service type to packet store routes.
    #[serde(default)]
    pub routes: Vec<ServiceRoute>,
}

fn default_max_packet_stores() -> usize {
    4
}

fn default_max_packet_store_size_bytes() -> u32 {
    4096
}

fn default_max_message_size_bytes() -> usize {
    MAX_MESSAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            max_packet_stores: default_max_packet_stores(),
            max_packet_store_size_bytes: default_max_packet_store_size_bytes(),
            max_message_size_bytes: default_max_message_size_bytes(),
            log_level: default_log_level(),
            virtual_channels: VirtualChannelRange::default(),
            capabilities: Capabilities::default(),
            routes: Vec::new(),
        }
    }
}

impl PlatformConfig {
    /// Create a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_packet_stores == 0 || self.max_packet_stores > MAX_PACKET_STORES {
            return Err(ConfigError::Invalid(format!(
                "max_packet_stores must be in 1..={} (got {})",
                MAX_PACKET_STORES, self.max_packet_stores
            )));
        }

        if self.max_packet_store_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_packet_store_size_bytes must be positive".into(),
            ));
        }

        if self.max_message_size_bytes == 0 || self.max_message_size_bytes > MAX_MESSAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_message_size_bytes must be in 1..={} (got {})",
                MAX_MESSAGE_SIZE, self.max_message_size_bytes
            )));
        }

        if self.virtual_channels.min > self.virtual_channels.max {
            return Err(ConfigError::Invalid(format!(
                "Virtual channel range {}..={} is empty",
                self.virtual_channels.min, self.virtual_channels.max
            )));
        }

        if self.routes.len() > MAX_SERVICE_ROUTES {
            return Err(ConfigError::Invalid(format!(
                "{} routes configured (limit {})",
                self.routes.len(),
                MAX_SERVICE_ROUTES
            )));
        }

        for (i, route) in self.routes.iter().enumerate() {
            if self.routes[..i]
                .iter()
                .any(|r| r.service_type == route.service_type)
            {
                return Err(ConfigError::Invalid(format!(
                    "Route {} duplicates service type {}",
                    i, route.service_type
                )));
            }
        }

        Ok(())
    }

    /// Whether a packet store of `size_bytes` can be handled.
    pub fn accepts_store_size(&self, size_bytes: u32) -> bool {
        size_bytes > 0 && size_bytes <= self.max_packet_store_size_bytes
    }
}

/// Inclusive virtual channel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualChannelRange {
    /// Lowest valid channel.
    pub min: u8,
    /// Highest valid channel.
    pub max: u8,
}

impl Default for VirtualChannelRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

impl VirtualChannelRange {
    /// Check whether `channel` is valid.
    pub fn contains(&self, channel: u8) -> bool {
        (self.min..=self.max).contains(&channel)
    }
}

/// Optional service features declared by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Open and by-time-range retrieval may run on the same store at once.
    #[serde(default)]
    pub concurrent_retrieval_requests: bool,

    /// Retrieval requests carry a priority.
    #[serde(default = "default_true")]
    pub prioritizing_retrievals: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            concurrent_retrieval_requests: false,
            prioritizing_retrievals: true,
        }
    }
}

/// Reports of `service_type` are filed into `packet_store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRoute {
    /// Originating service type.
    pub service_type: u8,

    /// Destination packet store.
    pub packet_store: PacketStoreId,
}

impl ServiceRoute {
    /// Create a new route.
    pub fn new(service_type: u8, packet_store: PacketStoreId) -> Self {
        Self {
            service_type,
            packet_store,
        }
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    max_packet_stores: Option<usize>,
    max_packet_store_size_bytes: Option<u32>,
    max_message_size_bytes: Option<usize>,
    log_level: Option<String>,
    virtual_channels: Option<VirtualChannelRange>,
    capabilities: Option<Capabilities>,
    routes: Vec<ServiceRoute>,
}

impl ConfigBuilder {
    /// Set the maximum number of packet stores
    pub fn max_packet_stores(mut self, count: usize) -> Self {
        self.max_packet_stores = Some(count);
        self
    }

    /// Set the maximum packet store size in bytes
    pub fn max_packet_store_size_bytes(mut self, bytes: u32) -> Self {
        self.max_packet_store_size_bytes = Some(bytes);
        self
    }

    /// Set the maximum telemetry message size in bytes
    pub fn max_message_size_bytes(mut self, bytes: usize) -> Self {
        self.max_message_size_bytes = Some(bytes);
        self
    }

    /// Set the log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Set the valid virtual channel range (inclusive)
    pub fn virtual_channels(mut self, min: u8, max: u8) -> Self {
        self.virtual_channels = Some(VirtualChannelRange { min, max });
        self
    }

    /// Allow concurrent open and by-time-range retrievals
    pub fn concurrent_retrieval_requests(mut self, enabled: bool) -> Self {
        self.capabilities
            .get_or_insert_with(Capabilities::default)
            .concurrent_retrieval_requests = enabled;
        self
    }

    /// Honour retrieval priorities
    pub fn prioritizing_retrievals(mut self, enabled: bool) -> Self {
        self.capabilities
            .get_or_insert_with(Capabilities::default)
            .prioritizing_retrievals = enabled;
        self
    }

    /// Add a service route
    pub fn route(mut self, route: ServiceRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// Build the configuration
    pub fn build(self) -> PlatformConfig {
        let defaults = PlatformConfig::default();

        PlatformConfig {
            max_packet_stores: self.max_packet_stores.unwrap_or(defaults.max_packet_stores),
            max_packet_store_size_bytes: self
                .max_packet_store_size_bytes
                .unwrap_or(defaults.max_packet_store_size_bytes),
            max_message_size_bytes: self
                .max_message_size_bytes
                .unwrap_or(defaults.max_message_size_bytes),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            virtual_channels: self.virtual_channels.unwrap_or(defaults.virtual_channels),
            capabilities: self.capabilities.unwrap_or(defaults.capabilities),
            routes: self.routes,
        }
    }
}
