// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PUS Storage host tool
//!
//! # Usage
//!
//! ```bash
//! # Write an example platform configuration
//! pus-storagectl gen-config --output storage.toml
//!
//! # Check a configuration file
//! pus-storagectl validate --config storage.toml
//!
//! # Replay a command script, keeping the registry across runs
//! pus-storagectl --config storage.toml run --script pass.json \
//!     --restore stores.json --save stores.json
//! ```

mod script;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pus_storage::{
    Capabilities, ManualClock, PacketStoreId, PlatformConfig, RegistrySnapshot, ServiceRoute,
    StorageAndRetrievalService, VirtualChannelRange,
};
use tracing_subscriber::EnvFilter;

/// PUS Storage and Retrieval host tool
#[derive(Parser, Debug)]
#[command(name = "pus-storagectl")]
#[command(about = "PUS ST[15] storage engine - configuration and scripted replay")]
#[command(version)]
struct Args {
    /// Platform configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "storage.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate,

    /// Replay a JSON command script against a fresh service
    Run {
        /// Script file (JSON array of steps)
        #[arg(short, long)]
        script: PathBuf,

        /// Registry snapshot to start from
        #[arg(long)]
        restore: Option<PathBuf>,

        /// Where to write the registry snapshot afterwards
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Validation reports its own errors, before logging is set up
    if let Commands::Validate = args.command {
        return cmd_validate(args.config);
    }

    let config = match &args.config {
        Some(path) => PlatformConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlatformConfig::default(),
    };

    // Initialize logging (stdout is reserved for script output)
    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::GenConfig { output } => cmd_gen_config(output),
        Commands::Validate => Ok(()),
        Commands::Run {
            script,
            restore,
            save,
        } => cmd_run(config, script, restore, save),
    }
}

fn cmd_gen_config(output: PathBuf) -> anyhow::Result<()> {
    let config = PlatformConfig {
        max_packet_stores: 4,
        max_packet_store_size_bytes: 4096,
        max_message_size_bytes: 1024,
        log_level: "info".into(),
        virtual_channels: VirtualChannelRange { min: 1, max: 10 },
        capabilities: Capabilities {
            concurrent_retrieval_requests: false,
            prioritizing_retrievals: true,
        },
        routes: vec![
            ServiceRoute::new(3, PacketStoreId::new("housekeeping")?),
            ServiceRoute::new(5, PacketStoreId::new("events")?),
        ],
    };

    let toml_str = config.to_toml()?;

    // Add comments
    let content = format!(
        r#"# PUS Storage platform configuration
# Generated by pus-storagectl gen-config

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = config_path.context("validate requires --config")?;

    match PlatformConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Packet stores:    up to {}", config.max_packet_stores);
            println!("Store size:       up to {} bytes", config.max_packet_store_size_bytes);
            println!("Message size:     up to {} bytes", config.max_message_size_bytes);
            println!(
                "Virtual channels: {}..={}",
                config.virtual_channels.min, config.virtual_channels.max
            );
            println!("Routes: {}", config.routes.len());
            for route in &config.routes {
                println!("  ST[{}] -> {}", route.service_type, route.packet_store);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_run(
    config: PlatformConfig,
    script_path: PathBuf,
    restore: Option<PathBuf>,
    save: Option<PathBuf>,
) -> anyhow::Result<()> {
    let steps = script::load(&script_path)?;
    let mut service = StorageAndRetrievalService::with_clock(config, ManualClock::new(0))?;

    if let Some(path) = restore {
        let snapshot = RegistrySnapshot::load(&path)
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        service.restore(snapshot)?;
    }

    tracing::info!(
        "Replaying {} steps from {}",
        steps.len(),
        script_path.display()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = script::run(&mut service, &steps, &mut out)?;
    out.flush()?;

    tracing::info!(
        "Done: {} steps, {} reports, {} failures, {} internal errors",
        summary.steps,
        summary.reports,
        summary.failures,
        summary.internal_errors
    );

    if let Some(path) = save {
        service.snapshot().save(&path)?;
        tracing::info!("Saved {} packet stores to {}", service.registry().len(), path.display());
    }

    Ok(())
}
