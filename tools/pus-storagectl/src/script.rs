// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command scripts
//!
//! A script is a JSON array of steps replayed against one service instance.
//! Every report, rejected item, internal error and insertion outcome is
//! written as one JSON line, tagged with the index of the step that
//! produced it.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use pus_storage::{ManualClock, RecordingSink, Request, StorageAndRetrievalService, TimeTag};
use serde::Deserialize;
use serde_json::json;

/// One script step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Execute a telecommand
    Execute { request: Request },

    /// Feed a telemetry report generated by `service_type` at `time`
    Telemetry {
        service_type: u8,
        time: TimeTag,
        #[serde(default)]
        payload: Vec<u8>,
    },
}

/// Load a script file.
pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
}

/// Totals of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub reports: usize,
    pub failures: usize,
    pub internal_errors: usize,
}

/// Replay `steps`, writing one JSON line per event to `out`.
pub fn run<W: Write>(
    service: &mut StorageAndRetrievalService<ManualClock>,
    steps: &[Step],
    out: &mut W,
) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    let mut sink = RecordingSink::new();

    for (index, step) in steps.iter().enumerate() {
        match step {
            Step::Execute { request } => {
                service.execute(request, &mut sink);
            }
            Step::Telemetry {
                service_type,
                time,
                payload,
            } => {
                service.clock().set(*time);
                let line = match service.store_report(*service_type, payload) {
                    Ok(outcome) => json!({ "step": index, "telemetry": outcome }),
                    Err(e) => json!({ "step": index, "storage_error": e.to_string() }),
                };
                writeln!(out, "{}", line)?;
            }
        }

        for report in sink.reports.drain(..) {
            writeln!(out, "{}", json!({ "step": index, "emit": report }))?;
            summary.reports += 1;
        }
        for failure in sink.failures.drain(..) {
            writeln!(out, "{}", json!({ "step": index, "failure": failure }))?;
            summary.failures += 1;
        }
        for error in sink.internal_errors.drain(..) {
            writeln!(out, "{}", json!({ "step": index, "internal_error": error }))?;
            summary.internal_errors += 1;
        }
        summary.steps += 1;
    }

    Ok(summary)
}
