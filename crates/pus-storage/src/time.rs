// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time tags and clocks
//!
//! Packets are stamped with on-board time in whole seconds since the UNIX
//! epoch. The facade owns a [`Clock`] and stamps every routed report on
//! insertion; copy operations keep the source stamps.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// On-board time tag (seconds).
pub type TimeTag = u32;

/// Source of the current on-board time.
pub trait Clock {
    /// Current time tag.
    fn now(&self) -> TimeTag;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimeTag {
        (**self).now()
    }
}

/// Host wall clock, seconds since the UNIX epoch (saturating at `u32::MAX`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeTag {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| TimeTag::try_from(d.as_secs()).unwrap_or(TimeTag::MAX))
            .unwrap_or(0)
    }
}

/// Settable clock for tests and scripted replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<TimeTag>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: TimeTag) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: TimeTag) {
        self.now.set(now);
    }

    /// Move forward by `secs` (saturating).
    pub fn advance(&self, secs: TimeTag) {
        self.now.set(self.now.get().saturating_add(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeTag {
        self.now.get()
    }
}
