// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use pus_storage::{
    ManualClock, PlatformConfig, RecordingSink, Request, StorageAndRetrievalService,
};

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON request batches must never panic the facade
    let Ok(requests) = serde_json::from_slice::<Vec<Request>>(data) else {
        return;
    };
    let Ok(mut service) =
        StorageAndRetrievalService::with_clock(PlatformConfig::default(), ManualClock::new(0))
    else {
        return;
    };

    let mut sink = RecordingSink::new();
    for request in &requests {
        service.execute(request, &mut sink);
        assert!(service.registry().len() <= service.config().max_packet_stores);
    }
});
