// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use pus_storage::{
    ManualClock, PacketStoreDefinition, PacketStoreId, PacketStoreType, PlatformConfig,
    RecordingSink, Request, ServiceRoute, StorageAndRetrievalService, TimeWindowType,
};

// Byte layout: [capacity, type, then (op, arg) pairs]
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let (Ok(src), Ok(dst)) = (PacketStoreId::new("src"), PacketStoreId::new("dst")) else {
        return;
    };

    let capacity = u32::from(data[0]).max(1);
    let store_type = if data[1] & 1 == 0 {
        PacketStoreType::Circular
    } else {
        PacketStoreType::Bounded
    };

    let config = PlatformConfig::builder()
        .route(ServiceRoute::new(1, src.clone()))
        .build();
    let Ok(mut service) = StorageAndRetrievalService::with_clock(config, ManualClock::new(0)) else {
        return;
    };
    let mut sink = RecordingSink::new();
    service.execute(
        &Request::CreatePacketStores {
            stores: vec![
                PacketStoreDefinition::new(src.clone(), capacity, store_type, 1),
                PacketStoreDefinition::new(dst.clone(), capacity, store_type, 1),
            ],
        },
        &mut sink,
    );
    service.execute(&Request::EnableStorage { stores: vec![] }, &mut sink);

    for pair in data[2..].chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        match op % 4 {
            // Insert `arg` bytes, time moves forward by op / 4
            0 | 1 => {
                service.clock().advance(u32::from(op / 4));
                let _ = service.store_report(1, &vec![arg; usize::from(arg)]);
            }
            2 => {
                let request = Request::DeletePacketStoreContent {
                    time_limit: u32::from(arg),
                    stores: vec![dst.clone()],
                };
                service.execute(&request, &mut sink);
            }
            _ => {
                let kind = match arg % 3 {
                    0 => TimeWindowType::FromTagToTag,
                    1 => TimeWindowType::AfterTimeTag,
                    _ => TimeWindowType::BeforeTimeTag,
                };
                let t1 = u32::from(arg / 3);
                let request = Request::copy(kind, t1, t1 + u32::from(op), src.clone(), dst.clone());
                service.execute(&request, &mut sink);
            }
        }

        for (_, store) in service.registry().iter() {
            assert!(store.stored_bytes() <= store.capacity_bytes() as usize);
            let tags: Vec<_> = store.packets().map(|p| p.time_tag).collect();
            assert!(tags.windows(2).all(|w| w[0] <= w[1]));
        }
    }
});
