// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-window copy through the command facade
//!
//! Source store `src` holds packets stamped 10, 20, 30 and 40 (10 bytes
//! each) in every test.

use pus_storage::{
    ExecutionError, InternalError, ManualClock, PacketStoreDefinition, PacketStoreId,
    PacketStoreType, PlatformConfig, RecordingSink, Request, ServiceRoute,
    StorageAndRetrievalService, TimeTag, TimeWindowType,
};

type Service = StorageAndRetrievalService<ManualClock>;

fn id(s: &str) -> PacketStoreId {
    PacketStoreId::new(s).unwrap()
}

fn setup(dst_size: u32, dst_type: PacketStoreType) -> Service {
    let config = PlatformConfig::builder()
        .route(ServiceRoute::new(1, id("src")))
        .build();
    let mut service = StorageAndRetrievalService::with_clock(config, ManualClock::new(0)).unwrap();
    let mut sink = RecordingSink::new();
    service.execute(
        &Request::CreatePacketStores {
            stores: vec![
                PacketStoreDefinition::new(id("src"), 100, PacketStoreType::Circular, 1),
                PacketStoreDefinition::new(id("dst"), dst_size, dst_type, 2),
            ],
        },
        &mut sink,
    );
    service.execute(
        &Request::EnableStorage {
            stores: vec![id("src")],
        },
        &mut sink,
    );
    for time in [10, 20, 30, 40] {
        service.clock().set(time);
        service.store_report(1, &[time as u8; 10]).unwrap();
    }
    assert!(sink.failures.is_empty());
    service
}

fn copy(service: &mut Service, kind: TimeWindowType, t1: TimeTag, t2: TimeTag) -> RecordingSink {
    let mut sink = RecordingSink::new();
    service.execute(&Request::copy(kind, t1, t2, id("src"), id("dst")), &mut sink);
    sink
}

fn tags(service: &Service, name: &str) -> Vec<TimeTag> {
    service
        .registry()
        .get(&id(name))
        .map(|s| s.packets().map(|p| p.time_tag).collect())
        .unwrap_or_default()
}

#[test]
fn test_copy_from_tag_to_tag() {
    let mut service = setup(100, PacketStoreType::Circular);
    let sink = copy(&mut service, TimeWindowType::FromTagToTag, 15, 35);
    assert!(sink.failures.is_empty());
    assert_eq!(tags(&service, "dst"), vec![20, 30]);
    // Source untouched
    assert_eq!(tags(&service, "src"), vec![10, 20, 30, 40]);
}

#[test]
fn test_copy_after_time_tag() {
    let mut service = setup(100, PacketStoreType::Circular);
    copy(&mut service, TimeWindowType::AfterTimeTag, 25, 0);
    assert_eq!(tags(&service, "dst"), vec![30, 40]);
}

#[test]
fn test_copy_before_time_tag() {
    let mut service = setup(100, PacketStoreType::Circular);
    copy(&mut service, TimeWindowType::BeforeTimeTag, 0, 25);
    assert_eq!(tags(&service, "dst"), vec![10, 20]);
}

#[test]
fn test_copy_keeps_payloads() {
    let mut service = setup(100, PacketStoreType::Circular);
    copy(&mut service, TimeWindowType::FromTagToTag, 20, 20 + 1);
    let dst = service.registry().get(&id("dst")).unwrap();
    let packet = dst.packets().next().unwrap();
    assert_eq!(packet.data, vec![20u8; 10]);
}

#[test]
fn test_copy_no_overlap() {
    let mut service = setup(100, PacketStoreType::Circular);
    let sink = copy(&mut service, TimeWindowType::FromTagToTag, 100, 200);
    assert_eq!(sink.errors(), vec![ExecutionError::NoTimeWindowOverlap]);
    assert!(tags(&service, "dst").is_empty());

    let sink = copy(&mut service, TimeWindowType::AfterTimeTag, 41, 0);
    assert_eq!(sink.errors(), vec![ExecutionError::NoTimeWindowOverlap]);
}

#[test]
fn test_copy_invalid_window() {
    let mut service = setup(100, PacketStoreType::Circular);
    let sink = copy(&mut service, TimeWindowType::FromTagToTag, 30, 30);
    assert_eq!(sink.errors(), vec![ExecutionError::InvalidTimeWindow]);
    assert!(tags(&service, "dst").is_empty());
}

#[test]
fn test_copy_destination_must_be_empty() {
    let mut service = setup(100, PacketStoreType::Circular);
    copy(&mut service, TimeWindowType::AfterTimeTag, 35, 0);
    assert_eq!(tags(&service, "dst"), vec![40]);

    for (kind, t1, t2) in [
        (TimeWindowType::FromTagToTag, 15, 35),
        (TimeWindowType::FromTagToTag, 35, 15),
        (TimeWindowType::AfterTimeTag, 1000, 0),
        (TimeWindowType::BeforeTimeTag, 0, 0),
    ] {
        let sink = copy(&mut service, kind, t1, t2);
        assert_eq!(
            sink.errors(),
            vec![ExecutionError::DestinationPacketStoreNotEmpty]
        );
    }
    assert_eq!(tags(&service, "dst"), vec![40]);
}

#[test]
fn test_copy_from_empty_source() {
    let mut service = setup(100, PacketStoreType::Circular);
    let mut sink = RecordingSink::new();
    service.execute(
        &Request::copy(TimeWindowType::AfterTimeTag, 0, 0, id("dst"), id("src")),
        &mut sink,
    );
    // `src` is not empty, so it cannot receive
    assert_eq!(
        sink.errors(),
        vec![ExecutionError::DestinationPacketStoreNotEmpty]
    );

    let mut sink = RecordingSink::new();
    let mut empty = setup(100, PacketStoreType::Circular);
    empty.execute(
        &Request::CreatePacketStores {
            stores: vec![PacketStoreDefinition::new(
                id("void"),
                100,
                PacketStoreType::Circular,
                1,
            )],
        },
        &mut sink,
    );
    empty.execute(
        &Request::copy(TimeWindowType::AfterTimeTag, 0, 0, id("void"), id("dst")),
        &mut sink,
    );
    assert_eq!(sink.errors(), vec![ExecutionError::CopyOfPacketsFailed]);
}

#[test]
fn test_copy_into_bounded_is_truncated() {
    let mut service = setup(25, PacketStoreType::Bounded);
    let sink = copy(&mut service, TimeWindowType::AfterTimeTag, 0, 0);
    assert!(sink.failures.is_empty());
    assert_eq!(tags(&service, "dst"), vec![10, 20]);
}

#[test]
fn test_copy_into_circular_evicts() {
    let mut service = setup(25, PacketStoreType::Circular);
    let sink = copy(&mut service, TimeWindowType::AfterTimeTag, 0, 0);
    assert!(sink.failures.is_empty());
    assert_eq!(tags(&service, "dst"), vec![30, 40]);
}

#[test]
fn test_copy_unknown_window_type() {
    let mut service = setup(100, PacketStoreType::Circular);
    let mut sink = RecordingSink::new();
    service.execute(
        &Request::CopyPacketsInTimeWindow {
            time_window_type: 3,
            time_tag1: 0,
            time_tag2: 100,
            from: id("src"),
            to: id("dst"),
        },
        &mut sink,
    );
    assert!(sink.failures.is_empty());
    assert_eq!(
        sink.internal_errors,
        vec![InternalError::InvalidTimeWindowType(3)]
    );
    assert!(tags(&service, "dst").is_empty());
}

#[test]
fn test_copy_unknown_store() {
    let mut service = setup(100, PacketStoreType::Circular);
    let mut sink = RecordingSink::new();
    service.execute(
        &Request::copy(TimeWindowType::AfterTimeTag, 0, 0, id("nope"), id("dst")),
        &mut sink,
    );
    assert_eq!(sink.errors(), vec![ExecutionError::NonExistingPacketStore]);
    assert_eq!(sink.failures[0].store_id, Some(id("nope")));
}
