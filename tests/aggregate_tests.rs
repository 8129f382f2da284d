// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for the fabric aggregate lifecycle
//!
//! These tests verify the complete flow:
//! 1. Operation → version bump and one queued event
//! 2. Failed operation → no state change, no event
//! 3. Delete and recreate → version sequence continues

mod fixtures;

use fabric_sync::domain::{Fabric, FabricError, FabricStatus, ValidationError};
use fabric_sync::events::FabricEvent;
use fabric_sync::subjects::Operation;
use pretty_assertions::assert_eq;

use fixtures::{cotton, linen, silk, FABRIC_CODE};

/// Test: create then update advances to version 2 with one event each
#[test]
fn test_create_then_update() {
    let mut fabric = Fabric::create(FABRIC_CODE, cotton()).expect("valid fabric");
    assert_eq!(fabric.version(), 1);
    assert_eq!(fabric.status(), FabricStatus::Active);

    let created = fabric.take_events();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].event_type(), "app.fabric.created");

    fabric.update(silk(), 1).expect("current version");

    assert_eq!(fabric.version(), 2);
    assert_eq!(fabric.name(), "Silk");
    assert_eq!(fabric.measure_unit(), "KG");

    let updated = fabric.take_events();
    assert_eq!(updated.len(), 1);
    match &updated[0] {
        FabricEvent::Updated(e) => {
            assert_eq!(e.version, 2);
            assert_eq!(e.name, "Silk");
        }
        other => panic!("expected Updated, got {:?}", other),
    }
}

/// Test: a stale expected version is rejected and nothing changes
#[test]
fn test_stale_update_leaves_fabric_untouched() {
    let mut fabric = Fabric::create(FABRIC_CODE, cotton()).unwrap();
    fabric.update(silk(), 1).unwrap();
    fabric.take_events();
    let before = fabric.clone();

    let err = fabric.update(linen(), 1).unwrap_err();

    assert!(matches!(
        err,
        FabricError::ConcurrencyConflict {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    assert_eq!(fabric, before);
    assert!(fabric.pending_events().is_empty());
}

/// Test: delete then recreate continues the version sequence
#[test]
fn test_delete_then_reactivate_continues_versions() {
    let mut fabric = Fabric::create(FABRIC_CODE, cotton()).unwrap();
    fabric.update(silk(), 1).unwrap();
    fabric.delete(2).unwrap();

    assert_eq!(fabric.version(), 3);
    assert_eq!(fabric.status(), FabricStatus::Deleted);

    fabric.reactivate(linen(), 3).unwrap();

    assert_eq!(fabric.version(), 4);
    assert!(fabric.is_active());
    assert_eq!(fabric.name(), "Linen");

    let operations: Vec<Operation> = fabric.take_events().iter().map(|e| e.operation()).collect();
    assert_eq!(
        operations,
        vec![
            Operation::Created,
            Operation::Updated,
            Operation::Deleted,
            Operation::Reactivated
        ]
    );
}

/// Test: ordinary mutations of a deleted fabric fail
#[test]
fn test_deleted_fabric_rejects_update_and_delete() {
    let mut fabric = Fabric::create(FABRIC_CODE, cotton()).unwrap();
    fabric.delete(1).unwrap();
    fabric.take_events();

    assert!(matches!(fabric.update(silk(), 2), Err(FabricError::AlreadyDeleted(_))));
    assert!(matches!(fabric.delete(2), Err(FabricError::AlreadyDeleted(_))));
    assert_eq!(fabric.version(), 2);
    assert!(fabric.pending_events().is_empty());
}

/// Test: invalid input never produces an aggregate
#[test]
fn test_create_validation() {
    assert!(matches!(
        Fabric::create("fab-1", cotton()),
        Err(FabricError::Validation(ValidationError::CodePattern(_)))
    ));
    assert!(matches!(
        Fabric::create("F", cotton()),
        Err(FabricError::Validation(ValidationError::CodeLength(1)))
    ));

    let mut nameless = cotton();
    nameless.name.clear();
    assert!(matches!(
        Fabric::create(FABRIC_CODE, nameless),
        Err(FabricError::Validation(ValidationError::NameLength(0)))
    ));
}

/// Test: event payloads carry the state after the change
#[test]
fn test_event_payload_shape() {
    let mut fabric = Fabric::create(FABRIC_CODE, cotton()).unwrap();
    let events = fabric.take_events();
    let payload = events[0].payload().unwrap();

    assert_eq!(payload["code"], "FAB1");
    assert_eq!(payload["name"], "Cotton");
    assert_eq!(payload["measure_unit"], "MB");
    assert_eq!(payload["version"], 1);
}
