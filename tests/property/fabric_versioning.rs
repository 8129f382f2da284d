// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Fabric Versioning
//!
//! For any sequence of operations, with current or stale expected versions:
//! - a successful operation bumps the version by exactly one
//! - a failed operation changes nothing
//! - queued events carry versions 1..=current, one per success

use fabric_sync::domain::{Fabric, FabricDetails};
use fabric_sync::subjects::Operation;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn valid_code() -> impl Strategy<Value = String> {
    "[A-Z0-9]{2,30}"
}

fn valid_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,40}"
}

fn details(name: String) -> FabricDetails {
    FabricDetails::new(name, "MB", "ACTIVE")
}

#[derive(Debug, Clone)]
enum Op {
    Update { name: String, stale: bool },
    Delete { stale: bool },
    Reactivate { name: String, stale: bool },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (valid_name(), any::<bool>()).prop_map(|(name, stale)| Op::Update { name, stale }),
        any::<bool>().prop_map(|stale| Op::Delete { stale }),
        (valid_name(), any::<bool>()).prop_map(|(name, stale)| Op::Reactivate { name, stale }),
    ]
}

fn expected(fabric: &Fabric, stale: bool) -> u64 {
    if stale {
        fabric.version() + 1
    } else {
        fabric.version()
    }
}

fn run(fabric: &mut Fabric, op: Op) -> bool {
    let result = match op {
        Op::Update { name, stale } => {
            let version = expected(fabric, stale);
            fabric.update(details(name), version)
        }
        Op::Delete { stale } => {
            let version = expected(fabric, stale);
            fabric.delete(version)
        }
        Op::Reactivate { name, stale } => {
            let version = expected(fabric, stale);
            fabric.reactivate(details(name), version)
        }
    };
    result.is_ok()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A valid create always starts at version 1 with one Created event
    #[test]
    fn prop_create_starts_at_one(code in valid_code(), name in valid_name()) {
        let fabric = Fabric::create(code.clone(), details(name)).unwrap();

        prop_assert_eq!(fabric.version(), 1);
        prop_assert!(fabric.is_active());
        prop_assert_eq!(fabric.code().as_str(), code.as_str());
        prop_assert_eq!(fabric.pending_events().len(), 1);
        prop_assert_eq!(fabric.pending_events()[0].operation(), Operation::Created);
    }

    /// Version moves by exactly one per success and not at all on failure
    #[test]
    fn prop_version_is_monotonic(
        code in valid_code(),
        name in valid_name(),
        ops in prop::collection::vec(op(), 0..30)
    ) {
        let mut fabric = Fabric::create(code, details(name)).unwrap();

        for op in ops {
            let before = fabric.clone();
            if run(&mut fabric, op) {
                prop_assert_eq!(fabric.version(), before.version() + 1);
                prop_assert_eq!(fabric.pending_events().len(), before.pending_events().len() + 1);
            } else {
                prop_assert_eq!(&fabric, &before);
            }
        }
    }

    /// Queued events are exactly the successful mutations, in version order
    #[test]
    fn prop_events_match_successes(
        code in valid_code(),
        name in valid_name(),
        ops in prop::collection::vec(op(), 0..30)
    ) {
        let mut fabric = Fabric::create(code, details(name)).unwrap();
        let mut successes = 0u64;

        for op in ops {
            if run(&mut fabric, op) {
                successes += 1;
            }
        }

        let versions: Vec<u64> = fabric.take_events().iter().map(|e| e.version()).collect();
        let expected: Vec<u64> = (1..=successes + 1).collect();
        prop_assert_eq!(versions, expected);
        prop_assert_eq!(fabric.version(), successes + 1);
        prop_assert!(fabric.pending_events().is_empty());
    }

    /// Lowercase codes are never accepted
    #[test]
    fn prop_lowercase_code_rejected(code in "[a-z]{2,30}", name in valid_name()) {
        prop_assert!(Fabric::create(code, details(name)).is_err());
    }
}
