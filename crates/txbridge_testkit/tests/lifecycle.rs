//! Integration tests for the bridge lifecycle across all entry points.

use txbridge_core::{
    BridgeConfig, BridgeError, CompletionStatus, GoverningStatus, NativeState,
    TransactionCoordinator,
};
use txbridge_native::{NativeEvent, NativeOutcome};
use txbridge_testkit::{init_test_logging, BridgeFixture, BridgeOp, HostCall, HostMode};

fn close_events(fx: &BridgeFixture) -> usize {
    fx.native()
        .journal()
        .iter()
        .filter(|event| matches!(event, NativeEvent::Close { .. }))
        .count()
}

#[test]
fn repeated_joins_open_one_transaction() {
    init_test_logging();
    let fx = BridgeFixture::jta();

    for op in [
        BridgeOp::ExplicitJoin,
        BridgeOp::Pulse,
        BridgeOp::Begin,
        BridgeOp::ExplicitJoin,
        BridgeOp::Pulse,
    ] {
        fx.apply(op).unwrap();
        fx.assert_consistent();
    }

    assert_eq!(fx.native().begun(), 1);
    assert_eq!(fx.host.registered(), 1);
}

#[test]
fn every_open_is_closed_once() {
    let fx = BridgeFixture::jta();

    fx.coordinator.explicit_join().unwrap();
    assert_eq!(fx.bridge().state(), NativeState::Open);

    let report = fx.host.complete(CompletionStatus::Committed);

    assert!(report.is_clean());
    assert_eq!(fx.bridge().state(), NativeState::Closed);
    assert_eq!(close_events(&fx), 1);
    assert_eq!(fx.native().committed(), 1);
    fx.assert_consistent();
}

#[test]
fn failed_close_clears_handle_and_surfaces() {
    let fx = BridgeFixture::jta();
    fx.coordinator.explicit_join().unwrap();
    fx.store.set_fail_close(true);

    let report = fx.host.complete(CompletionStatus::Committed);

    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], BridgeError::NativeClose(_)));
    assert_eq!(report.outcome, CompletionStatus::RolledBack);
    assert!(!fx.bridge().is_open());
    fx.assert_consistent();

    // The bridge is usable again for the next transaction
    fx.store.set_fail_close(false);
    fx.host.begin_jta();
    fx.coordinator.explicit_join().unwrap();
    assert!(fx.bridge().is_open());
    assert_eq!(fx.native().begun(), 2);
}

#[test]
fn commit_error_masks_cleanup_error() {
    let fx = BridgeFixture::local();
    let driver = fx.driver();
    driver.begin().unwrap();
    fx.host.fail_commit(true);
    fx.store.set_fail_close(true);

    let err = driver.commit().unwrap_err();

    assert!(matches!(err, BridgeError::Host(ref e) if e.message == "host commit failed"));
    assert!(!fx.bridge().is_open());
    assert_eq!(fx.store.close_attempts(), 1);
    assert_eq!(fx.stats().suppressed_errors, 1);
    fx.assert_consistent();
}

#[test]
fn rollback_cleans_up_when_host_succeeds() {
    let fx = BridgeFixture::local();
    let driver = fx.driver();
    driver.begin().unwrap();

    driver.rollback().unwrap();

    assert!(!fx.bridge().is_open());
    assert_eq!(fx.native().rolled_back(), 1);
    fx.assert_consistent();
}

#[test]
fn rollback_cleans_up_when_host_fails() {
    let fx = BridgeFixture::local();
    let driver = fx.driver();
    driver.begin().unwrap();
    fx.host.fail_rollback(true);

    let err = driver.rollback().unwrap_err();

    assert!(err.is_host());
    assert!(!fx.bridge().is_open());
    assert_eq!(fx.native().rolled_back(), 1);
    fx.assert_consistent();
}

#[test]
fn after_completion_does_not_close_twice() {
    let fx = BridgeFixture::jta();
    fx.coordinator.explicit_join().unwrap();
    let listener = fx.host.synchronizations().pop().unwrap();

    listener.before_completion().unwrap();
    listener.after_completion(CompletionStatus::Committed).unwrap();

    assert_eq!(fx.store.close_attempts(), 1);
    assert_eq!(close_events(&fx), 1);
    assert_eq!(fx.native().committed(), 1);
}

#[test]
fn marked_rollback_fails_native_before_completion() {
    let fx = BridgeFixture::jta();
    assert_eq!(fx.host.status(), GoverningStatus::Active);

    fx.coordinator.explicit_join().unwrap();
    assert!(fx.bridge().is_open());
    assert_eq!(fx.host.registered(), 1);

    fx.host.set_status(GoverningStatus::MarkedRollback);
    let errors = fx.host.before_completion();

    assert!(errors.is_empty());
    assert!(!fx.bridge().is_open());
    let id = fx
        .native()
        .journal()
        .iter()
        .find_map(|event| match event {
            NativeEvent::Begin { id, .. } => Some(*id),
            _ => None,
        })
        .unwrap();
    assert!(fx
        .native()
        .journal()
        .contains(&NativeEvent::MarkFailure { id }));
    assert!(fx.native().journal().contains(&NativeEvent::Close {
        id,
        outcome: NativeOutcome::RolledBack
    }));
}

#[test]
fn native_commits_before_host_records_outcome() {
    let fx = BridgeFixture::jta();
    fx.coordinator.explicit_join().unwrap();

    // Stop after before-completion: the host has not finished
    assert!(fx.host.before_completion().is_empty());

    assert_eq!(fx.native().committed(), 1);
    assert_eq!(fx.host.status(), GoverningStatus::Active);
}

#[test]
fn local_transactions_never_register_listeners() {
    let fx = BridgeFixture::local();

    fx.coordinator.explicit_join().unwrap();
    assert!(!fx.bridge().is_open());

    let driver = fx.driver();
    driver.begin().unwrap();
    fx.coordinator.pulse().unwrap();
    driver.commit().unwrap();

    assert_eq!(fx.host.registered(), 0);
    assert!(!fx.host.calls().contains(&HostCall::RegisterSynchronization));
    assert_eq!(fx.native().committed(), 1);
}

#[test]
fn coordinator_reuse_cycles_handle() {
    let fx = BridgeFixture::jta();

    for round in 0..4u64 {
        fx.host.begin_jta();
        fx.coordinator.pulse().unwrap();
        assert!(fx.bridge().is_open());
        if round % 2 == 1 {
            fx.host.set_status(GoverningStatus::MarkedRollback);
        }
        assert!(fx.host.complete(CompletionStatus::Committed).is_clean());
        fx.assert_consistent();
    }

    assert_eq!(fx.native().begun(), 4);
    assert_eq!(fx.native().committed(), 2);
    assert_eq!(fx.native().rolled_back(), 2);
    assert_eq!(fx.stats().listeners_registered, 4);
}

#[test]
fn open_failure_propagates_to_join() {
    let fx = BridgeFixture::jta();
    fx.store.fail_next_opens(1);

    let err = fx.coordinator.explicit_join().unwrap_err();

    assert!(matches!(err, BridgeError::NativeOpen(_)));
    assert!(!fx.bridge().is_open());
    assert_eq!(fx.host.registered(), 0);

    fx.coordinator.explicit_join().unwrap();
    assert!(fx.bridge().is_open());
}

#[test]
fn open_failure_propagates_to_begin() {
    let fx = BridgeFixture::local();
    fx.store.fail_next_opens(1);

    let err = fx.driver().begin().unwrap_err();

    assert!(err.is_native());
    assert_eq!(fx.host.calls(), vec![HostCall::Begin]);
}

#[test]
fn rejected_registration_leaves_nothing_open() {
    let fx = BridgeFixture::jta();
    fx.host.reject_registration(true);

    let err = fx.coordinator.explicit_join().unwrap_err();

    assert!(err.is_host());
    assert!(!fx.bridge().is_open());
    assert_eq!(fx.native().rolled_back(), 1);
    fx.assert_consistent();
}

#[test]
fn pulse_join_disabled_by_config() {
    let fx = BridgeFixture::new(HostMode::Jta, BridgeConfig::new().join_on_pulse(false));

    fx.coordinator.pulse().unwrap();
    assert!(!fx.bridge().is_open());

    fx.coordinator.explicit_join().unwrap();
    assert!(fx.bridge().is_open());
}

#[test]
fn rollback_only_jta_transaction_rolls_back() {
    let fx = BridgeFixture::jta();
    fx.coordinator.explicit_join().unwrap();
    fx.driver().mark_rollback_only();

    let report = fx.host.complete(CompletionStatus::Committed);

    assert!(report.is_clean());
    assert_eq!(report.outcome, CompletionStatus::RolledBack);
    assert_eq!(fx.native().rolled_back(), 1);
    assert_eq!(fx.native().committed(), 0);
}
