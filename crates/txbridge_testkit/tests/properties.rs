//! Property tests: arbitrary interleavings of every bridge entry point.

use proptest::prelude::*;
use txbridge_core::{BridgeConfig, CompletionStatus, NativeState, TransactionCoordinator};
use txbridge_testkit::{
    host_mode_strategy, op_sequence_strategy, open_op_strategy, BridgeFixture, HostMode,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bridge_stays_consistent(mode in host_mode_strategy(), ops in op_sequence_strategy(40)) {
        let fx = BridgeFixture::new(mode, BridgeConfig::default());

        for op in ops {
            // Errors are expected once faults are armed
            let _ = fx.apply(op);
            fx.assert_consistent();
        }

        fx.store.reset();
        fx.bridge().failure().unwrap();
        prop_assert_eq!(fx.bridge().state(), NativeState::Closed);
        prop_assert_eq!(fx.native().open_count(), 0);
        fx.assert_consistent();
    }

    #[test]
    fn open_ops_open_at_most_one(ops in prop::collection::vec(open_op_strategy(), 1..20)) {
        let fx = BridgeFixture::new(HostMode::Jta, BridgeConfig::default());

        for op in ops {
            fx.apply(op).unwrap();
            prop_assert!(fx.native().open_count() <= 1);
        }

        prop_assert_eq!(fx.native().begun(), 1);
        prop_assert!(fx.host.registered() <= 1);
    }

    #[test]
    fn every_listener_matches_an_open(rounds in 1usize..10, commit in any::<bool>()) {
        let fx = BridgeFixture::jta();

        for _ in 0..rounds {
            fx.host.begin_jta();
            fx.coordinator.explicit_join().unwrap();
            let status = if commit {
                CompletionStatus::Committed
            } else {
                CompletionStatus::RolledBack
            };
            prop_assert!(fx.host.complete(status).is_clean());
        }

        let stats = fx.stats();
        prop_assert_eq!(stats.opened, rounds as u64);
        prop_assert_eq!(stats.listeners_registered, rounds as u64);
        prop_assert_eq!(stats.in_flight(), 0);
    }
}
