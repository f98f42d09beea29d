//! Ledger Property Tests
//!
//! Randomized operation sequences against the financial invariants: the
//! available balance never goes negative, reserved funds never exceed
//! earnings, the wallet cache always matches recomputation, and every
//! reachable state snapshots cleanly.

use agency_ledger_core::{
    compute_balance, create_payout, handle_application_approved, set_payout_status,
    validate_snapshot, AgentProfile, ApprovedApplication, CommissionType, LedgerConfig,
    LedgerState, PayoutStatus, StateSnapshot,
};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// ============================================================================
// Operation model
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    /// Approve an application for the agent, crediting `amount` cents.
    Approve { amount: i64, scholarship: bool },

    /// Request a payout of `amount` cents. May legitimately fail.
    RequestPayout { amount: i64 },

    /// Decide the oldest pending payout, if any.
    DecideOldest { approve: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..500_00, any::<bool>())
            .prop_map(|(amount, scholarship)| Op::Approve { amount, scholarship }),
        (1i64..800_00).prop_map(|amount| Op::RequestPayout { amount }),
        any::<bool>().prop_map(|approve| Op::DecideOldest { approve }),
    ]
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn apply(state: &mut LedgerState, seq: usize, op: &Op) {
    match op {
        Op::Approve { amount, scholarship } => {
            let application = ApprovedApplication {
                application_id: format!("APP_{:04}", seq),
                agent_id: "AGT_1".to_string(),
                university_id: "UNI_1".to_string(),
                degree_id: "bachelor".to_string(),
                application_year: 2026,
                commission_type: if *scholarship {
                    CommissionType::Scholarship
                } else {
                    CommissionType::Standard
                },
                commission_amount: *amount,
                student_id: Some(format!("STU_{:04}", seq)),
                program_id: Some("PRG_1".to_string()),
            };
            handle_application_approved(state, &application, now());
        }
        Op::RequestPayout { amount } => {
            // Rejection for insufficient funds is a legal outcome.
            let _ = create_payout(state, "AGT_1", *amount, now());
        }
        Op::DecideOldest { approve } => {
            let oldest = state
                .payouts()
                .values()
                .filter(|p| p.status() == PayoutStatus::Pending)
                .min_by(|a, b| a.created_at().cmp(&b.created_at()).then(a.id().cmp(b.id())))
                .map(|p| p.id().to_string());
            if let Some(payout_id) = oldest {
                let status = if *approve {
                    PayoutStatus::Paid
                } else {
                    PayoutStatus::Rejected
                };
                set_payout_status(state, &payout_id, status, now()).unwrap();
            }
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// No reachable operation sequence overdraws the agent.
    #[test]
    fn prop_available_balance_never_negative(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.register_agent(AgentProfile {
            id: "AGT_1".to_string(),
            name: "Amari".to_string(),
        });

        for (seq, op) in ops.iter().enumerate() {
            apply(&mut state, seq, op);

            let balance = compute_balance(&state, "AGT_1");
            prop_assert!(balance.available >= 0, "overdraft after op {}: {:?}", seq, op);
            prop_assert!(balance.pending >= 0);
        }
    }

    /// The balance derivation matches a direct sum over the ledger tables,
    /// and the wallet cache matches the derivation.
    #[test]
    fn prop_wallet_matches_derivation(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.register_agent(AgentProfile {
            id: "AGT_1".to_string(),
            name: "Amari".to_string(),
        });

        for (seq, op) in ops.iter().enumerate() {
            apply(&mut state, seq, op);
        }

        let earned: i64 = state
            .commissions()
            .values()
            .map(|c| c.amount())
            .sum();
        let reserved: i64 = state
            .payouts()
            .values()
            .filter(|p| p.reserves_funds())
            .map(|p| p.amount())
            .sum();
        let pending: i64 = state
            .payouts()
            .values()
            .filter(|p| p.status() == PayoutStatus::Pending)
            .map(|p| p.amount())
            .sum();

        let balance = compute_balance(&state, "AGT_1");
        prop_assert_eq!(balance.available, earned - reserved);
        prop_assert_eq!(balance.pending, pending);

        let wallet = state.wallet("AGT_1").unwrap();
        prop_assert_eq!(wallet.available_balance, balance.available);
        prop_assert_eq!(wallet.pending_balance, balance.pending);
    }

    /// Every reachable state passes snapshot validation and survives a
    /// JSON round trip with identical balances.
    #[test]
    fn prop_reachable_states_snapshot_cleanly(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.register_agent(AgentProfile {
            id: "AGT_1".to_string(),
            name: "Amari".to_string(),
        });

        for (seq, op) in ops.iter().enumerate() {
            apply(&mut state, seq, op);
        }

        let snapshot = StateSnapshot::from(&state);
        prop_assert!(validate_snapshot(&snapshot).is_ok());

        let json = snapshot.to_json().unwrap();
        let restored = StateSnapshot::from_json(&json).unwrap().into_state().unwrap();
        prop_assert_eq!(
            compute_balance(&restored, "AGT_1"),
            compute_balance(&state, "AGT_1")
        );
        prop_assert_eq!(restored.points().len(), state.points().len());
        prop_assert_eq!(restored.awards().len(), state.awards().len());
    }

    /// Scholarship accounting: active + used + expired partitions the points,
    /// and used points are exactly the award links.
    #[test]
    fn prop_points_partition_into_award_links(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.register_agent(AgentProfile {
            id: "AGT_1".to_string(),
            name: "Amari".to_string(),
        });

        for (seq, op) in ops.iter().enumerate() {
            apply(&mut state, seq, op);
        }

        let used: Vec<&str> = state
            .points()
            .values()
            .filter(|p| !p.is_active())
            .map(|p| p.id())
            .collect();
        let linked: Vec<&String> = state
            .awards()
            .values()
            .flat_map(|a| a.qualifying_points())
            .collect();

        prop_assert_eq!(used.len(), linked.len());
        for id in linked {
            prop_assert!(used.contains(&id.as_str()));
        }
        for award in state.awards().values() {
            prop_assert_eq!(award.qualifying_points().len() as u32, award.threshold());
        }
    }
}
