//! System Scholarship Cascade Tests
//!
//! The cascade recounts Approved and Paid agent awards from ground truth
//! every time an award is paid, and grants at most one system scholarship
//! per (university, degree, application year).

use agency_ledger_core::{
    award_point, set_award_status, AgentProfile, ApprovedApplication, AwardStatus, CommissionType,
    LedgerConfig, LedgerState, ScholarshipError, UniversityConfig,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

// ============================================================================
// Test Helpers
// ============================================================================

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Ledger with a university that grants a system scholarship once 2 agent
/// awards are approved or paid, and a point threshold of 2.
fn state() -> LedgerState {
    let mut state = LedgerState::new(LedgerConfig::default());
    let mut thresholds = HashMap::new();
    thresholds.insert("bachelor".to_string(), 2);
    state.register_university(UniversityConfig {
        id: "UNI_1".to_string(),
        min_agent_scholarships: 2,
        point_thresholds: thresholds,
    });
    for agent in ["AGT_1", "AGT_2", "AGT_3"] {
        state.register_agent(AgentProfile {
            id: agent.to_string(),
            name: agent.to_string(),
        });
    }
    state
}

fn application(agent: &str, n: u32) -> ApprovedApplication {
    ApprovedApplication {
        application_id: format!("APP_{}_{:03}", agent, n),
        agent_id: agent.to_string(),
        university_id: "UNI_1".to_string(),
        degree_id: "bachelor".to_string(),
        application_year: 2026,
        commission_type: CommissionType::Scholarship,
        commission_amount: 100_00,
        student_id: Some(format!("STU_{}_{:03}", agent, n)),
        program_id: Some("PRG_1".to_string()),
    }
}

/// Earn one award for the agent (2 points at threshold 2) and return its id.
fn earn_award(state: &mut LedgerState, agent: &str, seq: &mut u32) -> String {
    let mut award_ids = Vec::new();
    while award_ids.is_empty() {
        *seq += 1;
        award_ids = award_point(state, &application(agent, *seq), now()).new_award_ids;
    }
    award_ids.remove(0)
}

fn pay_award(state: &mut LedgerState, award_id: &str) {
    set_award_status(state, award_id, AwardStatus::Approved, now()).unwrap();
    set_award_status(state, award_id, AwardStatus::Paid, now()).unwrap();
}

// ============================================================================
// Cascade triggering
// ============================================================================

#[test]
fn test_first_paid_award_does_not_cascade_below_threshold() {
    let mut state = state();
    let mut seq = 0;
    let award = earn_award(&mut state, "AGT_1", &mut seq);

    pay_award(&mut state, &award);

    assert_eq!(state.system_awards().len(), 0);
}

#[test]
fn test_cascade_fires_when_count_crosses_threshold() {
    let mut state = state();
    let mut seq = 0;
    let first = earn_award(&mut state, "AGT_1", &mut seq);
    let second = earn_award(&mut state, "AGT_2", &mut seq);

    pay_award(&mut state, &first);
    assert_eq!(state.system_awards().len(), 0);

    pay_award(&mut state, &second);
    assert_eq!(state.system_awards().len(), 1);

    let system = state.system_awards().values().next().unwrap();
    assert_eq!(system.university_id(), "UNI_1");
    assert_eq!(system.degree_id(), "bachelor");
    assert_eq!(system.application_year(), 2026);
    assert_eq!(system.qualifying_agent_awards(), 2);
}

/// Approved (not yet paid) awards count toward the threshold, so a single
/// payment can cross it with the rest still approved.
#[test]
fn test_approved_awards_count_toward_threshold() {
    let mut state = state();
    let mut seq = 0;
    let first = earn_award(&mut state, "AGT_1", &mut seq);
    let second = earn_award(&mut state, "AGT_2", &mut seq);

    set_award_status(&mut state, &first, AwardStatus::Approved, now()).unwrap();
    set_award_status(&mut state, &second, AwardStatus::Approved, now()).unwrap();
    assert_eq!(state.system_awards().len(), 0, "cascade runs on payment");

    set_award_status(&mut state, &first, AwardStatus::Paid, now()).unwrap();
    assert_eq!(state.system_awards().len(), 1);
}

#[test]
fn test_no_duplicate_for_later_payments_same_year() {
    let mut state = state();
    let mut seq = 0;
    let awards: Vec<String> = (0..3)
        .map(|i| earn_award(&mut state, ["AGT_1", "AGT_2", "AGT_3"][i], &mut seq))
        .collect();

    for award in &awards {
        pay_award(&mut state, award);
    }

    // Threshold crossed at the second payment; the third is already past it.
    assert_eq!(state.system_awards().len(), 1, "one award per year");
    assert_eq!(state.events().of_type("SystemAwardCreated").count(), 1);
}

#[test]
fn test_unconfigured_university_never_cascades() {
    let mut state = state();
    let mut seq = 0;

    // Points toward a university with no registered config.
    let mut award_ids = Vec::new();
    while award_ids.is_empty() {
        seq += 1;
        let mut a = application("AGT_1", seq);
        a.university_id = "UNI_UNKNOWN".to_string();
        a.application_id = format!("APP_X_{:03}", seq);
        award_ids = award_point(&mut state, &a, now()).new_award_ids;
    }

    pay_award(&mut state, &award_ids[0]);
    assert_eq!(state.system_awards().len(), 0);
}

// ============================================================================
// Award state machine
// ============================================================================

#[test]
fn test_available_cannot_jump_to_paid() {
    let mut state = state();
    let mut seq = 0;
    let award = earn_award(&mut state, "AGT_1", &mut seq);

    let result = set_award_status(&mut state, &award, AwardStatus::Paid, now());
    assert_eq!(
        result.unwrap_err(),
        ScholarshipError::InvalidTransition {
            from: AwardStatus::Available,
            to: AwardStatus::Paid,
        }
    );
}

#[test]
fn test_used_award_cannot_be_paid() {
    let mut state = state();
    let mut seq = 0;
    let award = earn_award(&mut state, "AGT_1", &mut seq);

    agency_ledger_core::use_award(&mut state, &award, "APP_CONSUMER", now()).unwrap();
    let stored = state.award(&award).unwrap();
    assert_eq!(stored.status(), AwardStatus::Used);
    assert_eq!(stored.application_id(), Some("APP_CONSUMER"));
    assert!(stored.used_at().is_some());

    let result = set_award_status(&mut state, &award, AwardStatus::Approved, now());
    assert!(matches!(
        result,
        Err(ScholarshipError::InvalidTransition { from: AwardStatus::Used, .. })
    ));
}

#[test]
fn test_use_award_requires_available() {
    let mut state = state();
    let mut seq = 0;
    let award = earn_award(&mut state, "AGT_1", &mut seq);
    pay_award(&mut state, &award);

    let result = agency_ledger_core::use_award(&mut state, &award, "APP_X", now());
    assert!(matches!(
        result,
        Err(ScholarshipError::InvalidTransition { from: AwardStatus::Paid, .. })
    ));
}
