//! Snapshot - Save/Load Ledger State
//!
//! Serializes the complete ledger to a deterministic row-oriented form for
//! the administrative CLI and for offline inspection. Rows are sorted by id
//! so the same state always produces the same JSON.
//!
//! # Critical Invariants
//!
//! - **No Overdraft**: per agent, pending + paid payouts never exceed
//!   commissions
//! - **Uniqueness**: at most one commission and one point per application
//! - **Referential Integrity**: award point-links resolve to Used points
//! - **Wallet Consistency**: stored wallet rows match recomputation
//!
//! `validate_snapshot` checks all of these; `load` runs it before building
//! state, so a hand-edited or corrupted file is rejected rather than loaded
//! into an inconsistent ledger. The event log is runtime-only and is not
//! part of the snapshot.

use crate::ledger::balance::compute_balance;
use crate::ledger::{AgentProfile, LedgerConfig, LedgerState, UniversityConfig};
use crate::models::commission::Commission;
use crate::models::cycle::ApplicationCycle;
use crate::models::payout::Payout;
use crate::models::scholarship::{PointStatus, ScholarshipAward, ScholarshipPoint, SystemScholarshipAward};
use crate::models::wallet::Wallet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while loading or validating a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot validation failed: {0}")]
    Validation(String),
}

/// Complete ledger snapshot in row-oriented, id-sorted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub config: LedgerConfig,
    pub agents: Vec<AgentProfile>,
    pub universities: Vec<UniversityConfig>,
    pub commissions: Vec<Commission>,
    pub payouts: Vec<Payout>,
    pub wallets: Vec<Wallet>,
    pub points: Vec<ScholarshipPoint>,
    pub awards: Vec<ScholarshipAward>,
    pub system_awards: Vec<SystemScholarshipAward>,
    pub cycles: Vec<ApplicationCycle>,
}

impl From<&LedgerState> for StateSnapshot {
    fn from(state: &LedgerState) -> Self {
        let mut agents: Vec<_> = state.agents().values().cloned().collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        let mut universities: Vec<_> = state.universities().values().cloned().collect();
        universities.sort_by(|a, b| a.id.cmp(&b.id));
        let mut commissions: Vec<_> = state.commissions().values().cloned().collect();
        commissions.sort_by(|a, b| a.id().cmp(b.id()));
        let mut payouts: Vec<_> = state.payouts().values().cloned().collect();
        payouts.sort_by(|a, b| a.id().cmp(b.id()));
        let mut wallets: Vec<_> = state.wallets().values().cloned().collect();
        wallets.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        let mut points: Vec<_> = state.points().values().cloned().collect();
        points.sort_by(|a, b| a.id().cmp(b.id()));
        let mut awards: Vec<_> = state.awards().values().cloned().collect();
        awards.sort_by(|a, b| a.id().cmp(b.id()));
        let mut system_awards: Vec<_> = state.system_awards().values().cloned().collect();
        system_awards.sort_by(|a, b| a.id().cmp(b.id()));
        let mut cycles: Vec<_> = state.cycles().values().cloned().collect();
        cycles.sort_by_key(|c| c.year());

        Self {
            config: state.config().clone(),
            agents,
            universities,
            commissions,
            payouts,
            wallets,
            points,
            awards,
            system_awards,
            cycles,
        }
    }
}

impl StateSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON without validating.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and rebuild the ledger state.
    ///
    /// Wallet rows are recomputed from the ledger tables after loading, so a
    /// snapshot is never a vector for smuggling a stale cache in.
    pub fn into_state(self) -> Result<LedgerState, SnapshotError> {
        validate_snapshot(&self)?;

        let mut state = LedgerState::new(self.config.clone());
        for agent in self.agents {
            state.register_agent(agent);
        }
        for university in self.universities {
            state.register_university(university);
        }
        for commission in self.commissions {
            state.add_commission(commission);
        }
        for payout in self.payouts {
            state.add_payout(payout);
        }
        for point in self.points {
            state.add_point(point);
        }
        for award in self.awards {
            state.add_award(award);
        }
        for award in self.system_awards {
            state.add_system_award(award);
        }
        for cycle in self.cycles {
            state.add_cycle(cycle);
        }

        let agent_ids: Vec<String> = state.agents().keys().cloned().collect();
        for agent_id in agent_ids {
            crate::ledger::balance::refresh_wallet(&mut state, &agent_id);
        }

        Ok(state)
    }
}

/// Check snapshot integrity against the ledger invariants.
pub fn validate_snapshot(snapshot: &StateSnapshot) -> Result<(), SnapshotError> {
    // 1. Commission uniqueness per application
    let mut seen_apps = HashSet::new();
    for commission in &snapshot.commissions {
        if !seen_apps.insert(commission.application_id()) {
            return Err(SnapshotError::Validation(format!(
                "duplicate commission for application {}",
                commission.application_id()
            )));
        }
        if commission.amount() <= 0 {
            return Err(SnapshotError::Validation(format!(
                "non-positive commission amount in {}",
                commission.id()
            )));
        }
    }

    // 2. Point uniqueness per application
    let mut seen_point_apps = HashSet::new();
    for point in &snapshot.points {
        if !seen_point_apps.insert(point.application_id()) {
            return Err(SnapshotError::Validation(format!(
                "duplicate point for application {}",
                point.application_id()
            )));
        }
    }

    // 3. No overdraft per agent
    for agent in &snapshot.agents {
        let earned: i64 = snapshot
            .commissions
            .iter()
            .filter(|c| c.agent_id() == agent.id)
            .map(|c| c.amount())
            .sum();
        let reserved: i64 = snapshot
            .payouts
            .iter()
            .filter(|p| p.agent_id() == agent.id && p.reserves_funds())
            .map(|p| p.amount())
            .sum();
        if reserved > earned {
            return Err(SnapshotError::Validation(format!(
                "overdraft for agent {}: reserved {} exceeds earned {}",
                agent.id, reserved, earned
            )));
        }
    }

    // 4. Award point-links resolve to Used points
    let points_by_id: std::collections::HashMap<&str, &ScholarshipPoint> =
        snapshot.points.iter().map(|p| (p.id(), p)).collect();
    for award in &snapshot.awards {
        for point_id in award.qualifying_points() {
            match points_by_id.get(point_id.as_str()) {
                None => {
                    return Err(SnapshotError::Validation(format!(
                        "award {} references unknown point {}",
                        award.id(),
                        point_id
                    )));
                }
                Some(point) if point.status() != PointStatus::Used => {
                    return Err(SnapshotError::Validation(format!(
                        "award {} references point {} which is not Used",
                        award.id(),
                        point_id
                    )));
                }
                Some(_) => {}
            }
        }
    }

    // 5. Stored wallet rows match recomputation
    let mut scratch = LedgerState::new(snapshot.config.clone());
    for agent in &snapshot.agents {
        scratch.register_agent(agent.clone());
    }
    for commission in &snapshot.commissions {
        scratch.add_commission(commission.clone());
    }
    for payout in &snapshot.payouts {
        scratch.add_payout(payout.clone());
    }
    for wallet in &snapshot.wallets {
        let balance = compute_balance(&scratch, &wallet.agent_id);
        if balance.available != wallet.available_balance
            || balance.pending != wallet.pending_balance
        {
            return Err(SnapshotError::Validation(format!(
                "stale wallet for agent {}: stored ({}, {}), derived ({}, {})",
                wallet.agent_id,
                wallet.available_balance,
                wallet.pending_balance,
                balance.available,
                balance.pending
            )));
        }
    }

    Ok(())
}
