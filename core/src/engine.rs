//! Ledger Engine - thread-safe facade
//!
//! The platform serves requests from multiple workers concurrently, so the
//! read-validate-write sequence of a payout request must be serialized per
//! agent: two simultaneous requests from one agent must not both observe the
//! same pre-update balance. Requests from different agents must not block
//! each other's validation windows.
//!
//! The engine implements that with a per-agent lock registry, the
//! application-level analogue of `SELECT ... FOR UPDATE` on the agent's
//! wallet row. Lock ordering is fixed: the agent lock is always taken before
//! the state lock, and the state lock is never held while waiting on an
//! agent lock.
//!
//! Batch sweeps (expiry, cycle updates, reset) only move state forward and
//! are idempotent, so they take the state lock alone.

use crate::approval::{self, ApprovalOutcome};
use crate::cycle::{self, CycleError, CycleReset, CycleSweep, ResetOptions};
use crate::ledger::balance::{compute_balance, Balance};
use crate::ledger::snapshot::StateSnapshot;
use crate::ledger::LedgerState;
use crate::models::application::ApprovedApplication;
use crate::models::payout::{Payout, PayoutStatus};
use crate::models::scholarship::AwardStatus;
use crate::payout::{self, PayoutError};
use crate::scholarship::{self, ScholarshipError, ScholarshipProgress};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe ledger, shareable across workers via `Arc`.
///
/// # Example
///
/// ```rust
/// use agency_ledger_core::{AgentProfile, Commission, Ledger, LedgerConfig, LedgerState};
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut state = LedgerState::new(LedgerConfig::default());
/// state.register_agent(AgentProfile { id: "AGT_1".to_string(), name: "Amari".to_string() });
/// state.add_commission(Commission::new("AGT_1".to_string(), "APP_1".to_string(), 100_00, now));
///
/// let ledger = Ledger::new(state);
/// let payout = ledger.create_payout("AGT_1", 60_00, now).unwrap();
/// assert_eq!(payout.amount(), 60_00);
/// assert_eq!(ledger.balance("AGT_1").available, 40_00);
/// ```
pub struct Ledger {
    state: Mutex<LedgerState>,

    /// One mutex per agent, created on first use. Holding an agent's mutex
    /// across read-validate-write is what linearizes payout creation.
    agent_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Ledger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            agent_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the state, recovering from poisoning.
    ///
    /// A poisoned mutex only means another thread panicked while holding it;
    /// the ledger's invariants are re-derivable from its tables, so refusing
    /// all further access would be worse than continuing.
    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn agent_lock(&self, agent_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .agent_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        locks
            .entry(agent_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Request a payout, serialized against other operations on the same
    /// agent. See `payout::create_payout` for validation semantics.
    pub fn create_payout(
        &self,
        agent_id: &str,
        amount: i64,
        now: NaiveDateTime,
    ) -> Result<Payout, PayoutError> {
        let lock = self.agent_lock(agent_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.lock_state();
        payout::create_payout(&mut state, agent_id, amount, now)
    }

    /// Apply an administrator payout decision, serialized against payout
    /// creation for the same agent.
    pub fn set_payout_status(
        &self,
        payout_id: &str,
        new_status: PayoutStatus,
        now: NaiveDateTime,
    ) -> Result<(), PayoutError> {
        // The agent id comes from a short read; the authoritative transition
        // check re-reads the payout under the agent lock.
        let agent_id = {
            let state = self.lock_state();
            state
                .payout(payout_id)
                .ok_or_else(|| PayoutError::UnknownPayout(payout_id.to_string()))?
                .agent_id()
                .to_string()
        };
        let lock = self.agent_lock(&agent_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.lock_state();
        payout::set_payout_status(&mut state, payout_id, new_status, now)
    }

    /// Run the approval pipeline for an application, serialized against
    /// payout operations for the same agent (commission accrual moves the
    /// available balance).
    pub fn handle_application_approved(
        &self,
        application: &ApprovedApplication,
        now: NaiveDateTime,
    ) -> ApprovalOutcome {
        let lock = self.agent_lock(&application.agent_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut state = self.lock_state();
        approval::handle_application_approved(&mut state, application, now)
    }

    /// Derived balances for an agent (read-only, no locking scope needed
    /// beyond a consistent read of the tables).
    pub fn balance(&self, agent_id: &str) -> Balance {
        compute_balance(&self.lock_state(), agent_id)
    }

    /// Per-(university, degree) scholarship progress for an agent.
    pub fn scholarship_progress(&self, agent_id: &str) -> Vec<ScholarshipProgress> {
        scholarship::scholarship_progress(&self.lock_state(), agent_id)
    }

    pub fn set_award_status(
        &self,
        award_id: &str,
        new_status: AwardStatus,
        now: NaiveDateTime,
    ) -> Result<(), ScholarshipError> {
        let mut state = self.lock_state();
        scholarship::set_award_status(&mut state, award_id, new_status, now)
    }

    pub fn use_award(
        &self,
        award_id: &str,
        application_id: &str,
        now: NaiveDateTime,
    ) -> Result<(), ScholarshipError> {
        let mut state = self.lock_state();
        scholarship::use_award(&mut state, award_id, application_id, now)
    }

    /// Expire active points past their deadline. Idempotent sweep.
    pub fn expire_old_points(&self, now: NaiveDateTime) -> usize {
        scholarship::expire_old_points(&mut self.lock_state(), now)
    }

    /// Move cycles to the status implied by `today`. Idempotent sweep.
    pub fn update_cycle_statuses(&self, today: NaiveDate) -> CycleSweep {
        cycle::update_statuses(&mut self.lock_state(), today)
    }

    /// Annual reset sweep. See `cycle::reset_for_new_cycle`.
    pub fn reset_for_new_cycle(
        &self,
        today: NaiveDate,
        opts: ResetOptions,
    ) -> Result<CycleReset, CycleError> {
        cycle::reset_for_new_cycle(&mut self.lock_state(), today, opts)
    }

    /// Deterministic snapshot of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from(&*self.lock_state())
    }

    /// Run a closure against the state under the state lock.
    ///
    /// Read-oriented escape hatch for tests and reporting; mutations that
    /// affect balances must go through the engine methods so the per-agent
    /// locking discipline holds.
    pub fn with_state<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.lock_state())
    }
}
