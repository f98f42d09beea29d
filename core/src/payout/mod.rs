//! Payout Service
//!
//! Validates and records withdrawal requests against an agent's accrued
//! commissions, and applies administrator status decisions.
//!
//! # Request Flow
//!
//! ```text
//! Agent -> create_payout -> re-derive available from ledger tables
//!                        -> reject InvalidAmount / InsufficientBalance (no writes)
//!                        -> insert Pending payout
//!                        -> refresh wallet cache
//!                        -> log PayoutRequested (notification feed)
//! ```
//!
//! # Critical Invariants
//!
//! - **No Overdraft**: a request is only accepted if it fits inside the
//!   balance re-derived from the ledger tables at the moment of the request
//! - **No Partial State**: a rejected request performs no writes at all
//! - **Serialized Per Agent**: callers in concurrent contexts must hold the
//!   agent's lock across the read-validate-write sequence; `engine::Ledger`
//!   provides that scope
//!
//! CRITICAL: All money values are i64 (cents)

use crate::ledger::balance::{compute_balance, refresh_wallet};
use crate::ledger::LedgerState;
use crate::models::event::LedgerEvent;
use crate::models::payout::{Payout, PayoutStatus};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that can occur during payout operations
#[derive(Debug, Error, PartialEq)]
pub enum PayoutError {
    #[error("Payout amount must be positive")]
    InvalidAmount,

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("Invalid payout transition: {from} -> {to}")]
    InvalidTransition { from: PayoutStatus, to: PayoutStatus },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Unknown payout: {0}")]
    UnknownPayout(String),
}

/// Create a payout request for an agent.
///
/// Re-derives the available balance from the commission and payout tables at
/// the moment of the call; the wallet cache is never consulted. On success
/// the new payout is Pending, the wallet is refreshed, and a
/// `PayoutRequested` event is logged for the notification dispatcher.
///
/// If validation fails, **no state changes occur**.
///
/// # Example
///
/// ```rust
/// use agency_ledger_core::{create_payout, AgentProfile, Commission, LedgerConfig, LedgerState};
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut state = LedgerState::new(LedgerConfig::default());
/// state.register_agent(AgentProfile { id: "AGT_1".to_string(), name: "Amari".to_string() });
/// state.add_commission(Commission::new("AGT_1".to_string(), "APP_1".to_string(), 100_00, now));
///
/// let payout = create_payout(&mut state, "AGT_1", 40_00, now).unwrap();
/// assert_eq!(payout.amount(), 40_00);
/// assert_eq!(state.wallet("AGT_1").unwrap().available_balance, 60_00);
/// ```
pub fn create_payout(
    state: &mut LedgerState,
    agent_id: &str,
    amount: i64,
    now: NaiveDateTime,
) -> Result<Payout, PayoutError> {
    if amount <= 0 {
        return Err(PayoutError::InvalidAmount);
    }
    if state.agent(agent_id).is_none() {
        return Err(PayoutError::UnknownAgent(agent_id.to_string()));
    }

    // Validation reads the ledger tables, not the wallet cache.
    let balance = compute_balance(state, agent_id);
    if amount > balance.available {
        return Err(PayoutError::InsufficientBalance {
            requested: amount,
            available: balance.available,
        });
    }

    let payout = Payout::new(agent_id.to_string(), amount, now);
    state.add_payout(payout.clone());
    refresh_wallet(state, agent_id);
    state.log_event(LedgerEvent::PayoutRequested {
        payout_id: payout.id().to_string(),
        agent_id: agent_id.to_string(),
        amount,
        at: now,
    });

    Ok(payout)
}

/// Apply an administrator decision to a payout.
///
/// Only Pending -> Paid and Pending -> Rejected are legal; anything else
/// fails with `InvalidTransition` and writes nothing. The wallet is
/// refreshed afterwards (a rejection releases the reserved amount back to
/// available) and a `PayoutStatusChanged` event notifies the agent.
pub fn set_payout_status(
    state: &mut LedgerState,
    payout_id: &str,
    new_status: PayoutStatus,
    now: NaiveDateTime,
) -> Result<(), PayoutError> {
    let payout = state
        .payout(payout_id)
        .ok_or_else(|| PayoutError::UnknownPayout(payout_id.to_string()))?;
    let from = payout.status();
    let agent_id = payout.agent_id().to_string();

    if !from.can_transition(new_status) {
        return Err(PayoutError::InvalidTransition {
            from,
            to: new_status,
        });
    }

    // Lookup above guarantees the row exists.
    state
        .payout_mut(payout_id)
        .expect("payout row present")
        .set_status(new_status, now);
    refresh_wallet(state, &agent_id);
    state.log_event(LedgerEvent::PayoutStatusChanged {
        payout_id: payout_id.to_string(),
        agent_id,
        from,
        to: new_status,
        at: now,
    });

    Ok(())
}
