//! Balance Calculator
//!
//! Derives an agent's available and pending balances from the commission and
//! payout ledgers. This is the single source of truth for balance math:
//! validation in the payout service always calls `compute_balance` against
//! the ledger tables, never the wallet cache.
//!
//! # Derivation
//!
//! ```text
//! pending   = sum of amounts of the agent's Pending payouts
//! available = sum of the agent's commissions
//!           - (pending + sum of the agent's Paid payouts)
//! ```
//!
//! Pure function over ledger state. Once the no-overdraft invariant holds,
//! both values are non-negative by construction; a negative result signals a
//! ledger bug, not a valid state, and is deliberately not clamped.

use crate::ledger::LedgerState;
use crate::models::payout::PayoutStatus;
use crate::models::wallet::Wallet;

/// Derived balances for one agent (i64 cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// Commissions earned minus pending and paid payouts.
    pub available: i64,

    /// Sum of pending payout amounts.
    pub pending: i64,
}

/// Compute an agent's balances from the ledger tables.
///
/// Safe to call repeatedly; reads only. An unknown agent id yields a zero
/// balance (no rows, no sums).
///
/// # Example
/// ```
/// use agency_ledger_core::{compute_balance, LedgerConfig, LedgerState};
///
/// let state = LedgerState::new(LedgerConfig::default());
/// let balance = compute_balance(&state, "AGT_1");
/// assert_eq!(balance.available, 0);
/// assert_eq!(balance.pending, 0);
/// ```
pub fn compute_balance(state: &LedgerState, agent_id: &str) -> Balance {
    let earned: i64 = state
        .commissions_for_agent(agent_id)
        .map(|c| c.amount())
        .sum();

    let mut pending: i64 = 0;
    let mut paid: i64 = 0;
    for payout in state.payouts_for_agent(agent_id) {
        match payout.status() {
            PayoutStatus::Pending => pending += payout.amount(),
            PayoutStatus::Paid => paid += payout.amount(),
            PayoutStatus::Rejected => {}
        }
    }

    Balance {
        available: earned - (pending + paid),
        pending,
    }
}

/// Recompute and persist the wallet cache row for one agent.
///
/// Every writer of commissions or payouts calls this before returning, so a
/// reader of the wallet row sees values consistent with the ledger tables it
/// just mutated. The wallet remains a display cache: it is rebuildable at
/// any time by calling this again.
pub fn refresh_wallet(state: &mut LedgerState, agent_id: &str) {
    let balance = compute_balance(state, agent_id);
    state.put_wallet(Wallet {
        agent_id: agent_id.to_string(),
        available_balance: balance.available,
        pending_balance: balance.pending,
    });
}
