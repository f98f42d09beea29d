//! Wallet cache row.
//!
//! One row per agent holding the derived available and pending balances.
//! The wallet exists purely for display performance: it is recomputed from
//! the commission and payout tables inside the same logical transaction as
//! every mutation that affects it, and it is never consulted for validation.
//! See `ledger::balance` for the derivation.

use serde::{Deserialize, Serialize};

/// Cached balance projection for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Agent this wallet belongs to.
    pub agent_id: String,

    /// Commissions earned minus pending and paid payouts (i64 cents).
    pub available_balance: i64,

    /// Sum of pending payout amounts (i64 cents).
    pub pending_balance: i64,
}

impl Wallet {
    /// Create a zeroed wallet for a newly registered agent.
    pub fn empty(agent_id: String) -> Self {
        Self {
            agent_id,
            available_balance: 0,
            pending_balance: 0,
        }
    }
}
