//! Payout ledger entry.
//!
//! A payout records a withdrawal request against an agent's accrued
//! commissions. Unlike commissions, payouts carry mutable status: they are
//! created Pending and move to exactly one of the terminal states Paid or
//! Rejected by administrator action. A Pending or Paid payout counts against
//! the available balance; a Rejected payout releases the reserved amount.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Payout lifecycle status.
///
/// The only legal transitions are Pending -> Paid and Pending -> Rejected.
/// Paid and Rejected are terminal; a payout never returns to Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Requested, awaiting administrator decision. Reserves funds.
    Pending,

    /// Approved and disbursed. Terminal.
    Paid,

    /// Declined by an administrator. Terminal, releases reserved funds.
    Rejected,
}

impl PayoutStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Paid | PayoutStatus::Rejected)
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition(&self, to: PayoutStatus) -> bool {
        matches!(
            (self, to),
            (PayoutStatus::Pending, PayoutStatus::Paid)
                | (PayoutStatus::Pending, PayoutStatus::Rejected)
        )
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A payout (withdrawal) request against accrued commissions.
///
/// # Example
/// ```
/// use agency_ledger_core::{Payout, PayoutStatus};
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let payout = Payout::new("AGT_1".to_string(), 50_00, now);
/// assert_eq!(payout.status(), PayoutStatus::Pending);
/// assert_eq!(payout.amount(), 50_00);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    /// Unique payout identifier (UUID).
    id: String,

    /// Agent who requested the withdrawal.
    agent_id: String,

    /// Requested amount (i64 cents, always positive).
    amount: i64,

    /// Current lifecycle status.
    status: PayoutStatus,

    /// When the request was created.
    created_at: NaiveDateTime,

    /// When the status last changed.
    updated_at: NaiveDateTime,
}

impl Payout {
    /// Create a new Pending payout request.
    ///
    /// # Panics
    /// Panics if amount <= 0. User-facing amount validation happens in the
    /// payout service before construction.
    pub fn new(agent_id: String, amount: i64, created_at: NaiveDateTime) -> Self {
        assert!(amount > 0, "payout amount must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id,
            amount,
            status: PayoutStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    /// Restore a payout from a snapshot row.
    pub fn from_snapshot(
        id: String,
        agent_id: String,
        amount: i64,
        status: PayoutStatus,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            agent_id,
            amount,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Requested amount (i64 cents).
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn status(&self) -> PayoutStatus {
        self.status
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Whether this payout currently reserves funds (Pending or Paid).
    pub fn reserves_funds(&self) -> bool {
        matches!(self.status, PayoutStatus::Pending | PayoutStatus::Paid)
    }

    /// Apply a status transition without validating the edge.
    ///
    /// The payout service validates the transition first; this setter exists
    /// so the state-machine check and the write stay in one code path there.
    pub(crate) fn set_status(&mut self, status: PayoutStatus, at: NaiveDateTime) {
        self.status = status;
        self.updated_at = at;
    }
}
