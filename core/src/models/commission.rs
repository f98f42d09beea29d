//! Commission ledger entry.
//!
//! A commission records the amount an agent earned when one of their
//! applications was approved. Entries are append-only: exactly one commission
//! exists per approved application, and it is never updated or deleted in
//! normal operation. The available balance is derived by summing these rows.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An immutable commission ledger entry.
///
/// # Example
/// ```
/// use agency_ledger_core::Commission;
/// use chrono::NaiveDate;
///
/// let now = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let commission = Commission::new("AGT_1".to_string(), "APP_1".to_string(), 100_00, now);
/// assert_eq!(commission.amount(), 100_00);
/// assert_eq!(commission.application_id(), "APP_1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    /// Unique commission identifier (UUID).
    id: String,

    /// Agent credited with the commission.
    agent_id: String,

    /// Application that earned it (unique across commissions).
    application_id: String,

    /// Amount earned (i64 cents, always positive).
    amount: i64,

    /// When the commission was booked.
    created_at: NaiveDateTime,
}

impl Commission {
    /// Create a new commission entry.
    ///
    /// # Panics
    /// Panics if amount <= 0. Amount validation against user input happens
    /// upstream in the approval pipeline; reaching here with a non-positive
    /// amount is a programming error.
    pub fn new(agent_id: String, application_id: String, amount: i64, created_at: NaiveDateTime) -> Self {
        assert!(amount > 0, "commission amount must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id,
            application_id,
            amount,
            created_at,
        }
    }

    /// Restore a commission from a snapshot row.
    pub fn from_snapshot(
        id: String,
        agent_id: String,
        application_id: String,
        amount: i64,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            agent_id,
            application_id,
            amount,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Amount earned (i64 cents).
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}
