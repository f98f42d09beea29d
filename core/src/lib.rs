//! Agency Ledger Core - Rust Engine
//!
//! Financial ledger for an education-agency platform: commission accrual,
//! payout request/approval, derived wallet balances, scholarship point
//! accumulation, and the annual cycle sweep.
//!
//! # Architecture
//!
//! - **calendar**: Application-year and expiry date arithmetic
//! - **models**: Domain rows (Commission, Payout, Wallet, ScholarshipPoint, ...)
//! - **ledger**: The ledger state, derived balances, and snapshots
//! - **payout**: Payout request validation and status transitions
//! - **scholarship**: Point accrual, threshold conversion, system cascade
//! - **cycle**: Enrollment cycle state machine and annual reset
//! - **approval**: Ordered handlers for the "application approved" event
//! - **engine**: Thread-safe facade serializing payout creation per agent
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Balances are always re-derived from the ledger tables for validation;
//!    the Wallet row is a display cache only
//! 3. Per agent, pending + paid payouts never exceed accrued commissions

// Module declarations
pub mod approval;
pub mod calendar;
pub mod cycle;
pub mod engine;
pub mod ledger;
pub mod models;
pub mod payout;
pub mod scholarship;

// Re-exports for convenience
pub use approval::{handle_application_approved, ApprovalError, ApprovalOutcome};
pub use cycle::{reset_for_new_cycle, update_statuses, CycleError, CycleReset, CycleSweep, ResetOptions};
pub use engine::Ledger;
pub use ledger::balance::{compute_balance, refresh_wallet, Balance};
pub use ledger::snapshot::{validate_snapshot, SnapshotError, StateSnapshot};
pub use ledger::{AgentProfile, LedgerConfig, LedgerState, UniversityConfig};
pub use models::{
    application::{ApprovedApplication, CommissionType},
    commission::Commission,
    cycle::{ApplicationCycle, CycleStatus},
    event::{EventLog, LedgerEvent},
    payout::{Payout, PayoutStatus},
    scholarship::{
        AwardStatus, PointStatus, ScholarshipAward, ScholarshipPoint, SystemAwardStatus,
        SystemScholarshipAward,
    },
    wallet::Wallet,
};
pub use payout::{create_payout, set_payout_status, PayoutError};
pub use scholarship::{
    award_point, expire_old_points, scholarship_progress, set_award_status, use_award,
    PointOutcome, ScholarshipError, ScholarshipProgress,
};
