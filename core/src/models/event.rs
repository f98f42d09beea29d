//! Event logging for ledger auditing and notification dispatch.
//!
//! Every mutation the ledger core performs is recorded as a `LedgerEvent`.
//! The log serves two purposes:
//! - Auditing (reconstruct what happened to an agent's money and when)
//! - Notification feed (the external email/in-app dispatcher consumes
//!   CommissionCreated, PayoutRequested, PayoutStatusChanged, ...)
//!
//! Skipped best-effort steps (missing relationships during approval) are
//! logged here too, so the gap is operationally visible without failing the
//! triggering workflow.

use crate::models::payout::PayoutStatus;
use crate::models::scholarship::AwardStatus;
use chrono::{NaiveDate, NaiveDateTime};

/// A ledger event capturing one state change.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    /// A commission was booked for an approved application.
    CommissionCreated {
        commission_id: String,
        agent_id: String,
        application_id: String,
        amount: i64,
        at: NaiveDateTime,
    },

    /// An agent requested a payout (created Pending).
    PayoutRequested {
        payout_id: String,
        agent_id: String,
        amount: i64,
        at: NaiveDateTime,
    },

    /// An administrator moved a payout to a terminal state.
    PayoutStatusChanged {
        payout_id: String,
        agent_id: String,
        from: PayoutStatus,
        to: PayoutStatus,
        at: NaiveDateTime,
    },

    /// A scholarship point was earned.
    PointAwarded {
        point_id: String,
        agent_id: String,
        university_id: String,
        degree_id: String,
        application_id: String,
        expires_at: NaiveDateTime,
        at: NaiveDateTime,
    },

    /// The expiry sweep expired active points past their deadline.
    PointsExpired { count: usize, at: NaiveDateTime },

    /// A run of active points was converted into an agent-tier award.
    AwardEarned {
        award_id: String,
        agent_id: String,
        university_id: String,
        degree_id: String,
        points_consumed: usize,
        at: NaiveDateTime,
    },

    /// An agent-tier award changed status.
    AwardStatusChanged {
        award_id: String,
        agent_id: String,
        from: AwardStatus,
        to: AwardStatus,
        at: NaiveDateTime,
    },

    /// The agent-award count crossed the system threshold.
    SystemAwardCreated {
        system_award_id: String,
        university_id: String,
        degree_id: String,
        qualifying_awards: u32,
        at: NaiveDateTime,
    },

    /// A cycle moved from Upcoming to Active.
    CycleActivated { year: i32, on: NaiveDate },

    /// A cycle moved from Active to Closed.
    CycleClosed { year: i32, on: NaiveDate },

    /// The annual reset expired stale points and awards.
    CycleReset {
        points_expired: usize,
        awards_expired: usize,
        on: NaiveDate,
    },

    /// Approval bookkeeping was skipped for an application (best-effort
    /// boundary, e.g. a missing student or program relationship). Recorded
    /// for manual follow-up; never retried automatically.
    ApprovalSkipped {
        application_id: String,
        reason: String,
        at: NaiveDateTime,
    },
}

impl LedgerEvent {
    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::CommissionCreated { .. } => "CommissionCreated",
            LedgerEvent::PayoutRequested { .. } => "PayoutRequested",
            LedgerEvent::PayoutStatusChanged { .. } => "PayoutStatusChanged",
            LedgerEvent::PointAwarded { .. } => "PointAwarded",
            LedgerEvent::PointsExpired { .. } => "PointsExpired",
            LedgerEvent::AwardEarned { .. } => "AwardEarned",
            LedgerEvent::AwardStatusChanged { .. } => "AwardStatusChanged",
            LedgerEvent::SystemAwardCreated { .. } => "SystemAwardCreated",
            LedgerEvent::CycleActivated { .. } => "CycleActivated",
            LedgerEvent::CycleClosed { .. } => "CycleClosed",
            LedgerEvent::CycleReset { .. } => "CycleReset",
            LedgerEvent::ApprovalSkipped { .. } => "ApprovalSkipped",
        }
    }

    /// The agent this event concerns, if it concerns exactly one.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            LedgerEvent::CommissionCreated { agent_id, .. }
            | LedgerEvent::PayoutRequested { agent_id, .. }
            | LedgerEvent::PayoutStatusChanged { agent_id, .. }
            | LedgerEvent::PointAwarded { agent_id, .. }
            | LedgerEvent::AwardEarned { agent_id, .. }
            | LedgerEvent::AwardStatusChanged { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

/// Append-only in-memory event log.
///
/// # Example
/// ```
/// use agency_ledger_core::{EventLog, LedgerEvent};
/// use chrono::NaiveDate;
///
/// let mut log = EventLog::new();
/// log.log(LedgerEvent::PointsExpired {
///     count: 3,
///     at: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
/// });
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.of_type("PointsExpired").count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn log(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over all events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.iter()
    }

    /// Iterate over events of one type.
    pub fn of_type<'a>(&'a self, event_type: &'a str) -> impl Iterator<Item = &'a LedgerEvent> {
        self.events.iter().filter(move |e| e.event_type() == event_type)
    }

    /// Iterate over events concerning one agent.
    pub fn for_agent<'a>(&'a self, agent_id: &'a str) -> impl Iterator<Item = &'a LedgerEvent> {
        self.events.iter().filter(move |e| e.agent_id() == Some(agent_id))
    }
}
