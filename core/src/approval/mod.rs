//! Approval pipeline
//!
//! Explicit, ordered handlers for the inbound "application approved" event.
//! The workflow that approves an application calls
//! `handle_application_approved` once; the handlers run in a fixed order
//! and are isolated from each other:
//!
//! 1. **Commission**: book the commission and refresh the wallet
//! 2. **Scholarship**: accrue one point for scholarship-typed applications
//!
//! A missing student or program relationship makes bookkeeping impossible
//! for that step; the step is skipped, the gap is logged as an
//! `ApprovalSkipped` event for manual follow-up, and the approval itself
//! never fails. There is no automatic retry: approving an application is a
//! best-effort boundary for downstream bookkeeping.
//!
//! Notifications are not a separate handler because every successful step
//! already logs its event (`CommissionCreated`, `PointAwarded`, ...); the
//! external dispatcher consumes the event log.

use crate::ledger::balance::refresh_wallet;
use crate::ledger::LedgerState;
use crate::models::application::{ApprovedApplication, CommissionType};
use crate::models::commission::Commission;
use crate::models::event::LedgerEvent;
use crate::scholarship;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Why a bookkeeping step was skipped for an approved application.
///
/// Never propagated as a failure: the pipeline catches these, records them
/// in the outcome and the event log, and lets the approval stand.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("missing {missing}")]
    MissingRelationship {
        application_id: String,
        missing: &'static str,
    },

    #[error("non-positive commission amount")]
    NonPositiveCommission { application_id: String },
}

/// What the approval pipeline did for one application.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApprovalOutcome {
    /// Commission booked (or found already booked) for the application.
    pub commission_id: Option<String>,

    /// Point earned (or found already earned) for the application.
    pub point_id: Option<String>,

    /// Awards created by threshold conversion during this call.
    pub award_ids: Vec<String>,

    /// Steps skipped, typed. Mirrored as `ApprovalSkipped` events.
    pub skipped: Vec<ApprovalError>,
}

/// Run the ordered approval handlers for one approved application.
///
/// Idempotent: re-delivery of the same event finds the existing commission
/// and point and writes nothing new.
pub fn handle_application_approved(
    state: &mut LedgerState,
    application: &ApprovedApplication,
    now: NaiveDateTime,
) -> ApprovalOutcome {
    let mut outcome = ApprovalOutcome::default();

    // Relationship check gates both handlers: a commission or point booked
    // against a half-linked application could never be reconciled later.
    if let Some(missing) = relationship_gap(state, application) {
        skip(
            state,
            &mut outcome,
            ApprovalError::MissingRelationship {
                application_id: application.application_id.clone(),
                missing,
            },
            now,
        );
        return outcome;
    }

    book_commission(state, application, now, &mut outcome);

    if application.commission_type == CommissionType::Scholarship {
        let point = scholarship::award_point(state, application, now);
        outcome.point_id = Some(point.point_id);
        outcome.award_ids = point.new_award_ids;
    }

    outcome
}

fn relationship_gap(
    state: &LedgerState,
    application: &ApprovedApplication,
) -> Option<&'static str> {
    if state.agent(&application.agent_id).is_none() {
        return Some("agent");
    }
    application.missing_relationship()
}

fn book_commission(
    state: &mut LedgerState,
    application: &ApprovedApplication,
    now: NaiveDateTime,
    outcome: &mut ApprovalOutcome,
) {
    if let Some(existing) = state.commission_for_application(&application.application_id) {
        outcome.commission_id = Some(existing.id().to_string());
        return;
    }
    if application.commission_amount <= 0 {
        skip(
            state,
            outcome,
            ApprovalError::NonPositiveCommission {
                application_id: application.application_id.clone(),
            },
            now,
        );
        return;
    }

    let commission = Commission::new(
        application.agent_id.clone(),
        application.application_id.clone(),
        application.commission_amount,
        now,
    );
    let commission_id = commission.id().to_string();
    state.add_commission(commission);
    refresh_wallet(state, &application.agent_id);
    state.log_event(LedgerEvent::CommissionCreated {
        commission_id: commission_id.clone(),
        agent_id: application.agent_id.clone(),
        application_id: application.application_id.clone(),
        amount: application.commission_amount,
        at: now,
    });
    outcome.commission_id = Some(commission_id);
}

fn skip(
    state: &mut LedgerState,
    outcome: &mut ApprovalOutcome,
    error: ApprovalError,
    now: NaiveDateTime,
) {
    let application_id = match &error {
        ApprovalError::MissingRelationship { application_id, .. }
        | ApprovalError::NonPositiveCommission { application_id } => application_id.clone(),
    };
    state.log_event(LedgerEvent::ApprovalSkipped {
        application_id,
        reason: error.to_string(),
        at: now,
    });
    outcome.skipped.push(error);
}
