//! Scholarship Point Accumulator
//!
//! Accrues one point per approved scholarship-typed application, converts
//! runs of active points into agent-tier awards, expires stale points, and
//! reports per-agent progress for the dashboard.
//!
//! # Conversion
//!
//! After each point insertion the active-point count for the point's
//! (agent, university, degree) triple is recomputed. While the count is at
//! or above the effective threshold, the `threshold` oldest active points
//! are consumed into one Available award. A single insertion can therefore
//! yield multiple awards when a backlog of points already existed.
//!
//! # Critical Invariants
//!
//! - **Idempotent accrual**: re-delivery of the same application event never
//!   creates a second point
//! - **Exact consumption**: each award consumes exactly `threshold` points,
//!   oldest first; consumed and expired points never recount
//! - **Idempotent expiry**: the sweep only moves points forward
//!   (Active -> Expired), so running it twice changes nothing

pub mod cascade;

use crate::calendar;
use crate::ledger::LedgerState;
use crate::models::application::ApprovedApplication;
use crate::models::event::LedgerEvent;
use crate::models::scholarship::{AwardStatus, ScholarshipAward, ScholarshipPoint};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that can occur during scholarship operations
#[derive(Debug, Error, PartialEq)]
pub enum ScholarshipError {
    #[error("Unknown award: {0}")]
    UnknownAward(String),

    #[error("Invalid award transition: {from} -> {to}")]
    InvalidTransition { from: AwardStatus, to: AwardStatus },
}

/// Result of awarding a point for one approved application.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOutcome {
    /// Id of the point for this application (existing one on re-delivery).
    pub point_id: String,

    /// Awards created by threshold conversion during this call.
    pub new_award_ids: Vec<String>,

    /// True if the application had already earned its point.
    pub duplicate: bool,
}

/// Award one scholarship point for an approved application.
///
/// Idempotent on `application_id`: a re-delivered event returns the existing
/// point and performs no writes. Otherwise inserts an Active point expiring
/// November 30 of the application year, then runs threshold conversion for
/// the point's (agent, university, degree) triple.
pub fn award_point(
    state: &mut LedgerState,
    application: &ApprovedApplication,
    now: NaiveDateTime,
) -> PointOutcome {
    if let Some(existing) = state.point_for_application(&application.application_id) {
        return PointOutcome {
            point_id: existing.id().to_string(),
            new_award_ids: Vec::new(),
            duplicate: true,
        };
    }

    let point = ScholarshipPoint::new(
        application.agent_id.clone(),
        application.university_id.clone(),
        application.degree_id.clone(),
        application.application_id.clone(),
        application.application_year,
        now,
    );
    let point_id = point.id().to_string();
    state.log_event(LedgerEvent::PointAwarded {
        point_id: point_id.clone(),
        agent_id: point.agent_id().to_string(),
        university_id: point.university_id().to_string(),
        degree_id: point.degree_id().to_string(),
        application_id: point.application_id().to_string(),
        expires_at: point.expires_at(),
        at: now,
    });
    state.add_point(point);

    let new_award_ids = convert_points(
        state,
        &application.agent_id,
        &application.university_id,
        &application.degree_id,
        now,
    );

    PointOutcome {
        point_id,
        new_award_ids,
        duplicate: false,
    }
}

/// Convert runs of active points into awards for one triple.
///
/// Loops so that a backlog of points yields multiple awards in one call
/// (12 active points with threshold 5 produce 2 awards and leave 2 active).
fn convert_points(
    state: &mut LedgerState,
    agent_id: &str,
    university_id: &str,
    degree_id: &str,
    now: NaiveDateTime,
) -> Vec<String> {
    let threshold = state.effective_threshold(university_id, degree_id);
    if threshold == 0 {
        return Vec::new();
    }

    let mut new_award_ids = Vec::new();
    loop {
        // Oldest first; point id breaks earned_at ties deterministically.
        let mut active: Vec<(NaiveDateTime, String)> = state
            .points()
            .values()
            .filter(|p| {
                p.is_active()
                    && p.agent_id() == agent_id
                    && p.university_id() == university_id
                    && p.degree_id() == degree_id
            })
            .map(|p| (p.earned_at(), p.id().to_string()))
            .collect();
        if active.len() < threshold as usize {
            break;
        }
        active.sort();
        let consumed: Vec<String> = active
            .into_iter()
            .take(threshold as usize)
            .map(|(_, id)| id)
            .collect();

        let award = ScholarshipAward::new(
            agent_id.to_string(),
            university_id.to_string(),
            degree_id.to_string(),
            consumed.clone(),
            threshold,
            now,
        );
        let award_id = award.id().to_string();
        for point_id in &consumed {
            state
                .point_mut(point_id)
                .expect("consumed point exists")
                .consume(&award_id);
        }
        state.log_event(LedgerEvent::AwardEarned {
            award_id: award_id.clone(),
            agent_id: agent_id.to_string(),
            university_id: university_id.to_string(),
            degree_id: degree_id.to_string(),
            points_consumed: consumed.len(),
            at: now,
        });
        state.add_award(award);
        new_award_ids.push(award_id);
    }

    new_award_ids
}

/// Expire all active points whose expiry has passed.
///
/// Uses a strict `expires_at < now` comparison, so a point expiring
/// Nov 30 23:59:59 is still active at that exact timestamp and expired from
/// Dec 1 00:00:00. Idempotent; returns the number of points expired.
pub fn expire_old_points(state: &mut LedgerState, now: NaiveDateTime) -> usize {
    let expired_ids: Vec<String> = state
        .points()
        .values()
        .filter(|p| p.is_active() && p.expires_at() < now)
        .map(|p| p.id().to_string())
        .collect();

    for id in &expired_ids {
        state.point_mut(id).expect("point row present").expire();
    }
    if !expired_ids.is_empty() {
        state.log_event(LedgerEvent::PointsExpired {
            count: expired_ids.len(),
            at: now,
        });
    }
    expired_ids.len()
}

/// Apply an administrator decision to an agent-tier award.
///
/// Legal edges are Available -> Approved, Available -> Expired, and
/// Approved -> Paid (consumption goes through `use_award`). A transition to
/// Paid re-runs the system scholarship cascade for the award's university
/// and degree, recounting qualifying awards from ground truth.
pub fn set_award_status(
    state: &mut LedgerState,
    award_id: &str,
    new_status: AwardStatus,
    now: NaiveDateTime,
) -> Result<(), ScholarshipError> {
    let award = state
        .award(award_id)
        .ok_or_else(|| ScholarshipError::UnknownAward(award_id.to_string()))?;
    let from = award.status();
    if !from.can_transition(new_status) || new_status == AwardStatus::Used {
        return Err(ScholarshipError::InvalidTransition {
            from,
            to: new_status,
        });
    }

    let agent_id = award.agent_id().to_string();
    let university_id = award.university_id().to_string();
    let degree_id = award.degree_id().to_string();
    let year = calendar::application_year(award.earned_at().date());

    state
        .award_mut(award_id)
        .expect("award row present")
        .set_status(new_status);
    state.log_event(LedgerEvent::AwardStatusChanged {
        award_id: award_id.to_string(),
        agent_id,
        from,
        to: new_status,
        at: now,
    });

    if new_status == AwardStatus::Paid {
        cascade::run_cascade(state, &university_id, &degree_id, year, now);
    }

    Ok(())
}

/// Consume an Available award for an application.
///
/// The award becomes Used, terminally and immutably linked to the consuming
/// application. Any other starting status fails with `InvalidTransition`.
pub fn use_award(
    state: &mut LedgerState,
    award_id: &str,
    application_id: &str,
    now: NaiveDateTime,
) -> Result<(), ScholarshipError> {
    let award = state
        .award(award_id)
        .ok_or_else(|| ScholarshipError::UnknownAward(award_id.to_string()))?;
    let from = award.status();
    if !from.can_transition(AwardStatus::Used) {
        return Err(ScholarshipError::InvalidTransition {
            from,
            to: AwardStatus::Used,
        });
    }

    let agent_id = award.agent_id().to_string();
    state
        .award_mut(award_id)
        .expect("award row present")
        .mark_used(application_id, now);
    state.log_event(LedgerEvent::AwardStatusChanged {
        award_id: award_id.to_string(),
        agent_id,
        from,
        to: AwardStatus::Used,
        at: now,
    });

    Ok(())
}

/// Progress toward the next award for one (university, degree) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScholarshipProgress {
    pub university_id: String,
    pub degree_id: String,

    /// Active points counting toward the next award.
    pub active_points: u32,

    /// Threshold in force for the pair.
    pub threshold: u32,

    /// Percentage toward the next award (0.0 to 100.0).
    pub percent: f64,

    /// Awards still Available for use.
    pub available_awards: u32,

    /// All awards ever earned for the pair, regardless of status.
    pub total_awards: u32,
}

/// Per-(university, degree) scholarship progress for one agent.
///
/// Read interface for dashboard widgets; sorted by university then degree
/// for stable display.
pub fn scholarship_progress(state: &LedgerState, agent_id: &str) -> Vec<ScholarshipProgress> {
    use std::collections::BTreeMap;

    let mut pairs: BTreeMap<(String, String), (u32, u32, u32)> = BTreeMap::new();

    for point in state.points().values() {
        if point.agent_id() != agent_id || !point.is_active() {
            continue;
        }
        let key = (
            point.university_id().to_string(),
            point.degree_id().to_string(),
        );
        pairs.entry(key).or_default().0 += 1;
    }
    for award in state.awards().values() {
        if award.agent_id() != agent_id {
            continue;
        }
        let key = (
            award.university_id().to_string(),
            award.degree_id().to_string(),
        );
        let entry = pairs.entry(key).or_default();
        entry.2 += 1;
        if award.status() == AwardStatus::Available {
            entry.1 += 1;
        }
    }

    pairs
        .into_iter()
        .map(
            |((university_id, degree_id), (active_points, available_awards, total_awards))| {
                let threshold = state.effective_threshold(&university_id, &degree_id);
                let percent = if threshold == 0 {
                    0.0
                } else {
                    f64::from(active_points) / f64::from(threshold) * 100.0
                };
                ScholarshipProgress {
                    university_id,
                    degree_id,
                    active_points,
                    threshold,
                    percent,
                    available_awards,
                    total_awards,
                }
            },
        )
        .collect()
}
