//! Cycle Manager
//!
//! Time-driven sweeps over the enrollment cycles and the scholarship ledger:
//!
//! - `update_statuses` moves each cycle to the status implied by "today"
//!   (Upcoming -> Active -> Closed, strictly forward)
//! - `reset_for_new_cycle` runs once a year on December 1 and expires
//!   everything left over from prior application years: still-active points
//!   and still-available unused awards
//!
//! Both sweeps only move state forward, so re-running them is always safe;
//! the second run on the same day finds nothing left to change.

use crate::calendar;
use crate::models::cycle::CycleStatus;
use crate::models::event::LedgerEvent;
use crate::models::scholarship::AwardStatus;
use crate::ledger::LedgerState;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during cycle sweeps
#[derive(Debug, Error, PartialEq)]
pub enum CycleError {
    #[error("Cycle reset only runs on {expected}; today is {today} (use force to override)")]
    NotResetDay { today: NaiveDate, expected: NaiveDate },
}

/// Counts of cycle transitions applied by one status sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleSweep {
    /// Cycles moved Upcoming -> Active.
    pub activated: usize,

    /// Cycles moved Active -> Closed.
    pub closed: usize,
}

/// Move every cycle to the status implied by `today`.
///
/// Idempotent: a second run on the same day returns zero counts. Transitions
/// only move forward; a cycle already Closed stays Closed even if its window
/// were edited backwards.
pub fn update_statuses(state: &mut LedgerState, today: NaiveDate) -> CycleSweep {
    let mut sweep = CycleSweep::default();
    let years: Vec<i32> = state.cycles().keys().copied().collect();

    for year in years {
        let cycle = state.cycles().get(&year).expect("cycle row present");
        let current = cycle.status();
        let expected = cycle.expected_status(today);

        match (current, expected) {
            (CycleStatus::Upcoming, CycleStatus::Active) => {
                state
                    .cycles_mut()
                    .get_mut(&year)
                    .expect("cycle row present")
                    .set_status(CycleStatus::Active);
                state.log_event(LedgerEvent::CycleActivated { year, on: today });
                sweep.activated += 1;
            }
            (CycleStatus::Upcoming, CycleStatus::Closed)
            | (CycleStatus::Active, CycleStatus::Closed) => {
                state
                    .cycles_mut()
                    .get_mut(&year)
                    .expect("cycle row present")
                    .set_status(CycleStatus::Closed);
                state.log_event(LedgerEvent::CycleClosed { year, on: today });
                sweep.closed += 1;
            }
            _ => {}
        }
    }

    sweep
}

/// Options for the annual reset sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetOptions {
    /// Report intended changes without writing anything.
    pub dry_run: bool,

    /// Bypass the December 1 calendar gate.
    pub force: bool,
}

/// Result of one annual reset sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReset {
    /// Active points from prior application years that were (or would be)
    /// expired.
    pub points_expired: usize,

    /// Available awards from prior application years that were (or would be)
    /// expired.
    pub awards_expired: usize,

    /// False for a dry run.
    pub applied: bool,
}

/// Expire everything left over from application years before the current one.
///
/// Gated to December 1 unless `opts.force`. One-way and idempotent: a second
/// invocation on the same day finds nothing left to expire.
pub fn reset_for_new_cycle(
    state: &mut LedgerState,
    today: NaiveDate,
    opts: ResetOptions,
) -> Result<CycleReset, CycleError> {
    if !opts.force && !calendar::is_reset_day(today) {
        return Err(CycleError::NotResetDay {
            today,
            expected: calendar::reset_date(today),
        });
    }

    let current_year = calendar::application_year(today);

    let stale_points: Vec<String> = state
        .points()
        .values()
        .filter(|p| p.is_active() && p.application_year() < current_year)
        .map(|p| p.id().to_string())
        .collect();

    let stale_awards: Vec<String> = state
        .awards()
        .values()
        .filter(|a| {
            a.status() == AwardStatus::Available
                && calendar::application_year(a.earned_at().date()) < current_year
        })
        .map(|a| a.id().to_string())
        .collect();

    let result = CycleReset {
        points_expired: stale_points.len(),
        awards_expired: stale_awards.len(),
        applied: !opts.dry_run,
    };

    if opts.dry_run {
        return Ok(result);
    }

    for id in &stale_points {
        state.point_mut(id).expect("point row present").expire();
    }
    for id in &stale_awards {
        state
            .award_mut(id)
            .expect("award row present")
            .set_status(AwardStatus::Expired);
    }
    if result.points_expired > 0 || result.awards_expired > 0 {
        state.log_event(LedgerEvent::CycleReset {
            points_expired: result.points_expired,
            awards_expired: result.awards_expired,
            on: today,
        });
    }

    Ok(result)
}
