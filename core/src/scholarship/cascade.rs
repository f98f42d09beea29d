//! System Scholarship Cascade
//!
//! When an agent-tier award is paid, the count of Approved and Paid awards
//! for its (university, degree) pair is recounted from ground truth. Once
//! the count reaches the university's `min_agent_scholarships`, one Pending
//! system scholarship is created for the pair and application year.
//!
//! The check is always a recount over the award table, never a maintained
//! counter, so it cannot drift. At most one system award exists per
//! (university, degree, application year): later crossings in the same year
//! are no-ops, and a new year opens a new slot.

use crate::ledger::LedgerState;
use crate::models::event::LedgerEvent;
use crate::models::scholarship::SystemScholarshipAward;
use chrono::NaiveDateTime;

/// Re-derive the cascade for one (university, degree, year).
///
/// Returns the id of the system award if this call created one. A university
/// with no registered configuration never cascades.
pub fn run_cascade(
    state: &mut LedgerState,
    university_id: &str,
    degree_id: &str,
    application_year: i32,
    now: NaiveDateTime,
) -> Option<String> {
    let min = state.university(university_id)?.min_agent_scholarships;
    if min == 0 {
        return None;
    }

    let qualifying = qualifying_award_count(state, university_id, degree_id);
    if qualifying < min {
        return None;
    }

    let already_granted = state.system_awards().values().any(|a| {
        a.university_id() == university_id
            && a.degree_id() == degree_id
            && a.application_year() == application_year
    });
    if already_granted {
        return None;
    }

    let award = SystemScholarshipAward::new(
        university_id.to_string(),
        degree_id.to_string(),
        application_year,
        qualifying,
        format!(
            "threshold {} reached with {} qualifying agent awards",
            min, qualifying
        ),
    );
    let id = award.id().to_string();
    state.log_event(LedgerEvent::SystemAwardCreated {
        system_award_id: id.clone(),
        university_id: university_id.to_string(),
        degree_id: degree_id.to_string(),
        qualifying_awards: qualifying,
        at: now,
    });
    state.add_system_award(award);

    Some(id)
}

/// Count of Approved and Paid agent awards for a (university, degree) pair.
pub fn qualifying_award_count(state: &LedgerState, university_id: &str, degree_id: &str) -> u32 {
    state
        .awards()
        .values()
        .filter(|a| {
            a.university_id() == university_id
                && a.degree_id() == degree_id
                && a.status().counts_for_cascade()
        })
        .count() as u32
}
