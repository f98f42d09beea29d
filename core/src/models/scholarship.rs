//! Scholarship points and awards.
//!
//! Scholarship-typed approvals earn the agent one point per application,
//! keyed by (agent, university, degree). Once enough active points exist for
//! a triple, the oldest `threshold` points are consumed into one agent-tier
//! scholarship award. Awards in turn feed the university-wide system
//! scholarship once enough of them are approved or paid.
//!
//! Points expire on November 30 of their application year and never count
//! toward a threshold again (see `calendar`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Scholarship point lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStatus {
    /// Counts toward the next award threshold.
    Active,

    /// Consumed by an award. Never recounted.
    Used,

    /// Past its November 30 expiry. Never recounted.
    Expired,
}

/// One scholarship point, earned by one approved application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipPoint {
    /// Unique point identifier (UUID).
    id: String,

    /// Agent who earned the point.
    agent_id: String,

    /// University the qualifying application targeted.
    university_id: String,

    /// Degree level of the qualifying application.
    degree_id: String,

    /// Qualifying application (unique across points).
    application_id: String,

    /// Application year the point counts toward.
    application_year: i32,

    /// Current lifecycle status.
    status: PointStatus,

    /// When the point was earned.
    earned_at: NaiveDateTime,

    /// Fixed expiry: Nov 30 23:59:59 of `application_year`.
    expires_at: NaiveDateTime,

    /// Award that consumed this point, once Used.
    consumed_by: Option<String>,
}

impl ScholarshipPoint {
    /// Create a new Active point.
    pub fn new(
        agent_id: String,
        university_id: String,
        degree_id: String,
        application_id: String,
        application_year: i32,
        earned_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id,
            university_id,
            degree_id,
            application_id,
            application_year,
            status: PointStatus::Active,
            earned_at,
            expires_at: crate::calendar::point_expiry(application_year),
            consumed_by: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn university_id(&self) -> &str {
        &self.university_id
    }

    pub fn degree_id(&self) -> &str {
        &self.degree_id
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn application_year(&self) -> i32 {
        self.application_year
    }

    pub fn status(&self) -> PointStatus {
        self.status
    }

    pub fn earned_at(&self) -> NaiveDateTime {
        self.earned_at
    }

    pub fn expires_at(&self) -> NaiveDateTime {
        self.expires_at
    }

    pub fn consumed_by(&self) -> Option<&str> {
        self.consumed_by.as_deref()
    }

    /// Whether the point still counts toward a threshold.
    pub fn is_active(&self) -> bool {
        self.status == PointStatus::Active
    }

    /// Mark the point consumed by the given award.
    pub(crate) fn consume(&mut self, award_id: &str) {
        self.status = PointStatus::Used;
        self.consumed_by = Some(award_id.to_string());
    }

    /// Mark the point expired.
    pub(crate) fn expire(&mut self) {
        self.status = PointStatus::Expired;
    }
}

/// Agent-tier scholarship award lifecycle status.
///
/// Awards are created Available. An Available award can be consumed by an
/// application (Used, terminal), approved for cash-out (Approved, then Paid),
/// or expired by the annual cycle reset (Expired, terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardStatus {
    /// Earned and usable.
    Available,

    /// Approved for payment by an administrator.
    Approved,

    /// Paid out. Counts toward the system scholarship threshold.
    Paid,

    /// Consumed by an application. Terminal, immutably linked to it.
    Used,

    /// Expired unused by the annual cycle reset. Terminal.
    Expired,
}

impl AwardStatus {
    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition(&self, to: AwardStatus) -> bool {
        matches!(
            (self, to),
            (AwardStatus::Available, AwardStatus::Approved)
                | (AwardStatus::Available, AwardStatus::Used)
                | (AwardStatus::Available, AwardStatus::Expired)
                | (AwardStatus::Approved, AwardStatus::Paid)
        )
    }

    /// Whether this award counts toward the system scholarship threshold.
    pub fn counts_for_cascade(&self) -> bool {
        matches!(self, AwardStatus::Approved | AwardStatus::Paid)
    }
}

impl std::fmt::Display for AwardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AwardStatus::Available => "available",
            AwardStatus::Approved => "approved",
            AwardStatus::Paid => "paid",
            AwardStatus::Used => "used",
            AwardStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// An agent-tier scholarship award, earned by consuming `threshold` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipAward {
    /// Unique award identifier (UUID).
    id: String,

    /// Agent who earned the award.
    agent_id: String,

    /// University the consumed points targeted.
    university_id: String,

    /// Degree level the consumed points targeted.
    degree_id: String,

    /// Current lifecycle status.
    status: AwardStatus,

    /// Point ids consumed into this award (exactly `threshold` of them).
    qualifying_points: Vec<String>,

    /// Threshold in force when the award was earned.
    threshold: u32,

    /// When the award was earned.
    earned_at: NaiveDateTime,

    /// When the award was consumed, once Used.
    used_at: Option<NaiveDateTime>,

    /// Application that consumed the award, once Used.
    application_id: Option<String>,
}

impl ScholarshipAward {
    /// Create a new Available award.
    pub fn new(
        agent_id: String,
        university_id: String,
        degree_id: String,
        qualifying_points: Vec<String>,
        threshold: u32,
        earned_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id,
            university_id,
            degree_id,
            status: AwardStatus::Available,
            qualifying_points,
            threshold,
            earned_at,
            used_at: None,
            application_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn university_id(&self) -> &str {
        &self.university_id
    }

    pub fn degree_id(&self) -> &str {
        &self.degree_id
    }

    pub fn status(&self) -> AwardStatus {
        self.status
    }

    pub fn qualifying_points(&self) -> &[String] {
        &self.qualifying_points
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn earned_at(&self) -> NaiveDateTime {
        self.earned_at
    }

    pub fn used_at(&self) -> Option<NaiveDateTime> {
        self.used_at
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    /// Apply a validated status change.
    pub(crate) fn set_status(&mut self, status: AwardStatus) {
        self.status = status;
    }

    /// Mark the award consumed by the given application.
    pub(crate) fn mark_used(&mut self, application_id: &str, used_at: NaiveDateTime) {
        self.status = AwardStatus::Used;
        self.application_id = Some(application_id.to_string());
        self.used_at = Some(used_at);
    }
}

/// System scholarship lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemAwardStatus {
    Pending,
    Approved,
    Paid,
}

/// A university-wide system scholarship, created when enough agent-tier
/// awards for a (university, degree) pair are approved or paid.
///
/// At most one exists per (university, degree, application year); the count
/// crossing the threshold again within the same year is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemScholarshipAward {
    /// Unique identifier (UUID).
    id: String,

    /// University the award is granted for.
    university_id: String,

    /// Degree level the qualifying agent awards targeted.
    degree_id: String,

    /// Application year the crossing happened in.
    application_year: i32,

    /// Number of qualifying agent awards at creation time.
    qualifying_agent_awards: u32,

    /// Current lifecycle status.
    status: SystemAwardStatus,

    /// Free-form administrator notes.
    notes: String,
}

impl SystemScholarshipAward {
    /// Create a new Pending system award.
    pub fn new(
        university_id: String,
        degree_id: String,
        application_year: i32,
        qualifying_agent_awards: u32,
        notes: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            university_id,
            degree_id,
            application_year,
            qualifying_agent_awards,
            status: SystemAwardStatus::Pending,
            notes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn university_id(&self) -> &str {
        &self.university_id
    }

    pub fn degree_id(&self) -> &str {
        &self.degree_id
    }

    pub fn application_year(&self) -> i32 {
        self.application_year
    }

    pub fn qualifying_agent_awards(&self) -> u32 {
        self.qualifying_agent_awards
    }

    pub fn status(&self) -> SystemAwardStatus {
        self.status
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_transition_table() {
        assert!(AwardStatus::Available.can_transition(AwardStatus::Approved));
        assert!(AwardStatus::Available.can_transition(AwardStatus::Used));
        assert!(AwardStatus::Available.can_transition(AwardStatus::Expired));
        assert!(AwardStatus::Approved.can_transition(AwardStatus::Paid));

        assert!(!AwardStatus::Used.can_transition(AwardStatus::Available));
        assert!(!AwardStatus::Used.can_transition(AwardStatus::Paid));
        assert!(!AwardStatus::Paid.can_transition(AwardStatus::Available));
        assert!(!AwardStatus::Expired.can_transition(AwardStatus::Approved));
        assert!(!AwardStatus::Available.can_transition(AwardStatus::Paid));
    }

    #[test]
    fn test_cascade_counting_states() {
        assert!(AwardStatus::Approved.counts_for_cascade());
        assert!(AwardStatus::Paid.counts_for_cascade());
        assert!(!AwardStatus::Available.counts_for_cascade());
        assert!(!AwardStatus::Used.counts_for_cascade());
        assert!(!AwardStatus::Expired.counts_for_cascade());
    }
}
