//! Approved-application event payload.
//!
//! The application workflow itself (statuses, documents, CRUD) lives outside
//! this crate. The ledger only ever sees the payload of an "application
//! approved" event, which carries everything needed to book a commission and,
//! for scholarship-typed applications, a scholarship point.

use serde::{Deserialize, Serialize};

/// How the agent is compensated for an approved application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    /// Cash commission only.
    Standard,

    /// Cash commission plus one scholarship point.
    Scholarship,
}

/// Payload of the inbound "application approved" event.
///
/// `student_id` and `program_id` are optional because the upstream data can
/// be transiently inconsistent at approval time; the approval pipeline treats
/// their absence as a missing relationship and skips bookkeeping for the
/// application rather than failing the approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedApplication {
    /// External application identifier (unique per application).
    pub application_id: String,

    /// Agent who submitted the application.
    pub agent_id: String,

    /// University the application targets.
    pub university_id: String,

    /// Degree level of the target program (e.g. "bachelor", "master").
    pub degree_id: String,

    /// Application year the submission counts toward.
    pub application_year: i32,

    /// Compensation scheme for this application.
    pub commission_type: CommissionType,

    /// Commission amount in cents.
    pub commission_amount: i64,

    /// Linked student, if the relationship is intact.
    pub student_id: Option<String>,

    /// Linked program, if the relationship is intact.
    pub program_id: Option<String>,
}

impl ApprovedApplication {
    /// Name of the first missing required relationship, if any.
    pub fn missing_relationship(&self) -> Option<&'static str> {
        if self.student_id.is_none() {
            Some("student")
        } else if self.program_id.is_none() {
            Some("program")
        } else {
            None
        }
    }
}
