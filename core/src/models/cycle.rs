//! Enrollment cycle model.
//!
//! One cycle per application year with a fixed [start_date, end_date] window.
//! Status is purely a function of "today" relative to that window, so the
//! status sweep in `cycle::update_statuses` is idempotent by construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cycle lifecycle status. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Upcoming,
    Active,
    Closed,
}

/// An enrollment cycle for one application year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCycle {
    /// Application year this cycle covers.
    year: i32,

    /// First day applications are accepted.
    start_date: NaiveDate,

    /// Last day applications are accepted (inclusive).
    end_date: NaiveDate,

    /// Current status.
    status: CycleStatus,
}

impl ApplicationCycle {
    /// Create a new Upcoming cycle.
    ///
    /// # Panics
    /// Panics if end_date < start_date.
    pub fn new(year: i32, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        assert!(end_date >= start_date, "cycle end must not precede start");
        Self {
            year,
            start_date,
            end_date,
            status: CycleStatus::Upcoming,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    /// The status this cycle should have on the given day.
    pub fn expected_status(&self, today: NaiveDate) -> CycleStatus {
        if today < self.start_date {
            CycleStatus::Upcoming
        } else if today <= self.end_date {
            CycleStatus::Active
        } else {
            CycleStatus::Closed
        }
    }

    pub(crate) fn set_status(&mut self, status: CycleStatus) {
        self.status = status;
    }
}
