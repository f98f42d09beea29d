//! Ledger State
//!
//! Holds every row the ledger core operates on: agents, universities,
//! commissions, payouts, wallets, scholarship points and awards, system
//! awards, and enrollment cycles, plus the event log.
//!
//! The surrounding platform persists these rows in a relational store; this
//! struct models the rows and the transactional semantics over them the same
//! way a settlement engine models bank accounts rather than a real database.
//!
//! # Critical Invariants
//!
//! 1. **Commission Uniqueness**: at most one commission per application_id
//! 2. **Point Uniqueness**: at most one scholarship point per application_id
//! 3. **No Overdraft**: per agent, pending + paid payouts never exceed
//!    commissions (enforced by `payout::create_payout`, checkable via
//!    `balance::compute_balance`)
//! 4. **Wallet Freshness**: every writer of commissions or payouts refreshes
//!    the agent's wallet row before returning

pub mod balance;
pub mod snapshot;

use crate::models::commission::Commission;
use crate::models::cycle::ApplicationCycle;
use crate::models::event::{EventLog, LedgerEvent};
use crate::models::payout::Payout;
use crate::models::scholarship::{ScholarshipAward, ScholarshipPoint, SystemScholarshipAward};
use crate::models::wallet::Wallet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ledger-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Points required for one agent-tier award when no per-university
    /// override applies.
    pub default_point_threshold: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_point_threshold: 5,
        }
    }
}

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent identifier (e.g. "AGT_001").
    pub id: String,

    /// Display name.
    pub name: String,
}

/// Per-university scholarship configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityConfig {
    /// Unique university identifier.
    pub id: String,

    /// Agent-tier awards (approved or paid) required before a system
    /// scholarship is granted for a degree level of this university.
    pub min_agent_scholarships: u32,

    /// Per-degree overrides of the agent-tier point threshold.
    pub point_thresholds: HashMap<String, u32>,
}

/// Complete ledger state.
///
/// # Example
///
/// ```rust
/// use agency_ledger_core::{AgentProfile, LedgerConfig, LedgerState};
///
/// let mut state = LedgerState::new(LedgerConfig::default());
/// state.register_agent(AgentProfile { id: "AGT_1".to_string(), name: "Amari".to_string() });
/// assert_eq!(state.num_agents(), 1);
/// assert!(state.wallet("AGT_1").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Ledger-wide configuration.
    config: LedgerConfig,

    /// Registered agents, indexed by id.
    agents: HashMap<String, AgentProfile>,

    /// University scholarship configuration, indexed by id.
    universities: HashMap<String, UniversityConfig>,

    /// Commission ledger, indexed by commission id.
    commissions: HashMap<String, Commission>,

    /// application_id -> commission id (uniqueness index).
    commission_by_application: HashMap<String, String>,

    /// Payout ledger, indexed by payout id.
    payouts: HashMap<String, Payout>,

    /// Wallet cache, one row per registered agent.
    wallets: HashMap<String, Wallet>,

    /// Scholarship points, indexed by point id.
    points: HashMap<String, ScholarshipPoint>,

    /// application_id -> point id (uniqueness index).
    point_by_application: HashMap<String, String>,

    /// Agent-tier awards, indexed by award id.
    awards: HashMap<String, ScholarshipAward>,

    /// System scholarships, indexed by id.
    system_awards: HashMap<String, SystemScholarshipAward>,

    /// Enrollment cycles, indexed by application year.
    cycles: HashMap<i32, ApplicationCycle>,

    /// Audit and notification event log.
    events: EventLog,
}

impl LedgerState {
    /// Create an empty ledger with the given configuration.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            agents: HashMap::new(),
            universities: HashMap::new(),
            commissions: HashMap::new(),
            commission_by_application: HashMap::new(),
            payouts: HashMap::new(),
            wallets: HashMap::new(),
            points: HashMap::new(),
            point_by_application: HashMap::new(),
            awards: HashMap::new(),
            system_awards: HashMap::new(),
            cycles: HashMap::new(),
            events: EventLog::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Agents and universities
    // ------------------------------------------------------------------

    /// Register an agent, creating its zeroed wallet row.
    ///
    /// Registering an already-known agent id replaces the profile and leaves
    /// the wallet untouched.
    pub fn register_agent(&mut self, agent: AgentProfile) {
        self.wallets
            .entry(agent.id.clone())
            .or_insert_with(|| Wallet::empty(agent.id.clone()));
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn agent(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> &HashMap<String, AgentProfile> {
        &self.agents
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Register or replace a university configuration.
    pub fn register_university(&mut self, university: UniversityConfig) {
        self.universities.insert(university.id.clone(), university);
    }

    pub fn university(&self, id: &str) -> Option<&UniversityConfig> {
        self.universities.get(id)
    }

    pub fn universities(&self) -> &HashMap<String, UniversityConfig> {
        &self.universities
    }

    /// Point threshold in force for a (university, degree) pair.
    ///
    /// Per-degree university overrides win; otherwise the ledger default.
    pub fn effective_threshold(&self, university_id: &str, degree_id: &str) -> u32 {
        self.universities
            .get(university_id)
            .and_then(|u| u.point_thresholds.get(degree_id).copied())
            .unwrap_or(self.config.default_point_threshold)
    }

    // ------------------------------------------------------------------
    // Commissions
    // ------------------------------------------------------------------

    /// Insert a commission, maintaining the application uniqueness index.
    ///
    /// # Panics
    /// Panics if a commission already exists for the application. Callers
    /// check `commission_for_application` first; the approval pipeline is
    /// idempotent at its level.
    pub fn add_commission(&mut self, commission: Commission) {
        let app_id = commission.application_id().to_string();
        assert!(
            !self.commission_by_application.contains_key(&app_id),
            "commission already exists for application {}",
            app_id
        );
        self.commission_by_application
            .insert(app_id, commission.id().to_string());
        self.commissions
            .insert(commission.id().to_string(), commission);
    }

    pub fn commission(&self, id: &str) -> Option<&Commission> {
        self.commissions.get(id)
    }

    /// The commission booked for an application, if any.
    pub fn commission_for_application(&self, application_id: &str) -> Option<&Commission> {
        self.commission_by_application
            .get(application_id)
            .and_then(|id| self.commissions.get(id))
    }

    /// All commissions for one agent, in unspecified order.
    pub fn commissions_for_agent<'a>(
        &'a self,
        agent_id: &'a str,
    ) -> impl Iterator<Item = &'a Commission> {
        self.commissions
            .values()
            .filter(move |c| c.agent_id() == agent_id)
    }

    pub fn commissions(&self) -> &HashMap<String, Commission> {
        &self.commissions
    }

    pub fn num_commissions(&self) -> usize {
        self.commissions.len()
    }

    // ------------------------------------------------------------------
    // Payouts
    // ------------------------------------------------------------------

    pub fn add_payout(&mut self, payout: Payout) {
        self.payouts.insert(payout.id().to_string(), payout);
    }

    pub fn payout(&self, id: &str) -> Option<&Payout> {
        self.payouts.get(id)
    }

    pub fn payout_mut(&mut self, id: &str) -> Option<&mut Payout> {
        self.payouts.get_mut(id)
    }

    /// All payouts for one agent, in unspecified order.
    pub fn payouts_for_agent<'a>(&'a self, agent_id: &'a str) -> impl Iterator<Item = &'a Payout> {
        self.payouts
            .values()
            .filter(move |p| p.agent_id() == agent_id)
    }

    pub fn payouts(&self) -> &HashMap<String, Payout> {
        &self.payouts
    }

    pub fn num_payouts(&self) -> usize {
        self.payouts.len()
    }

    // ------------------------------------------------------------------
    // Wallets
    // ------------------------------------------------------------------

    pub fn wallet(&self, agent_id: &str) -> Option<&Wallet> {
        self.wallets.get(agent_id)
    }

    pub(crate) fn put_wallet(&mut self, wallet: Wallet) {
        self.wallets.insert(wallet.agent_id.clone(), wallet);
    }

    pub fn wallets(&self) -> &HashMap<String, Wallet> {
        &self.wallets
    }

    // ------------------------------------------------------------------
    // Scholarship points and awards
    // ------------------------------------------------------------------

    pub fn add_point(&mut self, point: ScholarshipPoint) {
        let app_id = point.application_id().to_string();
        assert!(
            !self.point_by_application.contains_key(&app_id),
            "point already exists for application {}",
            app_id
        );
        self.point_by_application
            .insert(app_id, point.id().to_string());
        self.points.insert(point.id().to_string(), point);
    }

    pub fn point(&self, id: &str) -> Option<&ScholarshipPoint> {
        self.points.get(id)
    }

    pub fn point_mut(&mut self, id: &str) -> Option<&mut ScholarshipPoint> {
        self.points.get_mut(id)
    }

    /// The point earned by an application, if any.
    pub fn point_for_application(&self, application_id: &str) -> Option<&ScholarshipPoint> {
        self.point_by_application
            .get(application_id)
            .and_then(|id| self.points.get(id))
    }

    pub fn points(&self) -> &HashMap<String, ScholarshipPoint> {
        &self.points
    }

    pub fn add_award(&mut self, award: ScholarshipAward) {
        self.awards.insert(award.id().to_string(), award);
    }

    pub fn award(&self, id: &str) -> Option<&ScholarshipAward> {
        self.awards.get(id)
    }

    pub fn award_mut(&mut self, id: &str) -> Option<&mut ScholarshipAward> {
        self.awards.get_mut(id)
    }

    pub fn awards(&self) -> &HashMap<String, ScholarshipAward> {
        &self.awards
    }

    pub fn add_system_award(&mut self, award: SystemScholarshipAward) {
        self.system_awards.insert(award.id().to_string(), award);
    }

    pub fn system_awards(&self) -> &HashMap<String, SystemScholarshipAward> {
        &self.system_awards
    }

    // ------------------------------------------------------------------
    // Cycles
    // ------------------------------------------------------------------

    /// Insert or replace the cycle for its application year.
    pub fn add_cycle(&mut self, cycle: ApplicationCycle) {
        self.cycles.insert(cycle.year(), cycle);
    }

    pub fn cycle(&self, year: i32) -> Option<&ApplicationCycle> {
        self.cycles.get(&year)
    }

    pub fn cycles(&self) -> &HashMap<i32, ApplicationCycle> {
        &self.cycles
    }

    pub fn cycles_mut(&mut self) -> &mut HashMap<i32, ApplicationCycle> {
        &mut self.cycles
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Append an event to the audit log.
    pub fn log_event(&mut self, event: LedgerEvent) {
        self.events.log(event);
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_register_agent_creates_wallet() {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.register_agent(AgentProfile {
            id: "AGT_1".to_string(),
            name: "Amari".to_string(),
        });

        let wallet = state.wallet("AGT_1").unwrap();
        assert_eq!(wallet.available_balance, 0);
        assert_eq!(wallet.pending_balance, 0);
    }

    #[test]
    fn test_commission_application_index() {
        let mut state = LedgerState::new(LedgerConfig::default());
        let commission =
            Commission::new("AGT_1".to_string(), "APP_1".to_string(), 100_00, now());
        let id = commission.id().to_string();

        state.add_commission(commission);

        assert_eq!(
            state.commission_for_application("APP_1").unwrap().id(),
            id
        );
        assert!(state.commission_for_application("APP_2").is_none());
    }

    #[test]
    #[should_panic(expected = "commission already exists")]
    fn test_duplicate_commission_panics() {
        let mut state = LedgerState::new(LedgerConfig::default());
        state.add_commission(Commission::new(
            "AGT_1".to_string(),
            "APP_1".to_string(),
            100_00,
            now(),
        ));
        state.add_commission(Commission::new(
            "AGT_1".to_string(),
            "APP_1".to_string(),
            100_00,
            now(),
        ));
    }

    #[test]
    #[should_panic(expected = "point already exists")]
    fn test_duplicate_point_panics() {
        let mut state = LedgerState::new(LedgerConfig::default());
        for _ in 0..2 {
            state.add_point(crate::models::scholarship::ScholarshipPoint::new(
                "AGT_1".to_string(),
                "UNI_1".to_string(),
                "bachelor".to_string(),
                "APP_1".to_string(),
                2026,
                now(),
            ));
        }
    }

    #[test]
    fn test_effective_threshold_override() {
        let mut state = LedgerState::new(LedgerConfig::default());
        let mut thresholds = HashMap::new();
        thresholds.insert("master".to_string(), 3);
        state.register_university(UniversityConfig {
            id: "UNI_1".to_string(),
            min_agent_scholarships: 10,
            point_thresholds: thresholds,
        });

        assert_eq!(state.effective_threshold("UNI_1", "master"), 3);
        assert_eq!(state.effective_threshold("UNI_1", "bachelor"), 5);
        assert_eq!(state.effective_threshold("UNI_2", "master"), 5);
    }
}
