//! Domain models for the agency ledger.

pub mod application;
pub mod commission;
pub mod cycle;
pub mod event;
pub mod payout;
pub mod scholarship;
pub mod wallet;
