//! Convoy CLI - Command line tools for the convoy planning engine.
//!
//! This crate provides the planning binaries:
//! - plan_scenario: Plan a built-in or randomized supply theater

pub mod sim;

pub use sim::Scenario;
