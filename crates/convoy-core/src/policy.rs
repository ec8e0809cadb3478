//! Planning policy knobs and their defaults.

use crate::models::ThreatLevel;
use serde::{Deserialize, Serialize};

/// Configuration for a planning run.
///
/// Tie-break and split behavior are policy, not law; the defaults reproduce
/// the standard doctrine (avoid high-severity zones, allow splitting a
/// request across vehicles, one-way missions, lowest vehicle id on ties).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerPolicy {
    /// Zones graded at or below this severity are tolerated. Crossing one
    /// still counts toward route exposure; anything above blocks the leg.
    pub max_tolerated_threat: ThreatLevel,
    /// Allow a vehicle to deliver part of a request when it cannot carry the
    /// whole remainder. The rest is re-queued for another vehicle.
    pub allow_partial_delivery: bool,
    /// Require every leg to leave enough range to get back to the home base,
    /// and append a cargo-free return leg to each finished route.
    pub require_return_to_base: bool,
    /// Vehicle tie-break when candidate leg distances are equal.
    pub tie_break: TieBreak,
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        Self {
            max_tolerated_threat: ThreatLevel::Medium,
            allow_partial_delivery: true,
            require_return_to_base: false,
            tie_break: TieBreak::LowestVehicleId,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Deterministic default: the lexically lowest vehicle id wins.
    LowestVehicleId,
    /// Prefer the vehicle with the most remaining capacity; id breaks
    /// residual ties.
    LargestRemainingCapacity,
}
