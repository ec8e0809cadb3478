//! Candidate leg construction: which destinations a vehicle can reach next.

use crate::fleet::{Locations, VehicleRun};
use crate::models::{Coordinate, Destination, ThreatZone};
use crate::network::CorridorNetwork;
use crate::policy::PlannerPolicy;
use crate::spatial::haversine_km;
use crate::threat;

/// Slack for floating-point range and tonnage comparisons.
const EPSILON: f64 = 1e-9;

/// One admissible next leg for a specific vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLeg {
    pub destination_id: String,
    /// Intermediate corridor waypoints, empty for a straight leg.
    pub via: Vec<String>,
    /// Full polyline of the leg, endpoints included.
    pub points: Vec<Coordinate>,
    pub distance_km: f64,
    /// Tonnage the vehicle could drop here, capped by its remaining capacity.
    pub deliverable_tons: f64,
    /// Zone id when the leg only exists by crossing an intolerable zone.
    pub blocking_zone: Option<String>,
}

/// Candidate legs split by threat clearance.
///
/// `clear` legs cross nothing above the tolerated severity. `blocked` legs
/// are otherwise feasible but forced through a hot zone; the assembler only
/// falls back to them when no clear leg exists.
#[derive(Debug, Clone, Default)]
pub struct FeasibleSet {
    pub clear: Vec<CandidateLeg>,
    pub blocked: Vec<CandidateLeg>,
}

/// Resolved geometry of a leg between two known locations.
pub(crate) struct LegGeometry {
    pub via: Vec<String>,
    pub distance_km: f64,
    pub points: Vec<Coordinate>,
}

/// Routes a leg over the corridor network when a path exists, otherwise
/// falls back to the direct great-circle line.
pub(crate) fn resolve_leg(
    from_id: &str,
    from_position: Coordinate,
    to_id: &str,
    to_position: Coordinate,
    network: &CorridorNetwork,
    locations: &Locations,
) -> LegGeometry {
    if let Some(path) = network.path(from_id, to_id) {
        let mut points = Vec::with_capacity(path.via.len() + 2);
        points.push(from_position);
        let mut resolved = true;
        for waypoint in &path.via {
            match locations.position(waypoint) {
                Some(position) => points.push(position),
                None => {
                    resolved = false;
                    break;
                }
            }
        }
        if resolved {
            points.push(to_position);
            return LegGeometry {
                via: path.via,
                distance_km: path.distance_km,
                points,
            };
        }
    }
    LegGeometry {
        via: Vec::new(),
        distance_km: haversine_km(from_position, to_position),
        points: vec![from_position, to_position],
    }
}

/// Builds the feasible set for one vehicle against the pending demand.
///
/// `pending` pairs each destination with its remaining undelivered tonnage.
/// The checks mirror the assignment rules: capability gate, partial-delivery
/// policy, range (with the return leg included when the policy demands it),
/// then threat clearance. Recomputed from current run state after every
/// committed leg, because position, capacity, and range all shift.
pub fn feasible_next<'a, I>(
    vehicle: &VehicleRun,
    pending: I,
    locations: &Locations,
    zones: &[ThreatZone],
    network: &CorridorNetwork,
    policy: &PlannerPolicy,
) -> FeasibleSet
where
    I: IntoIterator<Item = (&'a Destination, f64)>,
{
    let mut set = FeasibleSet::default();

    for (destination, remaining_tons) in pending {
        if remaining_tons <= 0.0 || !vehicle.can_serve(destination, locations) {
            continue;
        }
        let deliverable = remaining_tons.min(vehicle.remaining_capacity_tons);
        if !policy.allow_partial_delivery && deliverable + EPSILON < remaining_tons {
            continue;
        }

        let geometry = resolve_leg(
            &vehicle.at_location,
            vehicle.position,
            &destination.id,
            destination.position,
            network,
            locations,
        );

        let mut required_km = geometry.distance_km;
        if policy.require_return_to_base {
            let Some(home) = locations.get(&vehicle.spec.home_base) else {
                continue;
            };
            let return_leg = resolve_leg(
                &destination.id,
                destination.position,
                &vehicle.spec.home_base,
                home.position,
                network,
                locations,
            );
            required_km += return_leg.distance_km;
        }
        if required_km > vehicle.remaining_range_km() + EPSILON {
            continue;
        }

        let candidate = CandidateLeg {
            destination_id: destination.id.clone(),
            via: geometry.via,
            points: geometry.points,
            distance_km: geometry.distance_km,
            deliverable_tons: deliverable,
            blocking_zone: None,
        };
        match threat::blocks_path(zones, &candidate.points, vehicle.spec.mode, policy.max_tolerated_threat) {
            Some(zone) => set.blocked.push(CandidateLeg {
                blocking_zone: Some(zone.id.clone()),
                ..candidate
            }),
            None => set.clear.push(candidate),
        }
    }

    set
}
