//! Post-assembly route validation against the hard planning constraints.

use crate::error::PlanError;
use crate::fleet::Locations;
use crate::models::{Coordinate, Leg, Route, ThreatZone, Vehicle};
use crate::policy::PlannerPolicy;
use crate::threat;

/// Slack for re-summed distance and tonnage totals.
const TOLERANCE: f64 = 1e-6;

/// Re-checks an assembled route against the constraints the assembler was
/// supposed to honor. A failure here means the planner produced an invalid
/// plan and the whole run must be treated as failed, not just this route.
///
/// Checks, in order: leg continuity from the vehicle's home base, total
/// distance against range, total delivered tonnage against capacity, and
/// that every intolerable zone crossing carries the threat flag.
pub fn check_route(
    route: &Route,
    vehicle: &Vehicle,
    locations: &Locations,
    zones: &[ThreatZone],
    policy: &PlannerPolicy,
) -> Result<(), PlanError> {
    let mut expected_from = vehicle.home_base.as_str();
    for leg in &route.legs {
        if leg.from != expected_from {
            return Err(PlanError::DiscontinuousRoute {
                vehicle: vehicle.id.clone(),
                at: leg.from.clone(),
            });
        }
        expected_from = leg.to.as_str();
    }

    let traveled_km: f64 = route.legs.iter().map(|leg| leg.distance_km).sum();
    if traveled_km > vehicle.max_range_km + TOLERANCE {
        return Err(PlanError::RangeViolation {
            vehicle: vehicle.id.clone(),
            traveled_km,
            max_range_km: vehicle.max_range_km,
            destinations: delivered_to(route),
        });
    }

    let delivered_tons: f64 = route.legs.iter().map(|leg| leg.delivered_tons).sum();
    if delivered_tons > vehicle.capacity_tons + TOLERANCE {
        return Err(PlanError::CapacityViolation {
            vehicle: vehicle.id.clone(),
            delivered_tons,
            capacity_tons: vehicle.capacity_tons,
            destinations: delivered_to(route),
        });
    }

    for leg in &route.legs {
        if leg.threat_crossed {
            continue;
        }
        let points = leg_points(leg, locations, &vehicle.id)?;
        if let Some(zone) =
            threat::blocks_path(zones, &points, vehicle.mode, policy.max_tolerated_threat)
        {
            return Err(PlanError::UnflaggedThreatCrossing {
                vehicle: vehicle.id.clone(),
                zone: zone.id.clone(),
                to: leg.to.clone(),
            });
        }
    }

    Ok(())
}

/// Destination ids the route actually dropped cargo at.
fn delivered_to(route: &Route) -> Vec<String> {
    route
        .legs
        .iter()
        .filter(|leg| leg.delivered_tons > 0.0)
        .map(|leg| leg.to.clone())
        .collect()
}

/// Reconstructs the polyline of a leg from its named endpoints and
/// corridor waypoints.
fn leg_points(leg: &Leg, locations: &Locations, vehicle_id: &str) -> Result<Vec<Coordinate>, PlanError> {
    let mut ids = Vec::with_capacity(leg.via.len() + 2);
    ids.push(leg.from.as_str());
    ids.extend(leg.via.iter().map(String::as_str));
    ids.push(leg.to.as_str());

    let mut points = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(position) = locations.position(id) else {
            return Err(PlanError::InvalidInput {
                entity: vehicle_id.to_string(),
                reason: format!("leg endpoint '{}' is not a known location", id),
            });
        };
        points.push(position);
    }
    Ok(points)
}
