//! Greedy route assembly: priority-ordered matching of deliveries to vehicles.

use crate::candidates::{self, CandidateLeg};
use crate::error::PlanError;
use crate::fleet::{mode_compatible, FleetState, LocationInfo, Locations, VehicleRun};
use crate::models::{
    Destination, Leg, PlanResult, PlanSummary, Route, SupplyPoint, ThreatLevel, ThreatZone,
    TransportMode, UnservedDestination, UnservedReason, Vehicle,
};
use crate::network::{Corridor, CorridorNetwork};
use crate::policy::{PlannerPolicy, TieBreak};
use crate::spatial::haversine_km;
use crate::threat;
use crate::validator;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Tonnage below which a demand counts as fully served.
const EPSILON: f64 = 1e-9;

/// Supply delivery planner.
///
/// Holds the validated, immutable description of one theater: supply points,
/// destinations, the vehicle fleet, threat zones, and the corridor network.
/// [`plan`](Planner::plan) takes `&self` and keeps all mutable run state in a
/// per-call snapshot, so a shared `Planner` can serve concurrent requests.
#[derive(Debug)]
pub struct Planner {
    supply_points: Vec<SupplyPoint>,
    destinations: Vec<Destination>,
    vehicles: Vec<Vehicle>,
    zones: Vec<ThreatZone>,
    network: CorridorNetwork,
    locations: Locations,
    policy: PlannerPolicy,
}

impl Planner {
    /// Validates the theater description and builds a planner.
    ///
    /// Fails fast on malformed input: invalid coordinates, duplicate ids,
    /// vehicles stationed at unknown supply points, corridors touching
    /// unknown locations, degenerate zone geometry, and negative or
    /// non-finite tonnages and ranges.
    pub fn new(
        supply_points: Vec<SupplyPoint>,
        destinations: Vec<Destination>,
        vehicles: Vec<Vehicle>,
        zones: Vec<ThreatZone>,
        corridors: Vec<Corridor>,
        policy: PlannerPolicy,
    ) -> Result<Self, PlanError> {
        let mut location_ids = HashSet::new();
        for point in &supply_points {
            check_coordinate(point.position.lat, point.position.lon)?;
            check_manifest(&point.id, &point.inventory)?;
            if !location_ids.insert(point.id.as_str()) {
                return Err(PlanError::DuplicateId { id: point.id.clone() });
            }
        }
        for destination in &destinations {
            check_coordinate(destination.position.lat, destination.position.lon)?;
            check_manifest(&destination.id, &destination.demand)?;
            if !location_ids.insert(destination.id.as_str()) {
                return Err(PlanError::DuplicateId { id: destination.id.clone() });
            }
        }

        let supply_ids: HashSet<&str> = supply_points.iter().map(|p| p.id.as_str()).collect();
        let mut vehicle_ids = HashSet::new();
        for vehicle in &vehicles {
            if !vehicle_ids.insert(vehicle.id.as_str()) {
                return Err(PlanError::DuplicateId { id: vehicle.id.clone() });
            }
            if !vehicle.capacity_tons.is_finite() || vehicle.capacity_tons < 0.0 {
                return Err(PlanError::InvalidInput {
                    entity: vehicle.id.clone(),
                    reason: format!("capacity {} tons is not valid", vehicle.capacity_tons),
                });
            }
            if !vehicle.max_range_km.is_finite() || vehicle.max_range_km <= 0.0 {
                return Err(PlanError::InvalidInput {
                    entity: vehicle.id.clone(),
                    reason: format!("range {} km is not valid", vehicle.max_range_km),
                });
            }
            if !supply_ids.contains(vehicle.home_base.as_str()) {
                return Err(PlanError::UnknownHomeBase {
                    vehicle: vehicle.id.clone(),
                    base: vehicle.home_base.clone(),
                });
            }
        }

        for zone in &zones {
            let problems = zone.validate();
            if !problems.is_empty() {
                return Err(PlanError::InvalidZone {
                    zone: zone.id.clone(),
                    reason: problems.join("; "),
                });
            }
        }

        for corridor in &corridors {
            for endpoint in [corridor.a.as_str(), corridor.b.as_str()] {
                if !location_ids.contains(endpoint) {
                    return Err(PlanError::UnknownCorridorEndpoint {
                        location: endpoint.to_string(),
                    });
                }
            }
            if !corridor.distance_km.is_finite() || corridor.distance_km <= 0.0 {
                return Err(PlanError::InvalidInput {
                    entity: format!("corridor {} <-> {}", corridor.a, corridor.b),
                    reason: format!("distance {} km is not valid", corridor.distance_km),
                });
            }
        }

        let locations = Locations::build(&supply_points, &destinations);
        let network = CorridorNetwork::new(&corridors);

        Ok(Self {
            supply_points,
            destinations,
            vehicles,
            zones,
            network,
            locations,
            policy,
        })
    }

    pub fn policy(&self) -> &PlannerPolicy {
        &self.policy
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn supply_points(&self) -> &[SupplyPoint] {
        &self.supply_points
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn zones(&self) -> &[ThreatZone] {
        &self.zones
    }

    pub fn locations(&self) -> &Locations {
        &self.locations
    }

    /// Runs one planning pass and returns the assembled routes along with
    /// every destination that could not be served.
    ///
    /// The run works on a fresh fleet snapshot and its own work queue, so
    /// `plan` never mutates the planner itself. An `Err` from here means the
    /// finished plan failed validation, not that demand went unserved.
    pub fn plan(&self) -> Result<PlanResult, PlanError> {
        let fleet = FleetState::snapshot(&self.vehicles, &self.locations)?;
        let queue = self.build_queue();
        tracing::info!(
            "planning {} deliveries with {} available vehicles",
            queue.len(),
            fleet.len()
        );

        let mut assembly = Assembly {
            planner: self,
            fleet,
            queue,
            legs: HashMap::new(),
            exposure: HashMap::new(),
            served: 0,
            unserved: Vec::new(),
        };
        assembly.execute();
        assembly.finish()
    }

    /// Work queue ordered by priority, then by distance to the nearest
    /// supply point, then by id. Destinations with no demand are dropped.
    fn build_queue(&self) -> Vec<WorkItem> {
        let mut queue = Vec::new();
        for destination in &self.destinations {
            let demand = destination.demand.total_tons();
            if demand <= 0.0 {
                tracing::debug!("destination {} requests nothing, skipping", destination.id);
                continue;
            }
            let near_supply_km = self
                .supply_points
                .iter()
                .map(|point| haversine_km(point.position, destination.position))
                .fold(f64::INFINITY, f64::min);
            queue.push(WorkItem {
                destination: destination.clone(),
                remaining_tons: demand,
                splits: 0,
                near_supply_km,
            });
        }
        queue.sort_by(|a, b| {
            b.destination
                .priority
                .cmp(&a.destination.priority)
                .then_with(|| a.near_supply_km.total_cmp(&b.near_supply_km))
                .then_with(|| a.destination.id.cmp(&b.destination.id))
        });
        queue
    }
}

/// One pending delivery in the work queue.
struct WorkItem {
    destination: Destination,
    remaining_tons: f64,
    /// Partial deliveries committed so far.
    splits: u32,
    /// Straight-line distance to the closest supply point, for ordering.
    near_supply_km: f64,
}

/// A vehicle/candidate pairing under consideration for the next assignment.
struct Pick {
    vehicle_id: String,
    from: String,
    speed_kmh: f64,
    remaining_capacity_tons: f64,
    mode: TransportMode,
    candidate: CandidateLeg,
}

impl Pick {
    fn new(run: &VehicleRun, candidate: CandidateLeg) -> Self {
        Self {
            vehicle_id: run.spec.id.clone(),
            from: run.at_location.clone(),
            speed_kmh: run.spec.cruise_speed_kmh(),
            remaining_capacity_tons: run.remaining_capacity_tons,
            mode: run.spec.mode,
            candidate,
        }
    }
}

/// Keeps the better of two picks: shorter leg first, then the tie-break rule.
fn take_better(slot: &mut Option<Pick>, next: Pick, tie_break: TieBreak) {
    let Some(current) = slot else {
        *slot = Some(next);
        return;
    };
    let replace = match next.candidate.distance_km.total_cmp(&current.candidate.distance_km) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match tie_break {
            TieBreak::LowestVehicleId => next.vehicle_id < current.vehicle_id,
            TieBreak::LargestRemainingCapacity => {
                next.remaining_capacity_tons > current.remaining_capacity_tons
                    || (next.remaining_capacity_tons == current.remaining_capacity_tons
                        && next.vehicle_id < current.vehicle_id)
            }
        },
    };
    if replace {
        *slot = Some(next);
    }
}

/// Outcome of one assignment attempt on a queue slot.
enum Attempt {
    /// Demand fully met; the item left the queue.
    Served,
    /// Partial delivery committed; the remainder went to the back of its
    /// priority tier.
    Requeued,
    /// Split limit reached; the remainder was recorded as unserved.
    Exhausted,
    /// No vehicle could take the item. It stays put for a later pass.
    Stuck,
}

/// Mutable state of one planning run.
struct Assembly<'a> {
    planner: &'a Planner,
    fleet: FleetState,
    queue: Vec<WorkItem>,
    /// Assigned legs per vehicle id, in commit order.
    legs: HashMap<String, Vec<Leg>>,
    /// Worst severity crossed so far, per vehicle id.
    exposure: HashMap<String, ThreatLevel>,
    served: usize,
    unserved: Vec<UnservedDestination>,
}

impl Assembly<'_> {
    /// Drains the queue greedily. Passes repeat as long as any attempt
    /// lands an assignment, because a vehicle that relocated may bring a
    /// previously stuck destination into range.
    fn execute(&mut self) {
        loop {
            let mut progressed = false;
            let mut index = 0;
            while index < self.queue.len() {
                match self.try_assign(index) {
                    Attempt::Served | Attempt::Requeued | Attempt::Exhausted => {
                        progressed = true;
                    }
                    Attempt::Stuck => index += 1,
                }
            }
            if !progressed {
                break;
            }
        }
    }

    /// Picks the best vehicle for the queue item at `index` and commits the
    /// resulting leg. Candidates are recomputed from live run state on
    /// every attempt. Clear candidates always win over threat-blocked ones;
    /// a blocked candidate is only taken when it is the sole way to deliver,
    /// and the leg is then flagged as a forced crossing.
    fn try_assign(&mut self, index: usize) -> Attempt {
        let (best, best_blocked) = {
            let item = &self.queue[index];
            let mut best: Option<Pick> = None;
            let mut best_blocked: Option<Pick> = None;
            for run in self.fleet.vehicles() {
                let set = candidates::feasible_next(
                    run,
                    std::iter::once((&item.destination, item.remaining_tons)),
                    &self.planner.locations,
                    &self.planner.zones,
                    &self.planner.network,
                    &self.planner.policy,
                );
                for candidate in set.clear {
                    take_better(&mut best, Pick::new(run, candidate), self.planner.policy.tie_break);
                }
                for candidate in set.blocked {
                    take_better(
                        &mut best_blocked,
                        Pick::new(run, candidate),
                        self.planner.policy.tie_break,
                    );
                }
            }
            (best, best_blocked)
        };

        let (pick, forced) = match (best, best_blocked) {
            (Some(pick), _) => (pick, false),
            (None, Some(pick)) => (pick, true),
            (None, None) => return Attempt::Stuck,
        };

        if forced {
            tracing::warn!(
                "no clear route to {}: vehicle {} must cross zone {}",
                pick.candidate.destination_id,
                pick.vehicle_id,
                pick.candidate.blocking_zone.as_deref().unwrap_or("unknown")
            );
        }

        let Some(&arrival) = pick.candidate.points.last() else {
            return Attempt::Stuck;
        };
        let exposure =
            threat::path_exposure(&self.planner.zones, &pick.candidate.points, pick.mode);
        let delivered = pick.candidate.deliverable_tons;
        let leg = Leg {
            from: pick.from.clone(),
            to: pick.candidate.destination_id.clone(),
            via: pick.candidate.via.clone(),
            distance_km: pick.candidate.distance_km,
            transit_hours: pick.candidate.distance_km / pick.speed_kmh,
            delivered_tons: delivered,
            threat_crossed: forced,
        };
        tracing::info!(
            "vehicle {} tasked: {} -> {} ({:.1} km, {:.1} t)",
            pick.vehicle_id,
            leg.from,
            leg.to,
            leg.distance_km,
            delivered
        );

        let Some(run) = self.fleet.get_mut(&pick.vehicle_id) else {
            return Attempt::Stuck;
        };
        run.commit_leg(&leg.to, arrival, leg.distance_km, delivered);

        let worst = self
            .exposure
            .entry(pick.vehicle_id.clone())
            .or_insert(ThreatLevel::Low);
        if exposure > *worst {
            *worst = exposure;
        }
        self.legs.entry(pick.vehicle_id).or_default().push(leg);

        let item = &mut self.queue[index];
        item.remaining_tons -= delivered;
        if item.remaining_tons <= EPSILON {
            self.served += 1;
            self.queue.remove(index);
            return Attempt::Served;
        }

        item.splits += 1;
        if item.splits >= self.fleet.len() as u32 {
            let item = self.queue.remove(index);
            let reason = self.classify(&item);
            tracing::warn!(
                "destination {} dropped after {} partial deliveries ({}): {:.1} t remaining",
                item.destination.id,
                item.splits,
                reason,
                item.remaining_tons
            );
            self.unserved.push(UnservedDestination {
                destination_id: item.destination.id,
                reason,
                remaining_tons: item.remaining_tons,
            });
            return Attempt::Exhausted;
        }

        // Remainder goes behind every other pending item of the same
        // priority, ahead of the first lower-priority one.
        let item = self.queue.remove(index);
        let insert_at = self
            .queue
            .iter()
            .position(|work| work.destination.priority < item.destination.priority)
            .unwrap_or(self.queue.len());
        tracing::debug!(
            "destination {} partially served, {:.1} t remaining, re-queued",
            item.destination.id,
            item.remaining_tons
        );
        self.queue.insert(insert_at, item);
        Attempt::Requeued
    }

    /// Decides the reason code for an unserved destination.
    ///
    /// Mode incompatibility dominates, then range, then capacity: if any
    /// mode-appropriate vehicle still had the cargo space and the item was
    /// not assigned, distance is what stopped it.
    fn classify(&self, item: &WorkItem) -> UnservedReason {
        let target = LocationInfo::from(&item.destination);
        let mut any_mode = false;
        let mut any_capacity = false;

        for run in self.fleet.vehicles() {
            let Some(origin) = self.planner.locations.get(&run.at_location) else {
                continue;
            };
            if !mode_compatible(run.spec.mode, origin, target) {
                continue;
            }
            any_mode = true;
            let has_capacity = run.remaining_capacity_tons > 0.0
                && (self.planner.policy.allow_partial_delivery
                    || run.remaining_capacity_tons + EPSILON >= item.remaining_tons);
            if has_capacity {
                any_capacity = true;
            }
        }

        if !any_mode {
            UnservedReason::NoVehicleAvailable
        } else if any_capacity {
            UnservedReason::OutOfRange
        } else {
            UnservedReason::CapacityExhausted
        }
    }

    /// Sends every vehicle that left its home base back to it. Range for
    /// the return leg was already budgeted during assignment, so this only
    /// materializes the leg. A blocked return is flagged, never skipped.
    fn append_return_legs(&mut self) {
        let mut vehicle_ids: Vec<String> = self.legs.keys().cloned().collect();
        vehicle_ids.sort();

        for vehicle_id in vehicle_ids {
            let (from, position, home_id, mode, speed_kmh) = {
                let Some(run) = self.fleet.get(&vehicle_id) else {
                    continue;
                };
                (
                    run.at_location.clone(),
                    run.position,
                    run.spec.home_base.clone(),
                    run.spec.mode,
                    run.spec.cruise_speed_kmh(),
                )
            };
            if from == home_id {
                continue;
            }
            let Some(home) = self.planner.locations.get(&home_id) else {
                continue;
            };

            let geometry = candidates::resolve_leg(
                &from,
                position,
                &home_id,
                home.position,
                &self.planner.network,
                &self.planner.locations,
            );
            let blocked = threat::blocks_path(
                &self.planner.zones,
                &geometry.points,
                mode,
                self.planner.policy.max_tolerated_threat,
            );
            if let Some(zone) = blocked {
                tracing::warn!(
                    "vehicle {} returns to {} through zone {}",
                    vehicle_id,
                    home_id,
                    zone.id
                );
            }
            let exposure = threat::path_exposure(&self.planner.zones, &geometry.points, mode);
            let leg = Leg {
                from,
                to: home_id.clone(),
                via: geometry.via,
                distance_km: geometry.distance_km,
                transit_hours: geometry.distance_km / speed_kmh,
                delivered_tons: 0.0,
                threat_crossed: blocked.is_some(),
            };

            let Some(run) = self.fleet.get_mut(&vehicle_id) else {
                continue;
            };
            run.commit_leg(&home_id, home.position, leg.distance_km, 0.0);

            let worst = self
                .exposure
                .entry(vehicle_id.clone())
                .or_insert(ThreatLevel::Low);
            if exposure > *worst {
                *worst = exposure;
            }
            self.legs.entry(vehicle_id).or_default().push(leg);
        }
    }

    /// Records leftover queue items as unserved, appends return legs when
    /// the policy asks for them, then builds and validates the result.
    fn finish(mut self) -> Result<PlanResult, PlanError> {
        let leftovers = std::mem::take(&mut self.queue);
        for item in leftovers {
            let reason = self.classify(&item);
            tracing::warn!(
                "destination {} unserved ({}): {:.1} t remaining",
                item.destination.id,
                reason,
                item.remaining_tons
            );
            self.unserved.push(UnservedDestination {
                destination_id: item.destination.id,
                reason,
                remaining_tons: item.remaining_tons,
            });
        }

        if self.planner.policy.require_return_to_base {
            self.append_return_legs();
        }

        self.into_result()
    }

    fn into_result(mut self) -> Result<PlanResult, PlanError> {
        let mut routes = Vec::new();
        for run in self.fleet.vehicles() {
            let Some(legs) = self.legs.remove(&run.spec.id) else {
                continue;
            };
            if legs.is_empty() {
                continue;
            }
            let total_distance_km = legs.iter().map(|leg| leg.distance_km).sum();
            let total_delivered_tons = legs.iter().map(|leg| leg.delivered_tons).sum();
            let total_transit_hours = legs.iter().map(|leg| leg.transit_hours).sum();
            let threat_exposure = self
                .exposure
                .get(&run.spec.id)
                .copied()
                .unwrap_or(ThreatLevel::Low);
            let route = Route {
                vehicle_id: run.spec.id.clone(),
                vehicle_type: run.spec.vehicle_type.clone(),
                mode: run.spec.mode,
                legs,
                total_distance_km,
                total_delivered_tons,
                total_transit_hours,
                threat_exposure,
            };
            if let Err(error) = validator::check_route(
                &route,
                &run.spec,
                &self.planner.locations,
                &self.planner.zones,
                &self.planner.policy,
            ) {
                tracing::error!(
                    "route validation failed for vehicle {}: {}",
                    run.spec.id,
                    error
                );
                return Err(error);
            }
            routes.push(route);
        }

        let total_distance_km: f64 = routes.iter().map(|route| route.total_distance_km).sum();
        let total_delivered_tons: f64 =
            routes.iter().map(|route| route.total_delivered_tons).sum();
        let threat_crossed_legs = routes
            .iter()
            .flat_map(|route| route.legs.iter())
            .filter(|leg| leg.threat_crossed)
            .count();
        let avg_route_distance_km = if routes.is_empty() {
            0.0
        } else {
            total_distance_km / routes.len() as f64
        };
        let summary = PlanSummary {
            total_routes: routes.len(),
            total_distance_km,
            total_delivered_tons,
            destinations_served: self.served,
            destinations_unserved: self.unserved.len(),
            threat_crossed_legs,
            avg_route_distance_km,
        };
        tracing::info!(
            "plan complete: {} routes, {} served, {} unserved, {:.1} t delivered",
            summary.total_routes,
            summary.destinations_served,
            summary.destinations_unserved,
            summary.total_delivered_tons
        );

        Ok(PlanResult {
            routes,
            unserved: self.unserved,
            summary,
            planned_at: Utc::now(),
        })
    }
}

fn check_coordinate(lat: f64, lon: f64) -> Result<(), PlanError> {
    let position = crate::models::Coordinate { lat, lon };
    if position.is_valid() {
        Ok(())
    } else {
        Err(PlanError::InvalidCoordinate { lat, lon })
    }
}

fn check_manifest(entity: &str, manifest: &crate::models::Manifest) -> Result<(), PlanError> {
    for (class, tons) in &manifest.quantities {
        if !tons.is_finite() || *tons < 0.0 {
            return Err(PlanError::InvalidInput {
                entity: entity.to_string(),
                reason: format!("{:?} quantity {} is not a valid tonnage", class, tons),
            });
        }
    }
    Ok(())
}
