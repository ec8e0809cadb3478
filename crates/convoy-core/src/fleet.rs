//! Fleet capability registry and the request-scoped run state.

use crate::error::PlanError;
use crate::models::{Coordinate, Destination, SupplyPoint, TransportMode, Vehicle, VehicleStatus};
use std::collections::HashMap;

/// Position and facilities of a named location.
#[derive(Debug, Clone, Copy)]
pub struct LocationInfo {
    pub position: Coordinate,
    pub has_airstrip: bool,
    pub has_port: bool,
}

impl From<&SupplyPoint> for LocationInfo {
    fn from(point: &SupplyPoint) -> Self {
        Self {
            position: point.position,
            has_airstrip: point.has_airstrip,
            has_port: point.has_port,
        }
    }
}

impl From<&Destination> for LocationInfo {
    fn from(destination: &Destination) -> Self {
        Self {
            position: destination.position,
            has_airstrip: destination.has_airstrip,
            has_port: destination.has_port,
        }
    }
}

/// Id-keyed index of every known location (supply points and destinations).
#[derive(Debug, Clone, Default)]
pub struct Locations {
    index: HashMap<String, LocationInfo>,
}

impl Locations {
    pub fn build(supply_points: &[SupplyPoint], destinations: &[Destination]) -> Self {
        let mut index = HashMap::new();
        for point in supply_points {
            index.insert(point.id.clone(), LocationInfo::from(point));
        }
        for destination in destinations {
            index.insert(destination.id.clone(), LocationInfo::from(destination));
        }
        Self { index }
    }

    pub fn get(&self, id: &str) -> Option<LocationInfo> {
        self.index.get(id).copied()
    }

    pub fn position(&self, id: &str) -> Option<Coordinate> {
        self.get(id).map(|info| info.position)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

/// Mode gate: can `mode` run a leg between these two locations?
///
/// Ground vehicles move between any two points; aircraft need an airstrip at
/// both ends; watercraft need a port at both ends.
pub fn mode_compatible(mode: TransportMode, from: LocationInfo, to: LocationInfo) -> bool {
    match mode {
        TransportMode::Ground => true,
        TransportMode::Air => from.has_airstrip && to.has_airstrip,
        TransportMode::Water => from.has_port && to.has_port,
    }
}

/// Mutable per-vehicle bookkeeping for one planning run.
#[derive(Debug, Clone)]
pub struct VehicleRun {
    /// The immutable vehicle record this run state was snapshotted from.
    pub spec: Vehicle,
    pub position: Coordinate,
    /// Id of the location the vehicle currently sits at.
    pub at_location: String,
    pub remaining_capacity_tons: f64,
    pub traveled_km: f64,
}

impl VehicleRun {
    pub fn remaining_range_km(&self) -> f64 {
        self.spec.max_range_km - self.traveled_km
    }

    /// Capability check: mode appropriateness between the vehicle's current
    /// location and the destination, plus a nonzero-capacity gate. Partial
    /// fulfilment is allowed, so any positive remainder passes the gate.
    pub fn can_serve(&self, destination: &Destination, locations: &Locations) -> bool {
        if self.remaining_capacity_tons <= 0.0 {
            return false;
        }
        let Some(origin) = locations.get(&self.at_location) else {
            return false;
        };
        mode_compatible(self.spec.mode, origin, LocationInfo::from(destination))
    }

    /// Apply a committed leg: burn range, drop cargo, move the vehicle.
    pub fn commit_leg(
        &mut self,
        to_id: &str,
        to_position: Coordinate,
        distance_km: f64,
        delivered_tons: f64,
    ) {
        self.remaining_capacity_tons = (self.remaining_capacity_tons - delivered_tons).max(0.0);
        self.traveled_km += distance_km;
        self.position = to_position;
        self.at_location = to_id.to_string();
    }
}

/// Request-scoped fleet snapshot.
///
/// Built fresh for every planning run from the immutable vehicle records, so
/// concurrent runs never share mutable state. Only available vehicles are
/// taken; each starts at its home supply point. Vehicles are kept sorted by
/// id, which is what makes tie-breaks and output ordering deterministic.
#[derive(Debug, Clone)]
pub struct FleetState {
    vehicles: Vec<VehicleRun>,
}

impl FleetState {
    pub fn snapshot(vehicles: &[Vehicle], locations: &Locations) -> Result<Self, PlanError> {
        let mut runs = Vec::new();
        for vehicle in vehicles {
            if vehicle.status != VehicleStatus::Available {
                continue;
            }
            let Some(home) = locations.get(&vehicle.home_base) else {
                return Err(PlanError::UnknownHomeBase {
                    vehicle: vehicle.id.clone(),
                    base: vehicle.home_base.clone(),
                });
            };
            runs.push(VehicleRun {
                spec: vehicle.clone(),
                position: home.position,
                at_location: vehicle.home_base.clone(),
                remaining_capacity_tons: vehicle.capacity_tons,
                traveled_km: 0.0,
            });
        }
        runs.sort_by(|a, b| a.spec.id.cmp(&b.spec.id));
        tracing::debug!("fleet snapshot: {} of {} vehicles available", runs.len(), vehicles.len());
        Ok(Self { vehicles: runs })
    }

    pub fn vehicles(&self) -> &[VehicleRun] {
        &self.vehicles
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRun> {
        self.vehicles.iter().find(|run| run.spec.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut VehicleRun> {
        self.vehicles.iter_mut().find(|run| run.spec.id == id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
