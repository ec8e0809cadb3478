//! Core data models for the convoy routing engine.

use crate::spatial::{distance_to_segment_km, haversine_km, km_per_deg_lat, km_per_deg_lon,
    segments_intersect_2d};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// True when both components are finite and within valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

// ========== CARGO ==========

/// Supply classes carried by convoys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoClass {
    Food,
    Ammo,
    Fuel,
    Medical,
}

/// Quantities per cargo class, in metric tons.
///
/// Capacity accounting throughout the engine works on the total tonnage;
/// per-class quantities ride along for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub quantities: BTreeMap<CargoClass, f64>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from (class, tons) pairs.
    pub fn of(entries: &[(CargoClass, f64)]) -> Self {
        let mut manifest = Self::new();
        for (class, tons) in entries {
            *manifest.quantities.entry(*class).or_insert(0.0) += tons;
        }
        manifest
    }

    pub fn total_tons(&self) -> f64 {
        self.quantities.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_tons() <= 0.0
    }
}

// ========== LOCATIONS ==========

/// A fixed supply depot that convoys depart from. Immutable for the duration
/// of a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyPoint {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    #[serde(default)]
    pub region: Option<String>,
    /// Stock on hand, informational for planning purposes.
    #[serde(default)]
    pub inventory: Manifest,
    #[serde(default)]
    pub has_airstrip: bool,
    #[serde(default)]
    pub has_port: bool,
}

/// Delivery urgency. Ordering follows urgency, so `Critical` sorts highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Critical,
}

/// A demand site awaiting delivery. Immutable input; the undelivered
/// remainder during a run is tracked by the assembler, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Requested goods.
    pub demand: Manifest,
    #[serde(default)]
    pub has_airstrip: bool,
    #[serde(default)]
    pub has_port: bool,
}

// ========== VEHICLES ==========

/// How a vehicle moves between points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Ground,
    Air,
    Water,
}

impl TransportMode {
    /// Cruise speed assumed when the vehicle record does not carry one.
    pub fn default_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Ground => 80.0,
            TransportMode::Air => 300.0,
            TransportMode::Water => 40.0,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Ground => write!(f, "ground"),
            TransportMode::Air => write!(f, "air"),
            TransportMode::Water => write!(f, "water"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Ready for tasking
    #[default]
    Available,
    /// Already committed to a mission
    InTransit,
    /// Out of service
    Maintenance,
}

/// A transport asset. The record is immutable input; remaining capacity and
/// position during a run live in [`FleetState`](crate::fleet::FleetState).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    /// Free-form type label, e.g. "heavy truck" or "transport helicopter".
    pub vehicle_type: String,
    pub mode: TransportMode,
    pub capacity_tons: f64,
    pub max_range_km: f64,
    /// Cruise speed; defaulted per mode when absent or non-positive.
    #[serde(default)]
    pub speed_kmh: Option<f64>,
    /// Supply point the vehicle is stationed at.
    pub home_base: String,
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn cruise_speed_kmh(&self) -> f64 {
        match self.speed_kmh {
            Some(speed) if speed.is_finite() && speed > 0.0 => speed,
            _ => self.mode.default_speed_kmh(),
        }
    }
}

// ========== THREAT ZONES ==========

/// Graded hazard severity. Ordering follows severity, so `High` sorts highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatLevel::Low => write!(f, "low"),
            ThreatLevel::Medium => write!(f, "medium"),
            ThreatLevel::High => write!(f, "high"),
        }
    }
}

/// Geographic extent of a threat zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneShape {
    /// Circular area around a center point.
    Circle { center: Coordinate, radius_km: f64 },
    /// Polygon vertices as [lat, lon] pairs (closed ring - first == last).
    Polygon { ring: Vec<[f64; 2]> },
}

/// A geographic region flagged as hazardous for some or all transport modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatZone {
    pub id: String,
    pub name: String,
    pub shape: ZoneShape,
    #[serde(default)]
    pub severity: ThreatLevel,
    /// Modes this zone restricts; empty = every mode.
    #[serde(default)]
    pub restricted_modes: Vec<TransportMode>,
    /// Whether the zone is currently in force.
    pub active: bool,
}

impl ThreatZone {
    /// Does this zone's restriction apply to the given transport mode?
    pub fn applies_to(&self, mode: TransportMode) -> bool {
        self.restricted_modes.is_empty() || self.restricted_modes.contains(&mode)
    }

    /// Check if a point lies inside the zone's region.
    /// Polygons use the ray casting algorithm.
    pub fn contains_point(&self, point: Coordinate) -> bool {
        match &self.shape {
            ZoneShape::Circle { center, radius_km } => {
                haversine_km(*center, point) <= *radius_km
            }
            ZoneShape::Polygon { ring } => {
                // Ray casting: count intersections with polygon edges
                let mut inside = false;
                let n = ring.len();
                if n < 3 {
                    return false;
                }

                let mut j = n - 1;
                for i in 0..n {
                    let yi = ring[i][0];
                    let xi = ring[i][1];
                    let yj = ring[j][0];
                    let xj = ring[j][1];

                    if ((yi > point.lat) != (yj > point.lat))
                        && (point.lon < (xj - xi) * (point.lat - yi) / (yj - yi) + xi)
                    {
                        inside = !inside;
                    }
                    j = i;
                }

                inside
            }
        }
    }

    /// Check if the straight segment a->b passes through the zone.
    ///
    /// Circles use exact point-to-segment distance. Polygons combine an
    /// endpoint containment check with edge intersection tests in a local
    /// plane.
    pub fn crosses_segment(&self, a: Coordinate, b: Coordinate) -> bool {
        match &self.shape {
            ZoneShape::Circle { center, radius_km } => {
                distance_to_segment_km(*center, a, b) <= *radius_km
            }
            ZoneShape::Polygon { ring } => {
                if self.contains_point(a) || self.contains_point(b) {
                    return true;
                }

                let to_xy = |lat: f64, lon: f64| -> (f64, f64) {
                    (
                        (lon - a.lon) * km_per_deg_lon(a.lat),
                        (lat - a.lat) * km_per_deg_lat(a.lat),
                    )
                };
                let leg_start = (0.0, 0.0);
                let leg_end = to_xy(b.lat, b.lon);

                ring.windows(2).any(|edge| {
                    let v1 = to_xy(edge[0][0], edge[0][1]);
                    let v2 = to_xy(edge[1][0], edge[1][1]);
                    segments_intersect_2d(leg_start, leg_end, v1, v2)
                })
            }
        }
    }

    /// Validate zone geometry.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match &self.shape {
            ZoneShape::Circle { center, radius_km } => {
                if !center.is_valid() {
                    errors.push("Circle center is not a valid coordinate".to_string());
                }
                if !radius_km.is_finite() || *radius_km <= 0.0 {
                    errors.push("Circle radius must be positive".to_string());
                }
            }
            ZoneShape::Polygon { ring } => {
                if ring.len() < 3 {
                    errors.push("Polygon must have at least 3 vertices".to_string());
                }

                // Check polygon is closed (first == last)
                if ring.len() >= 3 {
                    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                        if (first[0] - last[0]).abs() > 0.0001
                            || (first[1] - last[1]).abs() > 0.0001
                        {
                            errors.push(
                                "Polygon must be closed (first vertex must equal last)"
                                    .to_string(),
                            );
                        }
                    }
                }

                for vertex in ring {
                    let point = Coordinate {
                        lat: vertex[0],
                        lon: vertex[1],
                    };
                    if !point.is_valid() {
                        errors.push(format!(
                            "Polygon vertex [{}, {}] is not a valid coordinate",
                            vertex[0], vertex[1]
                        ));
                        break;
                    }
                }
            }
        }

        errors
    }

    /// Check if the zone geometry is valid.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ========== PLAN OUTPUT ==========

/// One point-to-point movement in a vehicle's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub from: String,
    pub to: String,
    /// Intermediate corridor stops, empty when the leg is a straight line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<String>,
    pub distance_km: f64,
    pub transit_hours: f64,
    /// Tonnage dropped at `to` (zero for return legs).
    pub delivered_tons: f64,
    /// Set when the leg was forced through a zone that should be avoided.
    pub threat_crossed: bool,
}

/// Full ordered mission for one vehicle in a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub mode: TransportMode,
    pub legs: Vec<Leg>,
    pub total_distance_km: f64,
    pub total_delivered_tons: f64,
    pub total_transit_hours: f64,
    /// Worst severity among zones the route actually passes through.
    pub threat_exposure: ThreatLevel,
}

impl Route {
    /// Destination ids this route delivers to, in visit order.
    pub fn served_destinations(&self) -> Vec<&str> {
        self.legs
            .iter()
            .filter(|leg| leg.delivered_tons > 0.0)
            .map(|leg| leg.to.as_str())
            .collect()
    }
}

/// Why a destination could not be (fully) served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnservedReason {
    /// No vehicle could reach the destination within its remaining range.
    OutOfRange,
    /// Vehicles could reach it but had no cargo capacity left.
    CapacityExhausted,
    /// No mode-appropriate vehicle exists in the run at all.
    NoVehicleAvailable,
}

impl std::fmt::Display for UnservedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnservedReason::OutOfRange => write!(f, "out_of_range"),
            UnservedReason::CapacityExhausted => write!(f, "capacity_exhausted"),
            UnservedReason::NoVehicleAvailable => write!(f, "no_vehicle_available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnservedDestination {
    pub destination_id: String,
    pub reason: UnservedReason,
    /// Tonnage still undelivered. Less than the original request when a
    /// partial delivery succeeded first.
    pub remaining_tons: f64,
}

/// Aggregate numbers for one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_routes: usize,
    pub total_distance_km: f64,
    pub total_delivered_tons: f64,
    pub destinations_served: usize,
    pub destinations_unserved: usize,
    pub threat_crossed_legs: usize,
    pub avg_route_distance_km: f64,
}

/// Output of a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    pub routes: Vec<Route>,
    pub unserved: Vec<UnservedDestination>,
    pub summary: PlanSummary,
    pub planned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate { lat: 45.0, lon: -120.0 }.is_valid());
        assert!(Coordinate { lat: -90.0, lon: 180.0 }.is_valid());
        assert!(!Coordinate { lat: 90.5, lon: 0.0 }.is_valid());
        assert!(!Coordinate { lat: 0.0, lon: -180.1 }.is_valid());
        assert!(!Coordinate { lat: f64::NAN, lon: 0.0 }.is_valid());
    }

    #[test]
    fn manifest_totals() {
        let manifest = Manifest::of(&[
            (CargoClass::Food, 3.0),
            (CargoClass::Ammo, 2.5),
            (CargoClass::Food, 1.0),
        ]);
        assert!((manifest.total_tons() - 6.5).abs() < 1e-9);
        assert!(!manifest.is_empty());
        assert!(Manifest::new().is_empty());
    }

    #[test]
    fn priority_ordering_follows_urgency() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(ThreatLevel::High > ThreatLevel::Medium);
    }

    #[test]
    fn cruise_speed_falls_back_to_mode_default() {
        let mut vehicle = Vehicle {
            id: "v1".to_string(),
            vehicle_type: "truck".to_string(),
            mode: TransportMode::Ground,
            capacity_tons: 10.0,
            max_range_km: 500.0,
            speed_kmh: None,
            home_base: "base".to_string(),
            status: VehicleStatus::Available,
        };
        assert_eq!(vehicle.cruise_speed_kmh(), 80.0);
        vehicle.speed_kmh = Some(65.0);
        assert_eq!(vehicle.cruise_speed_kmh(), 65.0);
        vehicle.speed_kmh = Some(0.0);
        assert_eq!(vehicle.cruise_speed_kmh(), 80.0);
    }

    fn circle_zone(lat: f64, lon: f64, radius_km: f64) -> ThreatZone {
        ThreatZone {
            id: "z1".to_string(),
            name: "test zone".to_string(),
            shape: ZoneShape::Circle {
                center: Coordinate { lat, lon },
                radius_km,
            },
            severity: ThreatLevel::High,
            restricted_modes: Vec::new(),
            active: true,
        }
    }

    #[test]
    fn circle_zone_contains_and_crossings() {
        let zone = circle_zone(0.0, 0.5, 20.0);
        assert!(zone.contains_point(Coordinate { lat: 0.0, lon: 0.5 }));
        assert!(!zone.contains_point(Coordinate { lat: 0.0, lon: 0.0 }));

        // Segment passes straight through the center.
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 1.0 };
        assert!(zone.crosses_segment(a, b));

        // Parallel segment well clear of the zone.
        let c = Coordinate { lat: 1.0, lon: 0.0 };
        let d = Coordinate { lat: 1.0, lon: 1.0 };
        assert!(!zone.crosses_segment(c, d));
    }

    #[test]
    fn polygon_zone_crossing_detected_without_endpoints_inside() {
        // A thin strip across the leg's path; both leg endpoints lie outside.
        let zone = ThreatZone {
            id: "strip".to_string(),
            name: "strip".to_string(),
            shape: ZoneShape::Polygon {
                ring: vec![
                    [-0.5, 0.49],
                    [0.5, 0.49],
                    [0.5, 0.51],
                    [-0.5, 0.51],
                    [-0.5, 0.49],
                ],
            },
            severity: ThreatLevel::High,
            restricted_modes: Vec::new(),
            active: true,
        };
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 1.0 };
        assert!(zone.contains_point(Coordinate { lat: 0.0, lon: 0.5 }));
        assert!(zone.crosses_segment(a, b));
        assert!(!zone.crosses_segment(
            Coordinate { lat: 2.0, lon: 0.0 },
            Coordinate { lat: 2.0, lon: 1.0 }
        ));
    }

    #[test]
    fn zone_validation_rejects_degenerate_shapes() {
        let open_ring = ThreatZone {
            id: "p1".to_string(),
            name: "open".to_string(),
            shape: ZoneShape::Polygon {
                ring: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            },
            severity: ThreatLevel::Low,
            restricted_modes: Vec::new(),
            active: true,
        };
        assert!(!open_ring.is_valid());

        let bad_radius = circle_zone(0.0, 0.0, -5.0);
        assert!(!bad_radius.is_valid());

        let ok = circle_zone(10.0, 10.0, 5.0);
        assert!(ok.is_valid());
    }

    #[test]
    fn mode_filter_on_zones() {
        let mut zone = circle_zone(0.0, 0.0, 10.0);
        zone.restricted_modes = vec![TransportMode::Ground];
        assert!(zone.applies_to(TransportMode::Ground));
        assert!(!zone.applies_to(TransportMode::Air));

        zone.restricted_modes.clear();
        assert!(zone.applies_to(TransportMode::Air));
    }

    #[test]
    fn wire_names_for_reason_codes() {
        let reasons = vec![
            UnservedReason::OutOfRange,
            UnservedReason::CapacityExhausted,
            UnservedReason::NoVehicleAvailable,
        ];
        let json = serde_json::to_string(&reasons).unwrap();
        assert_eq!(
            json,
            r#"["out_of_range","capacity_exhausted","no_vehicle_available"]"#
        );
    }

    #[test]
    fn manifest_serializes_with_class_keys() {
        let manifest = Manifest::of(&[(CargoClass::Fuel, 4.0), (CargoClass::Medical, 1.5)]);
        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(json, r#"{"quantities":{"fuel":4.0,"medical":1.5}}"#);
    }
}
