//! Pre-defined supply theaters for planning demos.

use convoy_core::{
    CargoClass, Coordinate, Corridor, Destination, Manifest, PlanError, Planner, PlannerPolicy,
    Priority, SupplyPoint, ThreatLevel, ThreatZone, TransportMode, Vehicle, VehicleStatus,
    ZoneShape,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A named theater: everything one planning run needs.
pub struct Scenario {
    pub name: String,
    pub supply_points: Vec<SupplyPoint>,
    pub destinations: Vec<Destination>,
    pub vehicles: Vec<Vehicle>,
    pub zones: Vec<ThreatZone>,
    pub corridors: Vec<Corridor>,
}

impl Scenario {
    pub fn into_planner(self, policy: PlannerPolicy) -> Result<Planner, PlanError> {
        Planner::new(
            self.supply_points,
            self.destinations,
            self.vehicles,
            self.zones,
            self.corridors,
            policy,
        )
    }
}

fn supply(
    id: &str,
    name: &str,
    lat: f64,
    lon: f64,
    region: &str,
    inventory: Manifest,
    has_airstrip: bool,
    has_port: bool,
) -> SupplyPoint {
    SupplyPoint {
        id: id.to_string(),
        name: name.to_string(),
        position: Coordinate { lat, lon },
        region: Some(region.to_string()),
        inventory,
        has_airstrip,
        has_port,
    }
}

#[allow(clippy::too_many_arguments)]
fn destination(
    id: &str,
    name: &str,
    lat: f64,
    lon: f64,
    region: &str,
    priority: Priority,
    demand: Manifest,
    has_airstrip: bool,
    has_port: bool,
) -> Destination {
    Destination {
        id: id.to_string(),
        name: name.to_string(),
        position: Coordinate { lat, lon },
        region: Some(region.to_string()),
        priority,
        demand,
        has_airstrip,
        has_port,
    }
}

fn vehicle(
    id: &str,
    vehicle_type: &str,
    mode: TransportMode,
    capacity_tons: f64,
    max_range_km: f64,
    home_base: &str,
) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        vehicle_type: vehicle_type.to_string(),
        mode,
        capacity_tons,
        max_range_km,
        speed_kmh: None,
        home_base: home_base.to_string(),
        status: VehicleStatus::Available,
    }
}

fn corridor(a: &str, b: &str, distance_km: f64) -> Corridor {
    Corridor {
        a: a.to_string(),
        b: b.to_string(),
        distance_km,
    }
}

/// Mountain resupply theater in high desert terrain.
///
/// - Two depots, the northern one with an airstrip
/// - Five destinations spread over ridgelines and valleys
/// - A ground-only ambush zone on the main pass, a medium contested basin
/// - Surveyed road corridors that run longer than the crow flies
pub fn create_mountain_theater() -> Scenario {
    let supply_points = vec![
        supply(
            "depot-north",
            "North Depot",
            35.6,
            -106.0,
            "north range",
            Manifest::of(&[
                (CargoClass::Food, 120.0),
                (CargoClass::Ammo, 60.0),
                (CargoClass::Medical, 25.0),
            ]),
            true,
            false,
        ),
        supply(
            "depot-south",
            "South Depot",
            34.4,
            -106.3,
            "south valley",
            Manifest::of(&[(CargoClass::Food, 80.0), (CargoClass::Fuel, 90.0)]),
            false,
            false,
        ),
    ];

    let destinations = vec![
        destination(
            "ridge-post",
            "Ridge Observation Post",
            35.2,
            -105.4,
            "north range",
            Priority::High,
            Manifest::of(&[(CargoClass::Ammo, 5.0), (CargoClass::Food, 3.0)]),
            false,
            false,
        ),
        destination(
            "mountain-clinic",
            "Mountain Clinic",
            35.9,
            -105.7,
            "north range",
            Priority::Critical,
            Manifest::of(&[(CargoClass::Medical, 3.0)]),
            false,
            false,
        ),
        destination(
            "valley-camp",
            "Valley Camp",
            34.8,
            -105.9,
            "south valley",
            Priority::Normal,
            Manifest::of(&[(CargoClass::Food, 8.0), (CargoClass::Fuel, 4.0)]),
            false,
            false,
        ),
        destination(
            "remote-station",
            "Remote Relay Station",
            34.2,
            -104.9,
            "east basin",
            Priority::Normal,
            Manifest::of(&[(CargoClass::Food, 6.0)]),
            false,
            false,
        ),
        destination(
            "airfield-east",
            "East Airfield",
            35.1,
            -104.6,
            "east basin",
            Priority::High,
            Manifest::of(&[
                (CargoClass::Ammo, 2.0),
                (CargoClass::Medical, 1.0),
                (CargoClass::Food, 2.0),
            ]),
            true,
            false,
        ),
    ];

    let vehicles = vec![
        vehicle("truck-1", "heavy truck", TransportMode::Ground, 12.0, 600.0, "depot-north"),
        vehicle("truck-2", "utility truck", TransportMode::Ground, 8.0, 110.0, "depot-south"),
        vehicle(
            "heli-1",
            "transport helicopter",
            TransportMode::Air,
            3.0,
            800.0,
            "depot-north",
        ),
    ];

    let zones = vec![
        ThreatZone {
            id: "pass-ambush".to_string(),
            name: "Ambush reports on the main pass".to_string(),
            shape: ZoneShape::Circle {
                center: Coordinate { lat: 35.38, lon: -105.68 },
                radius_km: 20.0,
            },
            severity: ThreatLevel::High,
            restricted_modes: vec![TransportMode::Ground],
            active: true,
        },
        ThreatZone {
            id: "contested-basin".to_string(),
            name: "Contested eastern basin".to_string(),
            shape: ZoneShape::Polygon {
                ring: vec![
                    [34.0, -105.6],
                    [34.7, -105.6],
                    [34.7, -104.7],
                    [34.0, -104.7],
                    [34.0, -105.6],
                ],
            },
            severity: ThreatLevel::Medium,
            restricted_modes: Vec::new(),
            active: true,
        },
    ];

    let corridors = vec![
        corridor("depot-north", "ridge-post", 95.0),
        corridor("ridge-post", "airfield-east", 88.0),
        corridor("depot-south", "valley-camp", 68.0),
        corridor("valley-camp", "remote-station", 145.0),
    ];

    Scenario {
        name: "mountain".to_string(),
        supply_points,
        destinations,
        vehicles,
        zones,
        corridors,
    }
}

/// Coastal theater with a mixed ground, air, and water fleet.
///
/// - A main port with airstrip and an inland depot
/// - Island and shoreline destinations reachable only by water or air
/// - A mined strait that restricts watercraft
pub fn create_coastal_theater() -> Scenario {
    let supply_points = vec![
        supply(
            "port-main",
            "Main Port",
            30.3,
            -89.1,
            "coast",
            Manifest::of(&[
                (CargoClass::Food, 200.0),
                (CargoClass::Fuel, 150.0),
                (CargoClass::Medical, 40.0),
            ]),
            true,
            true,
        ),
        supply(
            "depot-inland",
            "Inland Depot",
            30.8,
            -89.5,
            "interior",
            Manifest::of(&[(CargoClass::Food, 90.0), (CargoClass::Ammo, 45.0)]),
            false,
            false,
        ),
    ];

    let destinations = vec![
        destination(
            "island-relay",
            "Island Relay",
            29.9,
            -88.6,
            "gulf",
            Priority::High,
            Manifest::of(&[(CargoClass::Food, 10.0), (CargoClass::Fuel, 5.0)]),
            false,
            true,
        ),
        destination(
            "coast-watch",
            "Coast Watch Station",
            30.1,
            -88.9,
            "coast",
            Priority::Normal,
            Manifest::of(&[(CargoClass::Food, 4.0)]),
            false,
            true,
        ),
        destination(
            "forward-strip",
            "Forward Airstrip",
            30.5,
            -88.7,
            "coast",
            Priority::Critical,
            Manifest::of(&[(CargoClass::Medical, 2.0)]),
            true,
            false,
        ),
        destination(
            "bayou-camp",
            "Bayou Camp",
            30.7,
            -89.0,
            "interior",
            Priority::Normal,
            Manifest::of(&[(CargoClass::Food, 6.0), (CargoClass::Ammo, 3.0)]),
            false,
            false,
        ),
    ];

    let vehicles = vec![
        vehicle("barge-1", "supply barge", TransportMode::Water, 40.0, 300.0, "port-main"),
        vehicle("truck-7", "cargo truck", TransportMode::Ground, 10.0, 400.0, "depot-inland"),
        vehicle(
            "heli-2",
            "transport helicopter",
            TransportMode::Air,
            3.0,
            700.0,
            "port-main",
        ),
    ];

    let zones = vec![ThreatZone {
        id: "strait-mines".to_string(),
        name: "Mined strait".to_string(),
        shape: ZoneShape::Circle {
            center: Coordinate { lat: 30.1, lon: -88.75 },
            radius_km: 15.0,
        },
        severity: ThreatLevel::High,
        restricted_modes: vec![TransportMode::Water],
        active: true,
    }];

    let corridors = vec![
        corridor("depot-inland", "bayou-camp", 42.0),
        corridor("port-main", "bayou-camp", 95.0),
    ];

    Scenario {
        name: "coastal".to_string(),
        supply_points,
        destinations,
        vehicles,
        zones,
        corridors,
    }
}

/// Randomized theater inside a ~200 km box.
///
/// Mixed priorities and demands, a ground fleet, and sometimes a hot zone.
/// The same seed always builds the same theater.
pub fn create_random_theater(seed: u64) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);

    let supply_count = rng.random_range(1..=3);
    let mut supply_points = Vec::new();
    for i in 0..supply_count {
        supply_points.push(supply(
            &format!("depot-{}", i),
            &format!("Depot {}", i),
            rng.random_range(34.0..36.0),
            rng.random_range(-107.0..-105.0),
            "random",
            Manifest::of(&[(CargoClass::Food, 500.0)]),
            false,
            false,
        ));
    }

    let classes = [
        CargoClass::Food,
        CargoClass::Ammo,
        CargoClass::Fuel,
        CargoClass::Medical,
    ];
    let priorities = [Priority::Normal, Priority::High, Priority::Critical];
    let mut destinations = Vec::new();
    for i in 0..rng.random_range(3..=10) {
        let class = classes[rng.random_range(0..classes.len())];
        destinations.push(destination(
            &format!("site-{}", i),
            &format!("Site {}", i),
            rng.random_range(34.0..36.0),
            rng.random_range(-107.0..-105.0),
            "random",
            priorities[rng.random_range(0..priorities.len())],
            Manifest::of(&[(class, rng.random_range(1.0..25.0))]),
            false,
            false,
        ));
    }

    let mut vehicles = Vec::new();
    for i in 0..rng.random_range(2..=6) {
        let home = rng.random_range(0..supply_count);
        vehicles.push(vehicle(
            &format!("truck-{}", i),
            "cargo truck",
            TransportMode::Ground,
            rng.random_range(4.0..20.0),
            rng.random_range(150.0..800.0),
            &format!("depot-{}", home),
        ));
    }

    let severities = [ThreatLevel::Low, ThreatLevel::Medium, ThreatLevel::High];
    let mut zones = Vec::new();
    for i in 0..rng.random_range(0..=2) {
        zones.push(ThreatZone {
            id: format!("zone-{}", i),
            name: format!("Zone {}", i),
            shape: ZoneShape::Circle {
                center: Coordinate {
                    lat: rng.random_range(34.0..36.0),
                    lon: rng.random_range(-107.0..-105.0),
                },
                radius_km: rng.random_range(10.0..60.0),
            },
            severity: severities[rng.random_range(0..severities.len())],
            restricted_modes: Vec::new(),
            active: true,
        });
    }

    Scenario {
        name: format!("random-{}", seed),
        supply_points,
        destinations,
        vehicles,
        zones,
        corridors: Vec::new(),
    }
}
