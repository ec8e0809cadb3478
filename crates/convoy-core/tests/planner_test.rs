//! Greedy assignment integration tests.
//!
//! Exercises the full planning flow: queue ordering, vehicle selection,
//! partial deliveries, facility gates, and unserved reporting.

use convoy_core::{
    CargoClass, Coordinate, Destination, Manifest, PlanResult, Planner, PlannerPolicy, Priority,
    SupplyPoint, TransportMode, UnservedReason, Vehicle, VehicleStatus,
};

fn make_supply(id: &str, lat: f64, lon: f64) -> SupplyPoint {
    SupplyPoint {
        id: id.to_string(),
        name: id.to_string(),
        position: Coordinate { lat, lon },
        region: None,
        inventory: Manifest::new(),
        has_airstrip: false,
        has_port: false,
    }
}

fn make_destination(id: &str, lat: f64, lon: f64, priority: Priority, tons: f64) -> Destination {
    Destination {
        id: id.to_string(),
        name: id.to_string(),
        position: Coordinate { lat, lon },
        region: None,
        priority,
        demand: Manifest::of(&[(CargoClass::Food, tons)]),
        has_airstrip: false,
        has_port: false,
    }
}

fn make_vehicle(id: &str, mode: TransportMode, capacity_tons: f64, max_range_km: f64) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        vehicle_type: match mode {
            TransportMode::Ground => "truck",
            TransportMode::Air => "helicopter",
            TransportMode::Water => "barge",
        }
        .to_string(),
        mode,
        capacity_tons,
        max_range_km,
        speed_kmh: None,
        home_base: "base".to_string(),
        status: VehicleStatus::Available,
    }
}

fn plan_simple(destinations: Vec<Destination>, vehicles: Vec<Vehicle>) -> PlanResult {
    let planner = Planner::new(
        vec![make_supply("base", 0.0, 0.0)],
        destinations,
        vehicles,
        Vec::new(),
        Vec::new(),
        PlannerPolicy::default(),
    )
    .unwrap();
    planner.plan().unwrap()
}

/// One in-range destination, one capable truck: a single full delivery.
#[test]
fn test_single_delivery_within_range() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 200.0)],
    );

    assert_eq!(result.routes.len(), 1);
    let route = &result.routes[0];
    assert_eq!(route.vehicle_id, "t1");
    assert_eq!(route.legs.len(), 1);

    let leg = &route.legs[0];
    assert_eq!(leg.from, "base");
    assert_eq!(leg.to, "fwd");
    // One degree of longitude at the equator.
    assert!((leg.distance_km - 111.19).abs() < 0.5);
    assert!((leg.transit_hours - leg.distance_km / 80.0).abs() < 1e-9);
    assert!((leg.delivered_tons - 5.0).abs() < 1e-9);
    assert!(!leg.threat_crossed);

    assert!(result.unserved.is_empty());
    assert_eq!(result.summary.total_routes, 1);
    assert_eq!(result.summary.destinations_served, 1);
    assert_eq!(result.summary.destinations_unserved, 0);
    assert_eq!(result.summary.threat_crossed_legs, 0);
    assert!((result.summary.avg_route_distance_km - route.total_distance_km).abs() < 1e-9);
}

/// The same destination with a short-legged truck goes unserved.
#[test]
fn test_out_of_range_destination() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 50.0)],
    );

    assert!(result.routes.is_empty());
    assert_eq!(result.unserved.len(), 1);
    let unserved = &result.unserved[0];
    assert_eq!(unserved.destination_id, "fwd");
    assert_eq!(unserved.reason, UnservedReason::OutOfRange);
    assert!((unserved.remaining_tons - 5.0).abs() < 1e-9);
}

/// Demand beyond the whole fleet's capacity: partial delivery plus a
/// capacity-exhausted remainder.
#[test]
fn test_partial_delivery_with_capacity_exhausted_remainder() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 20.0)],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 400.0)],
    );

    assert_eq!(result.routes.len(), 1);
    assert!((result.routes[0].total_delivered_tons - 10.0).abs() < 1e-9);

    assert_eq!(result.unserved.len(), 1);
    let unserved = &result.unserved[0];
    assert_eq!(unserved.destination_id, "fwd");
    assert_eq!(unserved.reason, UnservedReason::CapacityExhausted);
    assert!((unserved.remaining_tons - 10.0).abs() < 1e-9);

    // Partially served still counts as unserved in the summary.
    assert_eq!(result.summary.destinations_served, 0);
    assert_eq!(result.summary.destinations_unserved, 1);
}

/// A split finishes across two trucks when the fleet can cover the demand.
#[test]
fn test_split_completes_across_two_trucks() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 15.0)],
        vec![
            make_vehicle("t-a", TransportMode::Ground, 10.0, 400.0),
            make_vehicle("t-b", TransportMode::Ground, 10.0, 400.0),
        ],
    );

    assert_eq!(result.routes.len(), 2);
    assert!((result.routes[0].total_delivered_tons - 10.0).abs() < 1e-9);
    assert!((result.routes[1].total_delivered_tons - 5.0).abs() < 1e-9);
    assert!(result.unserved.is_empty());
    assert_eq!(result.summary.destinations_served, 1);
    assert!((result.summary.total_delivered_tons - 15.0).abs() < 1e-9);
}

/// No vehicles registered at all.
#[test]
fn test_empty_fleet_reports_no_vehicle_available() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        Vec::new(),
    );

    assert!(result.routes.is_empty());
    assert_eq!(result.unserved.len(), 1);
    assert_eq!(result.unserved[0].reason, UnservedReason::NoVehicleAvailable);
}

/// Vehicles out for maintenance are excluded from the run.
#[test]
fn test_unavailable_vehicles_are_skipped() {
    let mut down = make_vehicle("t1", TransportMode::Ground, 10.0, 400.0);
    down.status = VehicleStatus::Maintenance;
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![down],
    );

    assert!(result.routes.is_empty());
    assert_eq!(result.unserved[0].reason, UnservedReason::NoVehicleAvailable);
}

/// Critical demand is routed before anything else, even when that starves
/// a closer low-priority destination.
#[test]
fn test_critical_priority_served_first() {
    let result = plan_simple(
        vec![
            make_destination("near-normal", 0.0, 0.5, Priority::Normal, 5.0),
            make_destination("far-critical", 0.0, 1.5, Priority::Critical, 5.0),
        ],
        vec![make_vehicle("t1", TransportMode::Ground, 20.0, 200.0)],
    );

    assert_eq!(result.routes.len(), 1);
    let route = &result.routes[0];
    assert_eq!(route.legs.len(), 1);
    assert_eq!(route.legs[0].to, "far-critical");

    assert_eq!(result.unserved.len(), 1);
    assert_eq!(result.unserved[0].destination_id, "near-normal");
    assert_eq!(result.unserved[0].reason, UnservedReason::OutOfRange);
}

/// Equal-length legs go to the lexicographically lowest vehicle id.
#[test]
fn test_tie_broken_by_lowest_vehicle_id() {
    let result = plan_simple(
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![
            make_vehicle("t-b", TransportMode::Ground, 10.0, 400.0),
            make_vehicle("t-a", TransportMode::Ground, 10.0, 400.0),
        ],
    );

    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].vehicle_id, "t-a");
}

/// A vehicle chains onward legs from its new position, and the candidate
/// set shrinks as range burns down.
#[test]
fn test_legs_chain_from_previous_stop() {
    let result = plan_simple(
        vec![
            make_destination("alpha", 0.0, 1.0, Priority::Normal, 5.0),
            make_destination("bravo", 0.0, 2.0, Priority::Normal, 5.0),
        ],
        vec![make_vehicle("t1", TransportMode::Ground, 20.0, 250.0)],
    );

    assert_eq!(result.routes.len(), 1);
    let legs = &result.routes[0].legs;
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[0].from, "base");
    assert_eq!(legs[0].to, "alpha");
    assert_eq!(legs[1].from, "alpha");
    assert_eq!(legs[1].to, "bravo");
    assert!(result.unserved.is_empty());

    // 250 km covers base -> alpha -> bravo (~222 km) but not a third hop.
    assert!(result.routes[0].total_distance_km < 250.0);
}

/// Aircraft only fly between locations with airstrips.
#[test]
fn test_air_requires_airstrips_at_both_ends() {
    let mut base = make_supply("base", 0.0, 0.0);
    base.has_airstrip = true;
    let mut strip = make_destination("strip", 0.0, 1.0, Priority::Normal, 4.0);
    strip.has_airstrip = true;
    let field = make_destination("field", 1.0, 0.0, Priority::Normal, 4.0);

    let planner = Planner::new(
        vec![base],
        vec![strip, field],
        vec![make_vehicle("heli", TransportMode::Air, 5.0, 600.0)],
        Vec::new(),
        Vec::new(),
        PlannerPolicy::default(),
    )
    .unwrap();
    let result = planner.plan().unwrap();

    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].legs[0].to, "strip");
    // Air speed, not the ground default.
    let leg = &result.routes[0].legs[0];
    assert!((leg.transit_hours - leg.distance_km / 300.0).abs() < 1e-9);

    assert_eq!(result.unserved.len(), 1);
    assert_eq!(result.unserved[0].destination_id, "field");
    assert_eq!(result.unserved[0].reason, UnservedReason::NoVehicleAvailable);
}

/// Watercraft only sail between ports.
#[test]
fn test_water_requires_ports_at_both_ends() {
    let mut harbor = make_supply("base", 0.0, 0.0);
    harbor.has_port = true;
    let mut landing = make_destination("landing", 0.0, 1.0, Priority::Normal, 4.0);
    landing.has_port = true;
    let inland = make_destination("inland", 1.0, 0.0, Priority::Normal, 4.0);

    let planner = Planner::new(
        vec![harbor],
        vec![landing, inland],
        vec![make_vehicle("barge", TransportMode::Water, 30.0, 600.0)],
        Vec::new(),
        Vec::new(),
        PlannerPolicy::default(),
    )
    .unwrap();
    let result = planner.plan().unwrap();

    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].legs[0].to, "landing");
    assert_eq!(result.unserved.len(), 1);
    assert_eq!(result.unserved[0].destination_id, "inland");
    assert_eq!(result.unserved[0].reason, UnservedReason::NoVehicleAvailable);
}

/// With return-to-base on, the round trip must fit the range and the route
/// ends with an empty leg back home.
#[test]
fn test_return_to_base_policy() {
    let policy = PlannerPolicy {
        require_return_to_base: true,
        ..PlannerPolicy::default()
    };

    // 200 km is enough one way (~111 km) but not for the round trip.
    let planner = Planner::new(
        vec![make_supply("base", 0.0, 0.0)],
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 200.0)],
        Vec::new(),
        Vec::new(),
        policy.clone(),
    )
    .unwrap();
    let result = planner.plan().unwrap();
    assert!(result.routes.is_empty());
    assert_eq!(result.unserved[0].reason, UnservedReason::OutOfRange);

    // 250 km covers it; the final leg returns home empty.
    let planner = Planner::new(
        vec![make_supply("base", 0.0, 0.0)],
        vec![make_destination("fwd", 0.0, 1.0, Priority::Normal, 5.0)],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 250.0)],
        Vec::new(),
        Vec::new(),
        policy,
    )
    .unwrap();
    let result = planner.plan().unwrap();
    assert_eq!(result.routes.len(), 1);
    let legs = &result.routes[0].legs;
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[1].from, "fwd");
    assert_eq!(legs[1].to, "base");
    assert_eq!(legs[1].delivered_tons, 0.0);
    assert!(result.unserved.is_empty());
}

/// Destinations demanding nothing are left out of the plan entirely.
#[test]
fn test_zero_demand_destination_is_ignored() {
    let result = plan_simple(
        vec![
            make_destination("empty", 0.0, 1.0, Priority::Critical, 0.0),
            make_destination("real", 0.0, 0.5, Priority::Normal, 3.0),
        ],
        vec![make_vehicle("t1", TransportMode::Ground, 10.0, 400.0)],
    );

    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].legs[0].to, "real");
    assert!(result.unserved.is_empty());
}
