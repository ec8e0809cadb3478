//! Supply planning demo - runs the convoy planner over a built-in theater.
//!
//! Builds one of the packaged theaters (or a random one), runs a full
//! planning pass, and prints the assigned routes, the unserved backlog,
//! and the plan summary.
//!
//! Usage:
//!   cargo run -p convoy-cli --bin plan_scenario
//!   cargo run -p convoy-cli --bin plan_scenario -- --scenario coastal --round-trip
//!   cargo run -p convoy-cli --bin plan_scenario -- --scenario random --seed 42 --json

use clap::{Parser, ValueEnum};
use convoy_cli::sim::{
    create_coastal_theater, create_mountain_theater, create_random_theater, Scenario,
};
use convoy_core::{PlanResult, PlannerPolicy, ThreatLevel};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Available theaters
#[derive(Debug, Clone, ValueEnum)]
enum TheaterType {
    /// Two depots and five mountain outposts with an ambushed pass
    Mountain,
    /// Mixed ground/air/water fleet along a mined coastline
    Coastal,
    /// Seeded random theater
    Random,
}

/// Convoy supply planning demo
#[derive(Parser, Debug)]
#[command(author, version, about = "Plan supply routes for a built-in theater")]
struct Args {
    /// Theater to plan
    #[arg(long, value_enum, default_value = "mountain")]
    scenario: TheaterType,

    /// Seed for the random theater
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Treat every threat zone as tolerable (still reported as exposure)
    #[arg(long)]
    ignore_threats: bool,

    /// Require every vehicle to end its route back at its home base
    #[arg(long)]
    round_trip: bool,

    /// Print the raw plan as JSON instead of the report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("convoy_core=warn".parse()?),
        )
        .init();

    let scenario = match args.scenario {
        TheaterType::Mountain => create_mountain_theater(),
        TheaterType::Coastal => create_coastal_theater(),
        TheaterType::Random => create_random_theater(args.seed),
    };

    let mut policy = PlannerPolicy::default();
    if args.ignore_threats {
        policy.max_tolerated_threat = ThreatLevel::High;
    }
    if args.round_trip {
        policy.require_return_to_base = true;
    }

    if args.json {
        let planner = scenario.into_planner(policy)?;
        let result = planner.plan()?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║    CONVOY SUPPLY PLANNER                                      ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();

    print_theater(&scenario);

    let planner = scenario.into_planner(policy)?;
    let result = planner.plan()?;

    print_report(&result);

    Ok(())
}

fn print_theater(scenario: &Scenario) {
    println!("[THEATER] {}", scenario.name);
    println!(
        "  • {} supply points, {} destinations, {} vehicles",
        scenario.supply_points.len(),
        scenario.destinations.len(),
        scenario.vehicles.len()
    );
    println!(
        "  • {} threat zones, {} surveyed corridors",
        scenario.zones.len(),
        scenario.corridors.len()
    );
    for vehicle in &scenario.vehicles {
        println!(
            "  • {} ({}, {}): {:.1} t capacity, {:.0} km range, based at {}",
            vehicle.id,
            vehicle.vehicle_type,
            vehicle.mode,
            vehicle.capacity_tons,
            vehicle.max_range_km,
            vehicle.home_base
        );
    }
    println!();
}

fn print_report(result: &PlanResult) {
    println!("[ROUTES]");
    if result.routes.is_empty() {
        println!("  (no routes assigned)");
    }
    for route in &result.routes {
        println!(
            "  {} ({}, {}): {} legs | {:.1} km | {:.1} t | {} | exposure {}",
            route.vehicle_id,
            route.vehicle_type,
            route.mode,
            route.legs.len(),
            route.total_distance_km,
            route.total_delivered_tons,
            format_hours(route.total_transit_hours),
            route.threat_exposure
        );
        for leg in &route.legs {
            let mut line = format!(
                "    {:<14} -> {:<16} {:>7.1} km {:>6.1} t",
                leg.from, leg.to, leg.distance_km, leg.delivered_tons
            );
            if !leg.via.is_empty() {
                line.push_str(&format!("  via {}", leg.via.join(", ")));
            }
            if leg.threat_crossed {
                line.push_str("  [THREAT]");
            }
            println!("{}", line);
        }
    }
    println!();

    println!("[UNSERVED]");
    if result.unserved.is_empty() {
        println!("  (every destination fully served)");
    }
    for unserved in &result.unserved {
        println!(
            "  {}: {} ({:.1} t outstanding)",
            unserved.destination_id, unserved.reason, unserved.remaining_tons
        );
    }
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║  PLAN SUMMARY                                                 ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!("  Routes:             {}", result.summary.total_routes);
    println!("  Distance:           {:.1} km", result.summary.total_distance_km);
    println!("  Delivered:          {:.1} t", result.summary.total_delivered_tons);
    println!("  Served:             {}", result.summary.destinations_served);
    println!("  Unserved:           {}", result.summary.destinations_unserved);
    println!("  Threat crossings:   {}", result.summary.threat_crossed_legs);
    println!(
        "  Avg route distance: {:.1} km",
        result.summary.avg_route_distance_km
    );
}

fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    format!("{}h {:02}m", total_minutes / 60, total_minutes % 60)
}
