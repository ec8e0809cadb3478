pub mod assembler;
pub mod candidates;
pub mod error;
pub mod fleet;
pub mod models;
pub mod network;
pub mod policy;
pub mod spatial;
pub mod threat;
pub mod validator;

pub use assembler::Planner;
pub use candidates::{feasible_next, CandidateLeg, FeasibleSet};
pub use error::PlanError;
pub use fleet::{mode_compatible, FleetState, LocationInfo, Locations, VehicleRun};
pub use models::{
    CargoClass, Coordinate, Destination, Leg, Manifest, PlanResult, PlanSummary, Priority,
    Route, SupplyPoint, ThreatLevel, ThreatZone, TransportMode, UnservedDestination,
    UnservedReason, Vehicle, VehicleStatus, ZoneShape,
};
pub use network::{Corridor, CorridorNetwork, CorridorPath};
pub use policy::{PlannerPolicy, TieBreak};
pub use spatial::haversine_km;
pub use validator::check_route;
