//! Typed errors for planner construction and route validation.

use thiserror::Error;

/// Errors surfaced by [`Planner`](crate::assembler::Planner) construction and
/// by the route validator.
///
/// A destination that no vehicle can serve is NOT an error; it is reported in
/// the plan output with an [`UnservedReason`](crate::models::UnservedReason).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Latitude/longitude outside valid ranges, or non-finite.
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The same identifier was used for two locations or two vehicles.
    #[error("duplicate identifier '{id}'")]
    DuplicateId { id: String },

    /// A vehicle is stationed at a supply point that does not exist.
    #[error("vehicle '{vehicle}' is stationed at unknown supply point '{base}'")]
    UnknownHomeBase { vehicle: String, base: String },

    /// A corridor references a location that is neither a supply point nor a
    /// destination.
    #[error("corridor endpoint '{location}' is not a known location")]
    UnknownCorridorEndpoint { location: String },

    /// Degenerate threat zone geometry.
    #[error("threat zone '{zone}' is invalid: {reason}")]
    InvalidZone { zone: String, reason: String },

    /// Malformed numeric input (negative tonnage, non-finite range, ...).
    #[error("invalid input for {entity}: {reason}")]
    InvalidInput { entity: String, reason: String },

    /// A finished route travels further than its vehicle's maximum range.
    /// Raised by the validator only; it means the assembler has a defect.
    #[error(
        "route for vehicle '{vehicle}' travels {traveled_km:.1} km, \
         exceeding its range of {max_range_km:.1} km"
    )]
    RangeViolation {
        vehicle: String,
        traveled_km: f64,
        max_range_km: f64,
        /// Destinations that would have gone unshipped.
        destinations: Vec<String>,
    },

    /// A finished route delivers more than its vehicle can carry.
    /// Raised by the validator only; it means the assembler has a defect.
    #[error(
        "route for vehicle '{vehicle}' delivers {delivered_tons:.1} t, \
         exceeding its capacity of {capacity_tons:.1} t"
    )]
    CapacityViolation {
        vehicle: String,
        delivered_tons: f64,
        capacity_tons: f64,
        destinations: Vec<String>,
    },

    /// A leg crosses a zone that should have been avoided but does not carry
    /// the threat-crossed flag.
    #[error("route for vehicle '{vehicle}' crosses zone '{zone}' on the leg to '{to}' without a threat flag")]
    UnflaggedThreatCrossing {
        vehicle: String,
        zone: String,
        to: String,
    },

    /// A leg does not start where the previous one ended.
    #[error("route for vehicle '{vehicle}' is discontinuous at '{at}'")]
    DiscontinuousRoute { vehicle: String, at: String },
}
