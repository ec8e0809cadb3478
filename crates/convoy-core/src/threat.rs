//! Threat zone evaluation for points and route legs.

use crate::models::{Coordinate, ThreatLevel, ThreatZone, TransportMode};

/// Returns the first zone that makes `point` off-limits for `mode`.
///
/// A zone blocks when it is active, applies to the mode, sits above the
/// caller's tolerance, and contains the point.
pub fn blocks_point<'a>(
    zones: &'a [ThreatZone],
    point: Coordinate,
    mode: TransportMode,
    tolerance: ThreatLevel,
) -> Option<&'a ThreatZone> {
    zones
        .iter()
        .find(|zone| zone.active && zone.severity > tolerance && zone.applies_to(mode) && zone.contains_point(point))
}

/// Returns the first zone that makes the straight leg `a -> b` off-limits.
pub fn blocks_leg<'a>(
    zones: &'a [ThreatZone],
    a: Coordinate,
    b: Coordinate,
    mode: TransportMode,
    tolerance: ThreatLevel,
) -> Option<&'a ThreatZone> {
    zones
        .iter()
        .find(|zone| zone.active && zone.severity > tolerance && zone.applies_to(mode) && zone.crosses_segment(a, b))
}

/// Checks every segment of a polyline path against the zone set.
pub fn blocks_path<'a>(
    zones: &'a [ThreatZone],
    points: &[Coordinate],
    mode: TransportMode,
    tolerance: ThreatLevel,
) -> Option<&'a ThreatZone> {
    points
        .windows(2)
        .find_map(|pair| blocks_leg(zones, pair[0], pair[1], mode, tolerance))
}

/// All active zones the leg passes through, regardless of severity.
pub fn crossed_zones<'a>(
    zones: &'a [ThreatZone],
    a: Coordinate,
    b: Coordinate,
    mode: TransportMode,
) -> Vec<&'a ThreatZone> {
    zones
        .iter()
        .filter(|zone| zone.active && zone.applies_to(mode) && zone.crosses_segment(a, b))
        .collect()
}

/// Highest severity among zones the leg passes through, `Low` when clear.
pub fn leg_exposure(
    zones: &[ThreatZone],
    a: Coordinate,
    b: Coordinate,
    mode: TransportMode,
) -> ThreatLevel {
    crossed_zones(zones, a, b, mode)
        .iter()
        .map(|zone| zone.severity)
        .max()
        .unwrap_or(ThreatLevel::Low)
}

/// Highest severity along a polyline path, `Low` when clear.
pub fn path_exposure(
    zones: &[ThreatZone],
    points: &[Coordinate],
    mode: TransportMode,
) -> ThreatLevel {
    points
        .windows(2)
        .map(|pair| leg_exposure(zones, pair[0], pair[1], mode))
        .max()
        .unwrap_or(ThreatLevel::Low)
}
