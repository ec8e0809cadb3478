//! Spatial math for leg distances and threat zone geometry.

use crate::models::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
///
/// Standard haversine formula. The asin argument is clamped into [-1, 1] so
/// coincident and antipodal points stay free of rounding error.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(-1.0, 1.0).asin()
}

/// Kilometers per degree of latitude at a given latitude (WGS84 approximation).
pub fn km_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    (111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos())
        / 1000.0
}

/// Kilometers per degree of longitude at a given latitude (WGS84 approximation).
pub fn km_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    (111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos())
        / 1000.0
}

/// Minimum distance from a point to the straight segment a->b, in kilometers.
///
/// Projects into a local east/north plane anchored at the segment start,
/// which is accurate at the leg scales the planner works with.
pub fn distance_to_segment_km(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let ref_lat = a.lat;

    // Point and segment end in local coords
    let px = (point.lon - a.lon) * km_per_deg_lon(ref_lat);
    let py = (point.lat - a.lat) * km_per_deg_lat(ref_lat);
    let sx = (b.lon - a.lon) * km_per_deg_lon(ref_lat);
    let sy = (b.lat - a.lat) * km_per_deg_lat(ref_lat);

    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < 1e-12 {
        // Segment is essentially a point
        return (px * px + py * py).sqrt();
    }

    // Project point onto segment line: t = ((P-A) . (B-A)) / |B-A|^2
    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);

    let dx = px - t * sx;
    let dy = py - t * sy;
    (dx * dx + dy * dy).sqrt()
}

pub(crate) fn segments_intersect_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    // Epsilon in kilometers. Inputs are locally-projected coordinates; the
    // tolerance absorbs floating-point error from projection and arithmetic.
    const EPS_KM: f64 = 1e-9;

    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        let min = a.min(b) - EPS_KM;
        let max = a.max(b) + EPS_KM;
        value >= min && value <= max
    }

    fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
        within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_KM && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_KM && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_KM && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_KM && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_KM && o2 < -EPS_KM) || (o1 < -EPS_KM && o2 > EPS_KM);
    let b_crosses = (o3 > EPS_KM && o4 < -EPS_KM) || (o3 < -EPS_KM && o4 > EPS_KM);
    a_crosses && b_crosses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree of latitude)
        let dist = haversine_km(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((dist - 111.19).abs() < 0.2);
    }

    #[test]
    fn test_haversine_equator_longitude_degree() {
        let dist = haversine_km(coord(0.0, 0.0), coord(0.0, 1.0));
        assert!((dist - 111.19).abs() < 0.2);
    }

    #[test]
    fn test_haversine_same_point() {
        let p = coord(33.6846, -117.8265);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = coord(35.2, -106.6);
        let b = coord(36.9, -104.4);
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_antipodal_no_nan() {
        // Antipodal points are half the Earth's circumference apart; the
        // clamped asin argument must not produce NaN here.
        let dist = haversine_km(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn test_distance_to_segment_perpendicular() {
        // Point one degree north of the midpoint of an east-west segment.
        let p = coord(1.0, 0.5);
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 1.0);
        let dist = distance_to_segment_km(p, a, b);
        // One degree of latitude in the local plane at the equator.
        assert!((dist - km_per_deg_lat(0.0)).abs() < 0.01, "got {dist}");
    }

    #[test]
    fn test_distance_to_segment_beyond_endpoint() {
        // Point past the end of the segment measures to the endpoint.
        let p = coord(0.0, 2.0);
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 1.0);
        let dist = distance_to_segment_km(p, a, b);
        let direct = haversine_km(p, b);
        assert!((dist - direct).abs() < 0.5, "got {dist} vs {direct}");
    }

    #[test]
    fn segments_intersect_detects_crossing() {
        assert!(segments_intersect_2d(
            (0.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (10.0, 0.0)
        ));
        assert!(!segments_intersect_2d(
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 5.0),
            (10.0, 5.0)
        ));
    }
}
