//! Spatial math for sweep planning: great-circle distances, bearings,
//! destination points, and planar polygon predicates on lat/lng rings.
//!
//! Rings are ordered vertex slices with an implicit closing edge. All
//! polygon predicates treat the ring as planar in degree space, which is
//! valid for survey-sized areas.

use crate::models::LatLng;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Below this coordinate delta the planar approximation is used instead of
/// the full Haversine formula (error under 1% in that regime).
const PLANAR_DELTA_DEG: f64 = 1e-4;

/// Horizontal edges within this latitude delta are skipped by the ray cast.
const HORIZONTAL_EDGE_EPS: f64 = 1e-10;

/// Great-circle distance between two points in meters.
///
/// Very close points take a flat-earth shortcut at the mean latitude, which
/// is both cheaper and accurate to well under a meter at survey scales.
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let dlat = (b.lat - a.lat).abs();
    let dlng = (b.lng - a.lng).abs();

    if dlat < PLANAR_DELTA_DEG && dlng < PLANAR_DELTA_DEG {
        let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
        let x = dlng * mean_lat.cos();
        let y = dlat;
        return (x * x + y * y).sqrt().to_radians() * EARTH_RADIUS_M;
    }

    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial course from `a` to `b` in radians, 0 = north, pi/2 = east.
pub fn bearing_rad(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let x = dlambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    x.atan2(y)
}

/// Initial course from `a` to `b` in compass degrees [0, 360).
pub fn bearing_deg(a: LatLng, b: LatLng) -> f64 {
    (bearing_rad(a, b).to_degrees() + 360.0) % 360.0
}

/// Destination point given start, bearing (radians) and distance (meters).
pub fn offset_by_bearing(origin: LatLng, bearing_rad: f64, distance_m: f64) -> LatLng {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular.sin();
    let cos_ad = angular.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lng2 = lng1 + y.atan2(x);
    lng2 = (lng2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
        - std::f64::consts::PI;

    LatLng::new(lat2.to_degrees(), lng2.to_degrees())
}

/// Linear interpolation in degree space; `t = 0` is `a`, `t = 1` is `b`.
pub fn interpolate(a: LatLng, b: LatLng, t: f64) -> LatLng {
    LatLng::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng))
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lng(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Ray-cast containment test against a ring.
///
/// Casts eastward at the query latitude. Horizontal edges are skipped and
/// the latitude interval of each edge is half-open so a crossing through a
/// shared vertex is counted exactly once.
pub fn ring_contains(ring: &[LatLng], point: LatLng) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut crossings = 0usize;
    let n = ring.len();

    for i in 0..n {
        let mut p1 = ring[i];
        let mut p2 = ring[(i + 1) % n];

        if (p1.lat - p2.lat).abs() < HORIZONTAL_EDGE_EPS {
            continue;
        }
        if p1.lat > p2.lat {
            std::mem::swap(&mut p1, &mut p2);
        }
        if point.lat < p1.lat || point.lat >= p2.lat {
            continue;
        }

        let crossing_lng = p1.lng + (point.lat - p1.lat) * (p2.lng - p1.lng) / (p2.lat - p1.lat);
        if crossing_lng > point.lng {
            crossings += 1;
        }
    }

    crossings % 2 == 1
}

fn cross(o: LatLng, a: LatLng, b: LatLng) -> f64 {
    (a.lat - o.lat) * (b.lng - o.lng) - (a.lng - o.lng) * (b.lat - o.lat)
}

fn point_on_segment_bbox(p: LatLng, q: LatLng, r: LatLng) -> bool {
    q.lat <= p.lat.max(r.lat)
        && q.lat >= p.lat.min(r.lat)
        && q.lng <= p.lng.max(r.lng)
        && q.lng >= p.lng.min(r.lng)
}

/// Whether segments `p1..q1` and `p2..q2` intersect, including collinear
/// overlap and endpoint touches.
pub fn segments_intersect(p1: LatLng, q1: LatLng, p2: LatLng, q2: LatLng) -> bool {
    let d1 = cross(p2, q2, p1);
    let d2 = cross(p2, q2, q1);
    let d3 = cross(p1, q1, p2);
    let d4 = cross(p1, q1, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    if d1 == 0.0 && point_on_segment_bbox(p2, p1, q2) {
        return true;
    }
    if d2 == 0.0 && point_on_segment_bbox(p2, q1, q2) {
        return true;
    }
    if d3 == 0.0 && point_on_segment_bbox(p1, p2, q1) {
        return true;
    }
    if d4 == 0.0 && point_on_segment_bbox(p1, q2, q1) {
        return true;
    }

    false
}

/// Intersection point of segments `a1..a2` and `b1..b2`, if any.
/// Parallel segments yield `None`.
pub fn segment_intersection(a1: LatLng, a2: LatLng, b1: LatLng, b2: LatLng) -> Option<LatLng> {
    let (x1, y1) = (a1.lng, a1.lat);
    let (x2, y2) = (a2.lng, a2.lat);
    let (x3, y3) = (b1.lng, b1.lat);
    let (x4, y4) = (b2.lng, b2.lat);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-10 {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(LatLng::new(y1 + t * (y2 - y1), x1 + t * (x2 - x1)))
    } else {
        None
    }
}

/// All crossings of segment `a..b` with the ring's edges, in edge order.
pub fn line_ring_crossings(ring: &[LatLng], a: LatLng, b: LatLng) -> Vec<LatLng> {
    let n = ring.len();
    let mut crossings = Vec::new();
    for i in 0..n {
        if let Some(hit) = segment_intersection(a, b, ring[i], ring[(i + 1) % n]) {
            crossings.push(hit);
        }
    }
    crossings
}

/// Drops an explicit closing vertex (first == last) so the rest of the
/// planner can assume the closing edge is implicit. Callers that hand over
/// GeoJSON-style closed rings otherwise leave a zero-length edge behind.
pub fn open_ring(ring: &[LatLng]) -> &[LatLng] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 3 && first == last => {
            &ring[..ring.len() - 1]
        }
        _ => ring,
    }
}

/// Axis-aligned bounds of a ring as (min corner, max corner).
pub fn ring_bounds(ring: &[LatLng]) -> (LatLng, LatLng) {
    let mut min = LatLng::new(f64::MAX, f64::MAX);
    let mut max = LatLng::new(f64::MIN, f64::MIN);
    for p in ring {
        min.lat = min.lat.min(p.lat);
        min.lng = min.lng.min(p.lng);
        max.lat = max.lat.max(p.lat);
        max.lng = max.lng.max(p.lng);
    }
    (min, max)
}

/// Unweighted vertex mean. Good enough for bridge-point guidance; not the
/// true area centroid.
pub fn ring_centroid(ring: &[LatLng]) -> LatLng {
    let mut lat = 0.0;
    let mut lng = 0.0;
    for p in ring {
        lat += p.lat;
        lng += p.lng;
    }
    let n = ring.len() as f64;
    LatLng::new(lat / n, lng / n)
}

/// Ring area in square meters via the shoelace formula, projecting each
/// vertex to local meters at its own latitude.
pub fn ring_area_m2(ring: &[LatLng]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        let x1 = p1.lng * 111_000.0 * p1.lat.to_radians().cos();
        let y1 = p1.lat * 111_000.0;
        let x2 = p2.lng * 111_000.0 * p2.lat.to_radians().cos();
        let y2 = p2.lat * 111_000.0;
        area += x1 * y2 - x2 * y1;
    }
    area.abs() / 2.0
}

/// Signed area in degree space. Positive means clockwise winding under the
/// convention used by the outward-buffering step.
pub fn ring_signed_area_deg(ring: &[LatLng]) -> f64 {
    let n = ring.len();
    let mut signed = 0.0;
    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        signed += (p2.lng - p1.lng) * (p2.lat + p1.lat);
    }
    signed
}

/// Closest point to `p` on segment `a..b`, in degree space.
pub fn closest_point_on_segment(p: LatLng, a: LatLng, b: LatLng) -> LatLng {
    let dx = b.lng - a.lng;
    let dy = b.lat - a.lat;

    if dx == 0.0 && dy == 0.0 {
        return a;
    }

    let t = ((p.lng - a.lng) * dx + (p.lat - a.lat) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    LatLng::new(a.lat + t * dy, a.lng + t * dx)
}

/// Distance in meters from `p` to segment `a..b`.
pub fn distance_to_segment_m(p: LatLng, a: LatLng, b: LatLng) -> f64 {
    haversine_distance(p, closest_point_on_segment(p, a, b))
}

/// Closest point to `p` on the ring boundary.
pub fn nearest_boundary_point(ring: &[LatLng], p: LatLng) -> LatLng {
    let n = ring.len();
    let mut best = ring[0];
    let mut best_dist = f64::MAX;
    for i in 0..n {
        let candidate = closest_point_on_segment(p, ring[i], ring[(i + 1) % n]);
        let dist = haversine_distance(p, candidate);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    best
}

/// Minimum distance in meters from `p` to any ring edge.
pub fn distance_to_ring_m(ring: &[LatLng], p: LatLng) -> f64 {
    let n = ring.len();
    let mut best = f64::MAX;
    for i in 0..n {
        best = best.min(distance_to_segment_m(p, ring[i], ring[(i + 1) % n]));
    }
    best
}
