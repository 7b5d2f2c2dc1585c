//! Parallel sweep-line generation.
//!
//! Emits a family of lines perpendicular to the requested sweep direction,
//! clips each against the survey ring, and fills the surviving chords with
//! evenly spaced waypoints. Candidate lines are independent, so the family
//! is generated with a parallel map.

use rayon::prelude::*;

use crate::cache::{self, CachedRing};
use crate::models::LatLng;
use crate::spatial;

/// Chords are pulled inward by this fraction at both ends before the strict
/// containment check, keeping waypoints off numerically fuzzy boundaries.
const CHORD_SHRINK_RATIO: f64 = 0.02;

/// A clipped sweep line: an ordered run of in-ring waypoints.
pub type SweepLine = Vec<LatLng>;

/// Strict containment for a flight leg: both endpoints inside, interior
/// samples inside, and no boundary edge touched. The sampling catches
/// concave rings where the endpoints alone would mislead.
pub fn leg_strictly_inside(ring: &CachedRing, a: LatLng, b: LatLng) -> bool {
    if !ring.contains(a) || !ring.contains(b) {
        return false;
    }

    let length_m = cache::distance(a, b);
    let samples = ((length_m / 100.0) as usize).clamp(2, 8);
    for i in 1..=samples {
        let t = i as f64 / (samples + 1) as f64;
        if !ring.contains(spatial::interpolate(a, b, t)) {
            return false;
        }
    }

    !ring.crosses_boundary(a, b)
}

/// Generate the ordered family of clipped sweep lines for one direction.
///
/// Lines sit at multiples of `line_spacing_m` perpendicular to
/// `direction_rad`, anchored on `anchor`, and are extended far past the
/// ring bounds before clipping. If fewer than 3 lines survive, a fallback
/// family rotated 90 degrees at half spacing is appended.
pub fn generate_parallel_lines(
    ring: &CachedRing,
    anchor: LatLng,
    direction_rad: f64,
    line_spacing_m: f64,
    point_spacing_m: f64,
) -> Vec<SweepLine> {
    let (min_corner, max_corner) = ring.bounds();
    let max_dimension = cache::distance(min_corner, max_corner);
    let centroid = ring.centroid();
    let perp_rad = direction_rad + std::f64::consts::FRAC_PI_2;

    let half_count = ((max_dimension / line_spacing_m) + 10.0).clamp(20.0, 100.0) as i32;

    let mut lines: Vec<SweepLine> = (-half_count..=half_count)
        .into_par_iter()
        .map(|k| {
            let origin =
                spatial::offset_by_bearing(anchor, perp_rad, k as f64 * line_spacing_m);
            let line_start =
                spatial::offset_by_bearing(origin, direction_rad, -2.0 * max_dimension);
            let line_end =
                spatial::offset_by_bearing(line_start, direction_rad, 4.0 * max_dimension);
            clipped_line_points(ring, line_start, line_end, point_spacing_m, centroid)
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 3 {
        // Sparse yield, usually a thin sliver of a polygon. Try the
        // perpendicular orientation at half spacing.
        let fallback_dir = perp_rad;
        let fallback_perp = fallback_dir + std::f64::consts::FRAC_PI_2;
        for k in -20..=20 {
            let origin = spatial::offset_by_bearing(
                anchor,
                fallback_perp,
                k as f64 * line_spacing_m * 0.5,
            );
            let line_start =
                spatial::offset_by_bearing(origin, fallback_dir, -2.0 * max_dimension);
            let line_end =
                spatial::offset_by_bearing(line_start, fallback_dir, 4.0 * max_dimension);
            let line = clipped_line_points(ring, line_start, line_end, point_spacing_m, centroid);
            if !line.is_empty() {
                lines.push(line);
            }
        }
    }

    lines
}

/// Clip one infinite-ish line against the ring and fill each resulting
/// chord with waypoints at `point_spacing_m`.
pub fn clipped_line_points(
    ring: &CachedRing,
    line_start: LatLng,
    line_end: LatLng,
    point_spacing_m: f64,
    centroid: LatLng,
) -> SweepLine {
    let crossings = ring.crossings(line_start, line_end);
    if crossings.len() < 2 {
        return Vec::new();
    }

    // Dedupe coincident crossings (vertex hits produce doubles) and sort
    // along the sweep direction.
    let mut unique: Vec<LatLng> = Vec::with_capacity(crossings.len());
    let mut seen: Vec<(i64, i64)> = Vec::with_capacity(crossings.len());
    for p in crossings {
        let key = ((p.lat * 1e8).round() as i64, (p.lng * 1e8).round() as i64);
        if !seen.contains(&key) {
            seen.push(key);
            unique.push(p);
        }
    }
    let mut keyed: Vec<(f64, LatLng)> = unique
        .into_iter()
        .map(|p| (cache::distance(line_start, p), p))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut points = Vec::new();
    let mut i = 0;
    while i + 1 < keyed.len() {
        let chord_start = keyed[i].1;
        let chord_end = keyed[i + 1].1;
        i += 2;

        let adjusted_start = spatial::interpolate(chord_start, chord_end, CHORD_SHRINK_RATIO);
        let adjusted_end = spatial::interpolate(chord_end, chord_start, CHORD_SHRINK_RATIO);

        if !leg_strictly_inside(ring, adjusted_start, adjusted_end) {
            continue;
        }

        let chord_length = cache::distance(adjusted_start, adjusted_end);
        let count = ((chord_length / point_spacing_m).ceil() as usize + 1).max(2);

        let mut segment: Vec<LatLng> = Vec::with_capacity(count);
        for j in 0..count {
            let t = j as f64 / (count - 1) as f64;
            let candidate = spatial::interpolate(adjusted_start, adjusted_end, t);
            if !ring.contains(candidate) {
                continue;
            }

            match segment.last().copied() {
                None => segment.push(candidate),
                Some(last) => {
                    if leg_strictly_inside(ring, last, candidate) {
                        segment.push(candidate);
                    } else if let Some(rescue) = rescue_point(ring, last, candidate, centroid) {
                        segment.push(rescue);
                        if leg_strictly_inside(ring, rescue, candidate) {
                            segment.push(candidate);
                        }
                    }
                }
            }
        }

        // A chord is only usable when every consecutive leg is clean.
        let continuous = segment
            .windows(2)
            .all(|pair| leg_strictly_inside(ring, pair[0], pair[1]));
        if continuous && segment.len() >= 2 {
            points.extend(segment);
        }
    }

    points
}

/// One-shot midpoint rescue for a failed consecutive pair: take the
/// midpoint, nudge it 10% toward the centroid, and accept it only when the
/// leg from `last` stays strictly inside.
fn rescue_point(
    ring: &CachedRing,
    last: LatLng,
    candidate: LatLng,
    centroid: LatLng,
) -> Option<LatLng> {
    let midpoint = spatial::interpolate(last, candidate, 0.5);
    if !ring.contains(midpoint) {
        return None;
    }
    let nudged = spatial::interpolate(midpoint, centroid, 0.1);
    let point = if ring.contains(nudged) { nudged } else { midpoint };
    leg_strictly_inside(ring, last, point).then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_100m() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.000898, 0.0),
            LatLng::new(0.000898, 0.000898),
            LatLng::new(0.0, 0.000898),
        ]
    }

    #[test]
    fn generates_interior_lines_for_square() {
        let ring_points = square_100m();
        let ring = CachedRing::new(&ring_points);
        let anchor = LatLng::new(0.000449, 0.000449);
        let lines = generate_parallel_lines(&ring, anchor, 0.0, 10.0, 10.0);

        assert!(lines.len() >= 8, "expected a dense family, got {}", lines.len());
        for line in &lines {
            assert!(line.len() >= 2);
            for p in line {
                assert!(ring.contains(*p), "waypoint escaped the ring: {p:?}");
            }
        }
    }

    #[test]
    fn line_waypoints_respect_point_spacing() {
        let ring_points = square_100m();
        let ring = CachedRing::new(&ring_points);
        let anchor = LatLng::new(0.000449, 0.000449);
        let lines = generate_parallel_lines(&ring, anchor, 0.0, 10.0, 10.0);

        for line in &lines {
            for pair in line.windows(2) {
                let d = cache::distance(pair[0], pair[1]);
                assert!(d < 12.0, "along-track spacing too wide: {d}");
            }
        }
    }

    #[test]
    fn strict_leg_rejects_boundary_crossing() {
        // L-shape: the leg between the arm tips cuts through the notch.
        let ring_points = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 0.0018),
            LatLng::new(0.0009, 0.0018),
            LatLng::new(0.0009, 0.0009),
            LatLng::new(0.0018, 0.0009),
            LatLng::new(0.0018, 0.0),
        ];
        let ring = CachedRing::new(&ring_points);

        let west_arm = LatLng::new(0.0016, 0.0004);
        let east_arm = LatLng::new(0.0004, 0.0016);
        assert!(ring.contains(west_arm));
        assert!(ring.contains(east_arm));
        assert!(!leg_strictly_inside(&ring, west_arm, east_arm));

        let safe_a = LatLng::new(0.0002, 0.0002);
        let safe_b = LatLng::new(0.0002, 0.0016);
        assert!(leg_strictly_inside(&ring, safe_a, safe_b));
    }

    #[test]
    fn no_lines_for_disjoint_chord() {
        let ring_points = square_100m();
        let ring = CachedRing::new(&ring_points);
        let centroid = ring.centroid();
        let far_start = LatLng::new(0.01, -0.001);
        let far_end = LatLng::new(0.01, 0.002);
        assert!(clipped_line_points(&ring, far_start, far_end, 10.0, centroid).is_empty());
    }
}
