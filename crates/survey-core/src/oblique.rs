//! Oblique multi-direction mission driver.
//!
//! Tilted-gimbal capture needs several sweep directions to photograph
//! facades from all sides. The driver picks a direction count from the
//! gimbal pitch, buffers the survey ring outward so edge structures are
//! photographed from outside, plans each direction over the buffered ring,
//! and clips the results back to what actually covers the original area.

use std::collections::HashSet;

use crate::cache::{self, CachedRing};
use crate::error::{PlanError, PlannerResult};
use crate::grid::SpatialIndex;
use crate::models::{ExpandedAreaInfo, LatLng, ObliqueParams, ObliquePlan, Route, SweepParams};
use crate::planner;
use crate::simplify;
use crate::spatial;

const FIVE_DIRECTION_OFFSETS_DEG: [f64; 5] = [0.0, 72.0, 144.0, 216.0, 288.0];

/// Below this pitch magnitude the capture is effectively nadir.
const MIN_EFFECTIVE_PITCH_DEG: f64 = 15.0;

/// Repair passes allowed per direction.
const BLOCKS_PER_DIRECTION: usize = 10;

/// Boundary sampling step for the edge-coverage estimate.
const EDGE_SAMPLE_STEP_M: f64 = 10.0;

struct DirectionSelection {
    directions: Vec<f64>,
    labels: Vec<String>,
    optimized: bool,
    rationale: String,
}

/// Plan a full oblique mission.
pub fn plan_oblique(params: &ObliqueParams) -> PlannerResult<ObliquePlan> {
    validate_oblique_inputs(params)?;
    let polygon = spatial::open_ring(&params.polygon);

    let expansion_distance_m = expansion_distance(params);
    let expanded_polygon = expand_polygon(polygon, expansion_distance_m);
    let selection = select_directions(params.main_direction_deg, params.gimbal_pitch_deg);

    let original = CachedRing::new(polygon);
    let coverage_radius = effective_coverage_radius_m(params);

    let mut routes = Vec::new();
    let mut total_distance_m = 0.0;

    for (direction_deg, label) in selection.directions.iter().zip(selection.labels.iter()) {
        let sweep_params = SweepParams {
            direction_deg: *direction_deg,
            photo_width_m: params.photo_width_m,
            photo_length_m: params.photo_length_m,
            side_overlap_pct: params.side_overlap_pct,
            forward_overlap_pct: params.forward_overlap_pct,
            flight_height_m: params.flight_height_m,
            start_point: params.start_point,
        };

        let plan = planner::plan_sweep_multi_block(
            &expanded_polygon,
            &sweep_params,
            BLOCKS_PER_DIRECTION,
            false,
        )?;
        if plan.waypoints.is_empty() {
            tracing::info!("direction {direction_deg}° produced no flyable sweep, skipping");
            continue;
        }

        let effective = filter_to_original(&original, &plan.waypoints, coverage_radius);
        if effective.is_empty() {
            tracing::info!(
                "direction {direction_deg}° covers nothing inside the survey area, skipping"
            );
            continue;
        }

        let distance_m = planner::route_distance_m(&effective);
        let waypoints = simplify::simplify_route(&effective);
        total_distance_m += distance_m;
        routes.push(Route {
            direction_deg: *direction_deg,
            gimbal_pitch_deg: params.gimbal_pitch_deg,
            waypoints,
            distance_m,
            label: label.clone(),
        });
    }

    let edge_coverage_pct = edge_coverage(
        polygon,
        &routes,
        params.photo_width_m.max(params.photo_length_m) * 0.6,
    );

    Ok(ObliquePlan {
        total_route_count: routes.len(),
        routes,
        total_distance_m,
        optimized: selection.optimized,
        rationale: selection.rationale,
        expanded_polygon,
        expansion_distance_m,
        edge_coverage_pct,
    })
}

/// Preview the outward buffering for a mission without planning routes.
pub fn expanded_area_info(params: &ObliqueParams) -> PlannerResult<ExpandedAreaInfo> {
    validate_oblique_inputs(params)?;
    let polygon = spatial::open_ring(&params.polygon);

    let expansion_distance_m = expansion_distance(params);
    let expanded_polygon = expand_polygon(polygon, expansion_distance_m);
    let original_area_m2 = spatial::ring_area_m2(polygon);
    let expanded_area_m2 = spatial::ring_area_m2(&expanded_polygon);
    let area_increase_pct = if original_area_m2 > 0.0 {
        (expanded_area_m2 - original_area_m2) / original_area_m2 * 100.0
    } else {
        0.0
    };

    Ok(ExpandedAreaInfo {
        expanded_polygon,
        expansion_distance_m,
        original_area_m2,
        expanded_area_m2,
        area_increase_pct,
    })
}

fn validate_oblique_inputs(params: &ObliqueParams) -> PlannerResult<()> {
    let sweep_equivalent = SweepParams {
        direction_deg: params.main_direction_deg,
        photo_width_m: params.photo_width_m,
        photo_length_m: params.photo_length_m,
        side_overlap_pct: params.side_overlap_pct,
        forward_overlap_pct: params.forward_overlap_pct,
        flight_height_m: params.flight_height_m,
        start_point: params.start_point,
    };
    planner::validate_sweep_inputs(&params.polygon, &sweep_equivalent)?;

    if params.gimbal_pitch_deg > 0.0 {
        return Err(PlanError::UpwardGimbalPitch {
            pitch_deg: params.gimbal_pitch_deg,
        });
    }
    Ok(())
}

/// Direction count from the pitch magnitude: near-nadir flies one sweep,
/// moderate tilt a 3-direction cross, steep tilt 4 orthogonal directions,
/// and very steep tilt the full 5-direction star.
fn select_directions(main_direction_deg: f64, gimbal_pitch_deg: f64) -> DirectionSelection {
    let pitch = gimbal_pitch_deg.abs();
    let rotated = |offset: f64| (main_direction_deg + offset) % 360.0;

    if pitch < MIN_EFFECTIVE_PITCH_DEG {
        return DirectionSelection {
            directions: vec![rotated(0.0)],
            labels: vec!["nadir sweep".to_string()],
            optimized: true,
            rationale: format!(
                "gimbal pitch {pitch:.0}° is effectively nadir; a single sweep suffices"
            ),
        };
    }

    if pitch < 30.0 {
        return DirectionSelection {
            directions: vec![rotated(0.0), rotated(90.0), rotated(180.0)],
            labels: vec![
                "main direction sweep".to_string(),
                "cross direction sweep".to_string(),
                "reverse direction sweep".to_string(),
            ],
            optimized: true,
            rationale: format!(
                "moderate gimbal pitch ({pitch:.0}°); three-direction cross pattern"
            ),
        };
    }

    if pitch < 45.0 {
        return DirectionSelection {
            directions: vec![
                rotated(0.0),
                rotated(90.0),
                rotated(180.0),
                rotated(270.0),
            ],
            labels: vec![
                "main direction sweep".to_string(),
                "orthogonal sweep".to_string(),
                "reverse direction sweep".to_string(),
                "counter-orthogonal sweep".to_string(),
            ],
            optimized: true,
            rationale: format!(
                "steep gimbal pitch ({pitch:.0}°); four orthogonal directions keep coverage"
            ),
        };
    }

    let directions: Vec<f64> = FIVE_DIRECTION_OFFSETS_DEG.iter().map(|o| rotated(*o)).collect();
    let labels = directions
        .iter()
        .enumerate()
        .map(|(i, d)| format!("oblique sweep {} ({d:.0}°)", i + 1))
        .collect();
    DirectionSelection {
        directions,
        labels,
        optimized: false,
        rationale: format!(
            "very steep gimbal pitch ({pitch:.0}°); full five-direction oblique coverage"
        ),
    }
}

/// Outward buffer distance: photo footprint base, plus the ground shift of
/// a tilted camera, damped by the overlap margin, clamped to a sane band.
fn expansion_distance(params: &ObliqueParams) -> f64 {
    let pitch = params.gimbal_pitch_deg.abs();
    let max_coverage = params.photo_width_m.max(params.photo_length_m);

    let tilt_offset = if pitch > 5.0 {
        params.flight_height_m * pitch.to_radians().tan() * 0.5
    } else {
        0.0
    };

    let min_overlap = params.side_overlap_pct.min(params.forward_overlap_pct) / 100.0;
    let overlap_factor = 1.0 - min_overlap * 0.1;

    let distance = (max_coverage * 0.6 + tilt_offset) * overlap_factor;
    distance.clamp(max_coverage * 0.3, max_coverage * 0.8 + tilt_offset)
}

/// Translate every vertex along its outward angle bisector.
///
/// Requires counter-clockwise winding; the input is re-oriented when the
/// signed-area test says otherwise. Straight or degenerate corners fall
/// back to a single edge normal.
pub fn expand_polygon(ring: &[LatLng], distance_m: f64) -> Vec<LatLng> {
    if ring.len() < 3 {
        return ring.to_vec();
    }

    let oriented = ensure_counter_clockwise(ring);
    let n = oriented.len();
    let mut expanded = Vec::with_capacity(n);

    for i in 0..n {
        let current = oriented[i];
        let prev = oriented[(i + n - 1) % n];
        let next = oriented[(i + 1) % n];

        let (normal_lat, normal_lng) = outward_bisector(prev, current, next);
        let lat_offset = distance_m * normal_lat / spatial::meters_per_deg_lat(current.lat);
        let lng_offset = distance_m * normal_lng / spatial::meters_per_deg_lng(current.lat);

        expanded.push(LatLng::new(
            current.lat + lat_offset,
            current.lng + lng_offset,
        ));
    }

    expanded
}

fn ensure_counter_clockwise(ring: &[LatLng]) -> Vec<LatLng> {
    let mut oriented = ring.to_vec();
    if spatial::ring_signed_area_deg(ring) > 0.0 {
        oriented.reverse();
    }
    oriented
}

/// Unit outward normal at a vertex: the bisector of the two adjacent edge
/// normals, each edge normal being the edge vector rotated -90° in the
/// CCW-oriented ring.
fn outward_bisector(prev: LatLng, current: LatLng, next: LatLng) -> (f64, f64) {
    let edge1 = (current.lat - prev.lat, current.lng - prev.lng);
    let edge2 = (next.lat - current.lat, next.lng - current.lng);

    let normal1 = (-edge1.1, edge1.0);
    let normal2 = (-edge2.1, edge2.0);

    let bisector = (normal1.0 + normal2.0, normal1.1 + normal2.1);
    let length = (bisector.0 * bisector.0 + bisector.1 * bisector.1).sqrt();
    if length > 1e-10 {
        return (bisector.0 / length, bisector.1 / length);
    }

    // Straight angle: the bisector vanishes, one edge normal still points
    // outward.
    let length1 = (normal1.0 * normal1.0 + normal1.1 * normal1.1).sqrt();
    if length1 > 1e-10 {
        (normal1.0 / length1, normal1.1 / length1)
    } else {
        (0.0, 0.0)
    }
}

/// Radius within which an oblique waypoint photographs the survey area,
/// shrinking with tilt and overlap but never below 40% of the base.
fn effective_coverage_radius_m(params: &ObliqueParams) -> f64 {
    let base = params.photo_width_m.max(params.photo_length_m) * 0.5;
    let tilt_factor = params.gimbal_pitch_deg.abs().to_radians().cos();
    let overlap = params.side_overlap_pct.min(params.forward_overlap_pct) / 100.0;
    let radius = base * tilt_factor * (1.0 - overlap * 0.3);
    radius.max(base * 0.4)
}

/// Keep waypoints that can photograph the original ring: inside it, or
/// within the coverage radius of its boundary. A secondary sweep restores
/// discarded waypoints that turn out to be the only cover for some
/// interior sample.
fn filter_to_original(
    original: &CachedRing,
    waypoints: &[LatLng],
    coverage_radius_m: f64,
) -> Vec<LatLng> {
    let key = |p: &LatLng| ((p.lat * 1e8).round() as i64, (p.lng * 1e8).round() as i64);

    let mut kept: Vec<LatLng> = Vec::new();
    let mut kept_keys: HashSet<(i64, i64)> = HashSet::new();
    for wp in waypoints {
        if covers_ring(original, *wp, coverage_radius_m) && kept_keys.insert(key(wp)) {
            kept.push(*wp);
        }
    }

    let kept_index = SpatialIndex::with_points(coverage_radius_m, &kept);
    let samples = interior_samples(original, coverage_radius_m * 0.5);
    let uncovered: Vec<LatLng> = samples
        .into_iter()
        .filter(|sample| !kept_index.any_within(*sample, coverage_radius_m))
        .collect();

    if !uncovered.is_empty() {
        for wp in waypoints {
            if kept_keys.contains(&key(wp)) {
                continue;
            }
            let rescues_sample = uncovered
                .iter()
                .any(|sample| cache::distance(*wp, *sample) <= coverage_radius_m);
            if rescues_sample {
                kept_keys.insert(key(wp));
                kept.push(*wp);
            }
        }
    }

    kept
}

fn covers_ring(ring: &CachedRing, point: LatLng, radius_m: f64) -> bool {
    if ring.contains(point) {
        return true;
    }

    let (min_corner, max_corner) = ring.bounds();
    let lat_margin = radius_m / 111_000.0;
    let mid_lat = (min_corner.lat + max_corner.lat) / 2.0;
    let lng_margin = radius_m / (111_000.0 * mid_lat.to_radians().cos());
    if point.lat < min_corner.lat - lat_margin
        || point.lat > max_corner.lat + lat_margin
        || point.lng < min_corner.lng - lng_margin
        || point.lng > max_corner.lng + lng_margin
    {
        return false;
    }

    spatial::distance_to_ring_m(ring.points(), point) <= radius_m
}

fn interior_samples(ring: &CachedRing, step_m: f64) -> Vec<LatLng> {
    let (min_corner, max_corner) = ring.bounds();
    let mid_lat = (min_corner.lat + max_corner.lat) / 2.0;
    let lat_step = step_m / 111_000.0;
    let lng_step = step_m / (111_000.0 * mid_lat.to_radians().cos());

    let mut samples = Vec::new();
    let mut lat = min_corner.lat;
    while lat <= max_corner.lat {
        let mut lng = min_corner.lng;
        while lng <= max_corner.lng {
            let point = LatLng::new(lat, lng);
            if ring.contains(point) {
                samples.push(point);
            }
            lng += lng_step;
        }
        lat += lat_step;
    }

    samples.extend(boundary_samples(ring.points(), step_m));
    samples
}

fn boundary_samples(ring: &[LatLng], step_m: f64) -> Vec<LatLng> {
    let n = ring.len();
    let mut samples = Vec::new();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let edge_length = cache::distance(a, b);
        let count = ((edge_length / step_m).ceil() as usize).max(1);
        for j in 0..count {
            samples.push(spatial::interpolate(a, b, j as f64 / count as f64));
        }
    }
    samples
}

/// Fraction of 10 m boundary samples within the coverage radius of any
/// flown waypoint.
fn edge_coverage(original: &[LatLng], routes: &[Route], coverage_radius_m: f64) -> f64 {
    if routes.is_empty() {
        return 0.0;
    }

    let samples = boundary_samples(original, EDGE_SAMPLE_STEP_M);
    if samples.is_empty() {
        return 100.0;
    }

    let mut flown = SpatialIndex::new(coverage_radius_m);
    for route in routes {
        for wp in &route.waypoints {
            flown.insert(*wp);
        }
    }

    let covered = samples
        .iter()
        .filter(|sample| flown.any_within(**sample, coverage_radius_m))
        .count();

    covered as f64 / samples.len() as f64 * 100.0
}

/// Rough mission duration in minutes: flight time, per-waypoint capture
/// time, and a minute of turnaround per direction change.
pub fn estimate_work_time_min(
    plan: &ObliquePlan,
    cruise_speed_mps: f64,
    photo_interval_s: f64,
) -> f64 {
    if plan.routes.is_empty() {
        return 0.0;
    }

    let flight_s = plan.total_distance_m / cruise_speed_mps;
    let photo_points: usize = plan.routes.iter().map(|r| r.waypoints.len()).sum();
    let photo_s = photo_points as f64 * photo_interval_s;
    let turnaround_s = (plan.total_route_count.saturating_sub(1)) as f64 * 60.0;

    (flight_s + photo_s + turnaround_s) / 60.0
}

/// Height-banded gimbal pitch recommendation.
pub fn recommended_gimbal_pitch_deg(flight_height_m: f64) -> f64 {
    if flight_height_m < 50.0 {
        -20.0
    } else if flight_height_m < 100.0 {
        -30.0
    } else if flight_height_m < 200.0 {
        -45.0
    } else {
        -60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_200m() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0018, 0.0),
            LatLng::new(0.0018, 0.0018),
            LatLng::new(0.0, 0.0018),
        ]
    }

    fn base_params(pitch_deg: f64) -> ObliqueParams {
        ObliqueParams {
            main_direction_deg: 0.0,
            side_overlap_pct: 70.0,
            forward_overlap_pct: 80.0,
            photo_width_m: 50.0,
            photo_length_m: 50.0,
            gimbal_pitch_deg: pitch_deg,
            flight_height_m: 100.0,
            polygon: square_200m(),
            start_point: LatLng::new(0.0001, 0.0001),
        }
    }

    #[test]
    fn direction_count_follows_pitch_bands() {
        assert_eq!(select_directions(0.0, -5.0).directions.len(), 1);
        assert_eq!(select_directions(0.0, -14.9).directions.len(), 1);
        assert_eq!(select_directions(0.0, -15.0).directions.len(), 3);
        assert_eq!(select_directions(0.0, -29.9).directions.len(), 3);
        assert_eq!(select_directions(0.0, -30.0).directions.len(), 4);
        assert_eq!(select_directions(0.0, -44.9).directions.len(), 4);
        assert_eq!(select_directions(0.0, -45.0).directions.len(), 5);
        assert_eq!(select_directions(0.0, -60.0).directions.len(), 5);
    }

    #[test]
    fn five_directions_rotate_with_main() {
        let selection = select_directions(30.0, -50.0);
        let expected = [30.0, 102.0, 174.0, 246.0, 318.0];
        for (got, want) in selection.directions.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!(!selection.optimized);
    }

    #[test]
    fn expansion_distance_respects_clamp() {
        let params = base_params(-50.0);
        let d = expansion_distance(&params);
        let max_coverage = 50.0;
        let tilt = 100.0 * 50.0_f64.to_radians().tan() * 0.5;
        assert!(d >= max_coverage * 0.3);
        assert!(d <= max_coverage * 0.8 + tilt + 1e-9);
    }

    #[test]
    fn shallow_pitch_skips_tilt_offset() {
        let params = base_params(-3.0);
        let d = expansion_distance(&params);
        // pure footprint-based expansion, damped by overlap
        let expected: f64 = (50.0 * 0.6) * (1.0 - 0.7 * 0.1);
        assert!((d - expected.clamp(15.0, 40.0)).abs() < 1e-9);
    }

    #[test]
    fn expanded_polygon_contains_original_vertices() {
        let ring = square_200m();
        let expanded = expand_polygon(&ring, 30.0);
        assert_eq!(expanded.len(), ring.len());
        for vertex in &ring {
            assert!(
                spatial::ring_contains(&expanded, *vertex),
                "expanded ring lost vertex {vertex:?}"
            );
        }
    }

    #[test]
    fn expansion_grows_area() {
        let ring = square_200m();
        let expanded = expand_polygon(&ring, 25.0);
        assert!(spatial::ring_area_m2(&expanded) > spatial::ring_area_m2(&ring));
    }

    #[test]
    fn clockwise_input_is_reoriented() {
        let mut ring = square_200m();
        ring.reverse();
        let expanded = expand_polygon(&ring, 25.0);
        for vertex in &ring {
            assert!(spatial::ring_contains(&expanded, *vertex));
        }
    }

    #[test]
    fn validation_rejects_upward_pitch() {
        let params = base_params(5.0);
        assert!(matches!(
            plan_oblique(&params),
            Err(PlanError::UpwardGimbalPitch { .. })
        ));
    }

    #[test]
    fn coverage_radius_has_floor() {
        let mut params = base_params(-89.0);
        params.side_overlap_pct = 95.0;
        params.forward_overlap_pct = 95.0;
        let r = effective_coverage_radius_m(&params);
        assert!((r - 25.0 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn recommended_pitch_bands() {
        assert_eq!(recommended_gimbal_pitch_deg(30.0), -20.0);
        assert_eq!(recommended_gimbal_pitch_deg(80.0), -30.0);
        assert_eq!(recommended_gimbal_pitch_deg(150.0), -45.0);
        assert_eq!(recommended_gimbal_pitch_deg(300.0), -60.0);
    }
}
