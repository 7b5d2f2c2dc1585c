//! Planner entry points: single-direction sweeps and multi-block plans
//! with coverage repair.

use std::time::Instant;

use crate::cache::{self, CachedRing};
use crate::error::{PlanError, PlannerResult};
use crate::models::{LatLng, SurveyPlan, SweepParams};
use crate::repair::{self, RepairParams};
use crate::sequencer;
use crate::simplify;
use crate::spatial;
use crate::sweep;

/// Plan one sweep over the polygon.
///
/// Returns an empty plan with `total_lines == 0` when no sweep line
/// survives clipping; that is a valid "no plan exists" answer, not an
/// error.
pub fn plan_sweep(polygon: &[LatLng], params: &SweepParams) -> PlannerResult<SurveyPlan> {
    let started = Instant::now();
    validate_sweep_inputs(polygon, params)?;
    let polygon = spatial::open_ring(polygon);

    let line_spacing = params.line_spacing_m();
    let point_spacing = params.point_spacing_m();
    if line_spacing <= f64::EPSILON || point_spacing <= f64::EPSILON {
        // 100% overlap collapses the spacing; no finite plan covers that.
        return Ok(SurveyPlan::empty());
    }

    let ring = CachedRing::new(polygon);
    let ordering_start = resolve_start_point(&ring, params.start_point);
    let anchor = if ring.contains(params.start_point) {
        params.start_point
    } else {
        ring.centroid()
    };

    let lines = sweep::generate_parallel_lines(
        &ring,
        anchor,
        params.direction_deg.to_radians(),
        line_spacing,
        point_spacing,
    );
    let total_lines = lines.len();
    if lines.is_empty() {
        cache::record_planning_duration(started.elapsed());
        return Ok(SurveyPlan::empty());
    }

    let mut route = sequencer::snake_order(&ring, lines, ordering_start);

    // The strict spacing validator only runs when the route came out far
    // denser than the spacing parameters predict; sparse routes keep any
    // close pairs they may contain.
    let area_m2 = ring.area_m2();
    if area_m2 > 0.0 {
        let density = route.len() as f64 / area_m2;
        let expected = 1.0 / (line_spacing * point_spacing);
        if density > expected * 1.5 {
            route = repair::validate_spacing(&route, &[], point_spacing);
        }
    }

    let total_distance_m = route_distance_m(&route);
    cache::record_planning_duration(started.elapsed());

    Ok(SurveyPlan {
        waypoints: route,
        total_distance_m,
        total_lines,
    })
}

/// Plan a sweep, then run up to `max_blocks - 1` repair passes that add
/// supplementary waypoints over whatever the primary pass missed.
pub fn plan_sweep_multi_block(
    polygon: &[LatLng],
    params: &SweepParams,
    max_blocks: usize,
    simplify_result: bool,
) -> PlannerResult<SurveyPlan> {
    let first = plan_sweep(polygon, params)?;
    if first.waypoints.is_empty() {
        return Ok(first);
    }

    let polygon = spatial::open_ring(polygon);
    let ring = CachedRing::new(polygon);
    let mut waypoints = first.waypoints;
    let mut total_lines = first.total_lines;

    let repair_params = RepairParams {
        direction_rad: params.direction_deg.to_radians(),
        line_spacing_m: params.line_spacing_m(),
        point_spacing_m: params.point_spacing_m(),
        photo_width_m: params.photo_width_m,
        photo_length_m: params.photo_length_m,
    };

    for _block in 2..=max_blocks {
        let uncovered = repair::find_uncovered_points(
            &ring,
            &waypoints,
            params.photo_width_m,
            params.photo_length_m,
        );
        if uncovered.is_empty() {
            break;
        }

        let supplementary =
            repair::supplementary_waypoints(&ring, &uncovered, &repair_params, &waypoints);
        if supplementary.is_empty() {
            break;
        }

        let cleaned = sequencer::cleanup_invalid_legs(&ring, supplementary);
        if cleaned.is_empty() {
            break;
        }

        if let Some(&tail) = waypoints.last() {
            let head = cleaned[0];
            if !sweep::leg_strictly_inside(&ring, tail, head) {
                // Empty bridge is fine; the final cleanup drops the bad
                // junction leg if one remains.
                waypoints.extend(sequencer::find_bridge_path(&ring, tail, head));
            }
        }

        total_lines += cleaned.len().saturating_sub(1);
        waypoints.extend(cleaned);
    }

    let mut waypoints = sequencer::cleanup_invalid_legs(&ring, waypoints);
    if simplify_result {
        waypoints = simplify::simplify_route(&waypoints);
    }

    let total_distance_m = route_distance_m(&waypoints);
    Ok(SurveyPlan {
        waypoints,
        total_distance_m,
        total_lines,
    })
}

pub(crate) fn validate_sweep_inputs(
    polygon: &[LatLng],
    params: &SweepParams,
) -> PlannerResult<()> {
    if polygon.len() < 3 {
        return Err(PlanError::PolygonTooSmall {
            vertices: polygon.len(),
        });
    }
    for (name, value) in [
        ("side overlap", params.side_overlap_pct),
        ("forward overlap", params.forward_overlap_pct),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(PlanError::OverlapOutOfRange { name, value });
        }
    }
    for (name, value) in [
        ("photo width", params.photo_width_m),
        ("photo length", params.photo_length_m),
        ("flight height", params.flight_height_m),
    ] {
        if value <= 0.0 {
            return Err(PlanError::NonPositiveDimension { name, value });
        }
    }
    Ok(())
}

/// Exterior start points are replaced for traversal ordering: centroid
/// first, then a point just inside the nearest boundary, then the centroid
/// again as last resort.
fn resolve_start_point(ring: &CachedRing, start: LatLng) -> LatLng {
    if ring.contains(start) {
        return start;
    }

    let centroid = ring.centroid();
    if ring.contains(centroid) {
        return centroid;
    }

    let boundary = spatial::nearest_boundary_point(ring.points(), start);
    let nudged = spatial::interpolate(boundary, centroid, 0.01);
    if ring.contains(nudged) {
        nudged
    } else {
        centroid
    }
}

pub(crate) fn route_distance_m(waypoints: &[LatLng]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| cache::distance(pair[0], pair[1]))
        .sum()
}
