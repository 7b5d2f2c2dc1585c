//! Coverage-gap detection and supplementary waypoint synthesis.
//!
//! After a primary sweep the ring is grid-sampled, samples with no nearby
//! waypoint are clustered, and each cluster gets either a single fill-in
//! waypoint or a small local sweep. A global minimum-distance check keeps
//! supplementary passes from stacking waypoints onto existing ones.

use rayon::prelude::*;

use crate::cache::{self, CachedRing};
use crate::grid::SpatialIndex;
use crate::models::LatLng;
use crate::spatial;
use crate::sweep;

/// Grid sampling is clamped to this range; overly dense estimates are
/// rescaled by sqrt(estimate / cap).
const MIN_GRID_SAMPLES: f64 = 200.0;
const MAX_GRID_SAMPLES: f64 = 1500.0;

/// No more than this many uncovered samples are carried into clustering.
const MAX_UNCOVERED_CARRIED: usize = 50;

/// Fraction of the standard point spacing below which a supplementary
/// candidate is considered a duplicate of an existing waypoint.
const MIN_SPACING_RATIO: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct RepairParams {
    pub direction_rad: f64,
    pub line_spacing_m: f64,
    pub point_spacing_m: f64,
    pub photo_width_m: f64,
    pub photo_length_m: f64,
}

/// Radius within which a waypoint is considered to photograph a sample.
pub fn coverage_radius_m(photo_width_m: f64, photo_length_m: f64) -> f64 {
    photo_width_m.max(photo_length_m) * 0.25
}

/// Grid-sample the ring and return interior samples not covered by any
/// existing waypoint. Empty when coverage is already effectively complete
/// (fewer than 2 gaps or above 98%).
pub fn find_uncovered_points(
    ring: &CachedRing,
    existing: &[LatLng],
    photo_width_m: f64,
    photo_length_m: f64,
) -> Vec<LatLng> {
    let (min_corner, max_corner) = ring.bounds();
    let area_m2 = ring.area_m2();

    let base_grid = photo_width_m.min(photo_length_m);
    let cell = if area_m2 < 10_000.0 {
        base_grid * 0.2
    } else if area_m2 < 100_000.0 {
        base_grid * 0.3
    } else {
        base_grid * 0.5
    };

    let mid_lat = (min_corner.lat + max_corner.lat) / 2.0;
    let mut lat_step = cell / 111_000.0;
    let mut lng_step = cell / (111_000.0 * mid_lat.to_radians().cos());

    let cap = (area_m2 / 100.0).clamp(MIN_GRID_SAMPLES, MAX_GRID_SAMPLES);
    let estimate = ((max_corner.lat - min_corner.lat) / lat_step)
        * ((max_corner.lng - min_corner.lng) / lng_step);
    if estimate > cap {
        let scale = (estimate / cap).sqrt();
        lat_step *= scale;
        lng_step *= scale;
    }

    let mut grid = Vec::new();
    let mut lat = min_corner.lat;
    while lat <= max_corner.lat {
        let mut lng = min_corner.lng;
        while lng <= max_corner.lng {
            grid.push(LatLng::new(lat, lng));
            lng += lng_step;
        }
        lat += lat_step;
    }

    let interior: Vec<LatLng> = grid
        .into_par_iter()
        .filter(|p| ring.contains(*p))
        .collect();

    let radius = coverage_radius_m(photo_width_m, photo_length_m);
    let covered_by = SpatialIndex::with_points(radius, existing);
    let uncovered: Vec<LatLng> = interior
        .par_iter()
        .copied()
        .filter(|sample| !covered_by.any_within(*sample, radius))
        .collect();

    let coverage_pct = if interior.is_empty() {
        100.0
    } else {
        (1.0 - uncovered.len() as f64 / interior.len() as f64) * 100.0
    };

    if uncovered.len() < 2 || coverage_pct > 98.0 {
        return Vec::new();
    }

    if uncovered.len() > 10 {
        uncovered.into_iter().take(MAX_UNCOVERED_CARRIED).collect()
    } else {
        uncovered
    }
}

/// Synthesize waypoints for the uncovered samples, deduplicated against
/// every waypoint already planned.
pub fn supplementary_waypoints(
    ring: &CachedRing,
    uncovered: &[LatLng],
    params: &RepairParams,
    existing: &[LatLng],
) -> Vec<LatLng> {
    if uncovered.is_empty() {
        return Vec::new();
    }

    let cluster_radius = (params.line_spacing_m * 2.0).max(params.point_spacing_m * 4.0);
    let clusters = cluster_points(uncovered, cluster_radius);

    let radius = coverage_radius_m(params.photo_width_m, params.photo_length_m);
    let min_distance = params.point_spacing_m * MIN_SPACING_RATIO;

    let mut global = SpatialIndex::with_points(min_distance, existing);
    let mut accepted = Vec::new();

    for cluster in clusters {
        let candidates = cluster_candidates(ring, &cluster, params, radius);
        for candidate in candidates {
            if !global.any_closer_than(candidate, min_distance) {
                global.insert(candidate);
                accepted.push(candidate);
            }
        }
    }

    accepted
}

/// Expanding-frontier clustering over a spatial hash keyed at the cluster
/// radius; a point joins a cluster when it lies within the radius of any
/// point already in it.
fn cluster_points(points: &[LatLng], cluster_radius_m: f64) -> Vec<Vec<LatLng>> {
    use std::collections::HashMap;

    if points.is_empty() {
        return Vec::new();
    }

    let cell_key = |p: &LatLng| -> (i64, i64) {
        (
            (p.lat * 111_000.0 / cluster_radius_m).floor() as i64,
            (p.lng * 111_000.0 / cluster_radius_m).floor() as i64,
        )
    };

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, p) in points.iter().enumerate() {
        grid.entry(cell_key(p)).or_default().push(idx);
    }

    let mut visited = vec![false; points.len()];
    let mut clusters = Vec::new();

    for seed in 0..points.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let mut cluster = Vec::new();
        let mut frontier = vec![seed];

        while let Some(current) = frontier.pop() {
            cluster.push(points[current]);
            let (cx, cy) = cell_key(&points[current]);

            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(neighbors) = grid.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &other in neighbors {
                        if !visited[other]
                            && cache::distance(points[current], points[other])
                                <= cluster_radius_m
                        {
                            visited[other] = true;
                            frontier.push(other);
                        }
                    }
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}

fn cluster_span_m(cluster: &[LatLng]) -> f64 {
    if cluster.len() < 2 {
        return 0.0;
    }
    let (min_corner, max_corner) = spatial::ring_bounds(cluster);
    let lat_span = cache::distance(
        min_corner,
        LatLng::new(max_corner.lat, min_corner.lng),
    );
    let lng_span = cache::distance(
        min_corner,
        LatLng::new(min_corner.lat, max_corner.lng),
    );
    lat_span.max(lng_span)
}

/// Candidate waypoints for one cluster: a single centroid point for tight
/// clusters, a reduced sweep for wide ones, and an axis-aligned grid when
/// the sweep yields nothing.
fn cluster_candidates(
    ring: &CachedRing,
    cluster: &[LatLng],
    params: &RepairParams,
    radius_m: f64,
) -> Vec<LatLng> {
    let span = cluster_span_m(cluster);
    let center = spatial::ring_centroid(cluster);

    if cluster.len() == 1 || span < params.line_spacing_m * 0.8 {
        let candidate = if ring.contains(center) {
            Some(center)
        } else {
            cluster.iter().copied().find(|p| ring.contains(*p))
        };
        return candidate.into_iter().collect();
    }

    let lines = local_sweep_lines(ring, center, span, params, cluster, radius_m);
    if !lines.is_empty() {
        let connected = crate::sequencer::snake_order(ring, lines, center);
        return connected
            .into_iter()
            .filter(|wp| {
                cluster
                    .iter()
                    .any(|gap| cache::distance(*wp, *gap) <= radius_m)
            })
            .collect();
    }

    grid_fallback(ring, cluster, params, radius_m)
}

/// A narrow sweep family centered on the cluster, keeping only lines that
/// actually reach an uncovered sample.
fn local_sweep_lines(
    ring: &CachedRing,
    center: LatLng,
    span_m: f64,
    params: &RepairParams,
    targets: &[LatLng],
    radius_m: f64,
) -> Vec<Vec<LatLng>> {
    let extent = span_m.max(params.line_spacing_m);
    let half = (((extent / params.line_spacing_m) as i32 + 4).max(3)) / 2;
    let perp = params.direction_rad + std::f64::consts::FRAC_PI_2;
    let centroid = ring.centroid();

    let mut lines = Vec::new();
    for k in -half..=half {
        let origin =
            spatial::offset_by_bearing(center, perp, k as f64 * params.line_spacing_m);
        let line_start =
            spatial::offset_by_bearing(origin, params.direction_rad, -1.5 * extent);
        let line_end =
            spatial::offset_by_bearing(line_start, params.direction_rad, 3.0 * extent);

        let points =
            sweep::clipped_line_points(ring, line_start, line_end, params.point_spacing_m, centroid);
        let reaches_target = points.iter().any(|wp| {
            targets
                .iter()
                .any(|gap| cache::distance(*wp, *gap) <= radius_m)
        });
        if !points.is_empty() && reaches_target {
            lines.push(points);
        }
    }
    lines
}

/// Axis-aligned grid over the cluster bounds at the standard point spacing.
fn grid_fallback(
    ring: &CachedRing,
    cluster: &[LatLng],
    params: &RepairParams,
    radius_m: f64,
) -> Vec<LatLng> {
    let (min_corner, max_corner) = spatial::ring_bounds(cluster);
    let mid_lat = (min_corner.lat + max_corner.lat) / 2.0;
    let lat_step = params.point_spacing_m / 111_000.0;
    let lng_step = params.point_spacing_m / (111_000.0 * mid_lat.to_radians().cos());

    let mut accepted: Vec<LatLng> = Vec::new();
    let mut lat = min_corner.lat;
    while lat <= max_corner.lat {
        let mut lng = min_corner.lng;
        while lng <= max_corner.lng {
            let candidate = LatLng::new(lat, lng);
            lng += lng_step;

            if !ring.contains(candidate) {
                continue;
            }
            let covers = cluster
                .iter()
                .any(|gap| cache::distance(candidate, *gap) <= radius_m);
            if !covers {
                continue;
            }
            let crowded = accepted
                .iter()
                .any(|wp| cache::distance(candidate, *wp) < params.point_spacing_m * 0.85);
            if !crowded {
                accepted.push(candidate);
            }
        }
        lat += lat_step;
    }
    accepted
}

/// Reject candidates closer than 0.75x the point spacing to any already
/// accepted or pre-existing waypoint. Used when the density gate fires.
pub fn validate_spacing(
    candidates: &[LatLng],
    existing: &[LatLng],
    point_spacing_m: f64,
) -> Vec<LatLng> {
    let min_distance = point_spacing_m * MIN_SPACING_RATIO;
    let mut kept = SpatialIndex::with_points(min_distance, existing);
    let mut validated = Vec::new();
    let mut rejected = 0usize;

    for &candidate in candidates {
        if kept.any_closer_than(candidate, min_distance) {
            rejected += 1;
        } else {
            kept.insert(candidate);
            validated.push(candidate);
        }
    }

    if !candidates.is_empty() {
        let rejection_rate = rejected as f64 / candidates.len() as f64;
        if rejection_rate > 0.3 {
            tracing::warn!(
                "spacing validator rejected {:.1}% of waypoints; spacing parameters may be off",
                rejection_rate * 100.0
            );
        }
    }

    validated
}
