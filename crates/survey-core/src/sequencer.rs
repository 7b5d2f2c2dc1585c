//! Orders clipped sweep lines into a single flyable route.
//!
//! Lines are sorted by their dominant spatial axis, traversed in a snake
//! pattern (every other line reversed so adjacent lines share their near
//! endpoints), and joined with bridge waypoints wherever a direct
//! line-to-line leg would leave the ring.

use crate::cache::{self, CachedRing};
use crate::models::LatLng;
use crate::spatial;
use crate::sweep::{leg_strictly_inside, SweepLine};

/// Two-point bridge search is bounded to this many candidates per side.
const MAX_PAIR_CANDIDATES: usize = 3;

/// Concatenate the sweep lines into one waypoint list in snake order.
pub fn snake_order(ring: &CachedRing, lines: Vec<SweepLine>, start: LatLng) -> Vec<LatLng> {
    let mut ordered: Vec<SweepLine> = lines.into_iter().filter(|l| !l.is_empty()).collect();
    if ordered.is_empty() {
        return Vec::new();
    }

    sort_lines_by_position(&mut ordered, start);

    let mut route: Vec<LatLng> = Vec::new();
    let mut reverse = false;

    for mut line in ordered {
        if reverse {
            line.reverse();
        }

        if let Some(&tail) = route.last() {
            let head = line[0];
            if !leg_strictly_inside(ring, tail, head) {
                route.extend(find_bridge_path(ring, tail, head));
            }
        }

        route.extend(line);
        reverse = !reverse;
    }

    cleanup_invalid_legs(ring, route)
}

fn line_midpoint(line: &[LatLng]) -> LatLng {
    line[line.len() / 2]
}

/// Sort lines along whichever axis dominates the spread between adjacent
/// midpoints, then make sure the traversal starts at the end nearest the
/// start point.
fn sort_lines_by_position(lines: &mut [SweepLine], start: LatLng) {
    if lines.len() <= 1 {
        return;
    }

    let first = line_midpoint(&lines[0]);
    let second = line_midpoint(&lines[1]);
    let by_latitude = (second.lat - first.lat).abs() > (second.lng - first.lng).abs();

    lines.sort_by(|a, b| {
        let (ma, mb) = (line_midpoint(a), line_midpoint(b));
        let (ka, kb) = if by_latitude {
            (ma.lat, mb.lat)
        } else {
            (ma.lng, mb.lng)
        };
        ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let dist_first = cache::distance(start, line_midpoint(&lines[0]));
    let dist_last = cache::distance(start, line_midpoint(&lines[lines.len() - 1]));
    if dist_last < dist_first {
        lines.reverse();
    }
}

/// Synthesize up to two waypoints making `start -> ... -> end` strictly
/// inside. Empty result means either no bridge is needed or none exists.
pub fn find_bridge_path(ring: &CachedRing, start: LatLng, end: LatLng) -> Vec<LatLng> {
    if leg_strictly_inside(ring, start, end) {
        return Vec::new();
    }

    let centroid = ring.centroid();
    if ring.contains(centroid)
        && leg_strictly_inside(ring, start, centroid)
        && leg_strictly_inside(ring, centroid, end)
    {
        return vec![centroid];
    }

    let candidates = bridge_candidates(ring, start, end, centroid);

    for &candidate in &candidates {
        if leg_strictly_inside(ring, start, candidate)
            && leg_strictly_inside(ring, candidate, end)
        {
            return vec![candidate];
        }
    }

    let bound = candidates.len().min(MAX_PAIR_CANDIDATES);
    for i in 0..bound {
        for j in (i + 1)..bound {
            let (first, second) = (candidates[i], candidates[j]);
            if leg_strictly_inside(ring, start, first)
                && leg_strictly_inside(ring, first, second)
                && leg_strictly_inside(ring, second, end)
            {
                return vec![first, second];
            }
        }
    }

    Vec::new()
}

/// Candidate bridge points: samples along the direct leg pulled toward the
/// centroid, plus a ring of offsets around the centroid scaled by the leg
/// length. Each candidate gets a final 10% nudge toward the centroid for
/// margin.
fn bridge_candidates(
    ring: &CachedRing,
    start: LatLng,
    end: LatLng,
    centroid: LatLng,
) -> Vec<LatLng> {
    let mut candidates = Vec::new();

    for i in 1..=4 {
        let along = spatial::interpolate(start, end, i as f64 / 5.0);
        for pull in [0.1, 0.2, 0.3] {
            let candidate = spatial::interpolate(along, centroid, pull);
            if ring.contains(candidate) {
                candidates.push(candidate);
            }
        }
    }

    let leg_length = cache::distance(start, end);
    for step in 0..12 {
        let bearing = (step as f64 * 30.0).to_radians();
        for scale in [0.05, 0.1, 0.15] {
            let candidate = spatial::offset_by_bearing(centroid, bearing, leg_length * scale);
            if ring.contains(candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
        .into_iter()
        .map(|c| spatial::interpolate(c, centroid, 0.1))
        .filter(|c| ring.contains(*c))
        .collect()
}

/// Walk the route and repair or drop every leg that is not strictly inside.
/// The surviving list has no exterior legs.
pub fn cleanup_invalid_legs(ring: &CachedRing, waypoints: Vec<LatLng>) -> Vec<LatLng> {
    if waypoints.len() <= 1 {
        return waypoints;
    }

    let mut cleaned: Vec<LatLng> = Vec::with_capacity(waypoints.len());
    let mut dropped = 0usize;
    cleaned.push(waypoints[0]);

    for &point in &waypoints[1..] {
        let tail = *cleaned.last().unwrap_or(&point);
        if leg_strictly_inside(ring, tail, point) {
            cleaned.push(point);
            continue;
        }

        let bridge = find_bridge_path(ring, tail, point);
        if !bridge.is_empty() && bridge_reaches(ring, tail, &bridge, point) {
            cleaned.extend(bridge);
            cleaned.push(point);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::warn!("dropped {dropped} waypoints with no admissible connection");
    }
    cleaned
}

fn bridge_reaches(ring: &CachedRing, tail: LatLng, bridge: &[LatLng], target: LatLng) -> bool {
    let mut current = tail;
    for &hop in bridge {
        if !leg_strictly_inside(ring, current, hop) {
            return false;
        }
        current = hop;
    }
    leg_strictly_inside(ring, current, target)
}
