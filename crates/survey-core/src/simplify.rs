//! Collapses runs of near-collinear waypoints while keeping true turns.
//!
//! A waypoint survives when the route genuinely changes direction there,
//! when its incoming leg is far longer than its neighbors (an inter-line
//! connector), or when dropping it would let the straight run drift more
//! than the deviation threshold from its chord.

use crate::cache;
use crate::models::LatLng;
use crate::spatial;

pub const DEFAULT_ANGLE_TOLERANCE_DEG: f64 = 2.0;
pub const DEFAULT_MIN_SEGMENT_LENGTH_M: f64 = 10.0;

/// Maximum perpendicular drift from the running chord before the segment
/// is closed early.
const CHORD_DEVIATION_M: f64 = 3.0;

/// Simplify with the default tolerances.
pub fn simplify_route(waypoints: &[LatLng]) -> Vec<LatLng> {
    simplify_waypoints(
        waypoints,
        DEFAULT_ANGLE_TOLERANCE_DEG,
        DEFAULT_MIN_SEGMENT_LENGTH_M,
    )
}

/// Simplify an ordered waypoint sequence. The first and last points are
/// always kept. `min_segment_length_m` is advisory and currently unused by
/// the turn tests.
pub fn simplify_waypoints(
    waypoints: &[LatLng],
    angle_tolerance_deg: f64,
    _min_segment_length_m: f64,
) -> Vec<LatLng> {
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut simplified = vec![waypoints[0]];
    let mut segment_start = 0usize;

    for i in 1..waypoints.len() - 1 {
        let current = waypoints[i];
        let next = waypoints[i + 1];
        let prev = waypoints[i - 1];

        let mut is_turn = false;

        let bearing_in = spatial::bearing_deg(prev, current);
        let bearing_out = spatial::bearing_deg(current, next);
        if angle_difference_deg(bearing_in, bearing_out) > angle_tolerance_deg * 5.0 {
            is_turn = true;
        }

        // A leg much longer than its neighbors is an inter-line connector,
        // not part of a straight run.
        if i >= 2 {
            let before = cache::distance(waypoints[i - 2], prev);
            let incoming = cache::distance(prev, current);
            let outgoing = cache::distance(current, next);
            if incoming > 3.0 * ((before + outgoing) / 2.0) {
                is_turn = true;
            }
        }

        if is_turn {
            simplified.push(current);
            segment_start = i;
        } else if segment_start < i - 1 {
            let chord_start = waypoints[segment_start];
            let straight = (segment_start + 1..i).all(|j| {
                spatial::distance_to_segment_m(waypoints[j], chord_start, current)
                    <= CHORD_DEVIATION_M
            });
            if !straight {
                simplified.push(waypoints[i - 1]);
                segment_start = i - 1;
            }
        }
    }

    simplified.push(waypoints[waypoints.len() - 1]);
    simplified
}

fn angle_difference_deg(a: f64, b: f64) -> f64 {
    let diff = (b - a).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_run_collapses_to_endpoints() {
        let line: Vec<LatLng> = (0..10)
            .map(|i| LatLng::new(i as f64 * 0.0001, 0.0))
            .collect();
        let simplified = simplify_route(&line);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0], line[0]);
        assert_eq!(simplified[1], line[9]);
    }

    #[test]
    fn right_angle_turn_is_kept() {
        let mut route: Vec<LatLng> = (0..5)
            .map(|i| LatLng::new(i as f64 * 0.0001, 0.0))
            .collect();
        route.extend((1..5).map(|i| LatLng::new(0.0004, i as f64 * 0.0001)));

        let simplified = simplify_route(&route);
        assert_eq!(simplified.len(), 3);
        assert_eq!(simplified[1], LatLng::new(0.0004, 0.0));
    }

    #[test]
    fn zigzag_survives_unchanged() {
        let route = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.001, 0.0),
            LatLng::new(0.001, 0.0001),
            LatLng::new(0.0, 0.0001),
            LatLng::new(0.0, 0.0002),
            LatLng::new(0.001, 0.0002),
        ];
        let simplified = simplify_route(&route);
        assert_eq!(simplified, route);
    }

    #[test]
    fn idempotent_on_snake_routes() {
        let mut route = Vec::new();
        for line in 0..4 {
            let lng = line as f64 * 0.0001;
            let lats: Vec<f64> = (0..8).map(|i| i as f64 * 0.0001).collect();
            if line % 2 == 0 {
                route.extend(lats.iter().map(|&lat| LatLng::new(lat, lng)));
            } else {
                route.extend(lats.iter().rev().map(|&lat| LatLng::new(lat, lng)));
            }
        }

        let once = simplify_route(&route);
        let twice = simplify_route(&once);
        assert_eq!(once, twice);
        assert!(once.len() < route.len());
    }

    #[test]
    fn short_sequences_pass_through() {
        let pair = vec![LatLng::new(0.0, 0.0), LatLng::new(0.001, 0.001)];
        assert_eq!(simplify_route(&pair), pair);
    }
}
