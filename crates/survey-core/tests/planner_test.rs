//! Scenario tests for the sweep planner.

use survey_core::{cache, spatial, LatLng, PlanError, SweepParams};

/// ~100m x ~100m square at the equator.
fn square_100m() -> Vec<LatLng> {
    vec![
        LatLng::new(0.0, 0.0),
        LatLng::new(0.000898, 0.0),
        LatLng::new(0.000898, 0.000898),
        LatLng::new(0.0, 0.000898),
    ]
}

/// L-shape: 200m x 200m square missing its north-east 100m x 100m quadrant.
fn l_shape() -> Vec<LatLng> {
    vec![
        LatLng::new(0.0, 0.0),
        LatLng::new(0.0, 0.0018),
        LatLng::new(0.0009, 0.0018),
        LatLng::new(0.0009, 0.0009),
        LatLng::new(0.0018, 0.0009),
        LatLng::new(0.0018, 0.0),
    ]
}

fn params(direction_deg: f64, start: LatLng) -> SweepParams {
    SweepParams {
        direction_deg,
        photo_width_m: 50.0,
        photo_length_m: 50.0,
        side_overlap_pct: 80.0,
        forward_overlap_pct: 80.0,
        flight_height_m: 100.0,
        start_point: start,
    }
}

fn assert_leg_inside(polygon: &[LatLng], a: LatLng, b: LatLng) {
    for i in 1..=8 {
        let t = i as f64 / 9.0;
        let sample = spatial::interpolate(a, b, t);
        assert!(
            spatial::ring_contains(polygon, sample),
            "leg sample left the polygon: {a:?} -> {b:?} at t={t}"
        );
    }
}

#[test]
fn square_sweep_covers_with_expected_geometry() {
    cache::reset();
    let polygon = square_100m();
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();

    // ~10m line spacing across ~100m: a dense interior family.
    assert!(
        (8..=11).contains(&plan.total_lines),
        "unexpected line count {}",
        plan.total_lines
    );
    assert!(plan.waypoints.len() >= 80, "got {}", plan.waypoints.len());

    for wp in &plan.waypoints {
        assert!(spatial::ring_contains(&polygon, *wp), "waypoint outside: {wp:?}");
    }
    for pair in plan.waypoints.windows(2) {
        assert_leg_inside(&polygon, pair[0], pair[1]);
    }

    assert!(
        plan.total_distance_m > 850.0 && plan.total_distance_m < 1150.0,
        "total distance {} out of range",
        plan.total_distance_m
    );
}

#[test]
fn square_sweep_is_snake_ordered() {
    let polygon = square_100m();
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();

    // Snake traversal keeps every leg short: along-track spacing or the
    // line-to-line hop. A non-snake order would need ~100m connectors.
    for pair in plan.waypoints.windows(2) {
        let d = spatial::haversine_distance(pair[0], pair[1]);
        assert!(d < 20.0, "leg of {d} m breaks the snake pattern");
    }
}

#[test]
fn total_distance_is_additive() {
    let polygon = square_100m();
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();

    let recomputed: f64 = plan
        .waypoints
        .windows(2)
        .map(|pair| cache::distance(pair[0], pair[1]))
        .sum();
    assert!(
        (plan.total_distance_m - recomputed).abs() < 1e-6,
        "planner total {} vs recomputed {recomputed}",
        plan.total_distance_m
    );

    let haversine_sum: f64 = plan
        .waypoints
        .windows(2)
        .map(|pair| spatial::haversine_distance(pair[0], pair[1]))
        .sum();
    assert!((plan.total_distance_m - haversine_sum).abs() < 0.01);
}

#[test]
fn l_shape_route_stays_inside_and_reaches_both_arms() {
    cache::reset();
    let polygon = l_shape();
    // 78% side overlap -> 11m line spacing, which puts an odd number of
    // full-width lines south of the notch and forces the arm transition
    // to happen at the concave corner.
    let sweep = SweepParams {
        direction_deg: 90.0,
        photo_width_m: 50.0,
        photo_length_m: 50.0,
        side_overlap_pct: 78.0,
        forward_overlap_pct: 80.0,
        flight_height_m: 100.0,
        start_point: LatLng::new(0.00005, 0.00001),
    };
    let plan = survey_core::plan_sweep(&polygon, &sweep).unwrap();
    assert!(!plan.waypoints.is_empty());

    for wp in &plan.waypoints {
        assert!(spatial::ring_contains(&polygon, *wp), "waypoint outside: {wp:?}");
    }
    // No leg may cut across the notch at the inner corner.
    for pair in plan.waypoints.windows(2) {
        assert_leg_inside(&polygon, pair[0], pair[1]);
    }

    let visits_north_arm = plan
        .waypoints
        .iter()
        .any(|wp| wp.lat > 0.0011 && wp.lng < 0.0009);
    let visits_east_arm = plan.waypoints.iter().any(|wp| wp.lng > 0.0011);
    assert!(visits_north_arm, "north arm never visited");
    assert!(visits_east_arm, "east arm never visited");
}

#[test]
fn l_shape_transition_inserts_bridge_waypoint() {
    let polygon = l_shape();
    let sweep = SweepParams {
        direction_deg: 90.0,
        photo_width_m: 50.0,
        photo_length_m: 50.0,
        side_overlap_pct: 78.0,
        forward_overlap_pct: 80.0,
        flight_height_m: 100.0,
        start_point: LatLng::new(0.00005, 0.00001),
    };
    let plan = survey_core::plan_sweep(&polygon, &sweep).unwrap();

    // Sweep-line waypoints all sit on the 11m latitude lattice anchored at
    // the start point; a bridge waypoint does not.
    let anchor_lat_m = 0.00005 * 111_194.9;
    let has_off_lattice_point = plan.waypoints.iter().any(|wp| {
        let lat_m = wp.lat * 111_194.9;
        let offset = (lat_m - anchor_lat_m) / 11.0;
        (offset - offset.round()).abs() * 11.0 > 1.0
    });
    assert!(has_off_lattice_point, "expected a bridge waypoint off the sweep lattice");
}

#[test]
fn exterior_start_point_is_not_emitted() {
    let polygon = square_100m();
    let start = LatLng::new(-0.001, -0.001);
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, start)).unwrap();

    assert!(!plan.waypoints.is_empty());
    let first = plan.waypoints[0];
    assert!(spatial::ring_contains(&polygon, first));
    assert!(spatial::haversine_distance(first, start) > 50.0);
    for wp in &plan.waypoints {
        assert_ne!(*wp, start);
    }
}

#[test]
fn degenerate_collinear_polygon_yields_empty_plan() {
    let polygon = vec![
        LatLng::new(0.0, 0.0),
        LatLng::new(0.0005, 0.0),
        LatLng::new(0.001, 0.0),
    ];
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();
    assert!(plan.waypoints.is_empty());
    assert_eq!(plan.total_lines, 0);
    assert_eq!(plan.total_distance_m, 0.0);
}

#[test]
fn two_vertex_polygon_is_rejected() {
    let polygon = vec![LatLng::new(0.0, 0.0), LatLng::new(0.001, 0.001)];
    let err =
        survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap_err();
    assert_eq!(err, PlanError::PolygonTooSmall { vertices: 2 });
}

#[test]
fn multi_block_reaches_coverage_target() {
    cache::reset();
    let polygon = square_100m();
    let plan = survey_core::plan_sweep_multi_block(
        &polygon,
        &params(0.0, LatLng::new(0.0, 0.0)),
        3,
        false,
    )
    .unwrap();

    // 0.3x base grid sampling, coverage radius 0.25 * max footprint.
    let coverage_radius = 12.5;
    let step = 15.0 / 111_194.9;
    let mut total = 0usize;
    let mut covered = 0usize;
    let mut lat = 0.0;
    while lat <= 0.000898 {
        let mut lng = 0.0;
        while lng <= 0.000898 {
            let sample = LatLng::new(lat, lng);
            if spatial::ring_contains(&polygon, sample) {
                total += 1;
                let near = plan
                    .waypoints
                    .iter()
                    .any(|wp| spatial::haversine_distance(sample, *wp) <= coverage_radius);
                if near {
                    covered += 1;
                }
            }
            lng += step;
        }
        lat += step;
    }

    assert!(total > 0);
    let fraction = covered as f64 / total as f64;
    assert!(fraction >= 0.95, "coverage fraction {fraction} below target");
}

#[test]
fn multi_block_keeps_route_inside() {
    let polygon = l_shape();
    let sweep = SweepParams {
        direction_deg: 0.0,
        photo_width_m: 50.0,
        photo_length_m: 50.0,
        side_overlap_pct: 80.0,
        forward_overlap_pct: 80.0,
        flight_height_m: 100.0,
        start_point: LatLng::new(0.00001, 0.00001),
    };
    let plan = survey_core::plan_sweep_multi_block(&polygon, &sweep, 4, false).unwrap();

    for wp in &plan.waypoints {
        assert!(spatial::ring_contains(&polygon, *wp));
    }
    for pair in plan.waypoints.windows(2) {
        assert_leg_inside(&polygon, pair[0], pair[1]);
    }
}

#[test]
fn triangle_sweep_stays_inside() {
    // ~200m base, ~180m tall triangle with two slanted edges.
    let polygon = vec![
        LatLng::new(0.0, 0.0),
        LatLng::new(0.0, 0.0018),
        LatLng::new(0.0016, 0.0009),
    ];
    let plan =
        survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.00001, 0.0009))).unwrap();

    assert!(plan.total_lines >= 5);
    for wp in &plan.waypoints {
        assert!(spatial::ring_contains(&polygon, *wp), "waypoint outside: {wp:?}");
    }
    for pair in plan.waypoints.windows(2) {
        assert_leg_inside(&polygon, pair[0], pair[1]);
    }
}

#[test]
fn closed_ring_input_plans_like_open_ring() {
    let open = square_100m();
    let mut closed = open.clone();
    closed.push(closed[0]);

    let from_open =
        survey_core::plan_sweep(&open, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();
    let from_closed =
        survey_core::plan_sweep(&closed, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();

    assert_eq!(from_open.waypoints, from_closed.waypoints);
    assert_eq!(from_open.total_lines, from_closed.total_lines);
}

#[test]
fn angled_direction_stays_inside() {
    let polygon = square_100m();
    let plan = survey_core::plan_sweep(&polygon, &params(45.0, LatLng::new(0.0, 0.0))).unwrap();

    assert!(!plan.waypoints.is_empty());
    assert!(plan.total_lines >= 3);
    for wp in &plan.waypoints {
        assert!(spatial::ring_contains(&polygon, *wp));
    }
    for pair in plan.waypoints.windows(2) {
        assert_leg_inside(&polygon, pair[0], pair[1]);
    }
}

#[test]
fn simplifier_is_idempotent_on_planned_routes() {
    let polygon = square_100m();
    let plan = survey_core::plan_sweep(&polygon, &params(0.0, LatLng::new(0.0, 0.0))).unwrap();

    let once = survey_core::simplify::simplify_route(&plan.waypoints);
    let twice = survey_core::simplify::simplify_route(&once);
    assert_eq!(once, twice);
    assert!(once.len() <= plan.waypoints.len());
    assert!(once.len() >= 2);
}

#[test]
fn simplified_multi_block_plan_keeps_endpoints() {
    let polygon = square_100m();
    let raw = survey_core::plan_sweep_multi_block(
        &polygon,
        &params(0.0, LatLng::new(0.0, 0.0)),
        3,
        false,
    )
    .unwrap();
    let simplified = survey_core::plan_sweep_multi_block(
        &polygon,
        &params(0.0, LatLng::new(0.0, 0.0)),
        3,
        true,
    )
    .unwrap();

    assert!(!simplified.waypoints.is_empty());
    assert!(simplified.waypoints.len() <= raw.waypoints.len());
    assert_eq!(simplified.waypoints.first(), raw.waypoints.first());
    assert_eq!(simplified.waypoints.last(), raw.waypoints.last());
}
