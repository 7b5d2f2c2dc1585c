//! GeoJSON FeatureCollection rendering of survey plans.
//!
//! The survey polygon becomes a Polygon feature, each route a LineString
//! feature, and each waypoint a Point feature carrying its route and
//! waypoint indices. GeoJSON wants [lng, lat] order.

use serde_json::{json, Value};
use survey_core::{LatLng, ObliquePlan, SurveyPlan};

fn ring_coordinates(ring: &[LatLng]) -> Vec<Vec<f64>> {
    let mut coords: Vec<Vec<f64>> = ring.iter().map(|p| vec![p.lng, p.lat]).collect();
    if let Some(first) = coords.first().cloned() {
        // GeoJSON rings are explicitly closed.
        coords.push(first);
    }
    coords
}

fn line_coordinates(waypoints: &[LatLng]) -> Vec<Vec<f64>> {
    waypoints.iter().map(|p| vec![p.lng, p.lat]).collect()
}

fn polygon_feature(ring: &[LatLng], name: &str) -> Value {
    json!({
        "type": "Feature",
        "properties": { "name": name },
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring_coordinates(ring)],
        },
    })
}

/// FeatureCollection for a single-direction plan.
pub fn sweep_plan_to_geojson(polygon: &[LatLng], plan: &SurveyPlan, direction_deg: f64) -> Value {
    let mut features = vec![polygon_feature(polygon, "survey area")];

    features.push(json!({
        "type": "Feature",
        "properties": {
            "name": "sweep route",
            "direction_deg": direction_deg,
            "distance_m": plan.total_distance_m,
            "total_lines": plan.total_lines,
        },
        "geometry": {
            "type": "LineString",
            "coordinates": line_coordinates(&plan.waypoints),
        },
    }));

    for (index, wp) in plan.waypoints.iter().enumerate() {
        features.push(json!({
            "type": "Feature",
            "properties": { "waypoint_index": index },
            "geometry": {
                "type": "Point",
                "coordinates": [wp.lng, wp.lat],
            },
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}

/// FeatureCollection for an oblique mission: original and expanded rings,
/// one LineString per direction, and every waypoint as a Point.
pub fn oblique_plan_to_geojson(polygon: &[LatLng], plan: &ObliquePlan) -> Value {
    let mut features = vec![
        polygon_feature(polygon, "survey area"),
        polygon_feature(&plan.expanded_polygon, "expanded area"),
    ];

    for (route_index, route) in plan.routes.iter().enumerate() {
        features.push(json!({
            "type": "Feature",
            "properties": {
                "route_index": route_index,
                "label": route.label,
                "direction_deg": route.direction_deg,
                "gimbal_pitch_deg": route.gimbal_pitch_deg,
                "distance_m": route.distance_m,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": line_coordinates(&route.waypoints),
            },
        }));

        for (waypoint_index, wp) in route.waypoints.iter().enumerate() {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "route_index": route_index,
                    "waypoint_index": waypoint_index,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [wp.lng, wp.lat],
                },
            }));
        }
    }

    json!({ "type": "FeatureCollection", "features": features })
}
