//! Compact JSON summaries of planner results.

use serde_json::{json, Value};
use survey_core::{ObliquePlan, SurveyPlan};

pub fn oblique_plan_summary(plan: &ObliquePlan) -> Value {
    let routes: Vec<Value> = plan
        .routes
        .iter()
        .map(|route| {
            json!({
                "label": route.label,
                "direction_deg": route.direction_deg,
                "gimbal_pitch_deg": route.gimbal_pitch_deg,
                "waypoint_count": route.waypoints.len(),
                "distance_m": route.distance_m,
            })
        })
        .collect();

    json!({
        "total_route_count": plan.total_route_count,
        "total_distance_m": plan.total_distance_m,
        "optimized": plan.optimized,
        "rationale": plan.rationale,
        "expansion_distance_m": plan.expansion_distance_m,
        "edge_coverage_pct": plan.edge_coverage_pct,
        "routes": routes,
    })
}

pub fn sweep_plan_summary(plan: &SurveyPlan, direction_deg: f64) -> Value {
    json!({
        "direction_deg": direction_deg,
        "waypoint_count": plan.waypoints.len(),
        "total_distance_m": plan.total_distance_m,
        "total_lines": plan.total_lines,
    })
}
