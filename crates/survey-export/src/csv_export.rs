//! Flat CSV rendering of plans, one row per waypoint.

use survey_core::{ObliquePlan, SurveyPlan};

use crate::{ExportError, ExportResult};

const HEADER: [&str; 6] = [
    "route_index",
    "direction_deg",
    "gimbal_pitch_deg",
    "waypoint_index",
    "lat",
    "lng",
];

/// Render `route_index, direction, pitch, waypoint_index, lat, lng` rows.
pub fn oblique_plan_to_csv(plan: &ObliquePlan) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for (route_index, route) in plan.routes.iter().enumerate() {
        for (waypoint_index, wp) in route.waypoints.iter().enumerate() {
            writer.write_record([
                route_index.to_string(),
                format!("{:.2}", route.direction_deg),
                format!("{:.2}", route.gimbal_pitch_deg),
                waypoint_index.to_string(),
                format!("{:.8}", wp.lat),
                format!("{:.8}", wp.lng),
            ])?;
        }
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| ExportError::CsvIntoInner(e.to_string()))?;
    Ok(String::from_utf8(buffer)?)
}

/// Single-direction plans use the same columns: one nadir route at index 0.
pub fn sweep_plan_to_csv(plan: &SurveyPlan, direction_deg: f64) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for (waypoint_index, wp) in plan.waypoints.iter().enumerate() {
        writer.write_record([
            "0".to_string(),
            format!("{direction_deg:.2}"),
            "0.00".to_string(),
            waypoint_index.to_string(),
            format!("{:.8}", wp.lat),
            format!("{:.8}", wp.lng),
        ])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| ExportError::CsvIntoInner(e.to_string()))?;
    Ok(String::from_utf8(buffer)?)
}
