//! Photogrammetry formulas relating sensor geometry, flight height, ground
//! sampling distance and photo footprint. Pure functions; none touch
//! planner state.

use crate::error::{PlanError, PlannerResult};

fn require_positive(name: &'static str, value: f64) -> PlannerResult<()> {
    if value <= 0.0 {
        return Err(PlanError::NonPositiveDimension { name, value });
    }
    Ok(())
}

/// Ground sampling distance in meters per pixel.
///
/// `GSD = (sensor_width * height) / (focal_length * image_width)`.
pub fn ground_sampling_distance_m(
    sensor_width_mm: f64,
    flight_height_m: f64,
    focal_length_mm: f64,
    image_width_px: u32,
) -> PlannerResult<f64> {
    require_positive("sensor width", sensor_width_mm)?;
    require_positive("flight height", flight_height_m)?;
    require_positive("focal length", focal_length_mm)?;
    require_positive("image width", image_width_px as f64)?;

    Ok((sensor_width_mm * flight_height_m) / (focal_length_mm * image_width_px as f64))
}

/// Flight height needed to reach a target GSD.
pub fn flight_height_for_gsd_m(
    gsd_m: f64,
    sensor_width_mm: f64,
    focal_length_mm: f64,
    image_width_px: u32,
) -> PlannerResult<f64> {
    require_positive("GSD", gsd_m)?;
    require_positive("sensor width", sensor_width_mm)?;
    require_positive("focal length", focal_length_mm)?;
    require_positive("image width", image_width_px as f64)?;

    Ok((gsd_m * focal_length_mm * image_width_px as f64) / sensor_width_mm)
}

/// Ground footprint width of one photo in meters.
pub fn photo_width_m(
    sensor_width_mm: f64,
    flight_height_m: f64,
    focal_length_mm: f64,
) -> PlannerResult<f64> {
    require_positive("sensor width", sensor_width_mm)?;
    require_positive("flight height", flight_height_m)?;
    require_positive("focal length", focal_length_mm)?;

    Ok(sensor_width_mm * flight_height_m / focal_length_mm)
}

/// Ground footprint length of one photo in meters.
pub fn photo_length_m(
    sensor_height_mm: f64,
    flight_height_m: f64,
    focal_length_mm: f64,
) -> PlannerResult<f64> {
    require_positive("sensor height", sensor_height_mm)?;
    require_positive("flight height", flight_height_m)?;
    require_positive("focal length", focal_length_mm)?;

    Ok(sensor_height_mm * flight_height_m / focal_length_mm)
}
