//! Core data models for survey planning.

use serde::{Deserialize, Serialize};

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Parameters for a single-direction sweep over a survey polygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepParams {
    /// Sweep direction in compass degrees [0, 360).
    pub direction_deg: f64,
    /// Ground footprint width of one photo, meters.
    pub photo_width_m: f64,
    /// Ground footprint length of one photo, meters.
    pub photo_length_m: f64,
    /// Side overlap between adjacent sweep lines, percent [0, 100].
    pub side_overlap_pct: f64,
    /// Forward overlap between consecutive photos, percent [0, 100].
    pub forward_overlap_pct: f64,
    pub flight_height_m: f64,
    /// Where the aircraft starts; used to orient the traversal.
    pub start_point: LatLng,
}

impl SweepParams {
    /// Perpendicular distance between consecutive sweep lines.
    pub fn line_spacing_m(&self) -> f64 {
        self.photo_width_m * (1.0 - self.side_overlap_pct / 100.0)
    }

    /// Along-track distance between consecutive waypoints on one line.
    pub fn point_spacing_m(&self) -> f64 {
        self.photo_length_m * (1.0 - self.forward_overlap_pct / 100.0)
    }
}

/// Parameters for oblique (tilted-gimbal) multi-direction capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObliqueParams {
    /// Main sweep direction in compass degrees [0, 360).
    pub main_direction_deg: f64,
    pub side_overlap_pct: f64,
    pub forward_overlap_pct: f64,
    pub photo_width_m: f64,
    pub photo_length_m: f64,
    /// Gimbal pitch in degrees; negative means nose-down.
    pub gimbal_pitch_deg: f64,
    pub flight_height_m: f64,
    /// Survey area as a simple closed ring (closing edge implicit).
    pub polygon: Vec<LatLng>,
    pub start_point: LatLng,
}

/// Result of a single-direction sweep plan.
///
/// An empty waypoint list with `total_lines == 0` means no sweep line
/// survived clipping for these parameters; it is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPlan {
    pub waypoints: Vec<LatLng>,
    pub total_distance_m: f64,
    pub total_lines: usize,
}

impl SurveyPlan {
    pub(crate) fn empty() -> Self {
        Self {
            waypoints: Vec::new(),
            total_distance_m: 0.0,
            total_lines: 0,
        }
    }
}

/// One direction of an oblique capture mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub direction_deg: f64,
    pub gimbal_pitch_deg: f64,
    pub waypoints: Vec<LatLng>,
    pub distance_m: f64,
    pub label: String,
}

/// Result of oblique multi-direction planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObliquePlan {
    pub routes: Vec<Route>,
    pub total_distance_m: f64,
    pub total_route_count: usize,
    /// True when fewer than the full five directions were flown.
    pub optimized: bool,
    pub rationale: String,
    pub expanded_polygon: Vec<LatLng>,
    pub expansion_distance_m: f64,
    pub edge_coverage_pct: f64,
}

/// Expansion preview for an oblique mission, without planning routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandedAreaInfo {
    pub expanded_polygon: Vec<LatLng>,
    pub expansion_distance_m: f64,
    pub original_area_m2: f64,
    pub expanded_area_m2: f64,
    pub area_increase_pct: f64,
}
