//! Input validation errors for the planner entry points.

use thiserror::Error;

pub type PlannerResult<T> = std::result::Result<T, PlanError>;

/// Rejected input. Raised synchronously before any planning work begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("survey polygon needs at least 3 vertices, got {vertices}")]
    PolygonTooSmall { vertices: usize },

    #[error("{name} must be within 0-100%, got {value}")]
    OverlapOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveDimension { name: &'static str, value: f64 },

    #[error("gimbal pitch must be zero or negative (nose-down), got {pitch_deg}")]
    UpwardGimbalPitch { pitch_deg: f64 },
}
