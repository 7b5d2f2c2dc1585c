//! Survey Core - geometric flight planning for aerial photogrammetry
//!
//! Given a survey polygon on the WGS-84 ellipsoid and camera footprint
//! parameters, this crate plans ordered waypoint routes whose photo
//! footprints cover the polygon with the requested overlap while every
//! flight leg stays inside the polygon. Pure computation, no I/O.

pub mod cache;
pub mod error;
pub mod grid;
pub mod models;
pub mod oblique;
pub mod photogrammetry;
pub mod planner;
pub mod repair;
pub mod sequencer;
pub mod simplify;
pub mod spatial;
pub mod sweep;

pub use error::{PlanError, PlannerResult};
pub use models::{
    ExpandedAreaInfo, LatLng, ObliqueParams, ObliquePlan, Route, SurveyPlan, SweepParams,
};
pub use oblique::{expanded_area_info, plan_oblique};
pub use planner::{plan_sweep, plan_sweep_multi_block};
