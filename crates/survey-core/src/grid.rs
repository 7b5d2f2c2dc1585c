//! Uniform spatial hash over lat/lng points.
//!
//! The planner repeatedly asks "is any waypoint within r of this sample"
//! against sets of hundreds to thousands of points. Hashing points into
//! cells no smaller than the query radius bounds every lookup to the 3x3
//! cell neighborhood.

use std::collections::HashMap;

use crate::cache;
use crate::models::LatLng;

/// Approximate meters per degree used for cell addressing. Only cell
/// assignment depends on it; distance checks use the real geodesic math.
const METERS_PER_DEG: f64 = 111_000.0;

pub struct SpatialIndex {
    cell_size_m: f64,
    cells: HashMap<(i64, i64), Vec<LatLng>>,
    len: usize,
}

impl SpatialIndex {
    /// `cell_size_m` must be at least as large as any radius later passed
    /// to the queries, otherwise matches outside the 3x3 neighborhood are
    /// missed.
    pub fn new(cell_size_m: f64) -> Self {
        Self {
            cell_size_m: cell_size_m.max(1e-6),
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn with_points(cell_size_m: f64, points: &[LatLng]) -> Self {
        let mut index = Self::new(cell_size_m);
        for p in points {
            index.insert(*p);
        }
        index
    }

    fn cell_of(&self, point: LatLng) -> (i64, i64) {
        (
            (point.lat * METERS_PER_DEG / self.cell_size_m).floor() as i64,
            (point.lng * METERS_PER_DEG / self.cell_size_m).floor() as i64,
        )
    }

    pub fn insert(&mut self, point: LatLng) {
        let cell = self.cell_of(point);
        self.cells.entry(cell).or_default().push(point);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Any indexed point within `radius_m` (inclusive) of `point`?
    pub fn any_within(&self, point: LatLng, radius_m: f64) -> bool {
        self.scan(point, |candidate| cache::distance(point, candidate) <= radius_m)
    }

    /// Any indexed point strictly closer than `limit_m` to `point`?
    pub fn any_closer_than(&self, point: LatLng, limit_m: f64) -> bool {
        self.scan(point, |candidate| cache::distance(point, candidate) < limit_m)
    }

    fn scan<F: Fn(LatLng) -> bool>(&self, point: LatLng, hit: F) -> bool {
        let (cx, cy) = self.cell_of(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                if bucket.iter().any(|candidate| hit(*candidate)) {
                    return true;
                }
            }
        }
        false
    }
}
