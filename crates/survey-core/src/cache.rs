//! Process-wide memoization of the hot geometry queries.
//!
//! Four maps are kept: point distances, ring containment, line/ring
//! crossings, and ring bounds. All cached values are pure functions of
//! their keys; rings are identified by a content hash over rounded
//! coordinates, so an equal ring re-built by the caller hits the same
//! entries and a mutated ring naturally gets a fresh identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::models::LatLng;
use crate::spatial;

const CACHE_SIZE_THRESHOLD: usize = 10_000;
const CACHE_SWEEP_INTERVAL_S: u64 = 300;

type DistanceKey = (i64, i64, i64, i64);
type ContainmentKey = (i64, i64, u64);
type CrossingsKey = (i64, i64, i64, i64, u64);

fn key6(v: f64) -> i64 {
    (v * 1e6).round() as i64
}

fn key8(v: f64) -> i64 {
    (v * 1e8).round() as i64
}

/// FNV-1a over coordinates rounded to 8 decimals. Stable for equal rings,
/// different for mutated ones.
pub fn ring_hash(ring: &[LatLng]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for p in ring {
        for v in [key8(p.lat), key8(p.lng)] {
            for byte in v.to_le_bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
    }
    hash
}

struct Caches {
    distance: DashMap<DistanceKey, f64>,
    containment: DashMap<ContainmentKey, bool>,
    crossings: DashMap<CrossingsKey, Vec<LatLng>>,
    bounds: DashMap<u64, (LatLng, LatLng)>,
    /// Seconds since process start of the last sweep; compare-and-set keeps
    /// concurrent planners from sweeping twice.
    last_sweep_s: AtomicU64,
}

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

static CACHES: Lazy<Caches> = Lazy::new(|| Caches {
    distance: DashMap::new(),
    containment: DashMap::new(),
    crossings: DashMap::new(),
    bounds: DashMap::new(),
    last_sweep_s: AtomicU64::new(0),
});

impl Caches {
    fn sweep_if_due(&self) {
        let oversized = self.distance.len() > CACHE_SIZE_THRESHOLD
            || self.containment.len() > CACHE_SIZE_THRESHOLD;
        let now_s = PROCESS_START.elapsed().as_secs();
        let last = self.last_sweep_s.load(Ordering::Relaxed);

        if !oversized && now_s.saturating_sub(last) < CACHE_SWEEP_INTERVAL_S {
            return;
        }
        if self
            .last_sweep_s
            .compare_exchange(last, now_s, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            // Another thread took the sweep.
            return;
        }

        let half = CACHE_SIZE_THRESHOLD / 2;
        if self.distance.len() > half {
            tracing::debug!("sweeping distance cache ({} entries)", self.distance.len());
            self.distance.clear();
        }
        if self.containment.len() > half {
            tracing::debug!(
                "sweeping containment cache ({} entries)",
                self.containment.len()
            );
            self.containment.clear();
        }
        if self.crossings.len() > half {
            self.crossings.clear();
        }
        if self.bounds.len() > half {
            self.bounds.clear();
        }
    }
}

/// Cached great-circle distance in meters.
pub fn distance(a: LatLng, b: LatLng) -> f64 {
    let key = (key6(a.lat), key6(a.lng), key6(b.lat), key6(b.lng));
    if let Some(hit) = CACHES.distance.get(&key) {
        return *hit;
    }
    let value = spatial::haversine_distance(a, b);
    CACHES.distance.insert(key, value);
    value
}

/// A polygon ring paired with its content hash, giving cached access to the
/// containment, crossing and bounds queries the planner hammers.
#[derive(Clone, Copy)]
pub struct CachedRing<'a> {
    points: &'a [LatLng],
    hash: u64,
}

impl<'a> CachedRing<'a> {
    pub fn new(points: &'a [LatLng]) -> Self {
        Self {
            points,
            hash: ring_hash(points),
        }
    }

    pub fn points(&self) -> &'a [LatLng] {
        self.points
    }

    pub fn contains(&self, p: LatLng) -> bool {
        CACHES.sweep_if_due();
        let key = (key8(p.lat), key8(p.lng), self.hash);
        if let Some(hit) = CACHES.containment.get(&key) {
            return *hit;
        }
        let value = spatial::ring_contains(self.points, p);
        CACHES.containment.insert(key, value);
        value
    }

    pub fn crossings(&self, a: LatLng, b: LatLng) -> Vec<LatLng> {
        let key = (key6(a.lat), key6(a.lng), key6(b.lat), key6(b.lng), self.hash);
        if let Some(hit) = CACHES.crossings.get(&key) {
            return hit.clone();
        }
        let value = spatial::line_ring_crossings(self.points, a, b);
        CACHES.crossings.insert(key, value.clone());
        value
    }

    pub fn bounds(&self) -> (LatLng, LatLng) {
        if let Some(hit) = CACHES.bounds.get(&self.hash) {
            return *hit;
        }
        let value = spatial::ring_bounds(self.points);
        CACHES.bounds.insert(self.hash, value);
        value
    }

    pub fn centroid(&self) -> LatLng {
        spatial::ring_centroid(self.points)
    }

    pub fn area_m2(&self) -> f64 {
        spatial::ring_area_m2(self.points)
    }

    /// Whether segment `a..b` touches or crosses any ring edge.
    pub fn crosses_boundary(&self, a: LatLng, b: LatLng) -> bool {
        let n = self.points.len();
        for i in 0..n {
            if spatial::segments_intersect(a, b, self.points[i], self.points[(i + 1) % n]) {
                return true;
            }
        }
        false
    }
}

#[derive(Default)]
struct PlanningStats {
    total: Duration,
    count: u64,
}

// One mutex covers both fields so total/count stays a consistent pair.
static STATS: Lazy<Mutex<PlanningStats>> = Lazy::new(|| Mutex::new(PlanningStats::default()));

pub(crate) fn record_planning_duration(elapsed: Duration) {
    let mut stats = STATS.lock().unwrap_or_else(|e| e.into_inner());
    stats.total += elapsed;
    stats.count += 1;
}

/// Mean wall-clock duration of planning calls since the last reset.
pub fn average_planning_time() -> Option<Duration> {
    let stats = STATS.lock().unwrap_or_else(|e| e.into_inner());
    if stats.count == 0 {
        None
    } else {
        Some(stats.total / stats.count as u32)
    }
}

/// Clear all caches and performance counters. Intended for test suites that
/// need isolation between cases.
pub fn reset() {
    CACHES.distance.clear();
    CACHES.containment.clear();
    CACHES.crossings.clear();
    CACHES.bounds.clear();
    CACHES
        .last_sweep_s
        .store(PROCESS_START.elapsed().as_secs(), Ordering::Relaxed);
    let mut stats = STATS.lock().unwrap_or_else(|e| e.into_inner());
    *stats = PlanningStats::default();
}
