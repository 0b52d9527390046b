//! Surface coverage tracking shared by tilling and harvesting.
//!
//! Each till or harvest action drops a sample at a rounded surface
//! coordinate. Coverage is the number of distinct samples relative to the
//! owned area, so it is always recomputed from whatever land is owned right
//! now.

use std::collections::HashSet;

use super::land::{LandRegistry, PlotCoord};

/// A discretized surface coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleKey {
    pub x: i64,
    pub y: i64,
}

impl SampleKey {
    /// Round a continuous coordinate to the nearest unit, halves up.
    /// Non-finite input has no key.
    pub fn from_surface(x: f64, y: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self {
            x: (x + 0.5).floor() as i64,
            y: (y + 0.5).floor() as i64,
        })
    }

    pub fn plot(self, plot_size: f64) -> PlotCoord {
        PlotCoord::containing(self.x as f64, self.y as f64, plot_size)
    }
}

/// The set of surface units acted upon during one crop cycle.
/// Grows monotonically until [`SurfaceSamples::clear`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceSamples {
    keys: HashSet<SampleKey>,
}

impl SurfaceSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was not present before.
    pub fn insert(&mut self, key: SampleKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: SampleKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Derived coverage numbers. Never stored by the trackers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverageStats {
    pub owned_plots: usize,
    pub owned_area: f64,
    pub sample_count: usize,
    /// Percent of owned area covered. May exceed 100 when sampling is denser
    /// than the area unit.
    pub percentage: f64,
}

impl CoverageStats {
    pub fn compute(sample_count: usize, land: &dyn LandRegistry) -> Self {
        let owned_plots = land.owned_plot_count();
        let owned_area = land.owned_area();
        let percentage = if owned_area > 0.0 {
            sample_count as f64 / owned_area * 100.0
        } else {
            0.0
        };
        Self {
            owned_plots,
            owned_area,
            sample_count,
            percentage,
        }
    }

    /// Percentage limited to 0..=100 for consumers that need a fraction.
    pub fn clamped_percentage(&self) -> f64 {
        self.percentage.clamp(0.0, 100.0)
    }
}

/// A sample set plus a one-shot threshold.
///
/// The threshold fires the first time coverage reaches it and stays quiet
/// until [`CoverageTracker::reset`] or an explicit [`CoverageTracker::rearm`].
#[derive(Clone, Debug)]
pub struct CoverageTracker {
    samples: SurfaceSamples,
    threshold_pct: f64,
    fired: bool,
}

impl CoverageTracker {
    pub fn new(threshold_pct: f64) -> Self {
        Self {
            samples: SurfaceSamples::new(),
            threshold_pct,
            fired: false,
        }
    }

    /// Record a continuous coordinate. Idempotent per rounded unit.
    pub fn record(&mut self, x: f64, y: f64) -> bool {
        match SampleKey::from_surface(x, y) {
            Some(key) => self.samples.insert(key),
            None => false,
        }
    }

    pub fn record_key(&mut self, key: SampleKey) -> bool {
        self.samples.insert(key)
    }

    pub fn stats(&self, land: &dyn LandRegistry) -> CoverageStats {
        CoverageStats::compute(self.samples.len(), land)
    }

    /// Returns `true` exactly when this call fires the threshold.
    pub fn check_progress(&mut self, land: &dyn LandRegistry) -> bool {
        if self.fired {
            return false;
        }
        if self.stats(land).percentage >= self.threshold_pct {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Allow the threshold to fire again without discarding samples.
    pub fn rearm(&mut self) {
        self.fired = false;
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.fired = false;
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn samples(&self) -> &SurfaceSamples {
        &self.samples
    }
}

/// Rate-limited coverage query for callers that ask every frame.
///
/// A cached value is reused until `interval_secs` of simulated time pass or
/// the owned plot count changes.
#[derive(Clone, Debug)]
pub struct CoverageCache {
    interval_secs: f64,
    cached: Option<(f64, CoverageStats)>,
}

impl CoverageCache {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            cached: None,
        }
    }

    pub fn get(
        &mut self,
        now_secs: f64,
        tracker: &CoverageTracker,
        land: &dyn LandRegistry,
    ) -> CoverageStats {
        if let Some((at, stats)) = self.cached {
            let fresh = now_secs - at < self.interval_secs;
            if fresh && stats.owned_plots == land.owned_plot_count() {
                return stats;
            }
        }
        let stats = tracker.stats(land);
        if self.interval_secs > 0.0 {
            self.cached = Some((now_secs, stats));
        }
        stats
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
