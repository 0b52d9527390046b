//! The farm simulation context.
//!
//! [`Farm`] owns the two coverage trackers, the crop state machine and the
//! market, and wires them together: tilling enough land offers planting,
//! planting starts growth, a grown crop can be harvested, and enough harvest
//! opens the market. Land is borrowed per call so purchases between calls are
//! always seen.

use log::{debug, info, warn};

use super::config::FarmConfig;
use super::coverage::{CoverageCache, CoverageStats, CoverageTracker, SampleKey};
use super::error::FarmError;
use super::events::{FarmEvent, SurfaceLayer};
use super::growth::{GrowthMachine, StageChange};
use super::land::LandRegistry;
use super::market::{sanitize_price, Market, SaleForecast, SaleReceipt};

pub struct Farm {
    plot_size: f64,
    grid_size: i32,
    brush_width: f64,
    brush_height: f64,
    auto_till_step: f64,
    tilling: CoverageTracker,
    harvest: CoverageTracker,
    harvest_cache: CoverageCache,
    growth: GrowthMachine,
    market: Market,
    /// Scaled seconds simulated so far.
    sim_secs: f64,
    events: Vec<FarmEvent>,
}

impl Farm {
    pub fn new(config: &FarmConfig) -> Self {
        Self {
            plot_size: config.plot_size,
            grid_size: config.grid_size,
            brush_width: config.brush_width,
            brush_height: config.brush_height,
            auto_till_step: config.auto_till_step,
            tilling: CoverageTracker::new(config.tilling_threshold_pct),
            harvest: CoverageTracker::new(config.harvest_threshold_pct),
            harvest_cache: CoverageCache::new(config.harvest_cache_secs),
            growth: GrowthMachine::new(config.stages.clone()),
            market: Market::new(config.base_price, config.yield_per_plot),
            sim_secs: 0.0,
            events: Vec::new(),
        }
    }

    // ── Surface actions ────────────────────────────────────────────

    /// Insert one sample into `layer`'s tracker if it lands on owned land.
    fn sample(&mut self, layer: SurfaceLayer, land: &dyn LandRegistry, x: f64, y: f64) -> bool {
        let Some(key) = SampleKey::from_surface(x, y) else {
            return false;
        };
        let plot = key.plot(self.plot_size);
        if !land.is_plot_owned(plot.x, plot.y) {
            return false;
        }
        match layer {
            SurfaceLayer::Soil => self.tilling.record_key(key),
            SurfaceLayer::Crop => self.harvest.record_key(key),
        }
    }

    /// Record a single tilled coordinate and re-check the planting threshold.
    pub fn record_tilling(&mut self, land: &dyn LandRegistry, x: f64, y: f64) -> bool {
        let added = self.sample(SurfaceLayer::Soil, land, x, y);
        self.check_tilling_progress(land);
        added
    }

    /// Record a single harvested coordinate and re-check sale readiness.
    pub fn record_harvest(
        &mut self,
        land: &dyn LandRegistry,
        x: f64,
        y: f64,
    ) -> Result<bool, FarmError> {
        if !self.growth.is_harvestable() {
            return Err(FarmError::NotHarvestable);
        }
        let added = self.sample(SurfaceLayer::Crop, land, x, y);
        self.check_harvest_progress(land);
        Ok(added)
    }

    /// One tractor pass at `(x, y)`: tills before planting, harvests once the
    /// crop is harvestable, and does nothing while it grows.
    pub fn drive_over(&mut self, land: &dyn LandRegistry, x: f64, y: f64) -> Option<SurfaceLayer> {
        let layer = if !self.growth.is_planted() {
            SurfaceLayer::Soil
        } else if self.growth.is_harvestable() {
            SurfaceLayer::Crop
        } else {
            return None;
        };

        let cols = self.brush_width.round().max(1.0) as usize;
        let rows = self.brush_height.round().max(1.0) as usize;
        let left = x - (cols as f64 - 1.0) / 2.0;
        let top = y - (rows as f64 - 1.0) / 2.0;
        for i in 0..cols {
            for j in 0..rows {
                let (sx, sy) = (left + i as f64, top + j as f64);
                match layer {
                    SurfaceLayer::Soil => {
                        self.record_tilling(land, sx, sy);
                    }
                    SurfaceLayer::Crop => {
                        if let Err(e) = self.record_harvest(land, sx, sy) {
                            warn!("harvest pass stopped: {}", e);
                            return None;
                        }
                    }
                }
            }
        }
        self.events.push(FarmEvent::SurfaceErased {
            layer,
            x,
            y,
            width: self.brush_width,
            height: self.brush_height,
        });
        Some(layer)
    }

    // ── Tilling → planting ─────────────────────────────────────────

    /// Fire the planting prompt the first time the threshold is met.
    pub fn check_tilling_progress(&mut self, land: &dyn LandRegistry) -> bool {
        if self.growth.is_planted() {
            return false;
        }
        let stats = self.tilling.stats(land);
        debug!(
            "tilling check: {:.2}% (threshold: {}%)",
            stats.percentage,
            self.tilling.threshold_pct()
        );
        if self.tilling.check_progress(land) {
            info!("tilling threshold reached at {:.2}%", stats.percentage);
            self.events.push(FarmEvent::TillingThresholdReached {
                percentage: stats.percentage,
            });
            return true;
        }
        false
    }

    pub fn tilling_stats(&self, land: &dyn LandRegistry) -> CoverageStats {
        self.tilling.stats(land)
    }

    /// The player accepted the planting prompt: plant and start growing.
    pub fn confirm_planting(&mut self) -> Result<StageChange, FarmError> {
        if !self.tilling.has_fired() {
            return Err(FarmError::TillingIncomplete);
        }
        self.plant_and_grow()
    }

    /// The player declined; the prompt may be offered again.
    pub fn cancel_planting(&mut self) {
        if self.growth.is_planted() {
            return;
        }
        info!("planting declined");
        self.tilling.rearm();
    }

    /// Plant regardless of tilling coverage. Testing hook.
    pub fn force_plant(&mut self) -> Result<StageChange, FarmError> {
        self.plant_and_grow()
    }

    fn plant_and_grow(&mut self) -> Result<StageChange, FarmError> {
        let change = self.growth.plant()?;
        self.events.push(FarmEvent::StageChanged {
            stage: change.name.clone(),
            progress: 0.0,
        });
        self.start_growth()?;
        Ok(change)
    }

    /// Start the stage timer on a freshly planted crop.
    pub fn start_growth(&mut self) -> Result<(), FarmError> {
        self.growth.start_growth()
    }

    /// Fill every owned plot with tilling samples, then re-check. Testing hook.
    pub fn auto_till(&mut self, land: &dyn LandRegistry) -> Result<CoverageStats, FarmError> {
        if self.growth.is_planted() {
            return Err(FarmError::AlreadyPlanted);
        }
        self.tilling.reset();
        let step = self.auto_till_step;
        for py in 0..self.grid_size {
            for px in 0..self.grid_size {
                if !land.is_plot_owned(px, py) {
                    continue;
                }
                let x0 = (px as f64 * self.plot_size).floor();
                let y0 = (py as f64 * self.plot_size).floor();
                let x1 = ((px + 1) as f64 * self.plot_size).floor();
                let y1 = ((py + 1) as f64 * self.plot_size).floor();
                let cols = ((x1 - x0) / step).ceil().max(0.0) as usize;
                let rows = ((y1 - y0) / step).ceil().max(0.0) as usize;
                for i in 0..cols {
                    for j in 0..rows {
                        let (sx, sy) = (x0 + i as f64 * step, y0 + j as f64 * step);
                        self.sample(SurfaceLayer::Soil, land, sx, sy);
                    }
                }
                let half = self.plot_size / 2.0;
                self.events.push(FarmEvent::SurfaceErased {
                    layer: SurfaceLayer::Soil,
                    x: px as f64 * self.plot_size + half,
                    y: py as f64 * self.plot_size + half,
                    width: self.plot_size,
                    height: self.plot_size,
                });
            }
        }
        let stats = self.tilling.stats(land);
        info!(
            "auto-tilled {} samples ({:.2}%)",
            stats.sample_count, stats.percentage
        );
        self.check_tilling_progress(land);
        Ok(stats)
    }

    // ── Growth ─────────────────────────────────────────────────────

    /// Advance by `scaled_secs` (wall time × speed multiplier; 0 when paused).
    pub fn tick(&mut self, scaled_secs: f64) {
        if scaled_secs > 0.0 {
            self.sim_secs += scaled_secs;
        }
        match self.growth.tick(scaled_secs) {
            Some(change) => self.events.push(FarmEvent::StageChanged {
                stage: change.name,
                progress: self.growth.progress_percentage(),
            }),
            None if self.growth.is_growing() && scaled_secs > 0.0 => {
                self.events.push(FarmEvent::GrowthProgressed {
                    progress: self.growth.progress_percentage(),
                });
            }
            None => {}
        }
    }

    /// Skip to the next stage. Testing hook; only while growing.
    pub fn force_advance(&mut self) -> Result<StageChange, FarmError> {
        if !self.growth.is_planted() {
            return Err(FarmError::NotPlanted);
        }
        if !self.growth.is_growing() {
            return Err(FarmError::NotGrowing);
        }
        let change = self.growth.advance_stage().ok_or(FarmError::NotGrowing)?;
        self.events.push(FarmEvent::StageChanged {
            stage: change.name.clone(),
            progress: self.growth.progress_percentage(),
        });
        Ok(change)
    }

    // ── Harvest → market ───────────────────────────────────────────

    /// Open the market the first time harvested coverage meets the threshold.
    pub fn check_harvest_progress(&mut self, land: &dyn LandRegistry) -> bool {
        if self.market.is_ready_to_sell() {
            return false;
        }
        if !self.harvest.check_progress(land) {
            return false;
        }
        let stats = self.harvest.stats(land);
        if let Some(pending_yield) = self.market.mark_harvest_ready(stats.owned_plots, stats.percentage)
        {
            self.events
                .push(FarmEvent::HarvestThresholdReached { pending_yield });
        }
        true
    }

    pub fn harvest_stats(&self, land: &dyn LandRegistry) -> CoverageStats {
        self.harvest.stats(land)
    }

    /// Harvest stats for per-frame display, recomputed at most once per cache
    /// interval of simulated time.
    pub fn harvest_stats_cached(&mut self, land: &dyn LandRegistry) -> CoverageStats {
        self.harvest_cache.get(self.sim_secs, &self.harvest, land)
    }

    /// Pure preview of a sale at `raw_price`.
    pub fn forecast(&self, raw_price: f64) -> SaleForecast {
        self.market
            .forecast(sanitize_price(raw_price, self.market.base_price()))
    }

    /// Preview a sale and notify the presentation layer.
    pub fn preview_sale(&mut self, raw_price: f64) -> SaleForecast {
        let forecast = self.forecast(raw_price);
        self.events.push(FarmEvent::SaleForecast {
            sales_volume: forecast.sales_volume,
            revenue: forecast.revenue,
        });
        forecast
    }

    /// Sell the pending harvest and start a fresh crop cycle.
    pub fn confirm_sale(&mut self, raw_price: f64) -> Result<SaleReceipt, FarmError> {
        if !self.market.is_ready_to_sell() {
            return Err(FarmError::NothingToSell);
        }
        let price = sanitize_price(raw_price, self.market.base_price());
        let receipt = self.market.commit_sale(price);
        self.reset_cycle();
        self.events.push(FarmEvent::SaleCommitted {
            sold: receipt.sold,
            revenue: receipt.revenue,
            balance: receipt.balance,
        });
        Ok(receipt)
    }

    /// Abandon the current cycle. Money is kept; pending produce is lost.
    pub fn reset(&mut self) {
        if self.market.pending_yield() > 0 {
            warn!(
                "reset discards {} unsold units",
                self.market.pending_yield()
            );
        }
        self.market.clear_pending();
        self.reset_cycle();
    }

    fn reset_cycle(&mut self) {
        self.tilling.reset();
        self.harvest.reset();
        self.harvest_cache.invalidate();
        self.growth.reset();
        self.events.push(FarmEvent::CoverageReset);
        info!("crop cycle reset");
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<FarmEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn growth(&self) -> &GrowthMachine {
        &self.growth
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn tilling(&self) -> &CoverageTracker {
        &self.tilling
    }

    pub fn harvest(&self) -> &CoverageTracker {
        &self.harvest
    }

    pub fn sim_secs(&self) -> f64 {
        self.sim_secs
    }
}
