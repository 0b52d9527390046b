//! Presentation state for the farm screen.
//!
//! Everything here is cosmetic or UI bookkeeping. The simulation reaches it
//! only through the [`FarmListener`] impl at the bottom.

use super::events::{FarmListener, SurfaceLayer};
use super::land::PlotCoord;

/// Field view resolution in mask pixels per side. Two pixel rows share one
/// terminal row via half-blocks.
pub const FIELD_PX: usize = 36;

const MAX_LOG: usize = 30;

/// Frames a blocked land-cursor move flashes red.
const BLOCKED_FLASH_FRAMES: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dialog {
    None,
    /// Tilling threshold reached: plant now?
    Planting { percentage: f64 },
    LandPurchase { plot: PlotCoord },
    /// Second confirmation when buying land with seeds in the ground.
    PlantingWarning { plot: PlotCoord },
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub fn delta(self) -> (f64, f64) {
        match self {
            Heading::Up => (0.0, -1.0),
            Heading::Down => (0.0, 1.0),
            Heading::Left => (-1.0, 0.0),
            Heading::Right => (1.0, 0.0),
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Heading::Up => '▲',
            Heading::Down => '▼',
            Heading::Left => '◀',
            Heading::Right => '▶',
        }
    }
}

/// Tractor position in surface units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tractor {
    pub x: f64,
    pub y: f64,
    pub heading: Heading,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandCursor {
    pub active: bool,
    pub plot: PlotCoord,
    pub blocked_flash: u32,
}

/// Cosmetic cover over the field: un-tilled soil and standing wheat.
///
/// Purely visual. Coverage percentages come from the simulation, never from
/// this mask.
#[derive(Clone, Debug)]
pub struct CoverMask {
    field_size: f64,
    soil: Vec<bool>,
    crop: Vec<bool>,
}

impl CoverMask {
    pub fn new(field_size: f64) -> Self {
        Self {
            field_size,
            soil: vec![true; FIELD_PX * FIELD_PX],
            crop: vec![false; FIELD_PX * FIELD_PX],
        }
    }

    /// Surface units per mask pixel.
    pub fn px_size(&self) -> f64 {
        self.field_size / FIELD_PX as f64
    }

    /// Surface coordinate of a pixel's centre.
    pub fn px_center(&self, col: usize, row: usize) -> (f64, f64) {
        let s = self.px_size();
        ((col as f64 + 0.5) * s, (row as f64 + 0.5) * s)
    }

    /// Clear every pixel overlapping the `width × height` rect centred on
    /// `(x, y)`.
    pub fn erase(&mut self, layer: SurfaceLayer, x: f64, y: f64, width: f64, height: f64) {
        let s = self.px_size();
        if !(s > 0.0) {
            return;
        }
        let span = |lo: f64, hi: f64| {
            let first = ((lo / s).floor() as i64).max(0);
            let last = ((hi / s).floor() as i64 + 1).min(FIELD_PX as i64);
            first as usize..last.max(first) as usize
        };
        let cols = span(x - width / 2.0, x + width / 2.0);
        let rows = span(y - height / 2.0, y + height / 2.0);
        let mask = match layer {
            SurfaceLayer::Soil => &mut self.soil,
            SurfaceLayer::Crop => &mut self.crop,
        };
        for row in rows {
            for col in cols.clone() {
                mask[row * FIELD_PX + col] = false;
            }
        }
    }

    pub fn soil_covered(&self, col: usize, row: usize) -> bool {
        self.soil[row * FIELD_PX + col]
    }

    pub fn crop_standing(&self, col: usize, row: usize) -> bool {
        self.crop[row * FIELD_PX + col]
    }

    /// Grow wheat over the whole field.
    pub fn fill_crop(&mut self) {
        self.crop.iter_mut().for_each(|c| *c = true);
    }

    /// Back to un-tilled soil with no crop.
    pub fn restore(&mut self) {
        self.soil.iter_mut().for_each(|c| *c = true);
        self.crop.iter_mut().for_each(|c| *c = false);
    }
}

pub struct FarmState {
    pub dialog: Dialog,
    pub tractor: Tractor,
    pub land_cursor: LandCursor,
    pub cover: CoverMask,
    /// Stage label, `None` before planting.
    pub stage: Option<String>,
    pub growth_progress: f64,
    pub harvestable: bool,
    pub money: f64,
    pub pending_yield: u64,
    pub sell_available: bool,
    /// Price typed into the sell dialog.
    pub price_input: f64,
    /// Latest `(sales_volume, revenue)` preview.
    pub forecast: Option<(u64, f64)>,
    pub tilling_pct: f64,
    pub harvest_pct: f64,
    pub owned_plots: usize,
    pub log: Vec<String>,
    pub anim_frame: u32,
    /// Planting prompt that fired while another dialog was open.
    pub deferred_planting: Option<f64>,
}

impl FarmState {
    pub fn new(field_size: f64, start: PlotCoord, plot_size: f64, base_price: f64) -> Self {
        Self {
            dialog: Dialog::None,
            tractor: Tractor {
                x: (start.x as f64 + 0.5) * plot_size,
                y: (start.y as f64 + 0.5) * plot_size,
                heading: Heading::Up,
            },
            land_cursor: LandCursor {
                active: false,
                plot: start,
                blocked_flash: 0,
            },
            cover: CoverMask::new(field_size),
            stage: None,
            growth_progress: 0.0,
            harvestable: false,
            money: 0.0,
            pending_yield: 0,
            sell_available: false,
            price_input: base_price,
            forecast: None,
            tilling_pct: 0.0,
            harvest_pct: 0.0,
            owned_plots: 1,
            log: vec!["Welcome to the farm! Drive the tractor to till your plot.".into()],
            anim_frame: 0,
            deferred_planting: None,
        }
    }

    pub fn add_log(&mut self, text: &str) {
        self.log.push(text.to_string());
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Move the tractor `step` units along `heading`, clamped to the field.
    pub fn move_tractor(&mut self, heading: Heading, step: f64, field_size: f64) {
        let (dx, dy) = heading.delta();
        self.tractor.heading = heading;
        self.tractor.x = (self.tractor.x + dx * step).clamp(0.0, field_size);
        self.tractor.y = (self.tractor.y + dy * step).clamp(0.0, field_size);
    }

    pub fn flash_blocked(&mut self) {
        self.land_cursor.blocked_flash = BLOCKED_FLASH_FRAMES;
    }

    /// Nudge the sell price by `delta`, kept within `[min, max]`.
    pub fn adjust_price(&mut self, delta: f64, min: f64, max: f64) {
        self.price_input = (self.price_input + delta).clamp(min, max);
    }

    /// Sync the crop layer with harvestability; wheat appears the moment the
    /// crop turns harvestable.
    pub fn set_harvestable(&mut self, harvestable: bool) {
        if harvestable && !self.harvestable {
            self.cover.fill_crop();
        }
        self.harvestable = harvestable;
    }

    /// Show a deferred planting prompt once no other dialog is up. Dropped if
    /// the crop got planted meanwhile.
    pub fn open_deferred_prompt(&mut self, planted: bool) {
        if self.dialog != Dialog::None {
            return;
        }
        if let Some(percentage) = self.deferred_planting.take() {
            if !planted {
                self.dialog = Dialog::Planting { percentage };
            }
        }
    }

    pub fn tick_animation(&mut self) {
        self.anim_frame = self.anim_frame.wrapping_add(1);
        self.land_cursor.blocked_flash = self.land_cursor.blocked_flash.saturating_sub(1);
    }
}

impl FarmListener for FarmState {
    fn on_tilling_threshold_reached(&mut self, percentage: f64) {
        if self.dialog == Dialog::None {
            self.dialog = Dialog::Planting { percentage };
        } else {
            self.deferred_planting = Some(percentage);
        }
        self.add_log(&format!("{:.1}% of your land is tilled. Ready to plant?", percentage));
    }

    fn on_stage_changed(&mut self, stage: &str, progress: f64) {
        self.growth_progress = progress;
        if self.stage.as_deref() != Some(stage) {
            self.add_log(&format!("Crop stage: {}", stage));
        }
        self.stage = Some(stage.to_string());
    }

    fn on_growth_progress(&mut self, progress: f64) {
        self.growth_progress = progress;
    }

    fn on_harvest_threshold_reached(&mut self, pending_yield: u64) {
        self.pending_yield = pending_yield;
        self.sell_available = true;
        self.add_log(&format!("Harvest ready: {} units of wheat to sell.", pending_yield));
    }

    fn on_sale_forecast(&mut self, sales_volume: u64, revenue: f64) {
        self.forecast = Some((sales_volume, revenue));
    }

    fn on_sale_committed(&mut self, sold: u64, revenue: f64, balance: f64) {
        self.money = balance;
        self.pending_yield = 0;
        self.sell_available = false;
        self.forecast = None;
        if self.dialog == Dialog::Sell {
            self.dialog = Dialog::None;
        }
        self.add_log(&format!("Sold {} units for ${:.2}.", sold, revenue));
    }

    fn erase_at(&mut self, layer: SurfaceLayer, x: f64, y: f64, width: f64, height: f64) {
        self.cover.erase(layer, x, y, width, height);
    }

    fn on_coverage_reset(&mut self) {
        self.cover.restore();
        self.deferred_planting = None;
        self.stage = None;
        self.growth_progress = 0.0;
        self.harvestable = false;
        self.pending_yield = 0;
        self.sell_available = false;
        self.forecast = None;
        if matches!(self.dialog, Dialog::Planting { .. } | Dialog::Sell) {
            self.dialog = Dialog::None;
        }
    }
}
