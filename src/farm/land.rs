//! Land ownership.
//!
//! The simulation only ever reads land through [`LandRegistry`]. [`LandGrid`]
//! is the registry the game ships with: a square grid of purchasable plots
//! that grows by buying plots next to land already owned.

use std::collections::BTreeSet;

use log::info;

use super::config::FarmConfig;
use super::error::LandError;

/// Integer grid coordinate of one plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlotCoord {
    pub x: i32,
    pub y: i32,
}

impl PlotCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The plot containing a surface coordinate.
    pub fn containing(sx: f64, sy: f64, plot_size: f64) -> Self {
        Self {
            x: (sx / plot_size).floor() as i32,
            y: (sy / plot_size).floor() as i32,
        }
    }

    /// The four edge-sharing neighbours.
    pub fn neighbours(self) -> [PlotCoord; 4] {
        [
            PlotCoord::new(self.x, self.y - 1),
            PlotCoord::new(self.x, self.y + 1),
            PlotCoord::new(self.x - 1, self.y),
            PlotCoord::new(self.x + 1, self.y),
        ]
    }
}

/// Read-only view of owned land.
pub trait LandRegistry {
    fn owned_plot_count(&self) -> usize;

    /// Surface area of a single plot.
    fn plot_area_unit(&self) -> f64;

    fn is_plot_owned(&self, x: i32, y: i32) -> bool;

    fn owned_area(&self) -> f64 {
        self.owned_plot_count() as f64 * self.plot_area_unit()
    }
}

/// Stand-in when no land collaborator exists: nothing is owned.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLand;

impl LandRegistry for NoLand {
    fn owned_plot_count(&self) -> usize {
        0
    }

    fn plot_area_unit(&self) -> f64 {
        0.0
    }

    fn is_plot_owned(&self, _x: i32, _y: i32) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct LandGrid {
    grid_size: i32,
    plot_size: f64,
    price: u64,
    owned: BTreeSet<PlotCoord>,
}

impl LandGrid {
    pub fn new(config: &FarmConfig) -> Self {
        let (x, y) = config.starting_plot;
        let mut owned = BTreeSet::new();
        owned.insert(PlotCoord::new(x, y));
        Self {
            grid_size: config.grid_size,
            plot_size: config.plot_size,
            price: config.land_price,
            owned,
        }
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn plot_size(&self) -> f64 {
        self.plot_size
    }

    pub fn total_plots(&self) -> usize {
        let side = self.grid_size.max(0) as usize;
        side * side
    }

    /// Price shown for a plot. Flat for now.
    pub fn price_of(&self, _plot: PlotCoord) -> u64 {
        self.price
    }

    pub fn owned(&self) -> impl Iterator<Item = &PlotCoord> {
        self.owned.iter()
    }

    pub fn in_bounds(&self, plot: PlotCoord) -> bool {
        plot.x >= 0 && plot.y >= 0 && plot.x < self.grid_size && plot.y < self.grid_size
    }

    pub fn is_owned(&self, plot: PlotCoord) -> bool {
        self.owned.contains(&plot)
    }

    pub fn is_adjacent_to_owned(&self, plot: PlotCoord) -> bool {
        plot.neighbours().iter().any(|n| self.owned.contains(n))
    }

    /// Whether the land-selection cursor may stand on this plot.
    pub fn is_reachable(&self, plot: PlotCoord) -> bool {
        self.in_bounds(plot) && (self.is_owned(plot) || self.is_adjacent_to_owned(plot))
    }

    /// Check a purchase without performing it.
    pub fn check_purchase(&self, plot: PlotCoord) -> Result<(), LandError> {
        let PlotCoord { x, y } = plot;
        if !self.in_bounds(plot) {
            return Err(LandError::OutOfBounds {
                x,
                y,
                grid_size: self.grid_size,
            });
        }
        if self.is_owned(plot) {
            return Err(LandError::AlreadyOwned { x, y });
        }
        if !self.is_adjacent_to_owned(plot) {
            return Err(LandError::NotAdjacent { x, y });
        }
        Ok(())
    }

    pub fn purchase(&mut self, plot: PlotCoord) -> Result<(), LandError> {
        self.check_purchase(plot)?;
        self.owned.insert(plot);
        info!(
            "purchased plot ({}, {}), {} plots owned",
            plot.x,
            plot.y,
            self.owned.len()
        );
        Ok(())
    }
}

impl LandRegistry for LandGrid {
    fn owned_plot_count(&self) -> usize {
        self.owned.len()
    }

    fn plot_area_unit(&self) -> f64 {
        self.plot_size * self.plot_size
    }

    fn is_plot_owned(&self, x: i32, y: i32) -> bool {
        self.owned.contains(&PlotCoord::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> LandGrid {
        LandGrid::new(&FarmConfig::default())
    }

    #[test]
    fn starts_with_one_plot() {
        let land = grid();
        assert_eq!(land.owned_plot_count(), 1);
        assert!(land.is_plot_owned(1, 2));
        assert_eq!(land.plot_area_unit(), 144.0);
        assert_eq!(land.owned_area(), 144.0);
        assert_eq!(land.total_plots(), 9);
    }

    #[test]
    fn no_land_has_zero_area() {
        assert_eq!(NoLand.owned_plot_count(), 0);
        assert_eq!(NoLand.owned_area(), 0.0);
        assert!(!NoLand.is_plot_owned(0, 0));
    }

    #[test]
    fn containing_plot() {
        assert_eq!(PlotCoord::containing(0.0, 0.0, 12.0), PlotCoord::new(0, 0));
        assert_eq!(PlotCoord::containing(11.9, 12.0, 12.0), PlotCoord::new(0, 1));
        assert_eq!(PlotCoord::containing(-0.5, 5.0, 12.0), PlotCoord::new(-1, 0));
    }

    #[test]
    fn purchase_adjacent_plot() {
        let mut land = grid();
        assert!(land.purchase(PlotCoord::new(1, 1)).is_ok());
        assert_eq!(land.owned_plot_count(), 2);
        assert_eq!(land.owned_area(), 288.0);
    }

    #[test]
    fn purchase_rejects_diagonal() {
        let mut land = grid();
        assert_eq!(
            land.purchase(PlotCoord::new(0, 1)),
            Err(LandError::NotAdjacent { x: 0, y: 1 })
        );
    }

    #[test]
    fn purchase_rejects_owned_and_out_of_bounds() {
        let mut land = grid();
        assert_eq!(
            land.purchase(PlotCoord::new(1, 2)),
            Err(LandError::AlreadyOwned { x: 1, y: 2 })
        );
        assert!(matches!(
            land.purchase(PlotCoord::new(1, 3)),
            Err(LandError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn reachability_follows_ownership() {
        let mut land = grid();
        assert!(land.is_reachable(PlotCoord::new(1, 2)));
        assert!(land.is_reachable(PlotCoord::new(0, 2)));
        assert!(!land.is_reachable(PlotCoord::new(0, 0)));
        land.purchase(PlotCoord::new(0, 2)).unwrap();
        land.purchase(PlotCoord::new(0, 1)).unwrap();
        assert!(land.is_reachable(PlotCoord::new(0, 0)));
    }

    #[test]
    fn flat_price() {
        let land = grid();
        assert_eq!(land.price_of(PlotCoord::new(0, 0)), 1000);
        assert_eq!(land.price_of(PlotCoord::new(2, 2)), 1000);
    }
}
