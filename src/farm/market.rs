//! Price/demand market for harvested wheat.
//!
//! Demand falls off with the square of the price ratio: double the base price
//! and only a quarter of the harvest sells. Demand never exceeds the harvest,
//! so pricing below base does not sell more than was grown.

use log::info;

/// Replace a non-positive or non-numeric price with the base price.
pub fn sanitize_price(raw: f64, base_price: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        base_price
    }
}

/// Share of the harvest the market takes at `price`, in 0..=1.
pub fn demand_multiplier(price: f64, base_price: f64) -> f64 {
    let ratio = price / base_price;
    (1.0 / (ratio * ratio)).min(1.0)
}

/// What a sale at a given price would do. Computing one changes nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaleForecast {
    pub price: f64,
    pub demand_multiplier: f64,
    pub sales_volume: u64,
    pub revenue: f64,
}

impl SaleForecast {
    /// Percent of the pending harvest this sale moves.
    pub fn sell_through_pct(&self, pending_yield: u64) -> f64 {
        if pending_yield == 0 {
            return 0.0;
        }
        self.sales_volume as f64 / pending_yield as f64 * 100.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaleReceipt {
    pub sold: u64,
    pub revenue: f64,
    pub balance: f64,
}

#[derive(Clone, Debug)]
pub struct Market {
    base_price: f64,
    yield_per_plot: u64,
    money: f64,
    pending_yield: u64,
    ready_to_sell: bool,
}

impl Market {
    pub fn new(base_price: f64, yield_per_plot: u64) -> Self {
        Self {
            base_price,
            yield_per_plot,
            money: 0.0,
            pending_yield: 0,
            ready_to_sell: false,
        }
    }

    /// Units produced by `owned_plots` at the given harvested coverage.
    /// Coverage above 100% counts as 100%.
    pub fn compute_yield(&self, owned_plots: usize, harvested_pct: f64) -> u64 {
        let pct = harvested_pct.clamp(0.0, 100.0);
        let max_possible = owned_plots as f64 * self.yield_per_plot as f64;
        (max_possible * pct / 100.0).floor() as u64
    }

    /// Fix the pending yield for this harvest. Only the first call per cycle
    /// has an effect; returns the yield when it does.
    pub fn mark_harvest_ready(&mut self, owned_plots: usize, harvested_pct: f64) -> Option<u64> {
        if self.ready_to_sell {
            return None;
        }
        self.ready_to_sell = true;
        self.pending_yield = self.compute_yield(owned_plots, harvested_pct);
        info!(
            "harvest ready: {} units from {} plots at {:.1}%",
            self.pending_yield, owned_plots, harvested_pct
        );
        Some(self.pending_yield)
    }

    /// `price` must be positive; see [`sanitize_price`].
    pub fn forecast(&self, price: f64) -> SaleForecast {
        let demand = demand_multiplier(price, self.base_price);
        let volume = (self.pending_yield as f64 * demand).floor().max(0.0) as u64;
        SaleForecast {
            price,
            demand_multiplier: demand,
            sales_volume: volume,
            revenue: volume as f64 * price,
        }
    }

    /// Sell at `price`: credit the revenue and clear the pending harvest.
    pub fn commit_sale(&mut self, price: f64) -> SaleReceipt {
        let forecast = self.forecast(price);
        self.money += forecast.revenue;
        self.clear_pending();
        info!(
            "sold {} units for ${:.2}, balance ${:.2}",
            forecast.sales_volume, forecast.revenue, self.money
        );
        SaleReceipt {
            sold: forecast.sales_volume,
            revenue: forecast.revenue,
            balance: self.money,
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending_yield = 0;
        self.ready_to_sell = false;
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn pending_yield(&self) -> u64 {
        self.pending_yield
    }

    pub fn is_ready_to_sell(&self) -> bool {
        self.ready_to_sell
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_volume_never_exceeds_pending(pending in 0u64..10_000, price in 0.01f64..1000.0) {
            let mut m = Market::new(10.0, 10_000);
            m.mark_harvest_ready(1, pending as f64 / 100.0);
            let f = m.forecast(price);
            prop_assert!(f.sales_volume <= m.pending_yield());
            prop_assert!(f.revenue >= 0.0);
        }

        #[test]
        fn prop_demand_within_unit_interval(price in 0.01f64..1000.0) {
            let d = demand_multiplier(price, 10.0);
            prop_assert!(d > 0.0 && d <= 1.0);
        }

        #[test]
        fn prop_demand_non_increasing_in_price(a in 0.01f64..500.0, b in 0.01f64..500.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(demand_multiplier(hi, 10.0) <= demand_multiplier(lo, 10.0));
        }
    }
}
