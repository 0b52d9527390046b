//! Notifications from the simulation to the presentation layer.
//!
//! The simulation queues [`FarmEvent`]s while it runs; the shell drains the
//! queue once per frame and routes each event to a [`FarmListener`]. Every
//! listener method has an empty default, so a missing presentation layer is
//! just [`NoopListener`].

/// Which cosmetic layer a surface action wipes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceLayer {
    /// The untilled cover over the soil.
    Soil,
    /// Standing wheat.
    Crop,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FarmEvent {
    /// Enough land is tilled; ask whether to plant.
    TillingThresholdReached { percentage: f64 },
    /// The crop entered a new stage.
    StageChanged { stage: String, progress: f64 },
    /// Progress through the current stage moved.
    GrowthProgressed { progress: f64 },
    /// Enough wheat is harvested; selling is available.
    HarvestThresholdReached { pending_yield: u64 },
    SaleForecast { sales_volume: u64, revenue: f64 },
    SaleCommitted { sold: u64, revenue: f64, balance: f64 },
    /// One till or harvest action at a surface position.
    SurfaceErased {
        layer: SurfaceLayer,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// The crop cycle ended; restore every cosmetic layer.
    CoverageReset,
}

#[allow(unused_variables)]
pub trait FarmListener {
    fn on_tilling_threshold_reached(&mut self, percentage: f64) {}

    fn on_stage_changed(&mut self, stage: &str, progress: f64) {}

    fn on_growth_progress(&mut self, progress: f64) {}

    fn on_harvest_threshold_reached(&mut self, pending_yield: u64) {}

    fn on_sale_forecast(&mut self, sales_volume: u64, revenue: f64) {}

    fn on_sale_committed(&mut self, sold: u64, revenue: f64, balance: f64) {}

    fn erase_at(&mut self, layer: SurfaceLayer, x: f64, y: f64, width: f64, height: f64) {}

    fn on_coverage_reset(&mut self) {}
}

/// Listener for when nothing is listening.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl FarmListener for NoopListener {}

/// Route queued events to a listener in order.
pub fn dispatch<I>(events: I, listener: &mut dyn FarmListener)
where
    I: IntoIterator<Item = FarmEvent>,
{
    for event in events {
        match event {
            FarmEvent::TillingThresholdReached { percentage } => {
                listener.on_tilling_threshold_reached(percentage)
            }
            FarmEvent::StageChanged { stage, progress } => {
                listener.on_stage_changed(&stage, progress)
            }
            FarmEvent::GrowthProgressed { progress } => listener.on_growth_progress(progress),
            FarmEvent::HarvestThresholdReached { pending_yield } => {
                listener.on_harvest_threshold_reached(pending_yield)
            }
            FarmEvent::SaleForecast {
                sales_volume,
                revenue,
            } => listener.on_sale_forecast(sales_volume, revenue),
            FarmEvent::SaleCommitted {
                sold,
                revenue,
                balance,
            } => listener.on_sale_committed(sold, revenue, balance),
            FarmEvent::SurfaceErased {
                layer,
                x,
                y,
                width,
                height,
            } => listener.erase_at(layer, x, y, width, height),
            FarmEvent::CoverageReset => listener.on_coverage_reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl FarmListener for Recorder {
        fn on_tilling_threshold_reached(&mut self, percentage: f64) {
            self.calls.push(format!("till {}", percentage));
        }

        fn on_stage_changed(&mut self, stage: &str, progress: f64) {
            self.calls.push(format!("stage {} {}", stage, progress));
        }

        fn on_sale_committed(&mut self, sold: u64, _revenue: f64, balance: f64) {
            self.calls.push(format!("sold {} -> {}", sold, balance));
        }
    }

    #[test]
    fn dispatch_preserves_order_and_skips_defaults() {
        let mut r = Recorder::default();
        dispatch(
            vec![
                FarmEvent::TillingThresholdReached { percentage: 61.0 },
                FarmEvent::GrowthProgressed { progress: 5.0 },
                FarmEvent::StageChanged {
                    stage: "Seeds".into(),
                    progress: 0.0,
                },
                FarmEvent::SaleCommitted {
                    sold: 80,
                    revenue: 800.0,
                    balance: 800.0,
                },
            ],
            &mut r,
        );
        assert_eq!(r.calls, vec!["till 61", "stage Seeds 0", "sold 80 -> 800"]);
    }

    #[test]
    fn noop_listener_accepts_everything() {
        dispatch(
            vec![FarmEvent::CoverageReset, FarmEvent::GrowthProgressed { progress: 1.0 }],
            &mut NoopListener,
        );
    }
}
