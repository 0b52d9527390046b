//! Wheat Farm: a tractor-driven crop cycle with a price-setting market.
//!
//! The simulation core (`coverage`, `growth`, `market`, `sim`) knows nothing
//! about the screen. [`FarmGame`] glues it to the browser: input becomes
//! commands, time becomes scaled seconds, and queued farm events are routed
//! to the presentation state once per update.

pub mod actions;
pub mod config;
pub mod coverage;
pub mod error;
pub mod events;
pub mod growth;
pub mod land;
pub mod logic;
pub mod market;
pub mod render;
pub mod sim;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::clock::{SimClock, TimeControl};
use crate::input::{ClickState, InputEvent};

use config::FarmConfig;
use events::dispatch;
use land::{LandGrid, LandRegistry, PlotCoord};
use sim::Farm;
use state::FarmState;

pub struct FarmGame {
    pub config: FarmConfig,
    pub land: LandGrid,
    pub farm: Farm,
    pub state: FarmState,
    pub time: TimeControl,
    clock: SimClock,
}

impl FarmGame {
    /// `config` should already have passed [`FarmConfig::validate`].
    pub fn new(config: FarmConfig) -> Self {
        let (sx, sy) = config.starting_plot;
        let state = FarmState::new(
            config.field_size(),
            PlotCoord::new(sx, sy),
            config.plot_size,
            config.base_price,
        );
        let mut game = Self {
            land: LandGrid::new(&config),
            farm: Farm::new(&config),
            state,
            time: TimeControl::default(),
            clock: SimClock::new(),
            config,
        };
        game.sync();
        game
    }

    /// Handle an input event. Returns true if the event did something.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let cmd = match event {
            InputEvent::Key(c) => logic::command_for_key(*c, &self.state),
            InputEvent::Click(id) => logic::command_for_click(*id, self.config.grid_size),
        };
        let Some(cmd) = cmd else {
            return false;
        };
        let handled = logic::execute(self, cmd);
        self.sync();
        handled
    }

    /// Advance to wall-clock time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let scaled = self.clock.update(now_ms, self.time.multiplier());
        self.tick(scaled);
    }

    /// Advance by `scaled_secs` of simulated time.
    pub fn tick(&mut self, scaled_secs: f64) {
        self.farm.tick(scaled_secs);
        self.state.tick_animation();
        self.sync();
    }

    /// Deliver queued farm events and refresh the HUD numbers.
    fn sync(&mut self) {
        dispatch(self.farm.drain_events(), &mut self.state);
        self.state.open_deferred_prompt(self.farm.growth().is_planted());
        self.state.tilling_pct = self.farm.tilling_stats(&self.land).percentage;
        self.state.harvest_pct = self.farm.harvest_stats_cached(&self.land).percentage;
        self.state.owned_plots = self.land.owned_plot_count();
        self.state.money = self.farm.market().money();
        self.state.set_harvestable(self.farm.growth().is_harvestable());
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KEY_ENTER, KEY_ESC};
    use state::Dialog;

    fn key(game: &mut FarmGame, c: char) -> bool {
        game.handle_input(&InputEvent::Key(c))
    }

    /// Sweep the tractor over the starting plot (x 12..24, y 24..36) until
    /// the planting prompt opens.
    fn till_until_prompt(game: &mut FarmGame) {
        // Drive to the top-left corner of the plot
        for _ in 0..5 {
            key(game, 'a');
        }
        for _ in 0..5 {
            key(game, 'w');
        }
        'rows: for row in 0..4 {
            let dir = if row % 2 == 0 { 'd' } else { 'a' };
            for _ in 0..11 {
                key(game, dir);
                if matches!(game.state.dialog, Dialog::Planting { .. }) {
                    break 'rows;
                }
            }
            for _ in 0..3 {
                key(game, 's');
                if matches!(game.state.dialog, Dialog::Planting { .. }) {
                    break 'rows;
                }
            }
        }
    }

    fn grow(game: &mut FarmGame) {
        for _ in 0..200 {
            game.tick(0.5);
        }
    }

    #[test]
    fn new_game_starts_idle() {
        let g = FarmGame::new(FarmConfig::default());
        assert_eq!(g.state.dialog, Dialog::None);
        assert_eq!(g.state.owned_plots, 1);
        assert_eq!(g.state.tilling_pct, 0.0);
        assert_eq!(g.state.stage, None);
    }

    #[test]
    fn driving_tills_and_prompts() {
        let mut g = FarmGame::new(FarmConfig::default());
        till_until_prompt(&mut g);
        assert!(matches!(g.state.dialog, Dialog::Planting { .. }));
        assert!(g.state.tilling_pct >= 60.0);
    }

    #[test]
    fn declining_then_confirming_plants() {
        let mut g = FarmGame::new(FarmConfig::default());
        till_until_prompt(&mut g);
        key(&mut g, KEY_ESC);
        assert_eq!(g.state.dialog, Dialog::None);
        assert!(!g.farm.growth().is_planted());

        // Any further tilling re-offers the prompt
        key(&mut g, 'd');
        assert!(matches!(g.state.dialog, Dialog::Planting { .. }));
        key(&mut g, KEY_ENTER);
        assert!(g.farm.growth().is_growing());
        assert_eq!(g.state.stage.as_deref(), Some("Seeds"));
    }

    #[test]
    fn paused_game_does_not_grow() {
        let mut g = FarmGame::new(FarmConfig::default());
        g.farm.force_plant().unwrap();
        key(&mut g, ' ');
        g.frame(0.0);
        for i in 1..=120 {
            g.frame(i as f64 * 16.0);
        }
        assert_eq!(g.farm.growth().progress_percentage(), 0.0);
        key(&mut g, '5');
        g.frame(120.0 * 16.0 + 100.0);
        assert!((g.farm.growth().cycle().progress_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn full_season_through_input() {
        let mut g = FarmGame::new(FarmConfig::default());
        key(&mut g, 't');
        assert!(matches!(g.state.dialog, Dialog::Planting { .. }));
        key(&mut g, 'y');
        grow(&mut g);
        assert!(g.state.harvestable);
        assert_eq!(g.state.stage.as_deref(), Some("Wheat"));
        assert!(g.state.cover.crop_standing(18, 30));

        // Not enough harvest yet
        assert!(!key(&mut g, 'v'));

        // Sweep the plot with the tractor to harvest
        for _ in 0..5 {
            key(&mut g, 'a');
        }
        for _ in 0..5 {
            key(&mut g, 'w');
        }
        for row in 0..4 {
            let dir = if row % 2 == 0 { 'd' } else { 'a' };
            for _ in 0..11 {
                key(&mut g, dir);
            }
            for _ in 0..3 {
                key(&mut g, 's');
            }
        }
        assert!(g.state.sell_available);
        assert!(g.state.pending_yield >= 80);

        assert!(key(&mut g, 'v'));
        assert_eq!(g.state.dialog, Dialog::Sell);
        assert!(g.state.forecast.is_some());
        key(&mut g, '+');
        key(&mut g, '+');
        assert_eq!(g.state.price_input, 11.0);

        let pending = g.state.pending_yield;
        key(&mut g, KEY_ENTER);
        let sold = (pending as f64 * (1.0 / (1.1f64 * 1.1))).floor();
        assert!((g.state.money - sold * 11.0).abs() < 1e-6);
        assert_eq!(g.state.dialog, Dialog::None);
        assert_eq!(g.state.stage, None);
        assert!(g.state.cover.soil_covered(18, 30));
    }

    #[test]
    fn prompt_behind_dialog_opens_after_it_closes() {
        let mut g = FarmGame::new(FarmConfig::default());
        g.state.dialog = Dialog::LandPurchase {
            plot: PlotCoord::new(1, 1),
        };
        g.farm.auto_till(&g.land).unwrap();
        g.tick(0.0);
        assert!(matches!(g.state.dialog, Dialog::LandPurchase { .. }));

        key(&mut g, KEY_ESC);
        assert!(matches!(g.state.dialog, Dialog::Planting { .. }));
        key(&mut g, KEY_ENTER);
        assert!(g.farm.growth().is_growing());
    }

    #[test]
    fn clicks_route_like_keys() {
        let mut g = FarmGame::new(FarmConfig::default());
        assert!(g.handle_input(&InputEvent::Click(actions::SPEED_DOUBLE)));
        assert_eq!(g.time.multiplier(), 2.0);
        assert!(g.handle_input(&InputEvent::Click(actions::TOGGLE_PAUSE)));
        assert_eq!(g.time.multiplier(), 0.0);
        assert!(!g.handle_input(&InputEvent::Click(9999)));
    }
}
