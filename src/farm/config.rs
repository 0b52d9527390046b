//! Tuning table for the wheat farm.
//!
//! Thresholds, the stage list and per-stage durations changed between
//! revisions of the game, so they are data. A revision is a preset; a custom
//! table can be loaded from JSON, with missing fields taken from the default.

use serde::Deserialize;

use super::error::ConfigError;

/// Preset names accepted by [`FarmConfig::preset`].
pub const PRESET_NAMES: &[&str] = &["terminal", "canvas-v1", "canvas-v2"];

/// Largest grid side. Plot click IDs (`100 + grid²`) must fit a `u16` and
/// every plot needs at least two pixels of the field view.
pub const MAX_GRID_SIZE: i32 = 15;

/// Largest plot side in surface units. Sampling walks every unit, so this
/// bounds the work of one auto-till.
pub const MAX_PLOT_SIZE: f64 = 4096.0;

/// One entry of the ordered growth stage table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StageSpec {
    pub name: String,
    /// Scaled seconds spent in this stage. `None` on the terminal stage.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl StageSpec {
    pub fn timed(name: &str, secs: f64) -> Self {
        Self {
            name: name.to_string(),
            duration_secs: Some(secs),
        }
    }

    pub fn terminal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            duration_secs: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Plots per side of the square land grid.
    pub grid_size: i32,
    /// Side length of one plot in surface units.
    pub plot_size: f64,
    /// The plot owned at the start of the game.
    pub starting_plot: (i32, i32),
    /// Percent of owned area that must be tilled before planting is offered.
    pub tilling_threshold_pct: f64,
    /// Percent of owned area that must be harvested before selling is offered.
    pub harvest_threshold_pct: f64,
    pub stages: Vec<StageSpec>,
    /// Units of wheat one fully harvested plot yields.
    pub yield_per_plot: u64,
    pub base_price: f64,
    /// Displayed plot price. Nothing is charged.
    pub land_price: u64,
    pub min_price: f64,
    pub max_price: f64,
    pub price_step: f64,
    /// Surface units the tractor moves per key press.
    pub tractor_step: f64,
    pub brush_width: f64,
    pub brush_height: f64,
    /// Sample spacing used by the auto-till hook.
    pub auto_till_step: f64,
    /// Minimum simulated seconds between full harvest-stat recomputations
    /// for display. Zero disables the cache.
    pub harvest_cache_secs: f64,
}

fn default_stages() -> Vec<StageSpec> {
    vec![
        StageSpec::timed("Seeds", 10.0),
        StageSpec::timed("Seedlings", 10.0),
        StageSpec::timed("Plantlings", 10.0),
        StageSpec::timed("Plantlings2", 20.0),
        StageSpec::terminal("Wheat"),
    ]
}

impl Default for FarmConfig {
    /// The `terminal` preset: a character-cell field where one surface unit is
    /// one half-block cell.
    fn default() -> Self {
        Self {
            grid_size: 3,
            plot_size: 12.0,
            starting_plot: (1, 2),
            tilling_threshold_pct: 60.0,
            harvest_threshold_pct: 80.0,
            stages: default_stages(),
            yield_per_plot: 100,
            base_price: 10.0,
            land_price: 1000,
            min_price: 1.0,
            max_price: 100.0,
            price_step: 0.5,
            tractor_step: 1.0,
            brush_width: 3.0,
            brush_height: 3.0,
            auto_till_step: 1.0,
            harvest_cache_secs: 0.25,
        }
    }
}

impl FarmConfig {
    /// Look up a named revision of the tuning table.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "terminal" => Self::default(),
            // 560px play area split into a 3x3 grid, 0.8% tilling threshold.
            "canvas-v1" => Self {
                plot_size: 560.0 / 3.0,
                tilling_threshold_pct: 0.8,
                tractor_step: 6.0,
                brush_width: 6.0,
                brush_height: 6.0,
                auto_till_step: 5.0,
                harvest_cache_secs: 0.3,
                ..Self::default()
            },
            // Earlier stage list with a single, longer Plantlings stage.
            "canvas-v2" => Self {
                plot_size: 560.0 / 3.0,
                tilling_threshold_pct: 2.1,
                stages: vec![
                    StageSpec::timed("Seeds", 10.0),
                    StageSpec::timed("Seedlings", 10.0),
                    StageSpec::timed("Plantlings", 20.0),
                    StageSpec::terminal("Wheat"),
                ],
                tractor_step: 6.0,
                brush_width: 6.0,
                brush_height: 6.0,
                auto_till_step: 5.0,
                harvest_cache_secs: 0.3,
                ..Self::default()
            },
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON table. Fields that are absent keep their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_size", self.grid_size as f64),
            ("plot_size", self.plot_size),
            ("tilling_threshold_pct", self.tilling_threshold_pct),
            ("harvest_threshold_pct", self.harvest_threshold_pct),
            ("base_price", self.base_price),
            ("min_price", self.min_price),
            ("price_step", self.price_step),
            ("tractor_step", self.tractor_step),
            ("brush_width", self.brush_width),
            ("brush_height", self.brush_height),
            ("auto_till_step", self.auto_till_step),
        ];
        for (field, value) in positive {
            // `!(v > 0)` also rejects NaN
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let bounded = [
            ("grid_size", self.grid_size as f64, MAX_GRID_SIZE as f64),
            ("plot_size", self.plot_size, MAX_PLOT_SIZE),
            ("tractor_step", self.tractor_step, self.plot_size),
            ("brush_width", self.brush_width, self.plot_size),
            ("brush_height", self.brush_height, self.plot_size),
            ("auto_till_step", self.auto_till_step, self.plot_size),
        ];
        for (field, value, max) in bounded {
            if value > max {
                return Err(ConfigError::TooLarge { field, value, max });
            }
        }
        if self.max_price < self.min_price {
            return Err(ConfigError::NonPositive {
                field: "max_price - min_price",
                value: self.max_price - self.min_price,
            });
        }
        if self.harvest_cache_secs < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "harvest_cache_secs",
                value: self.harvest_cache_secs,
            });
        }

        if self.stages.len() < 2 {
            return Err(ConfigError::TooFewStages(self.stages.len()));
        }
        let (terminal, timed) = self.stages.split_last().ok_or(ConfigError::TooFewStages(0))?;
        for stage in timed {
            match stage.duration_secs {
                Some(secs) if secs > 0.0 => {}
                _ => return Err(ConfigError::BadStageDuration(stage.name.clone())),
            }
        }
        if terminal.duration_secs.is_some() {
            return Err(ConfigError::TimedTerminalStage(terminal.name.clone()));
        }

        let (x, y) = self.starting_plot;
        if x < 0 || y < 0 || x >= self.grid_size || y >= self.grid_size {
            return Err(ConfigError::StartingPlotOutOfGrid {
                x,
                y,
                grid_size: self.grid_size,
            });
        }
        Ok(())
    }

    /// Side length of the whole field in surface units.
    pub fn field_size(&self) -> f64 {
        self.grid_size as f64 * self.plot_size
    }

    pub fn plot_area(&self) -> f64 {
        self.plot_size * self.plot_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = FarmConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.stages.len(), 5);
        assert_eq!(c.stages[3].duration_secs, Some(20.0));
        assert_eq!(c.stages[4].duration_secs, None);
        assert_eq!(c.field_size(), 36.0);
        assert_eq!(c.plot_area(), 144.0);
    }

    #[test]
    fn every_preset_is_valid() {
        for name in PRESET_NAMES {
            assert!(FarmConfig::preset(name).is_ok(), "preset {}", name);
        }
    }

    #[test]
    fn canvas_presets_differ_in_threshold_and_stages() {
        let v1 = FarmConfig::preset("canvas-v1").unwrap();
        let v2 = FarmConfig::preset("canvas-v2").unwrap();
        assert!((v1.tilling_threshold_pct - 0.8).abs() < 1e-9);
        assert!((v2.tilling_threshold_pct - 2.1).abs() < 1e-9);
        assert_eq!(v1.stages.len(), 5);
        assert_eq!(v2.stages.len(), 4);
        assert_eq!(v2.stages[2].duration_secs, Some(20.0));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            FarmConfig::preset("mars"),
            Err(ConfigError::UnknownPreset(name)) if name == "mars"
        ));
    }

    #[test]
    fn json_fills_missing_fields_from_default() {
        let c = FarmConfig::from_json(r#"{ "tilling_threshold_pct": 2.1, "grid_size": 4 }"#)
            .unwrap();
        assert_eq!(c.grid_size, 4);
        assert!((c.tilling_threshold_pct - 2.1).abs() < 1e-9);
        assert_eq!(c.yield_per_plot, 100);
        assert_eq!(c.stages, FarmConfig::default().stages);
    }

    #[test]
    fn json_stage_table() {
        let c = FarmConfig::from_json(
            r#"{ "stages": [
                { "name": "Seeds", "duration_secs": 5 },
                { "name": "Wheat" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(c.stages.len(), 2);
        assert_eq!(c.stages[1], StageSpec::terminal("Wheat"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            FarmConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_single_stage() {
        let c = FarmConfig {
            stages: vec![StageSpec::terminal("Wheat")],
            ..FarmConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::TooFewStages(1))));
    }

    #[test]
    fn rejects_untimed_middle_stage() {
        let c = FarmConfig {
            stages: vec![StageSpec::terminal("Seeds"), StageSpec::terminal("Wheat")],
            ..FarmConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::BadStageDuration(_))));
    }

    #[test]
    fn rejects_timed_terminal_stage() {
        let c = FarmConfig {
            stages: vec![StageSpec::timed("Seeds", 1.0), StageSpec::timed("Wheat", 1.0)],
            ..FarmConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::TimedTerminalStage(_))));
    }

    #[test]
    fn rejects_nonpositive_base_price() {
        let c = FarmConfig {
            base_price: 0.0,
            ..FarmConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositive { field: "base_price", .. })
        ));
    }

    #[test]
    fn rejects_oversized_grid() {
        let c = FarmConfig {
            grid_size: MAX_GRID_SIZE + 1,
            ..FarmConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::TooLarge { field: "grid_size", .. })
        ));
        assert!(matches!(
            FarmConfig::from_json(r#"{"grid_size":50000}"#),
            Err(ConfigError::TooLarge { field: "grid_size", .. })
        ));

        let largest = FarmConfig {
            grid_size: MAX_GRID_SIZE,
            ..FarmConfig::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_plot() {
        assert!(matches!(
            FarmConfig::from_json(r#"{"plot_size":1e17}"#),
            Err(ConfigError::TooLarge { field: "plot_size", .. })
        ));
        let c = FarmConfig {
            plot_size: MAX_PLOT_SIZE,
            brush_width: 3.0,
            ..FarmConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_brush_wider_than_plot() {
        for json in [
            r#"{"brush_width":13}"#,
            r#"{"brush_height":1e9}"#,
        ] {
            assert!(
                matches!(FarmConfig::from_json(json), Err(ConfigError::TooLarge { .. })),
                "{}",
                json
            );
        }
    }

    #[test]
    fn rejects_steps_longer_than_plot() {
        assert!(matches!(
            FarmConfig::from_json(r#"{"auto_till_step":12.5}"#),
            Err(ConfigError::TooLarge { field: "auto_till_step", .. })
        ));
        assert!(matches!(
            FarmConfig::from_json(r#"{"tractor_step":100}"#),
            Err(ConfigError::TooLarge { field: "tractor_step", .. })
        ));
        assert!(FarmConfig::from_json(r#"{"auto_till_step":12}"#).is_ok());
    }

    #[test]
    fn rejects_nan_threshold() {
        let c = FarmConfig {
            tilling_threshold_pct: f64::NAN,
            ..FarmConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_starting_plot_outside_grid() {
        let c = FarmConfig {
            starting_plot: (3, 0),
            ..FarmConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::StartingPlotOutOfGrid { x: 3, y: 0, .. })
        ));
    }
}
