//! Error types for the farm simulation.
//!
//! None of these are fatal. Precondition failures come back as `Err` so the
//! caller can log them and keep running; the worst outcome is a stalled crop
//! cycle that an explicit reset recovers from.

/// A farm operation was requested in a state where it does not apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FarmError {
    /// Growth or a stage skip was requested before seeds were planted.
    #[error("no crop is planted")]
    NotPlanted,

    /// Planting was requested while a crop cycle is already running.
    #[error("a crop is already planted")]
    AlreadyPlanted,

    /// Growth can only start from the first stage, once.
    #[error("growth has already started")]
    AlreadyGrowing,

    /// A stage skip was requested while the crop is not growing.
    #[error("the crop is not growing")]
    NotGrowing,

    /// Planting was confirmed before the tilling threshold fired.
    #[error("not enough land has been tilled to plant")]
    TillingIncomplete,

    /// Harvesting was attempted before the crop reached its terminal stage.
    #[error("the crop is not ready to harvest")]
    NotHarvestable,

    /// A sale was confirmed with nothing pending.
    #[error("there is no harvested produce to sell")]
    NothingToSell,
}

/// A land purchase could not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LandError {
    #[error("plot ({x}, {y}) is outside the {grid_size}x{grid_size} grid")]
    OutOfBounds { x: i32, y: i32, grid_size: i32 },

    #[error("plot ({x}, {y}) is already owned")]
    AlreadyOwned { x: i32, y: i32 },

    #[error("plot ({x}, {y}) is not adjacent to owned land")]
    NotAdjacent { x: i32, y: i32 },
}

/// A configuration table failed to load or validate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("need at least two growth stages, got {0}")]
    TooFewStages(usize),

    #[error("stage '{0}' needs a positive duration")]
    BadStageDuration(String),

    #[error("terminal stage '{0}' must not have a duration")]
    TimedTerminalStage(String),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("starting plot ({x}, {y}) lies outside the {grid_size}x{grid_size} grid")]
    StartingPlotOutOfGrid { x: i32, y: i32, grid_size: i32 },
}
