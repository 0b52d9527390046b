//! Crop growth state machine.
//!
//! A crop walks the configured stage table strictly in order. Each timed
//! stage accumulates scaled seconds until its duration is reached; entering
//! the last stage makes the crop harvestable and stops growth.

use log::{debug, info};

use super::config::StageSpec;
use super::error::FarmError;

/// Reported whenever the crop enters a new stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageChange {
    pub index: usize,
    pub name: String,
    pub harvestable: bool,
}

/// The single mutable crop record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CropCycle {
    /// `None` while nothing is planted.
    pub stage: Option<usize>,
    /// Scaled seconds spent in the current stage.
    pub progress_secs: f64,
    pub growing: bool,
    pub harvestable: bool,
}

#[derive(Clone, Debug)]
pub struct GrowthMachine {
    stages: Vec<StageSpec>,
    cycle: CropCycle,
}

impl GrowthMachine {
    /// `stages` must hold at least two entries (see `FarmConfig::validate`).
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self {
            stages,
            cycle: CropCycle::default(),
        }
    }

    /// Put seeds in the ground: stage 0, not yet growing.
    pub fn plant(&mut self) -> Result<StageChange, FarmError> {
        if self.cycle.stage.is_some() {
            return Err(FarmError::AlreadyPlanted);
        }
        self.cycle = CropCycle {
            stage: Some(0),
            ..CropCycle::default()
        };
        info!("seeds planted");
        Ok(self.change_for(0))
    }

    /// Start the stage timer. Only valid right after planting.
    pub fn start_growth(&mut self) -> Result<(), FarmError> {
        match self.cycle.stage {
            None => Err(FarmError::NotPlanted),
            Some(0) if !self.cycle.growing => {
                self.cycle.growing = true;
                self.cycle.progress_secs = 0.0;
                info!("growth started");
                Ok(())
            }
            Some(_) => Err(FarmError::AlreadyGrowing),
        }
    }

    /// Feed scaled elapsed time. A zero delta (paused) changes nothing.
    pub fn tick(&mut self, scaled_secs: f64) -> Option<StageChange> {
        if !self.cycle.growing || !(scaled_secs > 0.0) {
            return None;
        }
        let duration = self.current_duration()?;
        self.cycle.progress_secs += scaled_secs;
        if self.cycle.progress_secs >= duration {
            return self.advance_stage();
        }
        None
    }

    /// Move to the next stage. A no-op when unplanted or already terminal.
    pub fn advance_stage(&mut self) -> Option<StageChange> {
        let current = self.cycle.stage?;
        let terminal = self.terminal_index();
        if current >= terminal {
            debug!("advance ignored: crop is already at its terminal stage");
            return None;
        }
        let next = current + 1;
        self.cycle.stage = Some(next);
        self.cycle.progress_secs = 0.0;
        if next == terminal {
            self.cycle.growing = false;
            self.cycle.harvestable = true;
            info!("all growth stages complete, {} is harvestable", self.stages[next].name);
        } else {
            info!("advanced to stage {}", self.stages[next].name);
        }
        Some(self.change_for(next))
    }

    pub fn reset(&mut self) {
        self.cycle = CropCycle::default();
    }

    fn change_for(&self, index: usize) -> StageChange {
        StageChange {
            index,
            name: self.stages[index].name.clone(),
            harvestable: self.cycle.harvestable,
        }
    }

    fn terminal_index(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    /// Duration of the stage the crop is in, `None` when unplanted or terminal.
    pub fn current_duration(&self) -> Option<f64> {
        self.cycle
            .stage
            .and_then(|i| self.stages.get(i))
            .and_then(|s| s.duration_secs)
    }

    /// Progress through the current stage, 0..=100.
    pub fn progress_percentage(&self) -> f64 {
        if self.cycle.harvestable {
            return 100.0;
        }
        match self.current_duration() {
            Some(d) if d > 0.0 => (self.cycle.progress_secs / d * 100.0).min(100.0),
            _ => 0.0,
        }
    }

    pub fn cycle(&self) -> &CropCycle {
        &self.cycle
    }

    pub fn stage_index(&self) -> Option<usize> {
        self.cycle.stage
    }

    pub fn stage_name(&self) -> Option<&str> {
        self.cycle
            .stage
            .and_then(|i| self.stages.get(i))
            .map(|s| s.name.as_str())
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_planted(&self) -> bool {
        self.cycle.stage.is_some()
    }

    pub fn is_growing(&self) -> bool {
        self.cycle.growing
    }

    pub fn is_harvestable(&self) -> bool {
        self.cycle.harvestable
    }
}
