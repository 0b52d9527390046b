//! Wall-clock to simulation-time conversion.
//!
//! `draw_web()` calls at ~60fps with variable delta. [`SimClock`] turns each
//! frame's timestamp into scaled seconds for the farm, and [`TimeControl`]
//! owns the pause toggle and speed selector that decide the scale.

/// Longest frame gap fed to the simulation, in milliseconds.
const MAX_FRAME_MS: f64 = 500.0;

/// Speed selector positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    Normal,
    Double,
    Quintuple,
}

impl Speed {
    pub const ALL: [Speed; 3] = [Speed::Normal, Speed::Double, Speed::Quintuple];

    pub fn multiplier(self) -> f64 {
        match self {
            Speed::Normal => 1.0,
            Speed::Double => 2.0,
            Speed::Quintuple => 5.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Normal => "1x",
            Speed::Double => "2x",
            Speed::Quintuple => "5x",
        }
    }
}

/// Pause toggle plus speed selector.
///
/// Pausing drops the selected speed back to normal; choosing any speed
/// resumes play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeControl {
    paused: bool,
    speed: Speed,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            paused: false,
            speed: Speed::Normal,
        }
    }
}

impl TimeControl {
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            self.speed = Speed::Normal;
        }
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// 0 while paused, otherwise the selected speed.
    pub fn multiplier(&self) -> f64 {
        if self.paused {
            0.0
        } else {
            self.speed.multiplier()
        }
    }
}

pub struct SimClock {
    /// Timestamp of the last update (ms), None before the first frame.
    last_timestamp: Option<f64>,
    /// Scaled seconds handed out so far.
    pub total_scaled_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            last_timestamp: None,
            total_scaled_secs: 0.0,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar) and
    /// get the scaled seconds to simulate this frame.
    ///
    /// The anchor moves every frame, paused or not, so unpausing never
    /// replays the time spent paused.
    pub fn update(&mut self, now_ms: f64, multiplier: f64) -> f64 {
        let delta_ms = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        let scaled = delta_ms / 1000.0 * multiplier.max(0.0);
        self.total_scaled_secs += scaled;
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut clock = SimClock::new();
        assert_eq!(clock.update(1234.0, 1.0), 0.0);
    }

    #[test]
    fn normal_speed_passes_wall_time() {
        let mut clock = SimClock::new();
        clock.update(0.0, 1.0);
        assert!((clock.update(250.0, 1.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn multiplier_scales_delta() {
        let mut clock = SimClock::new();
        clock.update(0.0, 5.0);
        assert!((clock.update(100.0, 5.0) - 0.5).abs() < 1e-12);
        assert!((clock.update(200.0, 2.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn clamp_large_delta() {
        let mut clock = SimClock::new();
        clock.update(0.0, 1.0);
        // Tab backgrounded for 10 seconds → clamped to 500ms
        assert!((clock.update(10_000.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn backwards_timestamp_is_zero() {
        let mut clock = SimClock::new();
        clock.update(500.0, 1.0);
        assert_eq!(clock.update(400.0, 1.0), 0.0);
    }

    #[test]
    fn paused_frames_do_not_bank_time() {
        let mut clock = SimClock::new();
        clock.update(0.0, 1.0);
        for i in 1..=100 {
            assert_eq!(clock.update(i as f64 * 16.0, 0.0), 0.0);
        }
        // Unpaused: only the last frame's gap counts
        assert!((clock.update(1616.0, 1.0) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn steady_60fps() {
        let mut clock = SimClock::new();
        clock.update(0.0, 1.0);
        for i in 1..=60 {
            clock.update(i as f64 * 16.667, 1.0);
        }
        assert!((clock.total_scaled_secs - 1.0).abs() < 0.01);
    }

    #[test]
    fn pause_resets_speed() {
        let mut tc = TimeControl::default();
        tc.set_speed(Speed::Quintuple);
        assert_eq!(tc.multiplier(), 5.0);
        tc.toggle_pause();
        assert!(tc.is_paused());
        assert_eq!(tc.multiplier(), 0.0);
        assert_eq!(tc.speed(), Speed::Normal);
        tc.toggle_pause();
        assert_eq!(tc.multiplier(), 1.0);
    }

    #[test]
    fn choosing_speed_unpauses() {
        let mut tc = TimeControl::default();
        tc.toggle_pause();
        tc.set_speed(Speed::Double);
        assert!(!tc.is_paused());
        assert_eq!(tc.multiplier(), 2.0);
    }
}
