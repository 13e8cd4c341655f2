//! Day/night clock

use crate::subsystem::TimeOfDay;

/// A 24-hour clock that wraps, advanced by frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCycle {
    hour: f32,
    /// Real seconds for one full day
    day_length_secs: f32,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self::new(12.0, 600.0)
    }
}

impl DayCycle {
    /// Start at `hour`, completing a day every `day_length_secs`. Non-positive lengths freeze the clock.
    pub fn new(hour: f32, day_length_secs: f32) -> Self {
        Self {
            hour: hour.rem_euclid(24.0),
            day_length_secs,
        }
    }

    pub fn day_length_secs(&self) -> f32 {
        self.day_length_secs
    }

    pub fn set_hour(&mut self, hour: f32) {
        self.hour = hour.rem_euclid(24.0);
    }

    /// Sun elevation angle in radians: zero at 06:00, peak at noon, negative at night
    pub fn sun_angle(&self) -> f32 {
        (self.hour - 6.0) / 24.0 * std::f32::consts::TAU
    }

    pub fn is_daytime(&self) -> bool {
        (6.0..18.0).contains(&self.hour)
    }
}

impl TimeOfDay for DayCycle {
    fn update(&mut self, dt: f32) {
        if self.day_length_secs <= 0.0 {
            return;
        }
        self.hour = (self.hour + dt * 24.0 / self.day_length_secs).rem_euclid(24.0);
    }

    fn hour(&self) -> f32 {
        self.hour
    }
}
