//! Mode flags shared between the poll loop and the control surface

use atomic_float::AtomicF64;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

pub const MIN_SENSITIVITY: f64 = 0.001;
pub const MAX_SENSITIVITY: f64 = 10.0;
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

/// Multiplier tiers stepped through by the speed-cycle action
pub const SPEED_TIERS: [f64; 3] = [0.5, 1.0, 2.0];

/// Clamps a sensitivity multiplier into the supported range
pub fn clamp_sensitivity(value: f64) -> f64 {
    if value.is_nan() {
        return DEFAULT_SENSITIVITY;
    }
    value.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
}

/// Next tier for the speed-cycle action: ≤0.5 → 1.0, ≤1.0 → 2.0, else 0.5
pub fn next_speed_tier(current: f64) -> f64 {
    if current <= SPEED_TIERS[0] {
        SPEED_TIERS[1]
    } else if current <= SPEED_TIERS[1] {
        SPEED_TIERS[2]
    } else {
        SPEED_TIERS[0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedLabel {
    Low,
    Medium,
    High,
}

impl fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpeedLabel::Low => "Low",
            SpeedLabel::Medium => "Medium",
            SpeedLabel::High => "High",
        };
        write!(f, "{}", label)
    }
}

pub fn speed_label(multiplier: f64) -> SpeedLabel {
    if multiplier < 0.8 {
        SpeedLabel::Low
    } else if multiplier > 1.2 {
        SpeedLabel::High
    } else {
        SpeedLabel::Medium
    }
}

/// Runtime mode of the translation core
///
/// Every field is an atomic so the loop and the control surface can share one
/// instance through an `Arc` without locking.
#[derive(Debug)]
pub struct RuntimeMode {
    running: AtomicBool,
    input_disabled: AtomicBool,
    window_hidden: AtomicBool,
    sensitivity: AtomicF64,
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl RuntimeMode {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            running: AtomicBool::new(false),
            input_disabled: AtomicBool::new(false),
            window_hidden: AtomicBool::new(false),
            sensitivity: AtomicF64::new(clamp_sensitivity(sensitivity)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn is_input_disabled(&self) -> bool {
        self.input_disabled.load(Ordering::Relaxed)
    }

    /// Flips the disabled flag and returns the new value
    pub fn toggle_input_disabled(&self) -> bool {
        !self.input_disabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_window_hidden(&self) -> bool {
        self.window_hidden.load(Ordering::Relaxed)
    }

    /// Flips the hidden flag and returns the new value
    pub fn toggle_window_hidden(&self) -> bool {
        !self.window_hidden.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity.load(Ordering::Relaxed)
    }

    /// Stores a clamped multiplier and returns what was stored
    pub fn set_sensitivity(&self, value: f64) -> f64 {
        let clamped = clamp_sensitivity(value);
        self.sensitivity.store(clamped, Ordering::Relaxed);
        clamped
    }

    /// Adds `delta` to the multiplier, clamped, and returns the new value
    pub fn adjust_sensitivity(&self, delta: f64) -> f64 {
        self.update_sensitivity(|current| current + delta)
    }

    /// Advances to the next speed tier and returns it
    pub fn cycle_speed(&self) -> f64 {
        self.update_sensitivity(next_speed_tier)
    }

    fn update_sensitivity(&self, step: impl Fn(f64) -> f64) -> f64 {
        let previous = self
            .sensitivity
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(clamp_sensitivity(step(current)))
            })
            .unwrap_or_else(|current| current);
        clamp_sensitivity(step(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_multipliers() {
        assert_eq!(clamp_sensitivity(15.0), 10.0);
        assert_eq!(clamp_sensitivity(-3.0), 0.001);
        assert_eq!(clamp_sensitivity(0.75), 0.75);

        let mode = RuntimeMode::new(42.0);
        assert_eq!(mode.sensitivity(), 10.0);
        assert_eq!(mode.set_sensitivity(-1.0), 0.001);
    }

    #[test]
    fn speed_cycle_walks_the_tiers() {
        let mode = RuntimeMode::new(1.0);
        assert_eq!(mode.cycle_speed(), 2.0);
        assert_eq!(mode.cycle_speed(), 0.5);
        assert_eq!(mode.cycle_speed(), 1.0);
        assert_eq!(mode.sensitivity(), 1.0);
    }

    #[test]
    fn speed_cycle_from_odd_values() {
        assert_eq!(next_speed_tier(0.001), 1.0);
        assert_eq!(next_speed_tier(0.7), 2.0);
        assert_eq!(next_speed_tier(7.5), 0.5);
    }

    #[test]
    fn adjust_stays_inside_range() {
        let mode = RuntimeMode::new(9.995);
        assert_eq!(mode.adjust_sensitivity(0.01), 10.0);
        let mode = RuntimeMode::new(0.005);
        assert_eq!(mode.adjust_sensitivity(-0.01), 0.001);
    }

    #[test]
    fn labels_follow_thresholds() {
        assert_eq!(speed_label(0.5), SpeedLabel::Low);
        assert_eq!(speed_label(0.8), SpeedLabel::Medium);
        assert_eq!(speed_label(1.2), SpeedLabel::Medium);
        assert_eq!(speed_label(2.0), SpeedLabel::High);
        assert_eq!(SpeedLabel::High.to_string(), "High");
    }

    #[test]
    fn toggles_report_new_state() {
        let mode = RuntimeMode::default();
        assert!(mode.toggle_input_disabled());
        assert!(mode.is_input_disabled());
        assert!(!mode.toggle_input_disabled());
        assert!(mode.toggle_window_hidden());
        assert!(mode.is_window_hidden());
    }
}
