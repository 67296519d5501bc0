//! Stick deflection to cursor motion
//!
//! Movement is computed in sub-pixel precision. Only whole pixels reach the OS
//! cursor; the fractional rest is carried into the next tick so slow deflections
//! still move the pointer at the right average speed.

/// Raw axis range the dead zones are expressed in
pub const AXIS_SCALE: f64 = 32767.0;

/// Left stick radius (raw units) that produces no motion
pub const DEAD_ZONE: f64 = 4000.0;

/// Pixel speed per raw unit at sensitivity 1.0
pub const BASE_SPEED: f64 = 0.000002;

/// Fractional cursor movement not yet applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionAccumulator {
    pub x: f64,
    pub y: f64,
}

/// Converts a normalized axis value into raw units
pub fn to_raw_axis(value: f32) -> f64 {
    f64::from(value) * AXIS_SCALE
}

/// Pixel displacement for a raw stick vector, `None` inside the dead zone
pub fn displacement(x: f64, y: f64, speed: f64) -> Option<(f64, f64)> {
    let magnitude_sq = x * x + y * y;
    if magnitude_sq <= DEAD_ZONE * DEAD_ZONE {
        return None;
    }
    let magnitude = magnitude_sq.sqrt();
    let scale = speed * (magnitude - DEAD_ZONE) / magnitude * 1000.0;
    Some((x * scale, y * scale))
}

#[derive(Debug, Default)]
pub struct MotionIntegrator {
    remainder: MotionAccumulator,
}

impl MotionIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remainder(&self) -> MotionAccumulator {
        self.remainder
    }

    /// Applies a pixel displacement plus the carried remainder to `cursor`
    pub fn advance(&mut self, cursor: (i32, i32), delta: (f64, f64)) -> (i32, i32) {
        let target_x = f64::from(cursor.0) + delta.0 + self.remainder.x;
        let target_y = f64::from(cursor.1) + delta.1 + self.remainder.y;

        let whole_x = target_x.trunc();
        let whole_y = target_y.trunc();
        self.remainder = MotionAccumulator {
            x: target_x - whole_x,
            y: target_y - whole_y,
        };

        (whole_x as i32, whole_y as i32)
    }
}
