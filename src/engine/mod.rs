//! Input-translation core
//!
//! Turns controller snapshots into synthesized mouse and keyboard input at a fixed
//! tick rate.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──► MotionIntegrator ──► cursor move
//! DeviceSnapshot ────┤
//!                    └──► EdgeDetector ──► ActionDispatcher ──► Platform
//!                                              │
//!                                              ▼
//!                                        StatusEvent channel
//! ```
//!
//! [`tick_engine::PollLoop`] owns the lifecycle and paces the ticks.

pub mod dispatcher;
pub mod edge;
pub mod motion;
pub mod runtime;
pub mod tick_engine;

use crate::controller::DeviceError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use runtime::{speed_label, RuntimeMode, SpeedLabel};
pub use tick_engine::PollLoop;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No controller connected")]
    DeviceUnavailable,

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Poll loop task failed: {0}")]
    TaskFailed(String),
}

/// Timing parameters of the poll loop
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub tick_rate_hz: u32,

    /// How long `stop` waits for the loop task before giving up on it
    pub join_timeout: Duration,

    pub stats_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 150,
            join_timeout: Duration::from_secs(1),
            stats_interval: Duration::from_secs(30),
        }
    }
}

impl EngineSettings {
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

/// Mode changes published for the control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusEvent {
    Started,
    Stopped,
    InputEnabled,
    InputDisabled,
    SpeedChanged(f64),
    WindowShown,
    WindowHidden,
    DeviceLost,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Started => write!(f, "Gopher started"),
            StatusEvent::Stopped => write!(f, "Gopher stopped"),
            StatusEvent::InputEnabled => write!(f, "Input enabled"),
            StatusEvent::InputDisabled => write!(f, "Input disabled"),
            StatusEvent::SpeedChanged(value) => {
                write!(f, "Speed: {} ({:.3})", speed_label(*value), value)
            }
            StatusEvent::WindowShown => write!(f, "Window shown"),
            StatusEvent::WindowHidden => write!(f, "Window hidden"),
            StatusEvent::DeviceLost => write!(f, "Controller disconnected"),
        }
    }
}
