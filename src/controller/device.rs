//! Device reader contract
//!
//! A device reader hands the poll loop one [`DeviceSnapshot`] per tick. It never
//! fails a tick: an absent or unplugged controller is reported as
//! [`DevicePoll::NotConnected`] and the loop simply idles until `connect`
//! succeeds again.

use thiserror::Error;

/// Canonical button order used for button indices
///
/// Mapping codes for mouse and control slots refer to positions in this list.
pub const BUTTON_NAMES: [&str; 15] = [
    "A",
    "B",
    "X",
    "Y",
    "LeftShoulder",
    "RightShoulder",
    "Back",
    "Start",
    "LeftThumb",
    "RightThumb",
    "Guide",
    "DPadUp",
    "DPadDown",
    "DPadLeft",
    "DPadRight",
];

/// Analog stick position, each axis in -1.0..=1.0 with y growing downwards
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StickPosition {
    pub x: f32,
    pub y: f32,
}

/// Immutable read of the controller for a single tick
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceSnapshot {
    pub left_stick: StickPosition,
    pub right_stick: StickPosition,

    /// Pressed state per button index
    pub buttons: Vec<bool>,

    /// Trigger axes, -1.0 released to 1.0 fully pressed
    pub left_trigger: f32,
    pub right_trigger: f32,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            left_stick: StickPosition::default(),
            right_stick: StickPosition::default(),
            buttons: vec![false; BUTTON_NAMES.len()],
            left_trigger: -1.0,
            right_trigger: -1.0,
        }
    }
}

/// Result of polling the device once
#[derive(Clone, Debug, PartialEq)]
pub enum DevicePoll {
    Snapshot(DeviceSnapshot),
    NotConnected,
}

/// Description of the controller `connect` settled on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    /// No controller is plugged in; not fatal, connect may be retried later
    #[error("No controller found")]
    DeviceUnavailable,

    #[error("Failed to initialize controller backend: {0}")]
    InitializationError(String),
}

/// Physical controller as seen by the poll loop
pub trait InputDevice: Send + 'static {
    /// Acquires the first available controller
    ///
    /// Safe to call repeatedly. The new handle is fully resolved before it
    /// replaces the old one.
    fn connect(&mut self) -> Result<DeviceInfo, DeviceError>;

    /// Reads the current controller state
    fn poll(&mut self) -> DevicePoll;

    fn is_connected(&self) -> bool;
}
