//! Controller subsystem
//!
//! Exposes the physical gamepad to the poll loop as a pull-based reader:
//!
//! 1. [`device`] - Snapshot types and the [`InputDevice`] contract
//! 2. [`gilrs_device`] - Production reader on top of gilrs
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► gilrs ──► GilrsDevice::poll ──► DeviceSnapshot (one per tick)
//! ```
//!
//! Only a single controller is active at a time; `connect` picks the first one
//! gilrs reports.

pub mod device;
pub mod gilrs_device;

pub use device::{
    DeviceError, DeviceInfo, DevicePoll, DeviceSnapshot, InputDevice, StickPosition, BUTTON_NAMES,
};
pub use gilrs_device::GilrsDevice;
