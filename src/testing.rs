//! Fakes for the OS and controller collaborators

use crate::controller::{DeviceError, DeviceInfo, DevicePoll, DeviceSnapshot, InputDevice};
use crate::mapping::Key;
use crate::platform::{MouseButton, Platform, SynthesisError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    MoveTo(i32, i32),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    Scroll(i32),
    KeyDown(Key),
    KeyUp(Key),
    WindowVisible(bool),
}

/// Platform that records every synthesized call
#[derive(Debug, Clone, Default)]
pub struct RecordingPlatform {
    pub calls: Arc<Mutex<Vec<PlatformCall>>>,
    pub cursor: (i32, i32),
}

impl RecordingPlatform {
    pub fn taken(&self) -> Vec<PlatformCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: PlatformCall) -> Result<(), SynthesisError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl Platform for RecordingPlatform {
    fn cursor_position(&mut self) -> Result<(i32, i32), SynthesisError> {
        Ok(self.cursor)
    }

    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<(), SynthesisError> {
        self.cursor = (x, y);
        self.record(PlatformCall::MoveTo(x, y))
    }

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), SynthesisError> {
        self.record(PlatformCall::MouseDown(button))
    }

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), SynthesisError> {
        self.record(PlatformCall::MouseUp(button))
    }

    fn scroll(&mut self, amount: i32) -> Result<(), SynthesisError> {
        self.record(PlatformCall::Scroll(amount))
    }

    fn key_down(&mut self, key: Key) -> Result<(), SynthesisError> {
        self.record(PlatformCall::KeyDown(key))
    }

    fn key_up(&mut self, key: Key) -> Result<(), SynthesisError> {
        self.record(PlatformCall::KeyUp(key))
    }

    fn set_window_visible(&mut self, visible: bool) -> Result<(), SynthesisError> {
        self.record(PlatformCall::WindowVisible(visible))
    }
}

/// Device replaying scripted snapshots, then repeating the last one
#[derive(Debug, Default)]
pub struct ScriptedDevice {
    pub present: bool,
    pub connected: bool,
    pub script: VecDeque<DeviceSnapshot>,
    pub last: Option<DeviceSnapshot>,
}

impl ScriptedDevice {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<DeviceSnapshot>) -> Self {
        Self {
            present: true,
            connected: false,
            script: script.into(),
            last: None,
        }
    }
}

impl InputDevice for ScriptedDevice {
    fn connect(&mut self) -> Result<DeviceInfo, DeviceError> {
        if !self.present {
            return Err(DeviceError::DeviceUnavailable);
        }
        self.connected = true;
        Ok(DeviceInfo {
            name: "Scripted Pad".to_string(),
            id: "0".to_string(),
        })
    }

    fn poll(&mut self) -> DevicePoll {
        if !self.connected {
            return DevicePoll::NotConnected;
        }
        if let Some(next) = self.script.pop_front() {
            self.last = Some(next);
        }
        DevicePoll::Snapshot(self.last.clone().unwrap_or_default())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Snapshot with the given buttons held
pub fn pressed(indices: &[usize]) -> DeviceSnapshot {
    let mut snapshot = DeviceSnapshot::default();
    for index in indices {
        snapshot.buttons[*index] = true;
    }
    snapshot
}
