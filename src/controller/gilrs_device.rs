use crate::controller::device::{
    DeviceError, DeviceInfo, DevicePoll, DeviceSnapshot, InputDevice, StickPosition,
};
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

/// gilrs buttons in canonical index order
const BUTTON_LAYOUT: [Button; 15] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::Mode,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

// Device reader backed by gilrs
pub struct GilrsDevice {
    // Gilrs context
    gilrs: Gilrs,

    // Active gamepad
    active_gamepad: Option<GamepadId>,
}

impl GilrsDevice {
    pub fn create() -> Result<Self, DeviceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DeviceError::InitializationError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            active_gamepad: None,
        })
    }

    // Drain pending gilrs events so cached gamepad state is current
    fn pump_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    info!("Controller connected event detected: {:?}", id);
                }
                EventType::Disconnected if Some(id) == self.active_gamepad => {
                    warn!("Active controller disconnected: {:?}", id);
                    self.active_gamepad = None;
                }
                _ => {}
            }
        }
    }
}

impl InputDevice for GilrsDevice {
    fn connect(&mut self) -> Result<DeviceInfo, DeviceError> {
        self.pump_events();

        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();
        if gamepads.is_empty() {
            warn!("No gamepad connected");
            self.active_gamepad = None;
            return Err(DeviceError::DeviceUnavailable);
        }

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!(
                "  [{}] ID: {}, Name: {}, UUID: {:?}",
                idx,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
        }

        let (id, gamepad) = &gamepads[0];
        let device = DeviceInfo {
            name: gamepad.name().to_string(),
            id: id.to_string(),
        };
        let id = *id;
        drop(gamepads);

        self.active_gamepad = Some(id);
        info!("Selected gamepad: {} ({})", device.name, device.id);
        Ok(device)
    }

    fn poll(&mut self) -> DevicePoll {
        self.pump_events();

        let Some(id) = self.active_gamepad else {
            return DevicePoll::NotConnected;
        };
        let Some(gamepad) = self.gilrs.connected_gamepad(id) else {
            debug!("Gamepad {:?} no longer connected", id);
            self.active_gamepad = None;
            return DevicePoll::NotConnected;
        };

        DevicePoll::Snapshot(read_snapshot(&gamepad))
    }

    fn is_connected(&self) -> bool {
        self.active_gamepad.is_some()
    }
}

fn read_snapshot(gamepad: &Gamepad<'_>) -> DeviceSnapshot {
    DeviceSnapshot {
        left_stick: StickPosition {
            x: gamepad.value(Axis::LeftStickX),
            // gilrs reports up as positive, screen coordinates grow downwards
            y: -gamepad.value(Axis::LeftStickY),
        },
        right_stick: StickPosition {
            x: gamepad.value(Axis::RightStickX),
            y: -gamepad.value(Axis::RightStickY),
        },
        buttons: BUTTON_LAYOUT
            .iter()
            .map(|button| gamepad.is_pressed(*button))
            .collect(),
        left_trigger: read_trigger(gamepad, Button::LeftTrigger2, Axis::LeftZ),
        right_trigger: read_trigger(gamepad, Button::RightTrigger2, Axis::RightZ),
    }
}

// Analog triggers show up either as a button with a 0..1 value or as a Z axis
fn read_trigger(gamepad: &Gamepad<'_>, button: Button, axis: Axis) -> f32 {
    if let Some(data) = gamepad.button_data(button) {
        return trigger_axis_from_button_value(data.value());
    }
    gamepad
        .axis_data(axis)
        .map(|data| data.value())
        .unwrap_or(-1.0)
}

fn trigger_axis_from_button_value(value: f32) -> f32 {
    value.clamp(0.0, 1.0) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::device::BUTTON_NAMES;

    #[test]
    fn button_layout_matches_canonical_names() {
        assert_eq!(BUTTON_LAYOUT.len(), BUTTON_NAMES.len());
        assert_eq!(BUTTON_LAYOUT[0], Button::South);
        assert_eq!(BUTTON_LAYOUT[7], Button::Start);
        assert_eq!(BUTTON_LAYOUT[14], Button::DPadRight);
    }

    #[test]
    fn trigger_button_value_maps_to_full_axis_range() {
        assert_eq!(trigger_axis_from_button_value(0.0), -1.0);
        assert_eq!(trigger_axis_from_button_value(0.5), 0.0);
        assert_eq!(trigger_axis_from_button_value(1.0), 1.0);
        assert_eq!(trigger_axis_from_button_value(1.7), 1.0);
    }
}
