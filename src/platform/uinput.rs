//! Linux platform adapter on a `uinput` virtual device
//!
//! Creates one virtual device exposing relative pointer axes, the mouse buttons
//! and every key of the virtual-key table. `uinput` only reports relative motion,
//! so the adapter keeps its own notion of where the cursor is and emits the
//! difference when the core asks for an absolute move.

use crate::mapping::Key;
use crate::platform::{MouseButton, Platform, SynthesisError};
use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, EventType, InputEvent, KeyCode, RelativeAxisCode};
use tracing::{debug, error, info};

const DEVICE_NAME: &str = "gopher virtual pointer";

pub struct UinputPlatform {
    device: VirtualDevice,
    cursor: (i32, i32),
}

impl UinputPlatform {
    pub fn new() -> Result<Self, SynthesisError> {
        if !std::path::Path::new("/dev/uinput").exists() {
            error!("/dev/uinput not found. Run: sudo modprobe uinput");
            return Err(SynthesisError::Unsupported(
                "/dev/uinput is not available".to_string(),
            ));
        }

        let mut keys = AttributeSet::<KeyCode>::new();
        keys.insert(KeyCode::BTN_LEFT);
        keys.insert(KeyCode::BTN_RIGHT);
        keys.insert(KeyCode::BTN_MIDDLE);
        for code in 0u16..=0xFF {
            if let Some(key) = Key::from_virtual_code(code) {
                keys.insert(key_code(key));
            }
        }

        let mut axes = AttributeSet::<RelativeAxisCode>::new();
        axes.insert(RelativeAxisCode::REL_X);
        axes.insert(RelativeAxisCode::REL_Y);
        axes.insert(RelativeAxisCode::REL_WHEEL);

        let device = VirtualDevice::builder()?
            .name(DEVICE_NAME)
            .with_keys(&keys)?
            .with_relative_axes(&axes)?
            .build()?;

        info!("Created virtual input device: {}", DEVICE_NAME);
        Ok(Self {
            device,
            cursor: (0, 0),
        })
    }

    fn emit_key(&mut self, code: KeyCode, pressed: bool) -> Result<(), SynthesisError> {
        let event = InputEvent::new(EventType::KEY.0, code.0, i32::from(pressed));
        self.device.emit(&[event])?;
        Ok(())
    }
}

impl Platform for UinputPlatform {
    fn cursor_position(&mut self) -> Result<(i32, i32), SynthesisError> {
        Ok(self.cursor)
    }

    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<(), SynthesisError> {
        let dx = x - self.cursor.0;
        let dy = y - self.cursor.1;
        if dx != 0 || dy != 0 {
            self.device.emit(&[
                InputEvent::new(EventType::RELATIVE.0, RelativeAxisCode::REL_X.0, dx),
                InputEvent::new(EventType::RELATIVE.0, RelativeAxisCode::REL_Y.0, dy),
            ])?;
        }
        self.cursor = (x, y);
        Ok(())
    }

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), SynthesisError> {
        debug!("Mouse down: {:?}", button);
        self.emit_key(button_code(button), true)
    }

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), SynthesisError> {
        debug!("Mouse up: {:?}", button);
        self.emit_key(button_code(button), false)
    }

    fn scroll(&mut self, amount: i32) -> Result<(), SynthesisError> {
        if amount != 0 {
            self.device.emit(&[InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_WHEEL.0,
                amount,
            )])?;
        }
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<(), SynthesisError> {
        debug!("Key down: {}", key);
        self.emit_key(key_code(key), true)
    }

    fn key_up(&mut self, key: Key) -> Result<(), SynthesisError> {
        debug!("Key up: {}", key);
        self.emit_key(key_code(key), false)
    }

    fn set_window_visible(&mut self, visible: bool) -> Result<(), SynthesisError> {
        // A terminal session has no window handle we could hide.
        info!(
            "Console window marked {}",
            if visible { "visible" } else { "hidden" }
        );
        Ok(())
    }
}

fn button_code(button: MouseButton) -> KeyCode {
    match button {
        MouseButton::Left => KeyCode::BTN_LEFT,
        MouseButton::Right => KeyCode::BTN_RIGHT,
        MouseButton::Middle => KeyCode::BTN_MIDDLE,
    }
}

fn key_code(key: Key) -> KeyCode {
    match key {
        Key::Backspace => KeyCode::KEY_BACKSPACE,
        Key::Tab => KeyCode::KEY_TAB,
        Key::Clear => KeyCode::KEY_CLEAR,
        Key::Enter => KeyCode::KEY_ENTER,
        Key::Shift | Key::ShiftLeft => KeyCode::KEY_LEFTSHIFT,
        Key::ShiftRight => KeyCode::KEY_RIGHTSHIFT,
        Key::Ctrl | Key::CtrlLeft => KeyCode::KEY_LEFTCTRL,
        Key::CtrlRight => KeyCode::KEY_RIGHTCTRL,
        Key::Alt | Key::AltLeft => KeyCode::KEY_LEFTALT,
        Key::AltRight => KeyCode::KEY_RIGHTALT,
        Key::Pause => KeyCode::KEY_PAUSE,
        Key::CapsLock => KeyCode::KEY_CAPSLOCK,
        Key::Escape => KeyCode::KEY_ESC,
        Key::Space => KeyCode::KEY_SPACE,
        Key::PageUp => KeyCode::KEY_PAGEUP,
        Key::PageDown => KeyCode::KEY_PAGEDOWN,
        Key::End => KeyCode::KEY_END,
        Key::Home => KeyCode::KEY_HOME,
        Key::Left => KeyCode::KEY_LEFT,
        Key::Up => KeyCode::KEY_UP,
        Key::Right => KeyCode::KEY_RIGHT,
        Key::Down => KeyCode::KEY_DOWN,
        Key::Insert => KeyCode::KEY_INSERT,
        Key::Delete => KeyCode::KEY_DELETE,
        Key::Num0 => KeyCode::KEY_0,
        Key::Num1 => KeyCode::KEY_1,
        Key::Num2 => KeyCode::KEY_2,
        Key::Num3 => KeyCode::KEY_3,
        Key::Num4 => KeyCode::KEY_4,
        Key::Num5 => KeyCode::KEY_5,
        Key::Num6 => KeyCode::KEY_6,
        Key::Num7 => KeyCode::KEY_7,
        Key::Num8 => KeyCode::KEY_8,
        Key::Num9 => KeyCode::KEY_9,
        Key::A => KeyCode::KEY_A,
        Key::B => KeyCode::KEY_B,
        Key::C => KeyCode::KEY_C,
        Key::D => KeyCode::KEY_D,
        Key::E => KeyCode::KEY_E,
        Key::F => KeyCode::KEY_F,
        Key::G => KeyCode::KEY_G,
        Key::H => KeyCode::KEY_H,
        Key::I => KeyCode::KEY_I,
        Key::J => KeyCode::KEY_J,
        Key::K => KeyCode::KEY_K,
        Key::L => KeyCode::KEY_L,
        Key::M => KeyCode::KEY_M,
        Key::N => KeyCode::KEY_N,
        Key::O => KeyCode::KEY_O,
        Key::P => KeyCode::KEY_P,
        Key::Q => KeyCode::KEY_Q,
        Key::R => KeyCode::KEY_R,
        Key::S => KeyCode::KEY_S,
        Key::T => KeyCode::KEY_T,
        Key::U => KeyCode::KEY_U,
        Key::V => KeyCode::KEY_V,
        Key::W => KeyCode::KEY_W,
        Key::X => KeyCode::KEY_X,
        Key::Y => KeyCode::KEY_Y,
        Key::Z => KeyCode::KEY_Z,
        Key::MetaLeft => KeyCode::KEY_LEFTMETA,
        Key::MetaRight => KeyCode::KEY_RIGHTMETA,
        Key::Keypad0 => KeyCode::KEY_KP0,
        Key::Keypad1 => KeyCode::KEY_KP1,
        Key::Keypad2 => KeyCode::KEY_KP2,
        Key::Keypad3 => KeyCode::KEY_KP3,
        Key::Keypad4 => KeyCode::KEY_KP4,
        Key::Keypad5 => KeyCode::KEY_KP5,
        Key::Keypad6 => KeyCode::KEY_KP6,
        Key::Keypad7 => KeyCode::KEY_KP7,
        Key::Keypad8 => KeyCode::KEY_KP8,
        Key::Keypad9 => KeyCode::KEY_KP9,
        Key::Multiply => KeyCode::KEY_KPASTERISK,
        Key::Add => KeyCode::KEY_KPPLUS,
        Key::Separator => KeyCode::KEY_KPCOMMA,
        Key::Subtract => KeyCode::KEY_KPMINUS,
        Key::Decimal => KeyCode::KEY_KPDOT,
        Key::Divide => KeyCode::KEY_KPSLASH,
        Key::F1 => KeyCode::KEY_F1,
        Key::F2 => KeyCode::KEY_F2,
        Key::F3 => KeyCode::KEY_F3,
        Key::F4 => KeyCode::KEY_F4,
        Key::F5 => KeyCode::KEY_F5,
        Key::F6 => KeyCode::KEY_F6,
        Key::F7 => KeyCode::KEY_F7,
        Key::F8 => KeyCode::KEY_F8,
        Key::F9 => KeyCode::KEY_F9,
        Key::F10 => KeyCode::KEY_F10,
        Key::F11 => KeyCode::KEY_F11,
        Key::F12 => KeyCode::KEY_F12,
        Key::NumLock => KeyCode::KEY_NUMLOCK,
        Key::ScrollLock => KeyCode::KEY_SCROLLLOCK,
        Key::BrowserBack => KeyCode::KEY_BACK,
        Key::BrowserForward => KeyCode::KEY_FORWARD,
        Key::BrowserRefresh => KeyCode::KEY_REFRESH,
        Key::BrowserStop => KeyCode::KEY_STOP,
        Key::BrowserSearch => KeyCode::KEY_SEARCH,
        Key::BrowserFavorites => KeyCode::KEY_BOOKMARKS,
        Key::BrowserHome => KeyCode::KEY_HOMEPAGE,
        Key::VolumeMute => KeyCode::KEY_MUTE,
        Key::VolumeDown => KeyCode::KEY_VOLUMEDOWN,
        Key::VolumeUp => KeyCode::KEY_VOLUMEUP,
        Key::NextTrack => KeyCode::KEY_NEXTSONG,
        Key::PrevTrack => KeyCode::KEY_PREVIOUSSONG,
        Key::MediaStop => KeyCode::KEY_STOPCD,
        Key::PlayPause => KeyCode::KEY_PLAYPAUSE,
        Key::LaunchMail => KeyCode::KEY_MAIL,
        Key::LaunchMediaSelect => KeyCode::KEY_MEDIA,
        Key::LaunchApp1 => KeyCode::KEY_PROG1,
        Key::LaunchApp2 => KeyCode::KEY_PROG2,
        Key::Semicolon => KeyCode::KEY_SEMICOLON,
        Key::Equals => KeyCode::KEY_EQUAL,
        Key::Comma => KeyCode::KEY_COMMA,
        Key::Minus => KeyCode::KEY_MINUS,
        Key::Period => KeyCode::KEY_DOT,
        Key::Slash => KeyCode::KEY_SLASH,
        Key::Backtick => KeyCode::KEY_GRAVE,
        Key::OpenBracket => KeyCode::KEY_LEFTBRACE,
        Key::Backslash => KeyCode::KEY_BACKSLASH,
        Key::CloseBracket => KeyCode::KEY_RIGHTBRACE,
        Key::Quote => KeyCode::KEY_APOSTROPHE,
    }
}
