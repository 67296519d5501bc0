//! OS-facing collaborators of the translation core
//!
//! Everything the core needs from the operating system goes through the
//! [`Platform`] trait: cursor position, synthesized mouse/keyboard/scroll events
//! and console window visibility. The core never calls OS APIs directly.
//!
//! [`uinput::UinputPlatform`] is the Linux implementation.

pub mod uinput;

use crate::mapping::Key;
use thiserror::Error;

/// Mouse button that can be synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Failure of an OS input-synthesis call
///
/// Never fatal: the caller logs it and carries on with the tick.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Input device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation not supported on this platform: {0}")]
    Unsupported(String),
}

/// Minimal OS interface used by the poll loop
pub trait Platform: Send + 'static {
    /// Current cursor position in screen pixels
    fn cursor_position(&mut self) -> Result<(i32, i32), SynthesisError>;

    /// Moves the cursor to an absolute position
    fn set_cursor_position(&mut self, x: i32, y: i32) -> Result<(), SynthesisError>;

    fn mouse_down(&mut self, button: MouseButton) -> Result<(), SynthesisError>;

    fn mouse_up(&mut self, button: MouseButton) -> Result<(), SynthesisError>;

    /// Scrolls by `amount` wheel clicks; positive scrolls up
    fn scroll(&mut self, amount: i32) -> Result<(), SynthesisError>;

    fn key_down(&mut self, key: Key) -> Result<(), SynthesisError>;

    fn key_up(&mut self, key: Key) -> Result<(), SynthesisError>;

    /// Shows or hides the console window owning this process
    fn set_window_visible(&mut self, visible: bool) -> Result<(), SynthesisError>;
}
