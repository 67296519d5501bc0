//! Virtual-key code table
//!
//! Keyboard-mapped slots store Windows-style virtual-key codes. This table turns
//! such a code into a platform-neutral [`Key`], which the platform adapter then
//! translates into whatever its OS expects.

use std::fmt;

macro_rules! key_table {
    ($($variant:ident = $code:literal => $name:literal),+ $(,)?) => {
        /// Symbolic keyboard key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($variant),+
        }

        impl Key {
            /// Looks up the key for a virtual-key code
            pub fn from_virtual_code(code: u16) -> Option<Key> {
                match code {
                    $($code => Some(Key::$variant),)+
                    _ => None,
                }
            }

            /// Virtual-key code this key was resolved from
            pub fn virtual_code(self) -> u16 {
                match self {
                    $(Key::$variant => $code),+
                }
            }

            /// Short lowercase name, as shown in logs
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name),+
                }
            }
        }
    };
}

key_table! {
    Backspace = 0x08 => "backspace",
    Tab = 0x09 => "tab",
    Clear = 0x0C => "clear",
    Enter = 0x0D => "enter",
    Shift = 0x10 => "shift",
    Ctrl = 0x11 => "ctrl",
    Alt = 0x12 => "alt",
    Pause = 0x13 => "pause",
    CapsLock = 0x14 => "capslock",
    Escape = 0x1B => "esc",
    Space = 0x20 => "space",
    PageUp = 0x21 => "pgup",
    PageDown = 0x22 => "pgdn",
    End = 0x23 => "end",
    Home = 0x24 => "home",
    Left = 0x25 => "left",
    Up = 0x26 => "up",
    Right = 0x27 => "right",
    Down = 0x28 => "down",
    Insert = 0x2D => "insert",
    Delete = 0x2E => "delete",
    Num0 = 0x30 => "0",
    Num1 = 0x31 => "1",
    Num2 = 0x32 => "2",
    Num3 = 0x33 => "3",
    Num4 = 0x34 => "4",
    Num5 = 0x35 => "5",
    Num6 = 0x36 => "6",
    Num7 = 0x37 => "7",
    Num8 = 0x38 => "8",
    Num9 = 0x39 => "9",
    A = 0x41 => "a",
    B = 0x42 => "b",
    C = 0x43 => "c",
    D = 0x44 => "d",
    E = 0x45 => "e",
    F = 0x46 => "f",
    G = 0x47 => "g",
    H = 0x48 => "h",
    I = 0x49 => "i",
    J = 0x4A => "j",
    K = 0x4B => "k",
    L = 0x4C => "l",
    M = 0x4D => "m",
    N = 0x4E => "n",
    O = 0x4F => "o",
    P = 0x50 => "p",
    Q = 0x51 => "q",
    R = 0x52 => "r",
    S = 0x53 => "s",
    T = 0x54 => "t",
    U = 0x55 => "u",
    V = 0x56 => "v",
    W = 0x57 => "w",
    X = 0x58 => "x",
    Y = 0x59 => "y",
    Z = 0x5A => "z",
    MetaLeft = 0x5B => "winleft",
    MetaRight = 0x5C => "winright",
    Keypad0 = 0x60 => "num0",
    Keypad1 = 0x61 => "num1",
    Keypad2 = 0x62 => "num2",
    Keypad3 = 0x63 => "num3",
    Keypad4 = 0x64 => "num4",
    Keypad5 = 0x65 => "num5",
    Keypad6 = 0x66 => "num6",
    Keypad7 = 0x67 => "num7",
    Keypad8 = 0x68 => "num8",
    Keypad9 = 0x69 => "num9",
    Multiply = 0x6A => "multiply",
    Add = 0x6B => "add",
    Separator = 0x6C => "separator",
    Subtract = 0x6D => "subtract",
    Decimal = 0x6E => "decimal",
    Divide = 0x6F => "divide",
    F1 = 0x70 => "f1",
    F2 = 0x71 => "f2",
    F3 = 0x72 => "f3",
    F4 = 0x73 => "f4",
    F5 = 0x74 => "f5",
    F6 = 0x75 => "f6",
    F7 = 0x76 => "f7",
    F8 = 0x77 => "f8",
    F9 = 0x78 => "f9",
    F10 = 0x79 => "f10",
    F11 = 0x7A => "f11",
    F12 = 0x7B => "f12",
    NumLock = 0x90 => "numlock",
    ScrollLock = 0x91 => "scrolllock",
    ShiftLeft = 0xA0 => "shiftleft",
    ShiftRight = 0xA1 => "shiftright",
    CtrlLeft = 0xA2 => "ctrlleft",
    CtrlRight = 0xA3 => "ctrlright",
    AltLeft = 0xA4 => "altleft",
    AltRight = 0xA5 => "altright",
    BrowserBack = 0xA6 => "browser_back",
    BrowserForward = 0xA7 => "browser_forward",
    BrowserRefresh = 0xA8 => "browser_refresh",
    BrowserStop = 0xA9 => "browser_stop",
    BrowserSearch = 0xAA => "browser_search",
    BrowserFavorites = 0xAB => "browser_favorites",
    BrowserHome = 0xAC => "browser_home",
    VolumeMute = 0xAD => "volumemute",
    VolumeDown = 0xAE => "volumedown",
    VolumeUp = 0xAF => "volumeup",
    NextTrack = 0xB0 => "nexttrack",
    PrevTrack = 0xB1 => "prevtrack",
    MediaStop = 0xB2 => "stop",
    PlayPause = 0xB3 => "playpause",
    LaunchMail = 0xB4 => "launchmail",
    LaunchMediaSelect = 0xB5 => "launchmediaselect",
    LaunchApp1 = 0xB6 => "launchapp1",
    LaunchApp2 = 0xB7 => "launchapp2",
    Semicolon = 0xBA => ";",
    Equals = 0xBB => "=",
    Comma = 0xBC => ",",
    Minus = 0xBD => "-",
    Period = 0xBE => ".",
    Slash = 0xBF => "/",
    Backtick = 0xC0 => "`",
    OpenBracket = 0xDB => "[",
    Backslash = 0xDC => "\\",
    CloseBracket = 0xDD => "]",
    Quote = 0xDE => "'",
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
