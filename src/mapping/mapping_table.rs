//! Logical slots and the table binding them to input codes
//!
//! A slot is a fixed action position (mouse button, control function, or
//! keyboard key). Each slot is bound to an [`InputCode`]: for a button transition
//! the code is compared against the controller button index, and for keyboard
//! slots the same code also names the virtual key that gets synthesized.

use crate::mapping::MappingError;
use crate::platform::MouseButton;
use std::collections::BTreeMap;
use std::fmt;

/// Input code bound to a slot
///
/// Either a controller button index or a virtual-key code, depending on how the
/// slot is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputCode(pub u16);

impl InputCode {
    /// Code that marks a keyboard slot as unbound
    pub const UNBOUND_KEY: InputCode = InputCode(0);

    /// Parses a code literal such as `0x7A`, `0X7a` or `122`
    pub fn parse(literal: &str) -> Result<Self, MappingError> {
        let trimmed = literal.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => trimmed.parse::<u16>(),
        };

        parsed
            .map(InputCode)
            .map_err(|_| MappingError::InvalidCodeLiteral(literal.to_string()))
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Built-in control functions that can be bound to a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    HideWindow,
    DisableToggle,
    SpeedCycle,
}

/// Which trigger an analog line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSide {
    Left,
    Right,
}

/// How a slot's bound code is interpreted when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Mouse(MouseButton),
    Control(ControlAction),
    Keyboard,
}

macro_rules! slots {
    ($($variant:ident => $key:literal, $default:literal, $kind:expr;)+) => {
        /// Logical mapping slot
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Slot {
            $($variant),+
        }

        impl Slot {
            /// Every slot, in table order
            pub const ALL: &'static [Slot] = &[$(Slot::$variant),+];

            /// Key used for this slot in the config file
            pub fn config_key(self) -> &'static str {
                match self {
                    $(Slot::$variant => $key),+
                }
            }

            /// Code the slot is bound to out of the box
            pub fn default_code(self) -> InputCode {
                match self {
                    $(Slot::$variant => InputCode($default)),+
                }
            }

            pub fn kind(self) -> SlotKind {
                match self {
                    $(Slot::$variant => $kind),+
                }
            }

            pub fn from_config_key(key: &str) -> Option<Slot> {
                match key {
                    $($key => Some(Slot::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

slots! {
    MouseLeft => "mouse_left", 0x0, SlotKind::Mouse(MouseButton::Left);
    MouseRight => "mouse_right", 0x1, SlotKind::Mouse(MouseButton::Right);
    MouseMiddle => "mouse_middle", 0x2, SlotKind::Mouse(MouseButton::Middle);
    HideWindow => "hide_window", 0x7A, SlotKind::Control(ControlAction::HideWindow);
    DisableToggle => "disable_gopher", 0x24, SlotKind::Control(ControlAction::DisableToggle);
    SpeedCycle => "speed_change", 0x21, SlotKind::Control(ControlAction::SpeedCycle);
    DPadUp => "dpad_up", 0x26, SlotKind::Keyboard;
    DPadDown => "dpad_down", 0x28, SlotKind::Keyboard;
    DPadLeft => "dpad_left", 0x25, SlotKind::Keyboard;
    DPadRight => "dpad_right", 0x27, SlotKind::Keyboard;
    Start => "start", 0x0D, SlotKind::Keyboard;
    Back => "back", 0x08, SlotKind::Keyboard;
    LeftThumb => "left_thumb", 0x71, SlotKind::Keyboard;
    RightThumb => "right_thumb", 0x72, SlotKind::Keyboard;
    LeftShoulder => "left_shoulder", 0xA0, SlotKind::Keyboard;
    RightShoulder => "right_shoulder", 0xA1, SlotKind::Keyboard;
    AButton => "a_button", 0x0, SlotKind::Keyboard;
    BButton => "b_button", 0x0, SlotKind::Keyboard;
    XButton => "x_button", 0x0, SlotKind::Keyboard;
    YButton => "y_button", 0x0, SlotKind::Keyboard;
    LeftTrigger => "left_trigger", 0x20, SlotKind::Keyboard;
    RightTrigger => "right_trigger", 0x08, SlotKind::Keyboard;
}

impl Slot {
    /// Slot whose code is synthesized when the given trigger crosses its threshold
    pub fn for_trigger(side: TriggerSide) -> Slot {
        match side {
            TriggerSide::Left => Slot::LeftTrigger,
            TriggerSide::Right => Slot::RightTrigger,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_key())
    }
}

/// Slot → code bindings
///
/// Cheap to copy; the poll loop takes one snapshot per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingTable {
    bindings: [Option<InputCode>; Slot::ALL.len()],
}

impl Default for MappingTable {
    fn default() -> Self {
        let mut bindings = [None; Slot::ALL.len()];
        for slot in Slot::ALL {
            bindings[*slot as usize] = Some(slot.default_code());
        }
        Self { bindings }
    }
}

impl MappingTable {
    /// Table with every slot unbound
    pub fn unbound() -> Self {
        Self {
            bindings: [None; Slot::ALL.len()],
        }
    }

    pub fn binding(&self, slot: Slot) -> Option<InputCode> {
        self.bindings[slot as usize]
    }

    pub fn bind(&mut self, slot: Slot, code: Option<InputCode>) {
        self.bindings[slot as usize] = code;
    }

    /// Code a slot fires with, treating the keyboard sentinel as unbound
    pub fn effective_binding(&self, slot: Slot) -> Option<InputCode> {
        match (slot.kind(), self.binding(slot)) {
            (SlotKind::Keyboard, Some(InputCode::UNBOUND_KEY)) => None,
            (_, binding) => binding,
        }
    }

    /// Every slot bound to `code`, in table order
    ///
    /// Several slots may share a code; callers fire all of them.
    pub fn slots_bound_to(&self, code: InputCode) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL
            .iter()
            .copied()
            .filter(move |slot| self.effective_binding(*slot) == Some(code))
    }

    /// Builds a table from config literals
    ///
    /// Missing keys fall back to their default code. Literals that do not parse
    /// leave the slot unbound and are returned as warnings. An empty literal is
    /// an explicit "unbound".
    pub fn from_literals(literals: &BTreeMap<String, String>) -> (Self, Vec<MappingError>) {
        let mut table = Self::default();
        let mut warnings = Vec::new();

        for slot in Slot::ALL {
            let Some(literal) = literals.get(slot.config_key()) else {
                continue;
            };
            if literal.trim().is_empty() {
                table.bind(*slot, None);
                continue;
            }
            match InputCode::parse(literal) {
                Ok(code) => table.bind(*slot, Some(code)),
                Err(e) => {
                    table.bind(*slot, None);
                    warnings.push(MappingError::InvalidSlotLiteral {
                        slot: slot.config_key().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        for key in literals.keys() {
            if Slot::from_config_key(key).is_none() {
                warnings.push(MappingError::UnknownSlot(key.clone()));
            }
        }

        (table, warnings)
    }

    /// Config literals for every slot; unbound slots become an empty string
    pub fn to_literals(&self) -> BTreeMap<String, String> {
        Slot::ALL
            .iter()
            .map(|slot| {
                let literal = self
                    .binding(*slot)
                    .map(|code| code.to_string())
                    .unwrap_or_default();
                (slot.config_key().to_string(), literal)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hex_and_decimal_literals() {
        assert_eq!(InputCode::parse("0x7A").unwrap(), InputCode(0x7A));
        assert_eq!(InputCode::parse("0x7a").unwrap(), InputCode(0x7A));
        assert_eq!(InputCode::parse("0X0D").unwrap(), InputCode(13));
        assert_eq!(InputCode::parse(" 0x0 ").unwrap(), InputCode(0));
        assert_eq!(InputCode::parse("38").unwrap(), InputCode(38));
    }

    #[test]
    fn rejects_garbage_literals() {
        assert!(InputCode::parse("0xZZ").is_err());
        assert!(InputCode::parse("enter").is_err());
        assert!(InputCode::parse("0x").is_err());
        assert!(InputCode::parse("0x10000").is_err());
    }

    #[test]
    fn defaults_match_documented_codes() {
        let table = MappingTable::default();
        assert_eq!(table.binding(Slot::MouseLeft), Some(InputCode(0x0)));
        assert_eq!(table.binding(Slot::HideWindow), Some(InputCode(0x7A)));
        assert_eq!(table.binding(Slot::DisableToggle), Some(InputCode(0x24)));
        assert_eq!(table.binding(Slot::SpeedCycle), Some(InputCode(0x21)));
        assert_eq!(table.binding(Slot::LeftShoulder), Some(InputCode(0xA0)));
        assert_eq!(table.binding(Slot::RightTrigger), Some(InputCode(0x08)));
        assert_eq!(Slot::ALL.len(), 22);
    }

    #[test]
    fn keyboard_sentinel_is_unbound_but_mouse_zero_is_bound() {
        let table = MappingTable::default();
        assert_eq!(table.effective_binding(Slot::AButton), None);
        assert_eq!(table.effective_binding(Slot::MouseLeft), Some(InputCode(0)));

        let bound: Vec<Slot> = table.slots_bound_to(InputCode(0)).collect();
        assert_eq!(bound, vec![Slot::MouseLeft]);
    }

    #[test]
    fn shared_codes_return_every_slot() {
        let table = MappingTable::default();
        // back and right_trigger both default to backspace
        let bound: Vec<Slot> = table.slots_bound_to(InputCode(0x08)).collect();
        assert_eq!(bound, vec![Slot::Back, Slot::RightTrigger]);
    }

    #[test]
    fn literals_fill_missing_keys_and_flag_invalid_ones() {
        let mut literals = BTreeMap::new();
        literals.insert("mouse_left".to_string(), "0x3".to_string());
        literals.insert("dpad_up".to_string(), "not-a-code".to_string());
        literals.insert("start".to_string(), "".to_string());
        literals.insert("turbo".to_string(), "0x1".to_string());

        let (table, warnings) = MappingTable::from_literals(&literals);

        assert_eq!(table.binding(Slot::MouseLeft), Some(InputCode(3)));
        assert_eq!(table.binding(Slot::DPadUp), None);
        assert_eq!(table.binding(Slot::Start), None);
        assert_eq!(table.binding(Slot::MouseRight), Some(InputCode(1)));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn literals_survive_a_write_and_read() {
        let mut table = MappingTable::default();
        table.bind(Slot::Back, None);
        table.bind(Slot::YButton, Some(InputCode(0x59)));

        let (reloaded, warnings) = MappingTable::from_literals(&table.to_literals());
        assert!(warnings.is_empty());
        assert_eq!(reloaded, table);
    }
}
