//! Mapping from controller inputs to actions
//!
//! Holds the slot table that binds each logical action to an input code, and the
//! fixed virtual-key table keyboard slots resolve their code through.

pub mod error;
pub mod keymap;
pub mod mapping_table;

pub use error::MappingError;
pub use keymap::Key;
pub use mapping_table::{ControlAction, InputCode, MappingTable, Slot, SlotKind, TriggerSide};
