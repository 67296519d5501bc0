//! Error definitions for the mapping module

use thiserror::Error;

/// Errors raised while building or reading a mapping table
#[derive(Debug, Error)]
pub enum MappingError {
    /// A configured value is not a parseable code
    #[error("Invalid code literal: '{0}'")]
    InvalidCodeLiteral(String),

    /// A slot's configured value is not a parseable code; the slot is left unbound
    #[error("Slot '{slot}' left unbound: {source}")]
    InvalidSlotLiteral {
        slot: String,
        source: Box<MappingError>,
    },

    /// The config names a slot that does not exist
    #[error("Unknown mapping slot: {0}")]
    UnknownSlot(String),

    /// A bound code has no entry in the key table
    #[error("No key for virtual code {0:#04X}")]
    UnresolvableKey(u16),
}
