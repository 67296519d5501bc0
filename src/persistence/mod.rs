//! # Persistence Module
//!
//! ## Why This Module Exists
//! The translation core receives its slot bindings and sensitivity from the outside.
//! This module is that outside: a single TOML file holding the sensitivity
//! multiplier and one code literal per mapping slot.
//!
//! ## Key Abstractions
//! - **[`config_store::ConfigStore`]**: load/save of the file with default filling
//! - **[`persistence_worker::PersistenceWorker`]**: tokio task that serialises
//!   save requests coming from the poll loop and the console
//!
//! ## Error Handling Strategy
//! File operations return `color_eyre` results with context. A missing or
//! unreadable file never prevents startup: defaults are used, written back, and
//! a [`ConfigNotice`] tells the caller what happened.

pub mod config_store;
pub mod persistence_worker;

use crate::mapping::{MappingError, MappingTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// On-disk layout of the config file
///
/// Mapping values are kept as literal strings so a typo survives a rewrite and
/// can be fixed by hand.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct StoredConfig {
    #[serde(default)]
    pub sensitivity_multiplier: Option<f64>,

    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// Something about the config file the user should know about
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigNotice {
    /// No file existed, defaults were written
    Created(PathBuf),

    /// File could not be read or parsed and was replaced with defaults
    Replaced { path: PathBuf, reason: String },

    /// Keys were missing and have been filled with defaults
    Completed { missing: Vec<String> },
}

impl fmt::Display for ConfigNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNotice::Created(path) => {
                write!(f, "No config found, created default at {}", path.display())
            }
            ConfigNotice::Replaced { path, reason } => write!(
                f,
                "Config at {} was unusable ({}), replaced with defaults",
                path.display(),
                reason
            ),
            ConfigNotice::Completed { missing } => {
                write!(f, "Filled missing config keys: {}", missing.join(", "))
            }
        }
    }
}

/// Result of loading the config file
#[derive(Debug)]
pub struct LoadedConfig {
    pub mapping: MappingTable,
    pub sensitivity: f64,
    pub notice: Option<ConfigNotice>,

    /// Slots whose literal could not be used
    pub warnings: Vec<MappingError>,
}
