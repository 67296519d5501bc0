use super::{ConfigNotice, LoadedConfig, StoredConfig};
use crate::engine::runtime::{clamp_sensitivity, DEFAULT_SENSITIVITY};
use crate::mapping::{InputCode, MappingTable, Slot};
use color_eyre::{eyre::eyre, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "gopher";
const CONFIG_FILE: &str = "config.toml";

/// TOML-backed store for the mapping table and sensitivity
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/gopher/config.toml`
    pub fn at_default_location() -> Result<Self> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine the user config directory"))?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, repairing the file where needed
    ///
    /// Missing or unparsable files are replaced by defaults. Missing keys are
    /// filled in and the file is rewritten. Invalid literals are kept on disk and
    /// returned as warnings; their slots stay unbound.
    pub async fn load(&self) -> Result<LoadedConfig> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?;
        if !exists {
            info!("No config at {}, writing defaults", self.path.display());
            return self
                .write_defaults(ConfigNotice::Created(self.path.clone()))
                .await;
        }

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                return self.replace_with_defaults(e.to_string()).await;
            }
        };

        let mut stored: StoredConfig = match toml::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                return self.replace_with_defaults(e.message().to_string()).await;
            }
        };

        let missing = fill_missing(&mut stored);
        let notice = if missing.is_empty() {
            None
        } else {
            info!("Filling {} missing config keys", missing.len());
            self.write(&stored).await?;
            Some(ConfigNotice::Completed { missing })
        };

        let (mapping, warnings) = MappingTable::from_literals(&stored.mapping);
        for warning in &warnings {
            warn!("{}", warning);
        }

        let sensitivity = clamp_sensitivity(
            stored
                .sensitivity_multiplier
                .unwrap_or(DEFAULT_SENSITIVITY),
        );
        debug!("Loaded config from {}", self.path.display());

        Ok(LoadedConfig {
            mapping,
            sensitivity,
            notice,
            warnings,
        })
    }

    /// Writes the mapping table and sensitivity
    ///
    /// Merges into the file on disk: a slot's literal is only rewritten when its
    /// binding changed, so invalid literals and unknown keys stay for the user to
    /// fix by hand.
    pub async fn save(&self, mapping: &MappingTable, sensitivity: f64) -> Result<()> {
        let mut stored = self.read_stored().await.unwrap_or_default();
        let changed = merge_bindings(&mut stored.mapping, mapping);
        stored.sensitivity_multiplier = Some(clamp_sensitivity(sensitivity));
        self.write(&stored).await?;
        debug!(
            "Config saved to {} ({} mapping keys rewritten)",
            self.path.display(),
            changed
        );
        Ok(())
    }

    /// Resets the file to defaults and returns them
    ///
    /// Unlike `save` this discards everything else in the file.
    pub async fn load_defaults(&self) -> Result<(MappingTable, f64)> {
        let mapping = MappingTable::default();
        let stored = StoredConfig {
            sensitivity_multiplier: Some(DEFAULT_SENSITIVITY),
            mapping: mapping.to_literals(),
        };
        self.write(&stored).await?;
        info!("Config reset to defaults");
        Ok((mapping, DEFAULT_SENSITIVITY))
    }

    // Current file contents, if there is a readable and parsable file
    async fn read_stored(&self) -> Option<StoredConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No existing config to merge into: {}", e);
                return None;
            }
        };
        match toml::from_str(&content) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!("Existing config is not valid TOML, overwriting: {}", e);
                None
            }
        }
    }

    async fn replace_with_defaults(&self, reason: String) -> Result<LoadedConfig> {
        self.write_defaults(ConfigNotice::Replaced {
            path: self.path.clone(),
            reason,
        })
        .await
    }

    async fn write_defaults(&self, notice: ConfigNotice) -> Result<LoadedConfig> {
        let (mapping, sensitivity) = self.load_defaults().await?;
        Ok(LoadedConfig {
            mapping,
            sensitivity,
            notice: Some(notice),
            warnings: Vec::new(),
        })
    }

    async fn write(&self, stored: &StoredConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(stored)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))?;
        Ok(())
    }
}

// Rewrites the literals whose binding differs from `mapping`, returns how many
fn merge_bindings(literals: &mut BTreeMap<String, String>, mapping: &MappingTable) -> usize {
    let mut changed = 0;
    for slot in Slot::ALL {
        let binding = mapping.binding(*slot);
        let stored = literals
            .get(slot.config_key())
            .map(|literal| literal_binding(literal));
        if stored != Some(binding) {
            let literal = binding.map(|code| code.to_string()).unwrap_or_default();
            literals.insert(slot.config_key().to_string(), literal);
            changed += 1;
        }
    }
    changed
}

// Binding a stored literal loads as; empty and invalid literals are unbound
fn literal_binding(literal: &str) -> Option<InputCode> {
    if literal.trim().is_empty() {
        return None;
    }
    InputCode::parse(literal).ok()
}

// Adds default literals for absent keys, returns the keys that were added
fn fill_missing(stored: &mut StoredConfig) -> Vec<String> {
    let mut missing = Vec::new();

    if stored.sensitivity_multiplier.is_none() {
        stored.sensitivity_multiplier = Some(DEFAULT_SENSITIVITY);
        missing.push("sensitivity_multiplier".to_string());
    }

    for slot in Slot::ALL {
        if !stored.mapping.contains_key(slot.config_key()) {
            stored
                .mapping
                .insert(slot.config_key().to_string(), slot.default_code().to_string());
            missing.push(slot.config_key().to_string());
        }
    }
    missing
}
