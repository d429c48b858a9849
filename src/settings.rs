use crate::cache::MappingCache;
use crate::error::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Per-cell mapping logs.
    pub display_logs: bool,
    /// Build mappings for every registered record when applied.
    pub warm_up: bool,
    pub other: HashMap<String, String>, // Keys reserved for callers
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading mapper settings from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Applies the settings. Returns the number of records preloaded into
    /// `cache` (zero when warm-up is off).
    pub fn apply(&self, cache: &MappingCache) -> Result<usize> {
        crate::set_display_logs(self.display_logs);
        if self.warm_up {
            cache.warm_up()
        } else {
            Ok(0)
        }
    }
}
