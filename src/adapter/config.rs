use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::Result;

/// Adapter configuration as delivered by the host's configuration bag.
///
/// `lang`, `latitude` and `longitude` are filled in from the host's
/// `system.config` object during initialization when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Delete every object of this adapter before starting.
    #[serde(default)]
    pub forceinit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Adapter-specific keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdapterConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Names of every configured key, for start-up logging.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = vec!["forceinit".to_string()];
        if self.lang.is_some() {
            keys.push("lang".to_string());
        }
        if self.latitude.is_some() {
            keys.push("latitude".to_string());
        }
        if self.longitude.is_some() {
            keys.push("longitude".to_string());
        }
        keys.extend(self.extra.keys().cloned());
        keys
    }
}
