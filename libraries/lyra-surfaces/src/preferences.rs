//! Typed key/value storage for widget hosts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SurfaceError};

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PreferenceValue {
    Int(i32),
    Long(i64),
    Text(String),
}

/// Key/value store the widget host persists
///
/// Reads of a key stored with a different type return `None`.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<PreferenceValue>;

    fn set(&mut self, key: &str, value: PreferenceValue);

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            PreferenceValue::Int(v) => Some(v),
            _ => None,
        }
    }

    fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            PreferenceValue::Long(v) => Some(v),
            _ => None,
        }
    }

    fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PreferenceValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// In-memory store, optionally persisted as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPreferences {
    values: BTreeMap<String, PreferenceValue>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SurfaceError::PreferencesNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load from `path`, starting empty if the file does not exist yet
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(path) {
            Err(SurfaceError::PreferencesNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<PreferenceValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: PreferenceValue) {
        self.values.insert(key.to_string(), value);
    }
}
