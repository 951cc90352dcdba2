// src/types/personal_data.rs
//! Personal data loaded once per language and kept immutable for the run

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::core::FsOps;
use crate::error::ConfigError;

/// Field name to scalar, nested mapping or list; keys keep file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalData(Map<String, Value>);

impl PersonalData {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        match FsOps::read_json::<Value>(path).await? {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON text embedded in the prompt
    pub fn to_prompt_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Copy of the fields with `extra` string entries added or overwritten
    pub fn merged_with<I, K, V>(&self, extra: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = self.0.clone();
        for (key, value) in extra {
            merged.insert(key.into(), Value::String(value.into()));
        }
        merged
    }
}

impl From<Map<String, Value>> for PersonalData {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
