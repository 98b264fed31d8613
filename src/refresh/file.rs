//! JSON snapshot file source
//!
//! Reads a flat JSON object from disk on every refresh. String values are
//! stored as-is; any other JSON value is stored as its JSON text.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde_json::{Map, Value};

use crate::refresh::RefreshSource;

/// Refresh source backed by a JSON object file such as `{"region": "eu-west-1"}`.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RefreshSource<String, String> for FileSnapshotSource {
    fn refresh(&self) -> anyhow::Result<HashMap<String, String>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading snapshot {}", self.path.display()))?;
        let doc: Map<String, Value> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))?;

        Ok(doc
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect())
    }
}
