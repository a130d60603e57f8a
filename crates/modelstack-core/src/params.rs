use crate::error::{DeployError, Result};
use crate::io;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ParameterDocument
// ---------------------------------------------------------------------------

/// On-disk shape: a single top-level `Parameters` object of string pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ParameterDocument {
    #[serde(rename = "Parameters", default)]
    parameters: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// ParameterStore
// ---------------------------------------------------------------------------

/// Local persisted key/value document bridging pipeline stages. Loaded once
/// at the start of a run and persisted at checkpoints; the file is purely a
/// serialization boundary, never read mid-run.
///
/// The file is not locked. Concurrent pipelines against the same file lose
/// updates; running one pipeline at a time per file is the caller's
/// responsibility.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    path: PathBuf,
    doc: ParameterDocument,
}

impl ParameterStore {
    /// Load the store from `path`. A missing file is an empty document; a
    /// present but unparseable file fails loudly rather than being
    /// overwritten on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data).map_err(|source| {
                DeployError::MalformedParameterFile {
                    path: path.clone(),
                    source,
                }
            })?
        } else {
            ParameterDocument::default()
        };
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.doc.parameters.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.doc.parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.doc.parameters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.doc
            .parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Non-destructive merge: keys absent from `updates` are preserved, and
    /// no merge ever deletes a key.
    pub fn merge<I, K, V>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in updates {
            self.doc.parameters.insert(k.into(), v.into());
        }
    }

    /// Persist the document, pretty-printed, via an atomic replace.
    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.doc)?;
        io::atomic_write(&self.path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
