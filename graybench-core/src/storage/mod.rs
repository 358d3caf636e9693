//! File-backed JSON document store
//!
//! Collections are directories, documents are pretty-printed JSON files.
//! This backs benchmark runs, challenge attempts, session transcripts, and
//! anything else the platform wants to keep.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Collection and document names: alphanumerics plus `-` `_` `.`, no
/// leading dot. Keeps every write inside the store root.
fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Sanitize arbitrary text into a usable document id
pub fn sanitize_id(raw: &str) -> String {
    let mut id: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() || id.starts_with('.') {
        id = format!("doc_{id}");
    }
    id
}

#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    /// Open (and create) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(collection)?;
        validate_id(id)?;
        Ok(self.root.join(collection).join(format!("{id}.json")))
    }

    /// Write (or overwrite) a document
    pub fn put<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> Result<(), StoreError> {
        let path = self.doc_path(collection, id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let body = serde_json::to_string_pretty(value)?;
        fs::write(&path, body).map_err(|e| io_err(&path, e))
    }

    /// Read a document
    pub fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let path = self.doc_path(collection, id)?;
        if !path.exists() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        let body = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Document ids in a collection, sorted
    pub fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        validate_id(collection)?;
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if let Some(id) = name.strip_suffix(".json") {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete a document; deleting a missing document is an error
    pub fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.doc_path(collection, id)?;
        if !path.exists() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        fs::remove_file(&path).map_err(|e| io_err(&path, e))
    }
}
