// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::extractors::verdict::DocumentFacts;
use crate::utils::error::StorageError;

/// Encodes one document's result in the output record format:
/// `[filename, {accused_name: [[charge, sentence_or_null], ...], ...}]`.
pub fn record_json(doc_id: &str, facts: &DocumentFacts) -> Value {
    let mut charges = Map::new();
    for (name, pairs) in &facts.charges {
        let list: Vec<Value> = pairs
            .iter()
            .map(|pair| json!([pair.charge, pair.sentence]))
            .collect();
        charges.insert(name.clone(), Value::Array(list));
    }
    json!([doc_id, charges])
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self {
            base_dir: base_path,
        })
    }

    /// Saves a document's extracted record as `<stem>_charges.json`.
    pub fn save_document(
        &self,
        doc_id: &str,
        facts: &DocumentFacts,
    ) -> Result<PathBuf, StorageError> {
        let record = record_json(doc_id, facts);
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let file_path = self.base_dir.join(format!("{}_charges.json", stem(doc_id)));
        fs::write(&file_path, content)?;

        tracing::info!("Saved charges to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves extraction metadata for a document as `<stem>_meta.json`.
    pub fn save_document_metadata(
        &self,
        doc_id: &str,
        facts: &DocumentFacts,
    ) -> Result<PathBuf, StorageError> {
        let metadata = json!({
            "document": doc_id,
            "accused_count": facts.charges.len(),
            "table_names": facts.table_names,
            "tables_processed": facts.tables_processed,
            "table_format_failures": facts.table_format_failures,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let content = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let file_path = self.base_dir.join(format!("{}_meta.json", stem(doc_id)));
        fs::write(&file_path, content)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

fn stem(doc_id: &str) -> &str {
    Path::new(doc_id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(doc_id)
}
