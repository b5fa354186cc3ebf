//! Decodes raw model output into correction records.

use crate::models::TagValue;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// One model-proposed correction for a file, positionally paired with its
/// batch entry. No schema validation beyond "decodable sequence of
/// mappings"; consumers default missing fields to the sentinel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Correction {
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Correction {
    /// Missing or blank fields default to the sentinel at consumption
    /// time, not at parse time.
    pub fn field(&self, name: &str) -> TagValue {
        TagValue::from_raw(self.metadata.get(name).cloned())
    }
}

/// Decode the model's raw text.
///
/// Strict JSON first; when that fails, recover the first bracket-delimited
/// array (greedy across newlines) and retry — models frequently wrap valid
/// output in prose. `None` means "could not recover a result" and the
/// caller skips the batch.
pub fn parse(raw: &str) -> Option<Vec<Correction>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = serde_json::from_str::<Vec<Correction>>(trimmed) {
        return Some(parsed);
    }

    let pattern = Regex::new(r"(?s)\[.*\]").ok()?;
    let candidate = pattern.find(trimmed)?;
    serde_json::from_str::<Vec<Correction>>(candidate.as_str()).ok()
}
