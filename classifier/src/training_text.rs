//! Line-delimited JSON training text.
//!
//! One object per line:
//! `{"id": 7, "text": "buy now", "classifications": ["spam"]}`.
//! Blank lines and lines starting with `#` are skipped. Every line is NFC
//! normalized, trimmed and lowercased before decoding. Rows are keyed by
//! their 1-based line number, skipped lines included.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ahash::AHashMap;
use granite_core::utils::normalize;
use granite_core::{GraniteError, GraniteResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A labelled piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingText {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub classifications: BTreeSet<String>,
}

impl TrainingText {
    pub fn new<I, S>(id: i64, text: impl Into<String>, classifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            text: text.into(),
            classifications: classifications.into_iter().map(Into::into).collect(),
        }
    }

    /// At least one classification, none of them blank.
    pub fn validate(&self) -> GraniteResult<()> {
        if self.classifications.is_empty() {
            return Err(GraniteError::invalid_row(self.id, "no classifications"));
        }
        if self.classifications.iter().any(|c| c.trim().is_empty()) {
            return Err(GraniteError::invalid_row(self.id, "blank classification"));
        }
        Ok(())
    }
}

/// Decode training text from file contents.
///
/// # Example
/// ```
/// use granite_classifier::training_text::parse_training_text;
///
/// let rows = parse_training_text(
///     "# corpus\n{\"id\": 1, \"text\": \"Buy NOW\", \"classifications\": [\"spam\"]}\n",
/// )
/// .unwrap();
/// assert_eq!(rows[&2].text, "buy now");
/// ```
pub fn parse_training_text(content: &str) -> GraniteResult<BTreeMap<usize, TrainingText>> {
    let mut rows = BTreeMap::new();
    let mut lines_by_id: AHashMap<i64, usize> = AHashMap::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = normalize(line).to_lowercase();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let text: TrainingText =
            serde_json::from_str(&trimmed).map_err(|e| GraniteError::MalformedTrainingText {
                line: line_number,
                reason: e.to_string(),
            })?;
        text.validate()?;

        if let Some(previous) = lines_by_id.insert(text.id, line_number) {
            warn!(id = text.id, previous, line = line_number, "duplicate training text id");
        }
        rows.insert(line_number, text);
    }

    Ok(rows)
}

/// Load a training text file.
pub fn load_training_text<P: AsRef<Path>>(path: P) -> GraniteResult<BTreeMap<usize, TrainingText>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let rows = parse_training_text(&content)?;
    info!(count = rows.len(), path = %path.display(), "loaded training text");
    Ok(rows)
}
