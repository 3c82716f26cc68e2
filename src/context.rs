use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EvalError, Result};
use crate::types::DialogueContext;

#[derive(Deserialize)]
struct DevEntry {
    #[serde(rename = "final")]
    final_turn: DevUtterance,
    interaction: Vec<DevUtterance>,
}

#[derive(Deserialize)]
struct DevUtterance {
    utterance: String,
}

/// Loads the reference dialogues from a dev-set file. Entry i lines up with
/// the i-th interaction of a parsed report.
pub fn load_dev_contexts(path: &Path) -> Result<Vec<DialogueContext>> {
    let text = fs::read_to_string(path).map_err(|e| EvalError::InputNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let entries: Vec<DevEntry> =
        serde_json::from_str(&text).map_err(|e| EvalError::InputNotFound {
            path: path.to_path_buf(),
            reason: format!("not valid JSON: {e}"),
        })?;

    Ok(entries
        .into_iter()
        .map(|entry| DialogueContext {
            goal: entry.final_turn.utterance,
            interactions: entry
                .interaction
                .into_iter()
                .map(|turn| turn.utterance)
                .collect(),
        })
        .collect())
}
