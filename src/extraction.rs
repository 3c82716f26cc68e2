use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::{EvalError, Result};
use crate::types::{Dataset, PredictionRecord};

/// Separates the difficulty label from the SQL in raw model output,
/// e.g. `easy | SELECT count(*) FROM singer`.
pub const PREDICTION_DELIMITER: char = '|';

/// Drops everything up to and including the first delimiter and trims the
/// rest. Output without a delimiter is kept whole.
pub fn clean_prediction(raw: &str) -> String {
    match raw.split_once(PREDICTION_DELIMITER) {
        Some((_, sql)) => sql.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Turns a JSON predictions dump into the one-prediction-per-line text file
/// the external evaluator consumes.
pub struct PredictionExtractor {
    output_dir: PathBuf,
}

impl PredictionExtractor {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the cleaned predictions in input order together with the path
    /// of the text file they were written to. The file name embeds dataset,
    /// tag and a timestamp so repeated runs never collide.
    pub fn extract(
        &self,
        input: &Path,
        dataset: Dataset,
        tag: &str,
    ) -> Result<(Vec<String>, PathBuf)> {
        let text = fs::read_to_string(input).map_err(|e| EvalError::InputNotFound {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;
        let records: Vec<PredictionRecord> =
            serde_json::from_str(&text).map_err(|e| EvalError::InputNotFound {
                path: input.to_path_buf(),
                reason: format!("not valid JSON: {e}"),
            })?;

        let predictions = if dataset.is_multi_turn() {
            // The first record of sparc/cosql dumps is a reserved aggregate
            // slot, not a prediction.
            let mut cleaned = Vec::with_capacity(records.len().saturating_sub(1));
            for record in records.iter().skip(1) {
                let turn_idx = record.turn_idx.ok_or_else(|| EvalError::InputNotFound {
                    path: input.to_path_buf(),
                    reason: format!("record missing turn_idx required by {dataset}"),
                })?;
                if turn_idx == -1 {
                    cleaned.push(String::new());
                } else {
                    cleaned.push(clean_prediction(&record.prediction));
                }
            }
            cleaned
        } else {
            records
                .iter()
                .map(|r| clean_prediction(&r.prediction))
                .collect()
        };

        fs::create_dir_all(&self.output_dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let out_path = self
            .output_dir
            .join(format!("output_{dataset}_{tag}_{stamp}.txt"));
        let mut body = String::new();
        for prediction in &predictions {
            body.push_str(prediction);
            body.push('\n');
        }
        fs::write(&out_path, body)?;
        info!(path = %out_path.display(), lines = predictions.len(), "wrote predictions file");

        Ok((predictions, out_path))
    }
}
