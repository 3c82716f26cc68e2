use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::Dataset;

/// Upper bound on one evaluator run; execution-based evaluation replays
/// every query against the test-suite databases and can take a while.
pub const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(600);

/// Gold/db/table locations for one dataset, laid out the way the benchmark
/// archives unpack: `<base>/<dataset>/{database,tables.json,dev_gold.txt}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPaths {
    pub db_dir: PathBuf,
    pub table_file: PathBuf,
    pub gold_file: PathBuf,
}

impl DatasetPaths {
    pub fn for_dataset(base_dir: impl AsRef<Path>, dataset: Dataset) -> Self {
        let root = base_dir.as_ref().join(dataset.as_str());
        Self {
            db_dir: root.join("database"),
            table_file: root.join("tables.json"),
            gold_file: root.join("dev_gold.txt"),
        }
    }
}

/// Everything location-like a run needs, passed in explicitly instead of
/// living in a process-wide table.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub base_dir: PathBuf,
    pub suite_path: PathBuf,
    pub output_dir: PathBuf,
    pub eval_timeout: Duration,
}

impl EvalConfig {
    pub fn dataset_paths(&self, dataset: Dataset) -> DatasetPaths {
        DatasetPaths::for_dataset(&self.base_dir, dataset)
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./data"),
            suite_path: PathBuf::from("./test-suite-sql-eval"),
            output_dir: PathBuf::from("./output"),
            eval_timeout: DEFAULT_EVAL_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_benchmark_layout() {
        let paths = DatasetPaths::for_dataset("/data", Dataset::Cosql);
        assert_eq!(paths.db_dir, PathBuf::from("/data/cosql/database"));
        assert_eq!(paths.table_file, PathBuf::from("/data/cosql/tables.json"));
        assert_eq!(paths.gold_file, PathBuf::from("/data/cosql/dev_gold.txt"));
    }

    #[test]
    fn config_derives_per_dataset_paths() {
        let config = EvalConfig {
            base_dir: PathBuf::from("/bench"),
            ..EvalConfig::default()
        };
        let paths = config.dataset_paths(Dataset::Sparc);
        assert_eq!(paths.gold_file, PathBuf::from("/bench/sparc/dev_gold.txt"));
    }
}
