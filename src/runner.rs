use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::{DatasetPaths, DEFAULT_EVAL_TIMEOUT};
use crate::error::{EvalError, Result};
use crate::types::EvalType;

/// Seam around the external evaluation program so the rest of the pipeline
/// can be driven by a canned report in tests.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Runs the evaluator over a predictions text file and returns its full
    /// report text. The report is not interpreted here.
    async fn evaluate(&self, pred_file: &Path) -> Result<String>;
}

/// Invokes the official test-suite-sql-eval script as a subprocess.
pub struct TestSuiteEvaluator {
    python_bin: String,
    script: PathBuf,
    paths: DatasetPaths,
    etype: EvalType,
    timeout: Duration,
}

impl TestSuiteEvaluator {
    pub fn new(suite_path: impl AsRef<Path>, paths: DatasetPaths, etype: EvalType) -> Self {
        Self {
            python_bin: "python".to_string(),
            script: suite_path.as_ref().join("evaluation.py"),
            paths,
            etype,
            timeout: DEFAULT_EVAL_TIMEOUT,
        }
    }

    pub fn with_python_bin(mut self, bin: impl Into<String>) -> Self {
        self.python_bin = bin.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_args(&self, pred_file: &Path) -> Vec<String> {
        vec![
            self.script.display().to_string(),
            "--gold".to_string(),
            self.paths.gold_file.display().to_string(),
            "--pred".to_string(),
            pred_file.display().to_string(),
            "--etype".to_string(),
            self.etype.as_str().to_string(),
            "--db".to_string(),
            self.paths.db_dir.display().to_string(),
            "--table".to_string(),
            self.paths.table_file.display().to_string(),
        ]
    }
}

#[async_trait]
impl Evaluator for TestSuiteEvaluator {
    async fn evaluate(&self, pred_file: &Path) -> Result<String> {
        let args = self.build_args(pred_file);
        debug!(bin = %self.python_bin, ?args, "invoking evaluator");

        let mut cmd = Command::new(&self.python_bin);
        cmd.args(&args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| EvalError::SubprocessTimeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| EvalError::Subprocess {
                reason: format!("failed to spawn {}: {e}", self.python_bin),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvalError::Subprocess {
                reason: format!(
                    "{} exited with {}: {}",
                    self.script.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dataset;

    fn evaluator(suite: &Path) -> TestSuiteEvaluator {
        let paths = DatasetPaths::for_dataset("/data", Dataset::Sparc);
        TestSuiteEvaluator::new(suite, paths, EvalType::Match)
    }

    #[test]
    fn args_follow_the_evaluator_cli() {
        let eval = evaluator(Path::new("/suite"));
        let args = eval.build_args(Path::new("/tmp/preds.txt"));
        assert_eq!(
            args,
            vec![
                "/suite/evaluation.py",
                "--gold",
                "/data/sparc/dev_gold.txt",
                "--pred",
                "/tmp/preds.txt",
                "--etype",
                "match",
                "--db",
                "/data/sparc/database",
                "--table",
                "/data/sparc/tables.json",
            ]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_subprocess_error() {
        let dir = tempfile::tempdir().unwrap();
        let eval = evaluator(dir.path()).with_python_bin("no-such-interpreter-anywhere");
        let err = eval.evaluate(Path::new("preds.txt")).await.unwrap_err();
        assert!(matches!(err, EvalError::Subprocess { .. }));
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        // No evaluation.py in the suite dir, so the shell exits non-zero.
        let eval = evaluator(dir.path()).with_python_bin("sh");
        let err = eval.evaluate(Path::new("preds.txt")).await.unwrap_err();
        match err {
            EvalError::Subprocess { reason } => assert!(reason.contains("evaluation.py")),
            other => panic!("expected Subprocess, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn captured_stdout_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("evaluation.py"), "echo Right\n").unwrap();
        let eval = evaluator(dir.path()).with_python_bin("sh");
        let report = eval.evaluate(Path::new("preds.txt")).await.unwrap();
        assert_eq!(report, "Right\n");
    }

    #[tokio::test]
    async fn hung_evaluator_times_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("evaluation.py"), "sleep 5\n").unwrap();
        let eval = evaluator(dir.path())
            .with_python_bin("sh")
            .with_timeout(Duration::from_millis(100));
        let err = eval.evaluate(Path::new("preds.txt")).await.unwrap_err();
        assert!(matches!(err, EvalError::SubprocessTimeout { .. }));
    }
}
