use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use sqleval_rs::*;

#[derive(Parser)]
#[command(name="sqleval", version)]
struct Cli {
  #[command(subcommand)]
  cmd: Cmd,
  /// Root of the per-dataset gold/db/table files
  #[arg(long, default_value="./data")] base_dir: String,
  /// Where extracted prediction files are written
  #[arg(long, default_value="./output")] output_dir: String,
}

#[derive(Subcommand)]
enum Cmd {
  /// End-to-end: extract -> evaluate -> parse -> summary
  Run { #[arg(long)] input_file: String, #[arg(long)] dataset: String, #[arg(long, default_value="match")] etype: String, #[arg(long, default_value="./test-suite-sql-eval")] suite_path: String, #[arg(long, default_value="")] tag: String, #[arg(long, default_value_t=600)] eval_timeout_secs: u64, #[arg(long)] report_out: Option<String> },
  /// Extract prediction lines from a JSON predictions dump
  Extract { #[arg(long)] input_file: String, #[arg(long)] dataset: String, #[arg(long, default_value="")] tag: String },
  /// Evaluate an existing predictions text file
  Evaluate { #[arg(long)] pred_file: String, #[arg(long)] dataset: String, #[arg(long, default_value="match")] etype: String, #[arg(long, default_value="./test-suite-sql-eval")] suite_path: String, #[arg(long, default_value_t=600)] eval_timeout_secs: u64, #[arg(long)] report_out: Option<String> },
  /// Compare two saved reports and print one divergence bucket
  Compare { #[arg(long)] baseline_report: String, #[arg(long)] candidate_report: String, #[arg(long)] dev_file: String, #[arg(long, default_value="candidate-only-right")] part: String, #[arg(long, default_value="refined")] mode: String },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();
  let cli = Cli::parse();

  match cli.cmd {
    Cmd::Run { input_file, dataset, etype, suite_path, tag, eval_timeout_secs, report_out } => {
      let dataset: Dataset = dataset.parse()?;
      let etype: EvalType = etype.parse()?;
      let config = EvalConfig {
        base_dir: PathBuf::from(&cli.base_dir),
        suite_path: PathBuf::from(&suite_path),
        output_dir: PathBuf::from(&cli.output_dir),
        eval_timeout: Duration::from_secs(eval_timeout_secs),
      };
      let extractor = PredictionExtractor::new(&config.output_dir);
      let (_, pred_path) = extractor.extract(Path::new(&input_file), dataset, &tag)?;
      let evaluator =
        TestSuiteEvaluator::new(&config.suite_path, config.dataset_paths(dataset), etype)
          .with_timeout(config.eval_timeout);
      let report = evaluator.evaluate(&pred_path).await?;
      print!("{report}");
      save_report(report_out.as_deref(), &report)?;
      if dataset.is_multi_turn() {
        let parsed = ReportParser::new().parse(&report)?;
        info!(
          questions = parsed.question_results.len(),
          interactions = parsed.interaction_results.len(),
          question_accuracy = parsed.question_accuracy(),
          interaction_accuracy = parsed.interaction_accuracy(),
          "parsed report"
        );
      }
    }
    Cmd::Extract { input_file, dataset, tag } => {
      let dataset: Dataset = dataset.parse()?;
      let extractor = PredictionExtractor::new(&cli.output_dir);
      extractor.extract(Path::new(&input_file), dataset, &tag)?;
    }
    Cmd::Evaluate { pred_file, dataset, etype, suite_path, eval_timeout_secs, report_out } => {
      let dataset: Dataset = dataset.parse()?;
      let etype: EvalType = etype.parse()?;
      let paths = DatasetPaths::for_dataset(&cli.base_dir, dataset);
      let evaluator = TestSuiteEvaluator::new(&suite_path, paths, etype)
        .with_timeout(Duration::from_secs(eval_timeout_secs));
      let report = evaluator.evaluate(Path::new(&pred_file)).await?;
      print!("{report}");
      save_report(report_out.as_deref(), &report)?;
    }
    Cmd::Compare { baseline_report, candidate_report, dev_file, part, mode } => {
      let baseline_text = std::fs::read_to_string(&baseline_report)
        .with_context(|| format!("reading baseline report {baseline_report}"))?;
      let candidate_text = std::fs::read_to_string(&candidate_report)
        .with_context(|| format!("reading candidate report {candidate_report}"))?;
      let parser = ReportParser::new();
      let baseline = parser.parse(&baseline_text)?;
      let candidate = parser.parse(&candidate_text)?;
      let contexts = load_dev_contexts(Path::new(&dev_file))?;
      let buckets = compare_reports(&baseline, &candidate, &contexts)?;
      info!(
        both_right = buckets.both_right.len(),
        both_wrong = buckets.both_wrong.len(),
        baseline_only_right = buckets.baseline_only_right.len(),
        candidate_only_right = buckets.candidate_only_right.len(),
        "comparison buckets"
      );
      let entries = match part.as_str() {
        "both-right" => &buckets.both_right,
        "both-wrong" => &buckets.both_wrong,
        "baseline-only-right" => &buckets.baseline_only_right,
        "candidate-only-right" => &buckets.candidate_only_right,
        other => bail!("unknown part `{other}` (expected both-right, both-wrong, baseline-only-right or candidate-only-right)"),
      };
      let mode = match mode.as_str() {
        "refined" => DisplayMode::Refined,
        "raw" => DisplayMode::Raw,
        other => bail!("unknown mode `{other}` (expected refined or raw)"),
      };
      let stdout = std::io::stdout();
      render_bucket(&mut stdout.lock(), entries, mode)?;
    }
  }

  Ok(())
}

fn save_report(path: Option<&str>, report: &str) -> Result<()> {
  if let Some(path) = path {
    std::fs::write(path, report).with_context(|| format!("writing report to {path}"))?;
    info!(path, "saved report");
  }
  Ok(())
}
