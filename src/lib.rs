//! Utilities for evaluating text-to-SQL predictions: extract predicted SQL
//! from model output files, run the external test-suite evaluator, parse its
//! report, and compare two models' results interaction by interaction.

pub mod compare;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod extraction;
pub mod report;
pub mod runner;
pub mod types;

pub use compare::{compare_reports, ComparisonBuckets, ComparisonEntry};
pub use config::{DatasetPaths, EvalConfig, DEFAULT_EVAL_TIMEOUT};
pub use context::load_dev_contexts;
pub use display::{render_bucket, DisplayMode};
pub use error::{EvalError, Result};
pub use extraction::PredictionExtractor;
pub use report::{ParsedReport, ReportParser, ZeroTurnPolicy};
pub use runner::{Evaluator, TestSuiteEvaluator};
pub use types::{Dataset, DialogueContext, EvalType, PredictionRecord};
