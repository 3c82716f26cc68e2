use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::EvalError;

/// Benchmarks the evaluator knows about. Spider is single-turn; SParC and
/// CoSQL are multi-turn dialogues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Spider,
    Sparc,
    Cosql,
}

impl Dataset {
    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Spider => "spider",
            Dataset::Sparc => "sparc",
            Dataset::Cosql => "cosql",
        }
    }

    pub fn is_multi_turn(self) -> bool {
        !matches!(self, Dataset::Spider)
    }
}

impl FromStr for Dataset {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spider" => Ok(Dataset::Spider),
            "sparc" => Ok(Dataset::Sparc),
            "cosql" => Ok(Dataset::Cosql),
            other => Err(EvalError::UnsupportedDataset(other.to_string())),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The evaluator's `--etype` flag: exact-match or execution correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalType {
    Match,
    Exec,
}

impl EvalType {
    pub fn as_str(self) -> &'static str {
        match self {
            EvalType::Match => "match",
            EvalType::Exec => "exec",
        }
    }
}

impl FromStr for EvalType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "match" => Ok(EvalType::Match),
            "exec" => Ok(EvalType::Exec),
            other => Err(EvalError::UnsupportedEvalType(other.to_string())),
        }
    }
}

impl fmt::Display for EvalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the JSON predictions dump. `turn_idx` is only present in
/// multi-turn dumps; -1 marks an artificial turn with no expected prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    pub prediction: String,
    #[serde(default)]
    pub turn_idx: Option<i64>,
}

/// Reference dialogue for one interaction of the dev set, aligned by index
/// with the parsed report.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueContext {
    /// Final utterance, i.e. what the dialogue was driving at.
    pub goal: String,
    /// One utterance per turn, in order.
    pub interactions: Vec<String>,
}
