use crate::error::{EvalError, Result};
use crate::report::ParsedReport;
use crate::types::DialogueContext;

/// One interaction as seen by both systems: the reference dialogue plus each
/// system's verbatim detail block from its report.
#[derive(Debug, Clone)]
pub struct ComparisonEntry {
    pub context: DialogueContext,
    pub baseline_detail: Vec<String>,
    pub candidate_detail: Vec<String>,
}

/// The four disjoint outcome buckets of a baseline/candidate comparison.
/// Interaction order is preserved within each bucket.
#[derive(Debug, Clone, Default)]
pub struct ComparisonBuckets {
    pub both_right: Vec<ComparisonEntry>,
    pub both_wrong: Vec<ComparisonEntry>,
    pub baseline_only_right: Vec<ComparisonEntry>,
    pub candidate_only_right: Vec<ComparisonEntry>,
}

impl ComparisonBuckets {
    pub fn total(&self) -> usize {
        self.both_right.len()
            + self.both_wrong.len()
            + self.baseline_only_right.len()
            + self.candidate_only_right.len()
    }
}

/// Buckets every interaction by which of the two systems got it right. The
/// three inputs must be aligned index by index; a length mismatch means the
/// reports and the dev set disagree about the interaction count, which is an
/// upstream problem that must not be papered over by truncation.
pub fn compare_reports(
    baseline: &ParsedReport,
    candidate: &ParsedReport,
    contexts: &[DialogueContext],
) -> Result<ComparisonBuckets> {
    let baseline_len = baseline.interaction_results.len();
    let candidate_len = candidate.interaction_results.len();
    if contexts.len() != baseline_len || baseline_len != candidate_len {
        return Err(EvalError::LengthMismatch {
            contexts: contexts.len(),
            baseline: baseline_len,
            candidate: candidate_len,
        });
    }

    let mut buckets = ComparisonBuckets::default();
    for (i, context) in contexts.iter().enumerate() {
        let entry = ComparisonEntry {
            context: context.clone(),
            baseline_detail: baseline.interaction_details[i].clone(),
            candidate_detail: candidate.interaction_details[i].clone(),
        };
        match (
            baseline.interaction_results[i],
            candidate.interaction_results[i],
        ) {
            (true, true) => buckets.both_right.push(entry),
            (false, false) => buckets.both_wrong.push(entry),
            (true, false) => buckets.baseline_only_right.push(entry),
            (false, true) => buckets.candidate_only_right.push(entry),
        }
    }

    Ok(buckets)
}
