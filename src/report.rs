use crate::error::{EvalError, Result};

// Report layout of the test-suite-sql-eval version this crate was written
// against: each interaction block is one header line followed by four lines
// per turn, and the per-interaction section is terminated by the aggregate
// score table. A future evaluator changing its layout must fail parsing
// here rather than silently skew the turn arithmetic.
pub const LINES_PER_TURN: usize = 4;
pub const BLOCK_HEADER_LINES: usize = 1;

/// Ordinal header the evaluator prints before each interaction block,
/// e.g. `3th prediction`.
pub fn is_prediction_header(line: &str) -> bool {
    line.contains("th prediction")
}

/// First line of the aggregate score table that follows the last block.
pub fn is_aggregate_marker(line: &str) -> bool {
    line.contains("joint_all")
}

/// Compatibility shim around the evaluator's report format: two different
/// marker lines both delimit interaction blocks.
pub fn is_interaction_boundary(line: &str) -> bool {
    is_prediction_header(line) || is_aggregate_marker(line)
}

/// What to do with an interaction whose block contains no turns. The
/// evaluator is not known to emit these on purpose, so callers can choose
/// between scoring them vacuously correct (AND over nothing) and treating
/// them as a parse failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroTurnPolicy {
    #[default]
    VacuouslyCorrect,
    Reject,
}

/// Structured view of one evaluator report. The four sequences are aligned:
/// interaction k owns `turn_counts[k]` consecutive entries of
/// `question_results` and the verbatim lines in `interaction_details[k]`.
#[derive(Debug, Clone, Default)]
pub struct ParsedReport {
    /// Per-question outcomes in report order, across all interactions.
    pub question_results: Vec<bool>,
    /// Per-interaction outcomes: true iff every turn was right.
    pub interaction_results: Vec<bool>,
    /// Verbatim detail block per interaction, header line included.
    pub interaction_details: Vec<Vec<String>>,
    pub turn_counts: Vec<usize>,
}

impl ParsedReport {
    pub fn question_accuracy(&self) -> f64 {
        if self.question_results.is_empty() {
            return 0.0;
        }
        let right = self.question_results.iter().filter(|&&q| q).count();
        right as f64 / self.question_results.len() as f64
    }

    pub fn interaction_accuracy(&self) -> f64 {
        if self.interaction_results.is_empty() {
            return 0.0;
        }
        let right = self.interaction_results.iter().filter(|&&q| q).count();
        right as f64 / self.interaction_results.len() as f64
    }
}

/// Single-pass parser for the evaluator's textual report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportParser {
    zero_turn_policy: ZeroTurnPolicy,
}

impl ReportParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_turn_policy(policy: ZeroTurnPolicy) -> Self {
        Self {
            zero_turn_policy: policy,
        }
    }

    pub fn parse(&self, report: &str) -> Result<ParsedReport> {
        let lines: Vec<&str> = report.lines().collect();

        let boundaries: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_interaction_boundary(line))
            .map(|(i, _)| i)
            .collect();

        // The span between consecutive boundaries must be one header plus a
        // whole number of turns; the block after the final boundary is the
        // aggregate tail, not an interaction.
        let mut turn_counts = Vec::with_capacity(boundaries.len().saturating_sub(1));
        for pair in boundaries.windows(2) {
            let span = pair[1] - pair[0];
            if (span - BLOCK_HEADER_LINES) % LINES_PER_TURN != 0 {
                return Err(EvalError::MalformedReport {
                    line: pair[1],
                    reason: format!(
                        "block of {span} lines is not {BLOCK_HEADER_LINES} header + {LINES_PER_TURN} lines per turn"
                    ),
                });
            }
            turn_counts.push((span - BLOCK_HEADER_LINES) / LINES_PER_TURN);
        }

        let question_results: Vec<bool> = lines
            .iter()
            .filter_map(|line| match *line {
                "Right" => Some(true),
                "Wrong" => Some(false),
                _ => None,
            })
            .collect();

        let expected: usize = turn_counts.iter().sum();
        if expected != question_results.len() {
            return Err(EvalError::MalformedReport {
                line: lines.len(),
                reason: format!(
                    "{} Right/Wrong lines but turn counts sum to {expected}",
                    question_results.len()
                ),
            });
        }

        let mut interaction_results = Vec::with_capacity(turn_counts.len());
        let mut interaction_details = Vec::with_capacity(turn_counts.len());
        let mut line_cursor = boundaries.first().copied().unwrap_or(0);
        let mut outcome_cursor = 0usize;
        for (k, &turns) in turn_counts.iter().enumerate() {
            if turns == 0 && self.zero_turn_policy == ZeroTurnPolicy::Reject {
                return Err(EvalError::MalformedReport {
                    line: line_cursor,
                    reason: format!("interaction {k} has no turns"),
                });
            }
            let span = turns * LINES_PER_TURN + BLOCK_HEADER_LINES;
            let block: Vec<String> = lines[line_cursor..line_cursor + span]
                .iter()
                .map(|line| line.to_string())
                .collect();
            let questions = &question_results[outcome_cursor..outcome_cursor + turns];
            interaction_results.push(questions.iter().all(|&q| q));
            interaction_details.push(block);
            line_cursor += span;
            outcome_cursor += turns;
        }

        Ok(ParsedReport {
            question_results,
            interaction_results,
            interaction_details,
            turn_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds one interaction block in the evaluator's layout: ordinal
    // header, then per turn a result line, a prediction line, a gold line
    // and a blank line.
    fn block(ordinal: usize, outcomes: &[bool]) -> String {
        let mut s = format!("{ordinal}th prediction\n");
        for (turn, ok) in outcomes.iter().enumerate() {
            s.push_str(if *ok { "Right\n" } else { "Wrong\n" });
            s.push_str(&format!("easy pred: SELECT {turn}\n"));
            s.push_str(&format!("easy gold: SELECT {turn}\n"));
            s.push('\n');
        }
        s
    }

    fn full_report(interactions: &[&[bool]]) -> String {
        let mut s = String::new();
        for (i, outcomes) in interactions.iter().enumerate() {
            s.push_str(&block(i, outcomes));
        }
        s.push_str("joint_all                 0.500\n");
        s
    }

    #[test]
    fn boundary_markers() {
        assert!(is_interaction_boundary("12th prediction"));
        assert!(is_interaction_boundary("joint_all    0.42"));
        assert!(!is_interaction_boundary("Right"));
        assert!(!is_interaction_boundary("easy pred: SELECT 1"));
    }

    #[test]
    fn single_interaction_report() {
        let report = "1th prediction\nq\nRight\nbase\nextra\njoint_all";
        let parsed = ReportParser::new().parse(report).unwrap();
        assert_eq!(parsed.turn_counts, vec![1]);
        assert_eq!(parsed.question_results, vec![true]);
        assert_eq!(parsed.interaction_results, vec![true]);
        assert_eq!(
            parsed.interaction_details,
            vec![vec!["1th prediction", "q", "Right", "base", "extra"]]
        );
    }

    #[test]
    fn concatenated_fragments_round_trip() {
        let report = full_report(&[&[true], &[true, false], &[false]]);
        let parsed = ReportParser::new().parse(&report).unwrap();
        assert_eq!(parsed.turn_counts, vec![1, 2, 1]);
        assert_eq!(parsed.question_results, vec![true, true, false, false]);
        assert_eq!(parsed.interaction_results, vec![true, false, false]);
        assert_eq!(
            parsed.turn_counts.iter().sum::<usize>(),
            parsed.question_results.len()
        );
    }

    #[test]
    fn detail_blocks_are_anchored_at_the_first_boundary() {
        let mut report = String::from("eval started\nloading databases\n");
        report.push_str(&full_report(&[&[true]]));
        let parsed = ReportParser::new().parse(&report).unwrap();
        assert_eq!(parsed.interaction_details[0][0], "0th prediction");
        assert_eq!(parsed.interaction_details[0].len(), 5);
    }

    #[test]
    fn uneven_block_span_is_malformed() {
        let report = "1th prediction\nx\nRight\njoint_all";
        let err = ReportParser::new().parse(report).unwrap_err();
        assert!(matches!(err, EvalError::MalformedReport { line: 3, .. }));
    }

    #[test]
    fn outcome_count_mismatch_is_malformed() {
        // One declared turn but two Right/Wrong lines.
        let report = "1th prediction\nRight\nWrong\nfiller\nfiller\njoint_all";
        let err = ReportParser::new().parse(report).unwrap_err();
        assert!(matches!(err, EvalError::MalformedReport { .. }));
    }

    #[test]
    fn zero_turn_interaction_follows_policy() {
        let report = "1th prediction\njoint_all scores";
        let parsed = ReportParser::new().parse(report).unwrap();
        assert_eq!(parsed.turn_counts, vec![0]);
        assert_eq!(parsed.interaction_results, vec![true]);

        let strict = ReportParser::with_zero_turn_policy(ZeroTurnPolicy::Reject);
        let err = strict.parse(report).unwrap_err();
        assert!(matches!(err, EvalError::MalformedReport { .. }));
    }

    #[test]
    fn accuracies_over_parsed_outcomes() {
        let report = full_report(&[&[true, true], &[false, true]]);
        let parsed = ReportParser::new().parse(&report).unwrap();
        assert!((parsed.question_accuracy() - 0.75).abs() < 1e-9);
        assert!((parsed.interaction_accuracy() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_report_parses_to_nothing() {
        let parsed = ReportParser::new().parse("").unwrap();
        assert!(parsed.interaction_results.is_empty());
        assert!(parsed.question_results.is_empty());
        assert_eq!(parsed.question_accuracy(), 0.0);
    }
}
