use std::io::Write;

use crate::compare::ComparisonEntry;
use crate::error::{EvalError, Result};
use crate::report::{BLOCK_HEADER_LINES, LINES_PER_TURN};

/// Difficulty labels the evaluator prefixes prediction lines with.
pub const DIFFICULTY_PREFIXES: [&str; 4] =
    ["easy pred: ", "medium pred: ", "hard pred: ", "extra pred: "];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Per-turn view: question, wrong-turn banner, both predictions.
    #[default]
    Refined,
    /// Goal, full utterance list and both verbatim detail blocks.
    Raw,
}

pub fn strip_difficulty_prefix(line: &str) -> String {
    let mut out = line.to_string();
    for prefix in DIFFICULTY_PREFIXES {
        out = out.replace(prefix, "");
    }
    out
}

fn rule(ch: &str) -> String {
    ch.repeat(144)
}

/// Line at `offset` within the turn-th 4-line group of a detail block.
/// Offset 0 is the result line, offset 1 the prediction line.
fn turn_line<'a>(detail: &'a [String], turn: usize, offset: usize) -> Result<&'a str> {
    let idx = BLOCK_HEADER_LINES + turn * LINES_PER_TURN + offset;
    detail
        .get(idx)
        .map(String::as_str)
        .ok_or_else(|| EvalError::MalformedReport {
            line: idx,
            reason: format!(
                "detail block of {} lines has no line for turn {turn}",
                detail.len()
            ),
        })
}

/// Renders one comparison bucket for manual inspection. Misaligned inputs
/// fail loudly; this output is the whole point of the pipeline.
pub fn render_bucket<W: Write>(
    out: &mut W,
    entries: &[ComparisonEntry],
    mode: DisplayMode,
) -> Result<()> {
    match mode {
        DisplayMode::Refined => render_refined(out, entries),
        DisplayMode::Raw => render_raw(out, entries),
    }
}

fn render_refined<W: Write>(out: &mut W, entries: &[ComparisonEntry]) -> Result<()> {
    for entry in entries {
        writeln!(out, "{}", rule("="))?;
        writeln!(out, "Interaction context:")?;
        writeln!(out, "Goal: {}", entry.context.goal)?;
        writeln!(out, "{}", rule("-"))?;
        for (turn, utterance) in entry.context.interactions.iter().enumerate() {
            writeln!(out, "Question #{turn}: {utterance}")?;
            let flagged = turn_line(&entry.baseline_detail, turn, 0)?.contains("Wrong");
            if flagged {
                writeln!(out, "^^^^^^^^^^^^^^^^^^^^^^^^")?;
                writeln!(out, "^^^^^ Please note: ^^^^^")?;
            }
            let baseline = strip_difficulty_prefix(turn_line(&entry.baseline_detail, turn, 1)?);
            let candidate = strip_difficulty_prefix(turn_line(&entry.candidate_detail, turn, 1)?);
            writeln!(out, "Baseline prediction:  {baseline}")?;
            writeln!(out, "Candidate prediction: {candidate}")?;
            if flagged {
                writeln!(out, "^^^^^^^^^^^^^^^^^^^^^^^^")?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_raw<W: Write>(out: &mut W, entries: &[ComparisonEntry]) -> Result<()> {
    for entry in entries {
        writeln!(out, "{}", rule("="))?;
        writeln!(out, "Interaction context:")?;
        writeln!(out, "Goal: {}", entry.context.goal)?;
        writeln!(out, "{}", rule("-"))?;
        writeln!(out, "Interactions:")?;
        for utterance in &entry.context.interactions {
            writeln!(out, "{utterance}")?;
        }
        writeln!(out, "{}", rule("-"))?;
        writeln!(out, "Baseline:")?;
        for line in &entry.baseline_detail {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "Candidate:")?;
        for line in &entry.candidate_detail {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{}", rule("="))?;
        writeln!(out)?;
    }
    Ok(())
}
