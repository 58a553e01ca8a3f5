//! Response parsing engine
//! Splits the marker-delimited text returned by the chat-completion API into
//! a summary, a multiple-choice quiz and a list of predicted questions.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LearningContent, QuizQuestion};

const SUMMARY_MARKER: &str = "[SUMMARY]";
const QUIZ_MARKER: &str = "[QUIZ]";
const PREDICTED_MARKER: &str = "[PREDICTED]";

const CORRECT_ANSWER_LABEL: &str = "correct answer:";
const WRONG_ANSWERS_LABEL: &str = "wrong answers:";

/// Parse one raw response into structured learning content.
///
/// Never fails: structural anomalies drop the offending question or
/// line, and a response without the `[SUMMARY]` marker yields the fixed
/// placeholder result. A missing `[QUIZ]` or `[PREDICTED]` marker degrades to
/// whatever sections precede it rather than discarding the whole response.
pub fn parse(raw: &str) -> LearningContent {
    let Some((_, after_summary)) = raw.split_once(SUMMARY_MARKER) else {
        return LearningContent::placeholder();
    };

    let (summary_text, rest) = match after_summary.split_once(QUIZ_MARKER) {
        Some((before, after)) => (before, Some(after)),
        None => (after_summary, None),
    };
    let summary = summary_text.trim().to_string();

    let (quiz_block, predicted_block) = match rest {
        Some(rest) => match rest.split_once(PREDICTED_MARKER) {
            Some((quiz, predicted)) => (quiz, predicted),
            None => (rest, ""),
        },
        None => ("", ""),
    };

    LearningContent::new(
        summary,
        parse_quiz(quiz_block),
        parse_predicted(predicted_block),
    )
}

/// Strip a leading `<digits>.<whitespace>` enumeration prefix and trim.
///
/// Shared by the quiz-question and predicted-question extraction paths.
pub fn strip_enumeration_prefix(line: &str) -> String {
    static ENUMERATION_PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = ENUMERATION_PREFIX.get_or_init(|| Regex::new(r"^\d+\.\s*").unwrap());
    re.replace(line.trim(), "").trim().to_string()
}

/// Split the quiz block on blank lines and parse each question block.
fn parse_quiz(block: &str) -> Vec<QuizQuestion> {
    block
        .trim()
        .split("\n\n")
        .filter_map(parse_question_block)
        .collect()
}

/// Parse a single question block, or drop it when malformed.
///
/// A block survives only with at least three lines, a digit somewhere in its
/// first line (the weak numbered-question signal), a non-empty correct answer
/// and at least two wrong answers.
fn parse_question_block(block: &str) -> Option<QuizQuestion> {
    let lines: Vec<&str> = block.lines().collect();
    if lines.len() < 3 {
        return None;
    }

    let first = lines.first()?.trim();
    if !first.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let question = strip_enumeration_prefix(first);

    let mut correct_answer = String::new();
    let mut wrong_answers: Vec<String> = Vec::new();

    for line in &lines {
        let lowered = line.to_lowercase();
        if lowered.contains(CORRECT_ANSWER_LABEL) {
            correct_answer = after_last_colon(line);
        } else if lowered.contains(WRONG_ANSWERS_LABEL) {
            wrong_answers = after_last_colon(line)
                .split('|')
                .map(|answer| answer.trim().to_string())
                .collect();
        }
    }

    if correct_answer.is_empty() || wrong_answers.len() < 2 {
        return None;
    }

    Some(QuizQuestion {
        question,
        correct_answer,
        wrong_answers,
    })
}

/// Predicted questions: one per non-empty line, enumeration prefix stripped,
/// source order preserved.
fn parse_predicted(block: &str) -> Vec<String> {
    block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(strip_enumeration_prefix)
        .collect()
}

fn after_last_colon(line: &str) -> String {
    line.rsplit(':').next().unwrap_or("").trim().to_string()
}
