use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary text used when the raw response carries no recognizable content.
pub const PLACEHOLDER_SUMMARY: &str = "No content available";

/// One multiple-choice quiz question extracted from a response.
///
/// Only questions with a non-empty correct answer and at least two wrong
/// answers are retained by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub correct_answer: String,
    pub wrong_answers: Vec<String>,
}

/// The structured result of parsing one chat-completion response.
///
/// Immutable after creation; either discarded or appended to the persisted
/// bookmark list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningContent {
    pub id: Uuid,
    pub summary: String,
    pub quiz_questions: Vec<QuizQuestion>,
    pub predicted_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl LearningContent {
    pub fn new(
        summary: String,
        quiz_questions: Vec<QuizQuestion>,
        predicted_questions: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            summary,
            quiz_questions,
            predicted_questions,
            created_at: Utc::now(),
        }
    }

    /// The fixed empty result returned when the top-level marker is missing.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_SUMMARY.to_string(), Vec::new(), Vec::new())
    }

    pub fn is_placeholder(&self) -> bool {
        self.summary == PLACEHOLDER_SUMMARY
            && self.quiz_questions.is_empty()
            && self.predicted_questions.is_empty()
    }
}
