//! learnit — topic summaries, quizzes and predicted questions generated
//! through a chat-completion API.

pub mod models;
pub mod services;
pub mod utils;

pub use models::{LearningContent, QuizQuestion, PLACEHOLDER_SUMMARY};
pub use services::parser::parse;
