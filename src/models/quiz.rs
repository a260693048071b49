// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::PublicQuestion;
use crate::models::result::ResultSummary;

/// DTO for starting a session: the user's raw selection, before the
/// configuration resolver has validated it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizSelection {
    #[validate(length(min = 1, max = 50))]
    pub category: String,

    #[serde(default)]
    pub subcategories: Vec<String>,

    /// Minutes per question; 0 means untimed. Ignored in interview mode.
    #[serde(default)]
    pub time_per_question: u32,

    #[serde(default)]
    pub mock_interview: bool,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub session_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    pub total_questions: usize,
    pub remaining_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Snapshot of the in-memory session, rendered by the client each poll.
#[derive(Debug, Serialize)]
pub struct SessionStateResponse {
    pub session_id: Uuid,
    pub phase: String,
    pub current_question: usize,
    pub total_questions: usize,
    pub score: u32,
    pub answered: bool,
    pub current_answer: Option<String>,
    /// Revealed only once the current question has been answered.
    pub correct_answer: Option<String>,
    pub remaining_seconds: Option<u64>,
    pub time_taken_seconds: u64,
    /// Present only once the session is finished.
    pub result: Option<ResultSummary>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(length(min = 1, max = 50))]
    pub category: String,
}
