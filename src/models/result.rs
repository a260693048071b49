// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'results' table in the database.
/// One row per finished, authenticated session; `feedback` is attached
/// at most once afterwards (interview mode only).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub category: String,

    /// "custom" or "interview".
    pub quiz_type: String,

    pub score: i64,
    pub total_questions: i64,

    /// Minutes per question; set for custom mode, NULL for interview mode.
    pub time_per_question: Option<i64>,

    /// Seconds spent in the quiz; set for interview mode, NULL for custom mode.
    pub time_taken_seconds: Option<i64>,

    /// Per-question outcomes, kept so feedback can be generated lazily
    /// after the in-memory session is gone.
    pub breakdown: Json<Vec<QuestionOutcome>>,

    /// AI-generated narrative feedback (interview mode), written once.
    pub feedback: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// What happened on a single question, as recorded at session end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOutcome {
    pub question: String,
    pub correct_answer: String,
    /// The user's selection; `None` means the question timed out unanswered.
    pub given_answer: Option<String>,
}

/// Summary returned to the client when a session finishes.
#[derive(Debug, Serialize)]
pub struct ResultSummary {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
}
