// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Main category this question belongs to (e.g., "backend-engineer").
    pub category: String,

    /// Optional subcategory (single-topic categories have none).
    pub subcategory: Option<String>,

    /// The text of the question itself.
    pub question: String,

    /// Ordered answer options, fixed count per question.
    /// Stored as a JSON array in the database.
    pub answers: Json<Vec<String>>,

    /// Equal to exactly one element of `answers`.
    pub correct_answer: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to the client (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub answers: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id,
            question: q.question.clone(),
            answers: q.answers.0.clone(),
        }
    }
}
