// src/quiz/prompt.rs

use crate::models::result::{QuestionOutcome, QuizResult};
use crate::quiz::result::percentage;

/// Builds the freeform feedback request sent to the AI collaborator.
///
/// Pure string construction, unit-testable without the network: category,
/// score/total/percentage, time taken, then a per-question breakdown with
/// "not answered" standing in for timed-out questions.
pub fn build_feedback_prompt(result: &QuizResult, breakdown: &[QuestionOutcome]) -> String {
    let pct = percentage(result.score as u32, result.total_questions as u32);

    let mut prompt = String::new();
    prompt.push_str(
        "You are an experienced technical interviewer. A candidate has just \
         completed a mock interview quiz. Write concise, encouraging, specific \
         feedback (a few short paragraphs) on their performance: strengths, \
         weak areas, and what to study next.\n\n",
    );
    prompt.push_str(&format!("Category: {}\n", result.category));
    prompt.push_str(&format!(
        "Score: {} out of {} ({}%)\n",
        result.score, result.total_questions, pct
    ));
    if let Some(seconds) = result.time_taken_seconds {
        prompt.push_str(&format!(
            "Time taken: {} minutes {} seconds\n",
            seconds / 60,
            seconds % 60
        ));
    }

    prompt.push_str("\nPer-question results:\n");
    for (i, outcome) in breakdown.iter().enumerate() {
        let given = outcome.given_answer.as_deref().unwrap_or("not answered");
        prompt.push_str(&format!(
            "{}. {}\n   Correct answer: {}\n   Candidate's answer: {}\n",
            i + 1,
            outcome.question,
            outcome.correct_answer,
            given
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn result_fixture() -> QuizResult {
        QuizResult {
            id: 1,
            user_id: 7,
            category: "backend-engineer".to_string(),
            quiz_type: "interview".to_string(),
            score: 9,
            total_questions: 15,
            time_per_question: None,
            time_taken_seconds: Some(754),
            breakdown: Json(vec![]),
            feedback: None,
            created_at: None,
        }
    }

    #[test]
    fn prompt_contains_category_score_and_time() {
        let prompt = build_feedback_prompt(&result_fixture(), &[]);

        assert!(prompt.contains("Category: backend-engineer"));
        assert!(prompt.contains("Score: 9 out of 15 (60%)"));
        assert!(prompt.contains("Time taken: 12 minutes 34 seconds"));
    }

    #[test]
    fn timed_out_questions_read_not_answered() {
        let breakdown = vec![
            QuestionOutcome {
                question: "What is an index?".to_string(),
                correct_answer: "A lookup structure".to_string(),
                given_answer: Some("A lookup structure".to_string()),
            },
            QuestionOutcome {
                question: "What is a deadlock?".to_string(),
                correct_answer: "Mutual blocking".to_string(),
                given_answer: None,
            },
        ];

        let prompt = build_feedback_prompt(&result_fixture(), &breakdown);

        assert!(prompt.contains("1. What is an index?"));
        assert!(prompt.contains("Candidate's answer: A lookup structure"));
        assert!(prompt.contains("2. What is a deadlock?"));
        assert!(prompt.contains("Candidate's answer: not answered"));
    }
}
