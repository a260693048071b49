// src/quiz/result.rs

use crate::config::{CUSTOM_PASS_PERCENTAGE, INTERVIEW_PASS_PERCENTAGE};

/// The two session variants. Stored in the database as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizType {
    Custom,
    Interview,
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::Custom => "custom",
            QuizType::Interview => "interview",
        }
    }

    pub fn from_str(s: &str) -> QuizType {
        match s {
            "interview" => QuizType::Interview,
            _ => QuizType::Custom,
        }
    }

    /// Minimum rounded percentage required to pass. 80 for custom, 66 for
    /// interview; the asymmetry is deliberate and mirrored everywhere a
    /// pass/fail status is computed.
    pub fn pass_threshold(&self) -> u32 {
        match self {
            QuizType::Custom => CUSTOM_PASS_PERCENTAGE,
            QuizType::Interview => INTERVIEW_PASS_PERCENTAGE,
        }
    }
}

/// `round(score / total * 100)`, the single definition of "percentage"
/// used by result persistence, the feedback prompt, and the history view.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}

pub fn passed(quiz_type: QuizType, pct: u32) -> bool {
    pct >= quiz_type.pass_threshold()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(8, 10), 80);
        assert_eq!(percentage(9, 15), 60);
        assert_eq!(percentage(10, 15), 67); // 66.66.. rounds up
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 10), 0);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn custom_pass_boundary_is_80() {
        assert!(passed(QuizType::Custom, 80));
        assert!(!passed(QuizType::Custom, 79));
    }

    #[test]
    fn interview_pass_boundary_is_66() {
        assert!(passed(QuizType::Interview, 66));
        assert!(!passed(QuizType::Interview, 65));
    }

    #[test]
    fn interview_threshold_does_not_apply_to_custom() {
        // 66% passes an interview but fails a custom quiz.
        assert!(!passed(QuizType::Custom, 66));
    }
}
