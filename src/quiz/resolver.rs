// src/quiz/resolver.rs

use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::{
    CUSTOM_QUESTION_COUNT, INTERVIEW_QUESTION_COUNT, INTERVIEW_SESSION_SECONDS,
    RESTRICTED_CATEGORY, SINGLE_TOPIC_CATEGORY,
};
use crate::error::AppError;
use crate::models::quiz::QuizSelection;
use crate::quiz::result::QuizType;

/// What the caller is allowed to start. Guests and users who have not
/// verified their email are both restricted to the default category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Guest,
    Unverified,
    Verified,
}

impl Access {
    fn is_restricted(&self) -> bool {
        !matches!(self, Access::Verified)
    }
}

/// Immutable session configuration, fixed from start to finish.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub category: String,
    pub subcategories: BTreeSet<String>,
    /// Minutes per question; 0 means untimed. Forced to 1 in interview
    /// mode, where the real timing is the whole-session countdown.
    pub time_per_question: u32,
    pub mock_interview: bool,
}

impl QuizConfig {
    pub fn quiz_type(&self) -> QuizType {
        if self.mock_interview {
            QuizType::Interview
        } else {
            QuizType::Custom
        }
    }

    /// Fixed slice size the question loader must deliver.
    pub fn question_count(&self) -> usize {
        match self.quiz_type() {
            QuizType::Interview => INTERVIEW_QUESTION_COUNT,
            QuizType::Custom => CUSTOM_QUESTION_COUNT,
        }
    }

    /// Initial countdown: 20 minutes for the whole interview session,
    /// `time_per_question` minutes per custom question, none when untimed.
    pub fn countdown_duration(&self) -> Option<Duration> {
        if self.mock_interview {
            Some(Duration::from_secs(INTERVIEW_SESSION_SECONDS))
        } else if self.time_per_question > 0 {
            Some(Duration::from_secs(self.time_per_question as u64 * 60))
        } else {
            None
        }
    }

    /// Per-question timers restart on every advance; the interview
    /// countdown spans the session and keeps running across questions.
    pub fn per_question_timer(&self) -> bool {
        !self.mock_interview && self.time_per_question > 0
    }
}

/// Turns a raw user selection into an immutable `QuizConfig`.
///
/// Enforces the category restriction defensively even though the
/// presentation layer is expected to have disabled the start action.
pub fn resolve(selection: &QuizSelection, access: Access) -> Result<QuizConfig, AppError> {
    if access.is_restricted() && selection.category != RESTRICTED_CATEGORY {
        return Err(AppError::ValidationError("category restricted".to_string()));
    }

    let subcategories: BTreeSet<String> = selection.subcategories.iter().cloned().collect();

    if selection.mock_interview {
        return Ok(QuizConfig {
            category: selection.category.clone(),
            subcategories,
            time_per_question: 1,
            mock_interview: true,
        });
    }

    // Custom mode needs at least one subcategory, except for single-topic
    // categories that have none to offer.
    if subcategories.is_empty() && selection.category != SINGLE_TOPIC_CATEGORY {
        return Err(AppError::ValidationError(
            "no subcategory selected".to_string(),
        ));
    }

    Ok(QuizConfig {
        category: selection.category.clone(),
        subcategories,
        time_per_question: selection.time_per_question,
        mock_interview: false,
    })
}
