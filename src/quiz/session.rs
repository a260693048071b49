// src/quiz/session.rs

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::AppError;
use crate::models::question::Question;
use crate::models::quiz::SessionStateResponse;
use crate::models::result::{QuestionOutcome, ResultSummary};
use crate::quiz::countdown::Countdown;
use crate::quiz::resolver::QuizConfig;
use crate::quiz::result::{passed, percentage};

/// Lifecycle of a session. There is no loading state: the question fetch
/// precedes construction, and a failed fetch fails the start call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Answered,
    Finished,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Answered => "answered",
            SessionPhase::Finished => "finished",
        }
    }
}

/// One run of a quiz, held in memory from start until quit or completion.
///
/// All transitions are applied under the owning map's write lock, so they
/// are strictly sequential. Nothing is persisted before `Finished`;
/// quitting simply drops the session.
#[derive(Debug)]
pub struct QuizSession {
    pub id: Uuid,
    /// `None` for guest sessions, whose results are never persisted.
    pub user_id: Option<i64>,
    pub config: QuizConfig,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    current_answer: Option<String>,
    answered: bool,
    phase: SessionPhase,
    countdown: Option<Countdown>,
    /// Accumulated InProgress time; the clock is paused while Answered.
    active: Duration,
    segment_start: Option<Instant>,
    outcomes: Vec<QuestionOutcome>,
}

impl QuizSession {
    pub fn new(
        user_id: Option<i64>,
        config: QuizConfig,
        questions: Vec<Question>,
        now: Instant,
    ) -> Self {
        let countdown = config
            .countdown_duration()
            .map(|d| Countdown::start(d, now));

        QuizSession {
            id: Uuid::new_v4(),
            user_id,
            config,
            questions,
            current: 0,
            score: 0,
            current_answer: None,
            answered: false,
            phase: SessionPhase::InProgress,
            countdown,
            active: Duration::ZERO,
            segment_start: Some(now),
            outcomes: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Per-question outcomes recorded so far; complete once Finished.
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    pub fn remaining_seconds(&self, now: Instant) -> Option<u64> {
        self.countdown.as_ref().map(|c| c.remaining_seconds(now))
    }

    pub fn time_taken_seconds(&self, now: Instant) -> u64 {
        let running = match self.segment_start {
            Some(since) => now.saturating_duration_since(since),
            None => Duration::ZERO,
        };
        (self.active + running).as_secs()
    }

    /// Materializes an expired countdown as a timeout event, exactly once.
    /// A no-op unless the session is InProgress with a dead timer.
    pub fn sync(&mut self, now: Instant) {
        if self.phase != SessionPhase::InProgress {
            return;
        }
        if let Some(c) = &self.countdown
            && c.is_expired(now)
        {
            self.enter_answered(None, now);
        }
    }

    /// Records the user's selection for the current question.
    ///
    /// A countdown that already ran out is materialized first, so a late
    /// answer lands on a question the timer has already closed and is
    /// ignored. First selection only: once `answered` is set, later answer
    /// and timeout events are no-ops, which is what makes an answer that
    /// arrived before expiry win over the timer event behind it.
    pub fn submit_answer(&mut self, answer: String, now: Instant) -> Result<(), AppError> {
        if self.phase == SessionPhase::Finished {
            return Err(AppError::Conflict("session already finished".to_string()));
        }
        self.sync(now);
        if self.answered {
            return Ok(());
        }
        self.enter_answered(Some(answer), now);
        Ok(())
    }

    /// Advances past an answered question, or finishes the session when it
    /// was the last one. Finished is terminal and the score is frozen.
    pub fn advance(&mut self, now: Instant) -> Result<SessionPhase, AppError> {
        match self.phase {
            SessionPhase::Finished => {
                return Err(AppError::Conflict("session already finished".to_string()));
            }
            SessionPhase::InProgress => {
                return Err(AppError::Conflict(
                    "current question has not been answered".to_string(),
                ));
            }
            SessionPhase::Answered => {}
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.current_answer = None;
            self.answered = false;
            self.phase = SessionPhase::InProgress;
            self.segment_start = Some(now);

            if self.config.per_question_timer() {
                // Fresh countdown per question; the whole-session interview
                // countdown just keeps running.
                let duration = self
                    .config
                    .countdown_duration()
                    .unwrap_or(Duration::ZERO);
                self.countdown = Some(Countdown::start(duration, now));
            }
        } else {
            self.current = self.questions.len();
            self.phase = SessionPhase::Finished;
        }

        Ok(self.phase)
    }

    fn enter_answered(&mut self, answer: Option<String>, now: Instant) {
        debug_assert_eq!(self.phase, SessionPhase::InProgress);
        if self.answered {
            return;
        }

        let question = &self.questions[self.current];
        if answer.as_deref() == Some(question.correct_answer.as_str()) {
            self.score += 1;
        }
        self.outcomes.push(QuestionOutcome {
            question: question.question.clone(),
            correct_answer: question.correct_answer.clone(),
            given_answer: answer.clone(),
        });

        self.current_answer = answer;
        self.answered = true;
        self.phase = SessionPhase::Answered;

        if let Some(since) = self.segment_start.take() {
            self.active += now.saturating_duration_since(since);
        }
        if self.config.per_question_timer()
            && let Some(c) = &mut self.countdown
        {
            c.pause(now);
        }
    }

    pub fn summary(&self) -> ResultSummary {
        let total = self.questions.len() as u32;
        let pct = percentage(self.score, total);
        ResultSummary {
            score: self.score,
            total_questions: total,
            percentage: pct,
            passed: passed(self.config.quiz_type(), pct),
        }
    }

    pub fn snapshot(&self, now: Instant) -> SessionStateResponse {
        let correct_answer = if self.answered && self.current < self.questions.len() {
            Some(self.questions[self.current].correct_answer.clone())
        } else {
            None
        };

        SessionStateResponse {
            session_id: self.id,
            phase: self.phase.as_str().to_string(),
            current_question: self.current,
            total_questions: self.questions.len(),
            score: self.score,
            answered: self.answered,
            current_answer: self.current_answer.clone(),
            correct_answer,
            remaining_seconds: self.remaining_seconds(now),
            time_taken_seconds: self.time_taken_seconds(now),
            result: self.is_finished().then(|| self.summary()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::QuizSelection;
    use crate::quiz::resolver::{Access, resolve};
    use sqlx::types::Json;

    fn question(i: usize) -> Question {
        Question {
            id: i as i64,
            category: "backend-engineer".to_string(),
            subcategory: Some("sql".to_string()),
            question: format!("Question {}", i),
            answers: Json(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ]),
            correct_answer: "A".to_string(),
            created_at: None,
        }
    }

    fn custom_config(time_per_question: u32) -> QuizConfig {
        resolve(
            &QuizSelection {
                category: "backend-engineer".to_string(),
                subcategories: vec!["sql".to_string()],
                time_per_question,
                mock_interview: false,
            },
            Access::Verified,
        )
        .unwrap()
    }

    fn interview_config() -> QuizConfig {
        resolve(
            &QuizSelection {
                category: "backend-engineer".to_string(),
                subcategories: vec![],
                time_per_question: 0,
                mock_interview: true,
            },
            Access::Verified,
        )
        .unwrap()
    }

    fn session(config: QuizConfig, n: usize, now: Instant) -> QuizSession {
        QuizSession::new(Some(1), config, (0..n).map(question).collect(), now)
    }

    #[test]
    fn correct_answers_score_and_wrong_ones_do_not() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 10, t0);

        // 8 correct, 2 wrong, no timeouts.
        for i in 0..10 {
            let answer = if i < 8 { "A" } else { "B" };
            s.submit_answer(answer.to_string(), t0).unwrap();
            s.advance(t0).unwrap();
        }

        assert!(s.is_finished());
        let summary = s.summary();
        assert_eq!(summary.score, 8);
        assert_eq!(summary.percentage, 80);
        assert!(summary.passed);
    }

    #[test]
    fn second_answer_on_the_same_question_is_a_no_op() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 10, t0);

        s.submit_answer("B".to_string(), t0).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.current_index(), 0);

        // A later "correction" to the right answer must not apply.
        s.submit_answer("A".to_string(), t0).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.snapshot(t0).current_answer, Some("B".to_string()));
        assert_eq!(s.outcomes().len(), 1);
    }

    #[test]
    fn timeout_records_the_no_answer_sentinel_and_never_scores() {
        let t0 = Instant::now();
        let mut s = session(custom_config(1), 5, t0);

        s.sync(t0 + Duration::from_secs(61));
        assert_eq!(s.phase(), SessionPhase::Answered);
        assert_eq!(s.score(), 0);
        assert_eq!(s.outcomes()[0].given_answer, None);

        // Repeated sync must not double-fire.
        s.sync(t0 + Duration::from_secs(120));
        assert_eq!(s.outcomes().len(), 1);
    }

    #[test]
    fn an_explicit_answer_beats_a_later_timeout() {
        let t0 = Instant::now();
        let mut s = session(custom_config(1), 5, t0);

        s.submit_answer("A".to_string(), t0 + Duration::from_secs(59)).unwrap();
        assert_eq!(s.score(), 1);

        // The timer-zero event arrives after the answer: no-op.
        s.sync(t0 + Duration::from_secs(61));
        assert_eq!(s.score(), 1);
        assert_eq!(
            s.snapshot(t0 + Duration::from_secs(61)).current_answer,
            Some("A".to_string())
        );
    }

    #[test]
    fn an_answer_after_expiry_is_a_timeout() {
        let t0 = Instant::now();
        let mut s = session(custom_config(1), 5, t0);

        // The timer ran out a minute ago; the late answer must not score,
        // the question is recorded as unanswered.
        s.submit_answer("A".to_string(), t0 + Duration::from_secs(120)).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.phase(), SessionPhase::Answered);
        assert_eq!(s.outcomes()[0].given_answer, None);
        assert_eq!(
            s.snapshot(t0 + Duration::from_secs(120)).current_answer,
            None
        );
    }

    #[test]
    fn advance_requires_an_answered_question() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 5, t0);

        assert!(matches!(s.advance(t0), Err(AppError::Conflict(_))));
        s.submit_answer("A".to_string(), t0).unwrap();
        assert_eq!(s.advance(t0).unwrap(), SessionPhase::InProgress);
        assert_eq!(s.current_index(), 1);
        assert!(!s.snapshot(t0).answered);
    }

    #[test]
    fn per_question_timer_restarts_on_advance() {
        let t0 = Instant::now();
        let mut s = session(custom_config(2), 5, t0);

        let t1 = t0 + Duration::from_secs(90);
        s.submit_answer("A".to_string(), t1).unwrap();
        // Paused while answered.
        assert_eq!(s.remaining_seconds(t1 + Duration::from_secs(300)), Some(30));

        let t2 = t1 + Duration::from_secs(10);
        s.advance(t2).unwrap();
        assert_eq!(s.remaining_seconds(t2), Some(120));
    }

    #[test]
    fn score_never_exceeds_questions_advanced_past() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 10, t0);

        for i in 0..10 {
            assert!(s.score() as usize <= i);
            s.submit_answer("A".to_string(), t0).unwrap();
            s.advance(t0).unwrap();
        }
        assert_eq!(s.score(), 10);
        assert!(s.score() as usize <= s.total_questions());
    }

    #[test]
    fn finished_is_terminal() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 2, t0);

        for _ in 0..2 {
            s.submit_answer("A".to_string(), t0).unwrap();
            s.advance(t0).unwrap();
        }
        assert!(s.is_finished());
        assert_eq!(s.current_index(), 2);

        assert!(matches!(
            s.submit_answer("A".to_string(), t0),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(s.advance(t0), Err(AppError::Conflict(_))));
        assert_eq!(s.score(), 2);
    }

    #[test]
    fn interview_countdown_spans_the_session_and_cascades_timeouts() {
        let t0 = Instant::now();
        let mut s = session(interview_config(), 15, t0);
        assert_eq!(s.total_questions(), 15);
        assert_eq!(s.remaining_seconds(t0), Some(20 * 60));

        // Answer 9 questions correctly within the first 10 minutes.
        let mut now = t0;
        for _ in 0..9 {
            now += Duration::from_secs(60);
            s.submit_answer("A".to_string(), now).unwrap();
            s.advance(now).unwrap();
        }
        assert_eq!(s.score(), 9);

        // The whole-session countdown expires; the remaining 6 questions
        // time out one by one as the client pages through them.
        now = t0 + Duration::from_secs(20 * 60 + 1);
        for _ in 0..6 {
            s.sync(now);
            assert_eq!(s.phase(), SessionPhase::Answered);
            assert_eq!(s.snapshot(now).current_answer, None);
            s.advance(now).unwrap();
        }

        assert!(s.is_finished());
        let summary = s.summary();
        assert_eq!(summary.score, 9);
        assert_eq!(summary.percentage, 60);
        assert!(!summary.passed); // 60 < 66
        assert_eq!(s.outcomes().len(), 15);
        assert_eq!(
            s.outcomes().iter().filter(|o| o.given_answer.is_none()).count(),
            6
        );
    }

    #[test]
    fn interview_countdown_keeps_running_while_answered() {
        let t0 = Instant::now();
        let mut s = session(interview_config(), 15, t0);

        s.submit_answer("A".to_string(), t0 + Duration::from_secs(30)).unwrap();
        // Unlike the per-question timer, no pause while in Answered.
        assert_eq!(
            s.remaining_seconds(t0 + Duration::from_secs(90)),
            Some(20 * 60 - 90)
        );
    }

    #[test]
    fn time_taken_counts_only_in_progress_segments() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 2, t0);

        let t1 = t0 + Duration::from_secs(40);
        s.submit_answer("A".to_string(), t1).unwrap();
        // Dwell on the answer screen is not counted.
        assert_eq!(s.time_taken_seconds(t1 + Duration::from_secs(100)), 40);

        let t2 = t1 + Duration::from_secs(100);
        s.advance(t2).unwrap();
        let t3 = t2 + Duration::from_secs(20);
        s.submit_answer("B".to_string(), t3).unwrap();
        s.advance(t3).unwrap();

        assert!(s.is_finished());
        assert_eq!(s.time_taken_seconds(t3 + Duration::from_secs(500)), 60);
    }

    #[test]
    fn untimed_sessions_never_time_out() {
        let t0 = Instant::now();
        let mut s = session(custom_config(0), 3, t0);

        s.sync(t0 + Duration::from_secs(100_000));
        assert_eq!(s.phase(), SessionPhase::InProgress);
        assert_eq!(s.remaining_seconds(t0), None);
    }
}
