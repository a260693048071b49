// src/handlers/quiz.rs

use std::time::Instant;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, types::Json as SqlJson};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::AppError,
    models::{
        question::{PublicQuestion, Question},
        quiz::{AnswerRequest, GenerateQuestionsRequest, QuizSelection, StartQuizResponse},
    },
    quiz::{
        resolver::{self, Access, QuizConfig},
        session::{QuizSession, SessionPhase},
    },
    utils::jwt::CurrentUser,
};

fn access_of(user: &CurrentUser) -> Access {
    match &user.0 {
        None => Access::Guest,
        Some(claims) if claims.verified => Access::Verified,
        Some(_) => Access::Unverified,
    }
}

/// Fetches the fixed-size ordered question slice for a configuration.
/// The contract is all-or-nothing: fewer rows than the mode needs fails
/// the start call instead of running a short quiz.
async fn load_question_set(
    state: &AppState,
    config: &QuizConfig,
) -> Result<Vec<Question>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM questions WHERE category = ");
    builder.push_bind(&config.category);

    if !config.subcategories.is_empty() {
        builder.push(" AND subcategory IN (");
        let mut separated = builder.separated(",");
        for sub in &config.subcategories {
            separated.push_bind(sub);
        }
        separated.push_unseparated(")");
    }

    builder.push(" ORDER BY id LIMIT ");
    builder.push_bind(config.question_count() as i64);

    let questions: Vec<Question> = builder
        .build_query_as()
        .fetch_all(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch question set: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if questions.len() < config.question_count() {
        return Err(AppError::NotFound(format!(
            "Not enough questions for category '{}'",
            config.category
        )));
    }

    Ok(questions)
}

/// Counts one attempt for today. The counter is keyed by calendar date,
/// so it starts over each day.
async fn record_daily_attempt(state: &AppState, user_id: i64) -> Result<(), AppError> {
    let today = chrono::Utc::now().date_naive().to_string();
    sqlx::query(
        r#"
        INSERT INTO daily_attempts (user_id, date, count) VALUES (?, ?, 1)
        ON CONFLICT(user_id, date) DO UPDATE SET count = count + 1
        "#,
    )
    .bind(user_id)
    .bind(&today)
    .execute(&state.pool)
    .await?;
    Ok(())
}

/// Resolves the selection, loads the question set and creates the
/// in-memory session. Guests may play (restricted category only); their
/// results are never persisted.
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<QuizSelection>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = resolver::resolve(&payload, access_of(&user))?;
    let questions = load_question_set(&state, &config).await?;

    let user_id = user.0.as_ref().map(|c| c.user_id());
    if let Some(id) = user_id {
        record_daily_attempt(&state, id).await?;
    }

    let now = Instant::now();
    let session = QuizSession::new(user_id, config, questions, now);

    let response = StartQuizResponse {
        session_id: session.id,
        questions: session.questions().iter().map(PublicQuestion::from).collect(),
        total_questions: session.total_questions(),
        remaining_seconds: session.remaining_seconds(now),
    };

    state.sessions.write().await.insert(session.id, session);

    Ok((StatusCode::CREATED, Json(response)))
}

fn check_owner(session: &QuizSession, user: &CurrentUser) -> Result<(), AppError> {
    let caller = user.0.as_ref().map(|c| c.user_id());
    if session.user_id != caller {
        // Do not reveal that the session exists.
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    Ok(())
}

/// Polls the session state. Materializes an expired countdown first, so
/// the snapshot the client renders already reflects the timeout.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::NotFound("Session not found".to_string()))?;
    check_owner(session, &user)?;

    let now = Instant::now();
    session.sync(now);
    Ok(Json(session.snapshot(now)))
}

/// Submits an answer for the current question. The session materializes
/// an already-expired countdown first, so a late answer counts as a
/// timeout; repeats on an answered question are no-ops.
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::NotFound("Session not found".to_string()))?;
    check_owner(session, &user)?;

    let now = Instant::now();
    session.submit_answer(payload.answer, now)?;
    Ok(Json(session.snapshot(now)))
}

/// Advances to the next question, or finishes the session after the last
/// one. The Finished transition evicts the session from the map (the
/// final snapshot is served once) and writes the result row; a write
/// failure is logged and dropped.
pub async fn next_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.write().await;
    let now = Instant::now();

    let phase = {
        let session = sessions
            .get_mut(&session_id)
            .ok_or(AppError::NotFound("Session not found".to_string()))?;
        check_owner(session, &user)?;
        session.advance(now)?
    };

    if phase == SessionPhase::Finished {
        let session = sessions
            .remove(&session_id)
            .ok_or(AppError::NotFound("Session not found".to_string()))?;
        // The insert must not run under the global sessions lock.
        drop(sessions);

        let snapshot = session.snapshot(now);
        if session.user_id.is_some()
            && let Err(e) = persist_result(&state, &session, now).await
        {
            tracing::error!("Failed to persist quiz result: {:?}", e);
        }
        return Ok(Json(snapshot));
    }

    let session = sessions
        .get_mut(&session_id)
        .ok_or(AppError::NotFound("Session not found".to_string()))?;
    // A whole-session countdown that already ran out times the fresh
    // question out immediately.
    session.sync(now);
    Ok(Json(session.snapshot(now)))
}

async fn persist_result(
    state: &AppState,
    session: &QuizSession,
    now: Instant,
) -> Result<(), AppError> {
    let quiz_type = session.config.quiz_type();
    let (time_per_question, time_taken_seconds) = if session.config.mock_interview {
        (None, Some(session.time_taken_seconds(now) as i64))
    } else {
        (Some(session.config.time_per_question as i64), None)
    };

    sqlx::query(
        r#"
        INSERT INTO results
            (user_id, category, quiz_type, score, total_questions,
             time_per_question, time_taken_seconds, breakdown, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.user_id)
    .bind(&session.config.category)
    .bind(quiz_type.as_str())
    .bind(session.score() as i64)
    .bind(session.total_questions() as i64)
    .bind(time_per_question)
    .bind(time_taken_seconds)
    .bind(SqlJson(session.outcomes().to_vec()))
    .bind(chrono::Utc::now())
    .execute(&state.pool)
    .await?;

    Ok(())
}

/// Quits a session: drops it from memory with nothing persisted.
pub async fn quit_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get(&session_id)
        .ok_or(AppError::NotFound("Session not found".to_string()))?;
    check_owner(session, &user)?;

    sessions.remove(&session_id);
    Ok(Json(json!({ "message": "Session discarded" })))
}

/// Seeds the question bank for a category from the generation endpoint of
/// the payments-side collaborator. Verified users only.
pub async fn generate_questions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if access_of(&user) != Access::Verified {
        return Err(AppError::AuthError(
            "Verified account required".to_string(),
        ));
    }

    let generated = state.payments.generate_questions(&payload.category).await?;
    let count = generated.len();

    let mut tx = state.pool.begin().await?;
    for q in generated {
        sqlx::query(
            r#"
            INSERT INTO questions (category, subcategory, question, answers, correct_answer)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payload.category)
        .bind(&q.subcategory)
        .bind(&q.question)
        .bind(SqlJson(q.answers.clone()))
        .bind(&q.correct_answer)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "inserted": count, "category": payload.category })),
    ))
}
