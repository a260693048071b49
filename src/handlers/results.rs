// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    config::FEEDBACK_ERROR_PLACEHOLDER,
    error::AppError,
    models::result::QuizResult,
    quiz::{
        history::{
            SortColumn, SortDirection, SortSpec, categories, chart_series, default_category,
            sort_rows, table_rows,
        },
        prompt::build_feedback_prompt,
        result::QuizType,
    },
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Active table tab: "custom" (default) or "interview".
    pub tab: Option<String>,
    /// Chart category; defaults per the history rules.
    pub category: Option<String>,
    pub sort: Option<SortColumn>,
    pub direction: Option<SortDirection>,
}

async fn load_results(state: &AppState, user_id: i64) -> Result<Vec<QuizResult>, AppError> {
    sqlx::query_as::<_, QuizResult>(
        "SELECT * FROM results WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch results: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })
}

/// History view: distinct categories, the chart time series for the
/// selected category, and the sorted table for the active tab. All of it
/// is derived at read time; the stored rows are never touched.
pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let results = load_results(&state, claims.user_id()).await?;

    let cats = categories(&results);
    let selected = params
        .category
        .as_deref()
        .or_else(|| default_category(&cats));
    let chart = selected
        .map(|c| chart_series(&results, c))
        .unwrap_or_default();

    let tab = QuizType::from_str(params.tab.as_deref().unwrap_or("custom"));
    let spec = match params.sort {
        Some(column) => SortSpec {
            column,
            direction: params.direction.unwrap_or(SortDirection::Ascending),
        },
        None => SortSpec::default(),
    };
    let mut rows = table_rows(&results, tab);
    sort_rows(&mut rows, spec);

    Ok(Json(json!({
        "categories": cats,
        "selected_category": selected,
        "chart": chart,
        "tab": tab.as_str(),
        "sort": spec,
        "table": rows,
    })))
}

/// Returns feedback for the user's most recent interview result,
/// generating it at most once.
///
/// Stored feedback is returned verbatim and never regenerated. Otherwise
/// the prompt is built from the persisted breakdown and sent to the AI
/// collaborator, and the text is written back behind a `feedback IS NULL`
/// condition. A process-local guard holds the result id while a request
/// is in flight (and keeps it after a successful persist); a failed
/// generation releases it again, so the still-empty feedback is retried
/// lazily on the next view.
pub async fn generate_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        SELECT * FROM results
        WHERE user_id = ? AND quiz_type = 'interview'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(claims.user_id())
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("No interview result found".to_string()))?;

    if let Some(feedback) = result.feedback.as_deref()
        && !feedback.is_empty()
    {
        return Ok(Json(json!({ "feedback": feedback, "generated": false })));
    }

    // In flight or already generated in this process: do not invoke the
    // collaborator again. Best-effort only; true concurrent processes are
    // narrowed (not closed) by the conditional UPDATE below.
    {
        let mut guard = state.feedback_guard.lock().unwrap();
        if !guard.insert(result.id) {
            return Ok(Json(json!({
                "feedback": FEEDBACK_ERROR_PLACEHOLDER,
                "generated": false,
            })));
        }
    }

    let prompt = build_feedback_prompt(&result, &result.breakdown.0);

    let feedback = match state.ai.generate_content(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Feedback generation failed: {:?}", e);
            // Nothing was persisted; release the id so the next view
            // retries instead of seeing the placeholder forever.
            state.feedback_guard.lock().unwrap().remove(&result.id);
            return Ok(Json(json!({
                "feedback": FEEDBACK_ERROR_PLACEHOLDER,
                "generated": false,
            })));
        }
    };

    let updated = sqlx::query("UPDATE results SET feedback = ? WHERE id = ? AND feedback IS NULL")
        .bind(&feedback)
        .bind(result.id)
        .execute(&state.pool)
        .await;

    match updated {
        Ok(_) => Ok(Json(json!({ "feedback": feedback, "generated": true }))),
        Err(e) => {
            tracing::error!("Failed to persist feedback: {:?}", e);
            state.feedback_guard.lock().unwrap().remove(&result.id);
            Ok(Json(json!({
                "feedback": FEEDBACK_ERROR_PLACEHOLDER,
                "generated": false,
            })))
        }
    }
}

/// Returns the feedback text for one owned result, without generating.
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query_as::<_, QuizResult>(
        "SELECT * FROM results WHERE id = ? AND user_id = ?",
    )
    .bind(result_id)
    .bind(claims.user_id())
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(result))
}

/// Deletes one owned result row.
pub async fn delete_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM results WHERE id = ? AND user_id = ?")
        .bind(result_id)
        .bind(claims.user_id())
        .execute(&state.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(Json(json!({ "message": "Result deleted" })))
}
