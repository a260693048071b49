// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    AppState,
    handlers::{auth, quiz, results, subscription},
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz, history, subscription, webhooks).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-email", post(auth::verify_email))
        .route("/request-password-reset", post(auth::request_password_reset))
        .route("/verify-reset-code", post(auth::verify_reset_code))
        .route("/confirm-password-reset", post(auth::confirm_password_reset))
        // Account routes require a valid token.
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route("/resend-verification", post(auth::resend_verification))
                .route("/display-name", put(auth::update_display_name))
                .route("/account", delete(auth::delete_account))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    // Quiz sessions are optionally authenticated: guests may play the
    // restricted category, with nothing persisted.
    let quiz_routes = Router::new()
        .route("/start", post(quiz::start_quiz))
        .route(
            "/sessions/{id}",
            get(quiz::get_session).delete(quiz::quit_session),
        )
        .route("/sessions/{id}/answer", post(quiz::submit_answer))
        .route("/sessions/{id}/next", post(quiz::next_question))
        .route("/questions/generate", post(quiz::generate_questions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let results_routes = Router::new()
        .route("/history", get(results::get_history))
        .route("/feedback", post(results::generate_feedback))
        .route(
            "/results/{id}",
            get(results::get_result).delete(results::delete_result),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let subscription_routes = Router::new()
        .route("/", get(subscription::get_subscription))
        .route("/cancel", post(subscription::cancel_subscription))
        .route("/plan", post(subscription::change_plan))
        .route("/auto-renew", post(subscription::toggle_auto_renew))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .merge(Router::new().nest("/api", results_routes))
        .nest("/api/subscription", subscription_routes)
        .route(
            "/api/webhooks/subscription",
            post(subscription::subscription_webhook),
        )
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
