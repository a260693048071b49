// tests/common/mod.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quizprep::AppState;
use quizprep::config::Config;
use quizprep::error::AppError;
use quizprep::routes;
use quizprep::services::ai::TextGenerator;
use quizprep::services::payments::{GeneratedQuestion, PaymentsApi};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub const FEEDBACK_TEXT: &str = "Solid performance overall. Keep practicing SQL joins.";

/// AI collaborator stub that counts invocations, for the at-most-once
/// feedback assertions. The first `failures` calls error out, for the
/// lazy-retry assertions.
pub struct CountingGenerator {
    pub calls: Arc<AtomicUsize>,
    pub failures: AtomicUsize,
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn generate_content(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Upstream("AI API returned 503".to_string()));
        }
        Ok(FEEDBACK_TEXT.to_string())
    }
}

/// Payments collaborator stub; question generation returns a fixed bank.
pub struct StubPayments;

#[async_trait]
impl PaymentsApi for StubPayments {
    async fn generate_questions(&self, _category: &str) -> Result<Vec<GeneratedQuestion>, AppError> {
        Ok((0..15)
            .map(|i| GeneratedQuestion {
                subcategory: Some("general".to_string()),
                question: format!("Generated question {}", i),
                answers: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: "A".to_string(),
            })
            .collect())
    }

    async fn cancel_subscription(&self, _subscription_id: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn update_subscription_plan(
        &self,
        _subscription_id: &str,
        _new_price_id: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn toggle_auto_renew(
        &self,
        _subscription_id: &str,
        _enable_auto_renew: bool,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub ai_calls: Arc<AtomicUsize>,
}

/// Spawns the app on a random port against a fresh in-memory database.
/// Returns the base URL, the pool for direct seeding/assertions, and the
/// AI invocation counter.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_ai_failures(0).await
}

/// Like `spawn_app`, but the first `ai_failures` AI calls error out.
#[allow(dead_code)]
pub async fn spawn_app_with_ai_failures(ai_failures: usize) -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        base_url: "http://localhost:3000".to_string(),
        resend_api_key: None, // emails are skipped in tests
        ai_api_url: String::new(),
        ai_api_key: String::new(),
        payments_base_url: String::new(),
        payments_api_token: String::new(),
        webhook_secret: "test-hook-secret".to_string(),
    };

    let ai_calls = Arc::new(AtomicUsize::new(0));
    let ai = Arc::new(CountingGenerator {
        calls: ai_calls.clone(),
        failures: AtomicUsize::new(ai_failures),
    });

    let state = AppState::new(pool.clone(), config, ai, Arc::new(StubPayments));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        ai_calls,
    }
}

/// Registers a user, marks them verified directly in the database, and
/// returns a bearer token.
#[allow(dead_code)]
pub async fn verified_user_token(app: &TestApp, email: &str) -> String {
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "display_name": "Test User"
        }))
        .send()
        .await
        .expect("Register failed");

    sqlx::query("UPDATE users SET is_verified = TRUE WHERE email = ?")
        .bind(email)
        .execute(&app.pool)
        .await
        .unwrap();

    login(app, email, "password123").await
}

#[allow(dead_code)]
pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    resp["token"].as_str().expect("Token not found").to_string()
}

/// Seeds `n` questions for a category; "A" is always correct.
#[allow(dead_code)]
pub async fn seed_questions(app: &TestApp, category: &str, subcategory: Option<&str>, n: usize) {
    for i in 0..n {
        sqlx::query(
            r#"
            INSERT INTO questions (category, subcategory, question, answers, correct_answer)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(category)
        .bind(subcategory)
        .bind(format!("Question {}", i))
        .bind(r#"["A","B","C","D"]"#)
        .bind("A")
        .execute(&app.pool)
        .await
        .unwrap();
    }
}
