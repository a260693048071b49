// tests/auth_tests.rs

mod common;

use common::{login, spawn_app};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "alice@example.com",
            "password": "password123",
            "display_name": "Alice"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: password too short
    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "bob@example.com",
            "password": "short",
            "display_name": "Bob"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let body = serde_json::json!({
        "email": "carol@example.com",
        "password": "password123",
        "display_name": "Carol"
    });

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&body)
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/register", app.address))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "password123",
            "display_name": "Dave"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "dave@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn email_verification_flow() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "erin@example.com",
            "password": "password123",
            "display_name": "Erin"
        }))
        .send()
        .await
        .unwrap();

    // The email itself is skipped in tests; read the token directly.
    let (token,): (String,) =
        sqlx::query_as("SELECT verification_token FROM users WHERE email = ?")
            .bind("erin@example.com")
            .fetch_one(&app.pool)
            .await
            .unwrap();

    let response = client
        .post(format!("{}/api/auth/verify-email", app.address))
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let login_resp = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "erin@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(login_resp["is_verified"], true);

    // A consumed token cannot be replayed.
    let replay = client
        .post(format!("{}/api/auth/verify-email", app.address))
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status().as_u16(), 400);
}

#[tokio::test]
async fn resend_verification_is_rate_limited() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "frank@example.com",
            "password": "password123",
            "display_name": "Frank"
        }))
        .send()
        .await
        .unwrap();
    let token = login(&app, "frank@example.com", "password123").await;

    // Registration just sent one; an immediate resend hits the cooldown.
    let response = client
        .post(format!("{}/api/auth/resend-verification", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 429);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["retry_after_seconds"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn password_reset_flow() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "grace@example.com",
            "password": "password123",
            "display_name": "Grace"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/request-password-reset", app.address))
        .json(&serde_json::json!({ "email": "grace@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (code,): (String,) = sqlx::query_as("SELECT reset_token FROM users WHERE email = ?")
        .bind("grace@example.com")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let verify = client
        .post(format!("{}/api/auth/verify-reset-code", app.address))
        .json(&serde_json::json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(verify.status().as_u16(), 200);

    let confirm = client
        .post(format!("{}/api/auth/confirm-password-reset", app.address))
        .json(&serde_json::json!({ "code": code, "new_password": "brand-new-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(confirm.status().as_u16(), 200);

    // Old password no longer works, the new one does.
    let old = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "grace@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(old.status().as_u16(), 401);

    login(&app, "grace@example.com", "brand-new-pass").await;
}

#[tokio::test]
async fn unknown_reset_code_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/verify-reset-code", app.address))
        .json(&serde_json::json!({ "code": "not-a-real-code" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn account_deletion_removes_the_user() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", app.address))
        .json(&serde_json::json!({
            "email": "heidi@example.com",
            "password": "password123",
            "display_name": "Heidi"
        }))
        .send()
        .await
        .unwrap();
    let token = login(&app, "heidi@example.com", "password123").await;

    let response = client
        .delete(format!("{}/api/auth/account", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let login_again = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "heidi@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login_again.status().as_u16(), 401);
}

#[tokio::test]
async fn profile_endpoints_require_a_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/auth/me", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
