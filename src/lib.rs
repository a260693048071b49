// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod services;
pub mod utils;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::quiz::session::QuizSession;
use crate::services::{ai::TextGenerator, payments::PaymentsApi};

pub use routes::create_router;

/// Live quiz sessions, in memory only. Every state-machine event is
/// applied under the write lock, which serializes transitions per session.
pub type Sessions = Arc<RwLock<HashMap<Uuid, QuizSession>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub ai: Arc<dyn TextGenerator>,
    pub payments: Arc<dyn PaymentsApi>,
    pub sessions: Sessions,
    /// Result ids whose feedback generation is in flight or already
    /// handled in this process. Best-effort at-most-once guard.
    pub feedback_guard: Arc<Mutex<HashSet<i64>>>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: Config,
        ai: Arc<dyn TextGenerator>,
        payments: Arc<dyn PaymentsApi>,
    ) -> Self {
        AppState {
            pool,
            config,
            ai,
            payments,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            feedback_guard: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
