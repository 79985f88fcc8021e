pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interview/questions", post(interview::handle_questions))
        .route("/api/v1/interview/answer", post(interview::handle_answer))
        .route("/api/v1/interview/feedback", post(interview::handle_feedback))
        // Sessions API
        .route(
            "/api/v1/sessions",
            get(sessions::handle_list_sessions).post(sessions::handle_save_session),
        )
        .route("/api/v1/sessions/stats", get(sessions::handle_stats))
        .route("/api/v1/sessions/:id", get(sessions::handle_get_session))
        .route(
            "/api/v1/sessions/:id/feedback",
            get(sessions::handle_get_feedback),
        )
        .route(
            "/api/v1/sessions/:id/evaluate",
            post(sessions::handle_evaluate),
        )
        .with_state(state)
}
