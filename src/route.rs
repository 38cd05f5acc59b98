use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{handler::*, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/todos", post(create_todo_form))
        .route("/todos/:id/toggle", post(toggle_todo_form))
        .route("/todos/:id/delete", post(delete_todo_form))
        .route("/api/health", get(health_checker_handler))
        .route("/api/todos", get(get_todos).post(create_todo))
        .route("/api/todos/:id", patch(update_todo).delete(delete_todo))
        .with_state(app_state)
}
