use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;

use crate::{
    action::{self, ActionError},
    model::Todo,
    page::AddForm,
    schema::{form_fields, FieldBag, FieldErrors, ToggleTodoSchema},
    AppState,
};

/// Wire shape of a mutation result: `{"success": true}` or `{"error": ...}`
/// where the error is either field messages or a single message.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Success {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        todo: Option<Todo>,
    },
    Invalid {
        error: FieldErrors,
    },
    Failed {
        error: String,
    },
}

impl ActionResponse {
    pub fn success() -> Self {
        ActionResponse::Success {
            success: true,
            todo: None,
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match self {
            ActionError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ActionResponse::Invalid { error: errors }),
            )
                .into_response(),
            err @ ActionError::InvalidId { .. } => (
                StatusCode::BAD_REQUEST,
                Json(ActionResponse::Failed {
                    error: err.to_string(),
                }),
            )
                .into_response(),
            err @ ActionError::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResponse::Failed {
                    error: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo list with Rust, SQLx, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

fn page_failed(err: tera::Error) -> Response {
    tracing::error!(error = %err, "failed to render page");
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
}

/// Status for a failed form post: malformed ids are the client's fault.
fn form_failed(err: ActionError) -> Response {
    let status = match &err {
        ActionError::InvalidId { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

// Handler for the server-rendered listing page
pub async fn index(State(data): State<Arc<AppState>>) -> Response {
    if let Some(page) = data.listing.get() {
        return Html(page.to_string()).into_response();
    }

    let generation = data.listing.generation();
    let todos = action::list_todos(&data).await;
    match data.pages.render_index(&todos, &AddForm::default()) {
        Ok(page) => {
            data.listing.store(generation, Arc::from(page.as_str()));
            Html(page).into_response()
        }
        Err(err) => page_failed(err),
    }
}

// Handler for the add form
pub async fn create_todo_form(
    State(data): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let fields = form_fields(form);
    match action::create_todo(&data, &fields).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(ActionError::Validation(errors)) => {
            // Rejected input is echoed back, so this render is never cached.
            let todos = action::list_todos(&data).await;
            let form = AddForm {
                content: fields
                    .get("content")
                    .and_then(|value| value.as_str())
                    .unwrap_or_default(),
                errors: errors.get("content").unwrap_or_default(),
            };
            match data.pages.render_index(&todos, &form) {
                Ok(page) => (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response(),
                Err(err) => page_failed(err),
            }
        }
        Err(err) => form_failed(err),
    }
}

// Handler for the per-item completion form
pub async fn toggle_todo_form(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Form(body): Form<ToggleTodoSchema>,
) -> Response {
    match action::toggle_todo(&data, &id, body.completed).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => form_failed(err),
    }
}

// Handler for the per-item delete form
pub async fn delete_todo_form(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Response {
    match action::delete_todo(&data, &id).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => form_failed(err),
    }
}

// Handler for getting all Todo items
pub async fn get_todos(State(data): State<Arc<AppState>>) -> impl IntoResponse {
    let todos = action::list_todos(&data).await;
    let json_response = serde_json::json!({
        "status": "success",
        "results": todos.len(),
        "todos": todos
    });
    (StatusCode::OK, Json(json_response))
}

// Handler for creating a new Todo
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Json(body): Json<FieldBag>,
) -> Result<impl IntoResponse, ActionError> {
    let todo = action::create_todo(&data, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::Success {
            success: true,
            todo: Some(todo),
        }),
    ))
}

// Handler for setting the completion flag of a Todo by ID
pub async fn update_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    Json(body): Json<ToggleTodoSchema>,
) -> Result<impl IntoResponse, ActionError> {
    action::toggle_todo(&data, &id, body.completed).await?;
    Ok(Json(ActionResponse::success()))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ActionError> {
    action::delete_todo(&data, &id).await?;
    Ok(Json(ActionResponse::success()))
}
