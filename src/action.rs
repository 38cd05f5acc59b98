//! The four todo actions.
//!
//! Every action works against the store handle carried in [`AppState`].
//! Successful mutations invalidate the cached listing view; reads never
//! surface storage failures to the caller.

use std::fmt;

use tracing::{debug, error, warn};

use crate::{
    model::{Todo, TodoId},
    schema::{validate_create, FieldBag, FieldErrors},
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Toggle,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mutation::Create => "create",
            Mutation::Toggle => "toggle",
            Mutation::Delete => "delete",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] FieldErrors),
    /// The id cannot name any record, so the request itself is malformed.
    #[error("Failed to {action} todo")]
    InvalidId { action: Mutation, id: String },
    #[error("Failed to {action} todo")]
    Storage {
        action: Mutation,
        #[source]
        source: sqlx::Error,
    },
}

impl ActionError {
    fn invalid_id(action: Mutation, id: &str) -> Self {
        warn!(%action, id, "malformed todo id");
        ActionError::InvalidId {
            action,
            id: id.to_string(),
        }
    }

    fn storage(action: Mutation, source: sqlx::Error) -> Self {
        error!(%action, error = %source, "todo mutation failed");
        ActionError::Storage { action, source }
    }
}

pub type ActionResult<T = ()> = Result<T, ActionError>;

/// Lists every todo, newest first.
///
/// A storage failure is logged and degrades to an empty list.
pub async fn list_todos(state: &AppState) -> Vec<Todo> {
    match state.store.find_all().await {
        Ok(todos) => todos,
        Err(err) => {
            error!(error = %err, "failed to fetch todos");
            Vec::new()
        }
    }
}

pub async fn create_todo(state: &AppState, fields: &FieldBag) -> ActionResult<Todo> {
    let input = validate_create(fields)?;

    let todo = state
        .store
        .insert(input.content)
        .await
        .map_err(|err| ActionError::storage(Mutation::Create, err))?;

    debug!(id = %todo.id, "todo created");
    state.listing.invalidate();
    Ok(todo)
}

/// Sets the completion flag. A well-formed id that matches nothing is not an
/// error; a malformed one is.
pub async fn toggle_todo(state: &AppState, id: &str, completed: bool) -> ActionResult {
    let id = TodoId::parse(id).ok_or_else(|| ActionError::invalid_id(Mutation::Toggle, id))?;
    let touched = state
        .store
        .set_completed(&id, completed)
        .await
        .map_err(|err| ActionError::storage(Mutation::Toggle, err))?;
    debug!(%id, completed, touched, "todo toggled");

    state.listing.invalidate();
    Ok(())
}

/// Removes a todo. Deleting an unknown or already deleted id is a no-op.
pub async fn delete_todo(state: &AppState, id: &str) -> ActionResult {
    let id = TodoId::parse(id).ok_or_else(|| ActionError::invalid_id(Mutation::Delete, id))?;
    let removed = state
        .store
        .remove(&id)
        .await
        .map_err(|err| ActionError::storage(Mutation::Delete, err))?;
    debug!(%id, removed, "todo deleted");

    state.listing.invalidate();
    Ok(())
}
