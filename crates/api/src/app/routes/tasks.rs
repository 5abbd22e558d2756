use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};

use taskflow_core::{ProjectId, TaskId};

use crate::app::dto::{self, CreateTaskRequest, TaskResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_task))
        .route("/:id", put(toggle_task))
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };
    let project_id = match dto::parse_id::<ProjectId>(&body.project_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .projects
        .create_task(user.user_id(), project_id, &body.title, body.description.as_deref())
        .await
    {
        Ok(task) => (StatusCode::CREATED, Json(TaskResponse::from(task))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Flip a task between pending and completed. Takes no body.
pub async fn toggle_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_id::<TaskId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.projects.toggle_task(user.user_id(), id).await {
        Ok(task) => (StatusCode::OK, Json(TaskResponse::from(task))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
