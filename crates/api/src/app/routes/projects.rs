use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use taskflow_core::ProjectId;

use crate::app::dto::{self, ProjectRequest, ProjectResponse, TaskResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:id", put(update_project).delete(delete_project))
        .route("/:id/tasks", get(list_tasks))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.projects.list_projects(user.user_id()).await {
        Ok(projects) => {
            let items: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<ProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    match services
        .projects
        .create_project(user.user_id(), &body.name, body.description.as_deref())
        .await
    {
        Ok(project) => (StatusCode::CREATED, Json(ProjectResponse::from(project))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<ProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_id::<ProjectId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    match services
        .projects
        .update_project(user.user_id(), id, &body.name, body.description.as_deref())
        .await
    {
        Ok(project) => (StatusCode::OK, Json(ProjectResponse::from(project))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_id::<ProjectId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.projects.delete_project(user.user_id(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_id::<ProjectId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.projects.list_tasks(user.user_id(), id).await {
        Ok(tasks) => {
            let items: Vec<TaskResponse> = tasks.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
