use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{CredentialsRequest, MessageResponse, TokenResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    match services.accounts.register(&body.email, &body.password).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(MessageResponse {
                message: "user registered",
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    match services.accounts.login(&body.email, &body.password).await {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
