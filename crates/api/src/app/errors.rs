use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::extract::rejection::JsonRejection;
use serde_json::json;

use taskflow_core::{DomainError, ErrorKind};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let kind = err.kind();
    let status = status_for(kind);
    match err {
        DomainError::Validation(msg) => json_error(status, kind.as_str(), msg),
        DomainError::Conflict(msg) => json_error(status, kind.as_str(), msg),
        DomainError::Unauthenticated => json_error(status, kind.as_str(), "authentication required"),
        DomainError::Unauthorized => json_error(status, kind.as_str(), "unauthorized"),
        DomainError::NotFound => json_error(status, kind.as_str(), "not found"),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            json_error(status, kind.as_str(), "internal server error")
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Malformed or mistyped JSON bodies are client validation errors.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        ErrorKind::Validation.as_str(),
        rejection.body_text(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_status() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::Unauthorized, StatusCode::FORBIDDEN),
            (DomainError::NotFound, StatusCode::NOT_FOUND),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (DomainError::internal("db down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
