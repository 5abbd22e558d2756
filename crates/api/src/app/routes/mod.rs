use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod projects;
pub mod system;
pub mod tasks;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

/// Router for all authenticated (owner-scoped) endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .nest("/api/projects", projects::router())
        .nest("/api/tasks", tasks::router())
}
