use axum::{
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use taskflow_auth::AuthGate;

use crate::app::errors;
use crate::context::UserContext;

#[derive(Clone)]
pub struct AuthState {
    pub gate: AuthGate,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    // A header that is not valid visible ASCII is treated as absent.
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let user_id = state
        .gate
        .authenticate(header)
        .map_err(errors::domain_error_to_response)?;

    req.extensions_mut().insert(UserContext::new(user_id));

    Ok(next.run(req).await)
}
