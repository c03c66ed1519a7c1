//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;

/// The authenticated caller's uid, inserted into request extensions by
/// [`require_auth`]. Handlers trust it as already authenticated.
#[derive(Clone, Debug)]
pub struct AuthUid(pub String);

/// Middleware that validates the auth session cookie and extracts the uid.
///
/// If valid, inserts an [`AuthUid`] into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract cookie header
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Parse session ID from cookie
    let auth_session_id = cookie_header
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix("session=")
        })
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 3. Validate auth session in database, get uid
    let uid = state
        .store
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 4. Insert uid into request extensions
    req.extensions_mut().insert(AuthUid(uid));

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
